
use anyhow::{bail, Context};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::data_types::collection::Collection;
use crate::data_types::repertoire_error::RepertoireError;
use crate::data_types::sample::{Record, Sample};
use crate::parsing::sample_name::{parse_sample_name, NameLayout};
use crate::util::file_io::open_reader;
use crate::util::progress_bar::file_progress_bar;

/// Finds all files in `directory` matching `pattern`, sorted by their reversed path string.
/// Sorting on the reversed string groups files by their suffix first (chain, then replicate, then tissue code).
/// # Arguments
/// * `directory` - the folder to search in
/// * `pattern` - a filename glob, e.g. "*PKD*alpha*tsv"
pub fn find_repertoire_files(directory: &Path, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let full_pattern = directory.join(pattern);
    let full_pattern = full_pattern.to_str()
        .with_context(|| format!("Non UTF-8 search path: {full_pattern:?}"))?;

    let mut files = vec![];
    for entry in glob::glob(full_pattern).with_context(|| format!("Invalid glob pattern: {pattern:?}"))? {
        let path = entry.with_context(|| format!("Error while scanning {directory:?}:"))?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|p| p.to_string_lossy().chars().rev().collect::<String>());
    Ok(files)
}

/// The sample identifier for a file: the file name up to the first '.'
pub fn sample_name_from_path(path: &Path) -> anyhow::Result<String> {
    let file_name = path.file_name()
        .and_then(|f| f.to_str())
        .with_context(|| format!("Could not get file name from {path:?}"))?;
    match file_name.split('.').next() {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => bail!("Could not get sample name from {path:?}")
    }
}

/// Reads all rows of a single tab-delimited repertoire table
/// # Arguments
/// * `filename` - the TSV file, optionally gzipped
pub fn load_records(filename: &Path) -> anyhow::Result<Vec<Record>> {
    let reader = open_reader(filename)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let mut records = vec![];
    for result in csv_reader.deserialize() {
        let record: Record = result.with_context(|| format!("Error while reading {filename:?}:"))?;
        records.push(record);
    }
    Ok(records)
}

/// Loads a single repertoire file into a sample, parsing the metadata from the file name
pub fn load_sample(filename: &Path, layout: &NameLayout) -> anyhow::Result<Sample> {
    let name = sample_name_from_path(filename)?;
    let metadata = parse_sample_name(&name, layout)?;
    let records = load_records(filename)?;
    debug!("Loaded {} rows for {name}", records.len());
    Ok(Sample::new(name, metadata, records))
}

/// Loads every repertoire matching a glob into an ordered collection.
/// # Arguments
/// * `directory` - the folder to search in
/// * `pattern` - the filename glob
/// * `expected` - the number of files that must match, if known
/// * `layout` - sample name layout for metadata parsing
/// # Errors
/// * `UnexpectedFileCount` if the number of matches differs from `expected`
/// * if any file fails to parse, or two files share a sample name
pub fn load_repertoires(directory: &Path, pattern: &str, expected: Option<usize>, layout: &NameLayout) -> anyhow::Result<Collection> {
    let files = find_repertoire_files(directory, pattern)?;
    match expected {
        Some(expected) if files.len() != expected => {
            return Err(RepertoireError::UnexpectedFileCount {
                pattern: pattern.to_string(),
                expected,
                found: files.len()
            }.into());
        },
        _ => {}
    };

    info!("Loading {} repertoires matching {pattern:?}...", files.len());
    let progress = file_progress_bar(files.len());
    let mut collection = Collection::default();
    for filename in files.iter() {
        progress.set_message(filename.file_name().unwrap_or_default().to_string_lossy().to_string());
        let sample = load_sample(filename, layout)
            .with_context(|| format!("Error while loading {filename:?}:"))?;
        collection.insert(sample)?;
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::sample::IdentityKey;
    use crate::data_types::tissue::Tissue;
    use std::io::Write;

    fn write_table(folder: &Path, name: &str, rows: &[&str]) {
        let mut file = std::fs::File::create(folder.join(name)).unwrap();
        writeln!(file, "sequence\tjunction_aa\tv_call\tj_call\tduplicate_count\tproductive").unwrap();
        for row in rows.iter() {
            writeln!(file, "{row}").unwrap();
        }
    }

    #[test]
    fn test_load_repertoires() {
        let tmp = tempfile::tempdir().unwrap();
        write_table(tmp.path(), "dcr_PKD_ME1_1_alpha.tsv", &[
            "AAA\tCAVF\tTRAV1*01\tTRAJ2*01\t3\tT",
            "\tCASS\tTRAV1*01\tTRAJ2*01\t1\tT",
        ]);
        write_table(tmp.path(), "dcr_PKD_D1_1_alpha.tsv", &["CCC\tCAVF\tTRAV1*01\tTRAJ2*01\t\tT"]);
        write_table(tmp.path(), "dcr_PKD_D1_1_beta.tsv", &["GGG\tCASS\tTRBV1*01\tTRBJ2*01\t2\tT"]);

        let layout = NameLayout::default();
        let collection = load_repertoires(tmp.path(), "*alpha*tsv", Some(2), &layout).unwrap();
        // reversed-path order: "...1D_..." sorts before "...1EM_..."
        assert_eq!(collection.names(), vec!["dcr_PKD_D1_1_alpha".to_string(), "dcr_PKD_ME1_1_alpha".to_string()]);

        let me = collection.get("dcr_PKD_ME1_1_alpha").unwrap();
        assert_eq!(me.metadata().tissue(), &Tissue::Muscularis);
        assert_eq!(me.records().len(), 2);
        assert_eq!(me.records()[1].sequence, None);
        assert_eq!(me.identity_keys(IdentityKey::Sequence), vec!["AAA"]);

        let d = collection.get("dcr_PKD_D1_1_alpha").unwrap();
        assert_eq!(d.records()[0].count(), 1);
    }

    #[test]
    fn test_unexpected_count() {
        let tmp = tempfile::tempdir().unwrap();
        write_table(tmp.path(), "dcr_PKD_ME1_1_alpha.tsv", &[]);

        let err = load_repertoires(tmp.path(), "*alpha*tsv", Some(32), &NameLayout::default()).unwrap_err();
        let repertoire_err = err.downcast_ref::<RepertoireError>().unwrap();
        assert_eq!(repertoire_err, &RepertoireError::UnexpectedFileCount {
            pattern: "*alpha*tsv".to_string(), expected: 32, found: 1
        });

        // no expectation means no check
        let collection = load_repertoires(tmp.path(), "*alpha*tsv", None, &NameLayout::default()).unwrap();
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_sample_name_from_path() {
        assert_eq!(sample_name_from_path(Path::new("/data/dcr_PKD_ME1_1_alpha.tsv.gz")).unwrap(), "dcr_PKD_ME1_1_alpha");
        assert!(sample_name_from_path(Path::new("/data/.hidden")).is_err());
    }
}
