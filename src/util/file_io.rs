
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Returns true if the path ends in ".gz"
pub fn is_gzipped(filename: &Path) -> bool {
    filename.extension().unwrap_or_default() == "gz"
}

/// Opens a file for reading, transparently decompressing ".gz" files
/// # Arguments
/// * `filename` - the file path to open
/// # Errors
/// * if the file does not open properly
pub fn open_reader(filename: &Path) -> anyhow::Result<Box<dyn Read>> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn Read> = if is_gzipped(filename) {
        Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Opens a file for writing, compressing if the path ends in ".gz"
/// # Arguments
/// * `filename` - the file path to create
/// # Errors
/// * if the file cannot be created
pub fn open_writer(filename: &Path) -> anyhow::Result<Box<dyn Write>> {
    let file = File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    let writer: Box<dyn Write> = if is_gzipped(filename) {
        Box::new(flate2::write::GzEncoder::new(BufWriter::new(file), flate2::Compression::best()))
    } else {
        Box::new(BufWriter::new(file))
    };
    Ok(writer)
}

/// Opens a delimited table writer: comma separated if the path ends in ".csv" (or ".csv.gz"), tab separated otherwise
/// # Arguments
/// * `filename` - the file path to create
/// # Errors
/// * if the file cannot be created
pub fn open_table_writer(filename: &Path) -> anyhow::Result<csv::Writer<Box<dyn Write>>> {
    let stem = if is_gzipped(filename) { filename.with_extension("") } else { filename.to_path_buf() };
    let is_csv: bool = stem.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(open_writer(filename)?);
    Ok(csv_writer)
}

/// This will save a generic serializable struct to JSON.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let mut writer = open_writer(out_filename)?;
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_gz_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let plain = tmp.path().join("a.json");
        let zipped = tmp.path().join("a.json.gz");
        let data = vec!["x".to_string(), "y".to_string()];
        save_json(&data, &plain).unwrap();
        save_json(&data, &zipped).unwrap();

        let mut plain_text = String::new();
        open_reader(&plain).unwrap().read_to_string(&mut plain_text).unwrap();
        let mut zipped_text = String::new();
        open_reader(&zipped).unwrap().read_to_string(&mut zipped_text).unwrap();
        assert_eq!(plain_text, zipped_text);
        assert!(plain_text.contains("\"y\""));
    }

    #[test]
    fn test_table_delimiter() {
        let tmp = tempfile::tempdir().unwrap();
        for (name, expected) in [("t.csv", "a,b\n"), ("t.tsv", "a\tb\n"), ("t.csv.gz", "a,b\n"), ("t.txt", "a\tb\n")] {
            let path = tmp.path().join(name);
            let mut writer = open_table_writer(&path).unwrap();
            writer.write_record(["a", "b"]).unwrap();
            writer.flush().unwrap();
            drop(writer);

            let mut text = String::new();
            open_reader(&path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, expected, "{name}");
        }
    }
}
