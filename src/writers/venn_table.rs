use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use crate::data_types::partition::Partition;
use crate::data_types::sample::Sample;
use crate::util::file_io::open_table_writer;

/// Contains all the data written to each row of the Venn counts file
#[derive(Serialize)]
struct VennCountRow {
    /// Region label, sample names joined with the region delimiter
    region: String,
    /// Number of samples in the region
    arity: usize,
    /// Exclusive region size
    count: usize
}

/// Writes one row per Venn region
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `counts` - the exclusive region sizes
pub fn write_venn_counts(filename: &Path, counts: &Partition<usize>) -> anyhow::Result<()> {
    let mut csv_writer = open_table_writer(filename)?;
    for (key, &count) in counts.iter() {
        let row = VennCountRow {
            region: counts.label(key),
            arity: key.arity(),
            count
        };
        csv_writer.serialize(&row)?;
    }
    csv_writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

/// Contains all the data written to each row of the region rows file
#[derive(Serialize)]
struct RegionRow<'a> {
    sample: &'a str,
    sequence: &'a str,
    junction_aa: &'a str,
    v_call: &'a str,
    j_call: &'a str,
    duplicate_count: u64
}

/// Writes the rows of each sample that fall inside a region; empty cells stay empty
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `rows` - filtered samples, keyed by sample name
pub fn write_region_rows(filename: &Path, rows: &IndexMap<String, Sample>) -> anyhow::Result<()> {
    let mut csv_writer = open_table_writer(filename)?;
    for (name, sample) in rows.iter() {
        for record in sample.records().iter() {
            let row = RegionRow {
                sample: name,
                sequence: record.sequence.as_deref().unwrap_or_default(),
                junction_aa: record.junction_aa.as_deref().unwrap_or_default(),
                v_call: record.v_call.as_deref().unwrap_or_default(),
                j_call: record.j_call.as_deref().unwrap_or_default(),
                duplicate_count: record.count()
            };
            csv_writer.serialize(&row)?;
        }
    }
    csv_writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::collection::IdentityMap;
    use crate::data_types::sample::{Record, SampleMetadata};
    use crate::data_types::tissue::{Chain, Tissue};
    use crate::venn_solver::venn_counts;

    #[test]
    fn test_write_venn_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("venn.csv");
        let mut identities = IdentityMap::new();
        identities.insert("b".to_string(), vec!["x".to_string(), "y".to_string()]);
        identities.insert("a".to_string(), vec!["y".to_string()]);
        let counts = venn_counts(&identities).unwrap();
        write_venn_counts(&path, &counts).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "region,arity,count\nb,1,1\na,1,0\nb_&_a,2,1\n");
    }

    #[test]
    fn test_write_region_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.tsv");
        let metadata = SampleMetadata::new("D1".to_string(), Tissue::Dura, 1, Chain::Alpha);
        let sample = Sample::new("s1".to_string(), metadata, vec![Record::new("AAA", "CAVF", "TRAV1*01", "", 2)]);
        let mut rows = IndexMap::new();
        rows.insert("s1".to_string(), sample);
        write_region_rows(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "sample\tsequence\tjunction_aa\tv_call\tj_call\tduplicate_count\ns1\tAAA\tCAVF\tTRAV1*01\t\t2\n");
    }
}
