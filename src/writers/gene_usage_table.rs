use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use crate::gene_usage::GeneUsage;
use crate::util::file_io::open_table_writer;

/// Contains all the data written to each row of the gene usage file
#[derive(Serialize)]
struct GeneUsageRow<'a> {
    /// Sample name, or the pooled group label
    group: &'a str,
    gene: &'a str,
    count: u64,
    frequency: f64
}

/// Writes gene usage in long format, groups in the given order
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `usage` - group label to its sorted usage rows
pub fn write_gene_usage(filename: &Path, usage: &IndexMap<String, Vec<GeneUsage>>) -> anyhow::Result<()> {
    let mut csv_writer = open_table_writer(filename)?;
    for (group, rows) in usage.iter() {
        for gene_usage in rows.iter() {
            let row = GeneUsageRow {
                group,
                gene: &gene_usage.gene,
                count: gene_usage.count,
                frequency: gene_usage.frequency
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

    #[test]
    fn test_write_gene_usage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("usage.csv");
        let mut usage = IndexMap::new();
        usage.insert("pooled".to_string(), vec![
            GeneUsage { gene: "TRAV1".to_string(), count: 3, frequency: 0.75 },
            GeneUsage { gene: "TRAV2".to_string(), count: 1, frequency: 0.25 }
        ]);
        write_gene_usage(&path, &usage).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "group,gene,count,frequency\npooled,TRAV1,3,0.75\npooled,TRAV2,1,0.25\n");
    }
}
