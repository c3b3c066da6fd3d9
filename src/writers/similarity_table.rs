use anyhow::Context;
use serde::Serialize;
use std::path::Path;

use crate::data_types::similarity_matrix::SimilarityMatrix;
use crate::similarity::TissuePairSimilarity;
use crate::util::file_io::open_table_writer;

/// Writes a similarity matrix with its raw triangular storage.
/// The header is "sample" followed by every sample name; each row starts with the row sample name.
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `matrix` - the matrix to write; the NaN diagonal is written as "NaN"
pub fn write_similarity_matrix(filename: &Path, matrix: &SimilarityMatrix) -> anyhow::Result<()> {
    let mut csv_writer = open_table_writer(filename)?;

    let mut header = vec!["sample".to_string()];
    header.extend(matrix.names().iter().cloned());
    csv_writer.write_record(&header)?;

    for (name, values) in matrix.names().iter().zip(matrix.rows()) {
        let mut record = vec![name.clone()];
        record.extend(values.iter().map(|v| v.to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

/// Contains all the data written to each row of the tissue-pair file
#[derive(Serialize)]
struct TissuePairRow<'a> {
    /// Condition label
    condition: &'a str,
    /// Tissue pair, e.g. "ME-D"
    tissue_pair: String,
    /// Receptor chain
    chain: String,
    /// Individual identifier
    individual: u32,
    /// Jaccard index between the two tissues of this individual
    jaccard: f64
}

/// Writes the per-individual tissue-pair similarities in long format, one row per individual
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `pairs` - the grouped similarity values
pub fn write_tissue_pairs(filename: &Path, pairs: &[TissuePairSimilarity]) -> anyhow::Result<()> {
    let mut csv_writer = open_table_writer(filename)?;
    for pair in pairs.iter() {
        for &(individual, jaccard) in pair.values.iter() {
            let row = TissuePairRow {
                condition: &pair.condition,
                tissue_pair: format!("{}-{}", pair.tissue1, pair.tissue2),
                chain: pair.chain.to_string(),
                individual,
                jaccard
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
    use crate::data_types::tissue::Chain;

    #[test]
    fn test_write_matrix() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("matrix.csv");
        let mut matrix = SimilarityMatrix::new(vec!["a".to_string(), "b".to_string()]);
        matrix.set(0, 1, 0.5);
        write_similarity_matrix(&path, &matrix).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "sample,a,b\na,NaN,0.5\nb,0,NaN\n");
    }

    #[test]
    fn test_write_tissue_pairs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pairs.tsv");
        let pairs = vec![TissuePairSimilarity {
            condition: "PD".to_string(),
            tissue1: "ME".to_string(),
            tissue2: "D".to_string(),
            chain: Chain::Beta,
            values: vec![(1, 0.25), (3, 0.5)]
        }];
        write_tissue_pairs(&path, &pairs).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "condition\ttissue_pair\tchain\tindividual\tjaccard\nPD\tME-D\tbeta\t1\t0.25\nPD\tME-D\tbeta\t3\t0.5\n");
    }
}
