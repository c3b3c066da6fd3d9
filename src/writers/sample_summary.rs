use anyhow::Context;
use serde::Serialize;
use std::path::Path;

use crate::data_types::sample::Sample;
use crate::diversity::DiversityIndex;
use crate::util::file_io::open_table_writer;

/// Identifying columns shared by the per-sample outputs
#[derive(Clone, Debug)]
struct SampleColumns {
    sample: String,
    tissue: String,
    individual: u32,
    chain: String
}

impl SampleColumns {
    fn new(sample: &Sample) -> Self {
        let metadata = sample.metadata();
        Self {
            sample: sample.name().to_string(),
            tissue: metadata.tissue().to_string(),
            individual: metadata.individual(),
            chain: metadata.chain().to_string()
        }
    }
}

/// Contains all the data written to each row of the diversity file
#[derive(Serialize)]
struct DiversityRow {
    sample: String,
    tissue: String,
    individual: u32,
    chain: String,
    total_count: u64,
    categories: usize,
    simpson: f64,
    effective_species: f64,
    simpson_std_error: Option<f64>,
    effective_species_std_error: Option<f64>
}

/// This is a wrapper for collecting and writing per-sample diversity
#[derive(Default)]
pub struct DiversityWriter {
    rows: Vec<DiversityRow>
}

impl DiversityWriter {
    /// Adds the diversity of one sample
    pub fn add_sample(&mut self, sample: &Sample, index: &DiversityIndex) {
        let columns = SampleColumns::new(sample);
        self.rows.push(DiversityRow {
            sample: columns.sample,
            tissue: columns.tissue,
            individual: columns.individual,
            chain: columns.chain,
            total_count: index.total_count,
            categories: index.categories,
            simpson: index.simpson,
            effective_species: index.effective_species,
            simpson_std_error: index.simpson_std_error,
            effective_species_std_error: index.effective_species_std_error
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Will write the rows out to the given file path; missing errors are written as empty cells
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    pub fn write_summary(&self, filename: &Path) -> anyhow::Result<()> {
        let mut csv_writer = open_table_writer(filename)?;
        for row in self.rows.iter() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()
            .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
        Ok(())
    }
}

/// Contains all the data written to each row of the expanded-overlap file
#[derive(Serialize)]
struct ExpansionRow {
    individual: u32,
    chain: String,
    source: String,
    source_tissue: String,
    target: String,
    target_tissue: String,
    expanded: usize,
    fraction_found: Option<f64>
}

/// This is a wrapper for collecting and writing expanded-overlap fractions
#[derive(Default)]
pub struct ExpansionWriter {
    rows: Vec<ExpansionRow>
}

impl ExpansionWriter {
    /// Adds a source/target comparison
    /// # Arguments
    /// * `source` - sample providing the expanded keys
    /// * `target` - sample searched for those keys
    /// * `expanded` - number of expanded keys in the source
    /// * `fraction_found` - fraction of those keys found in the target, None if there were none
    pub fn add_comparison(&mut self, source: &Sample, target: &Sample, expanded: usize, fraction_found: Option<f64>) {
        let source_columns = SampleColumns::new(source);
        let target_columns = SampleColumns::new(target);
        self.rows.push(ExpansionRow {
            individual: source_columns.individual,
            chain: source_columns.chain,
            source: source_columns.sample,
            source_tissue: source_columns.tissue,
            target: target_columns.sample,
            target_tissue: target_columns.tissue,
            expanded,
            fraction_found
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Will write the rows out to the given file path
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    pub fn write_summary(&self, filename: &Path) -> anyhow::Result<()> {
        let mut csv_writer = open_table_writer(filename)?;
        for row in self.rows.iter() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()
            .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
        Ok(())
    }
}
