
use anyhow::{ensure, Context};
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::check_required_folder;
use crate::coarse_grain::coarse_grain_by_individual;
use crate::data_types::collection::Collection;
use crate::data_types::sample::IdentityKey;
use crate::filtering::{filter_by_tissue, filter_samples};
use crate::parsing::repertoire_loader::load_repertoires;
use crate::parsing::sample_name::NameLayout;

/// Input, filtering, and output options shared by every subcommand
#[derive(Args, Clone, Default, Serialize)]
pub struct InputSettings {
    /// Folder containing the repertoire tables (TSV, optionally gzipped)
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_dir: PathBuf,

    /// File glob inside the input folder; each glob is loaded as a separate set, e.g. one per chain
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "glob")]
    #[clap(value_name = "GLOB")]
    #[clap(help_heading = Some("Input/Output"))]
    pub globs: Vec<String>,

    /// Number of files each glob must match, provided in glob order [default: not checked]
    #[clap(long = "expected-files")]
    #[clap(value_name = "COUNT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub expected_files: Vec<usize>,

    /// Output folder
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Write comma separated tables instead of tab separated
    #[clap(long = "csv")]
    #[clap(help_heading = Some("Input/Output"))]
    pub csv: bool,

    /// Underscore-delimited field holding the tissue+individual code
    #[clap(long = "tissue-field")]
    #[clap(value_name = "INDEX")]
    #[clap(default_value = "2")]
    #[clap(help_heading = Some("Sample names"))]
    pub tissue_field: usize,

    /// Underscore-delimited field holding the chain tag
    #[clap(long = "chain-field")]
    #[clap(value_name = "INDEX")]
    #[clap(default_value = "4")]
    #[clap(help_heading = Some("Sample names"))]
    pub chain_field: usize,

    /// Column that decides set membership
    #[clap(short = 'k')]
    #[clap(long = "key")]
    #[clap(value_name = "KEY")]
    #[clap(default_value = "sequence")]
    #[clap(help_heading = Some("Filtering"))]
    pub identity_key: IdentityKey,

    /// Only keep these individuals [default: all]
    #[clap(long = "individual")]
    #[clap(value_name = "ID")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Filtering"))]
    pub individuals: Vec<u32>,

    /// Only keep these tissue abbreviations [default: all]
    #[clap(long = "tissue")]
    #[clap(value_name = "ABBR")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Filtering"))]
    pub tissues: Vec<String>,

    /// Tissue abbreviations merged into one pseudo-sample per individual, e.g. "HB,ST"
    #[clap(long = "merge-tissues")]
    #[clap(value_name = "ABBR")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Filtering"))]
    pub merge_tissues: Vec<String>,

    /// Tissue label of merged pseudo-samples
    #[clap(long = "merge-label")]
    #[clap(value_name = "LABEL")]
    #[clap(default_value = "BR")]
    #[clap(help_heading = Some("Filtering"))]
    pub merge_label: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl InputSettings {
    pub fn name_layout(&self) -> NameLayout {
        NameLayout::new(self.tissue_field, self.chain_field)
    }

    /// Full path of an output table with the configured extension
    /// # Arguments
    /// * `stem` - file name without extension
    pub fn table_path(&self, stem: &str) -> PathBuf {
        let extension = if self.csv { "csv" } else { "tsv" };
        self.output_folder.join(format!("{stem}.{extension}"))
    }

    /// Loads one collection per glob, then applies the individual and tissue filters and the optional merge
    /// # Errors
    /// * if loading fails or a glob matches an unexpected number of files
    /// * if coarse-graining fails
    pub fn load_collections(&self) -> anyhow::Result<Vec<Collection>> {
        let layout = self.name_layout();
        let mut collections = Vec::with_capacity(self.globs.len());
        for (i, pattern) in self.globs.iter().enumerate() {
            let expected = self.expected_files.get(i).copied();
            let loaded = load_repertoires(&self.input_dir, pattern, expected, &layout)?;
            let filtered = self.apply_filters(&loaded);
            info!("Glob {pattern:?}: {} of {} samples pass filters", filtered.len(), loaded.len());

            let prepared = if self.merge_tissues.is_empty() {
                filtered
            } else {
                let merged = coarse_grain_by_individual(&filtered, &self.merge_tissues, &self.merge_label, &layout)
                    .with_context(|| format!("Error while merging tissues for {pattern:?}:"))?;
                if self.tissues.is_empty() {
                    merged
                } else {
                    // unmerged leftovers of the merge set were not requested
                    let mut keep = self.tissues.clone();
                    keep.push(self.merge_label.clone());
                    filter_by_tissue(&merged, &keep)
                }
            };
            collections.push(prepared);
        }
        Ok(collections)
    }

    fn apply_filters(&self, collection: &Collection) -> Collection {
        let by_individual = if self.individuals.is_empty() {
            collection.clone()
        } else {
            filter_samples(collection, |s| self.individuals.contains(&s.metadata().individual()))
        };

        if self.tissues.is_empty() {
            by_individual
        } else {
            // keep merge inputs so coarse-graining still sees them
            let mut keep = self.tissues.clone();
            keep.extend(self.merge_tissues.iter().cloned());
            filter_by_tissue(&by_individual, &keep)
        }
    }
}

/// Checks the shared settings and logs them
pub fn check_input_settings(settings: &InputSettings) -> anyhow::Result<()> {
    info!("Inputs:");
    check_required_folder(&settings.input_dir, "Input folder")?;
    info!("\tInput folder: {:?}", &settings.input_dir);
    ensure!(!settings.globs.is_empty(), "At least one --glob is required");
    ensure!(
        settings.expected_files.is_empty() || settings.expected_files.len() == settings.globs.len(),
        "--expected-files must be provided once per --glob"
    );
    for (i, pattern) in settings.globs.iter().enumerate() {
        match settings.expected_files.get(i) {
            Some(expected) => info!("\tGlob #{i}: {pattern:?} ({expected} files expected)"),
            None => info!("\tGlob #{i}: {pattern:?}")
        };
    }

    info!("Sample names:");
    ensure!(settings.tissue_field != settings.chain_field, "--tissue-field and --chain-field must differ");
    info!("\tTissue field: {}", settings.tissue_field);
    info!("\tChain field: {}", settings.chain_field);

    info!("Filtering:");
    info!("\tIdentity key: {}", settings.identity_key);
    if settings.individuals.is_empty() {
        info!("\tIndividuals: ALL");
    } else {
        info!("\tIndividuals: {:?}", settings.individuals);
    }
    if settings.tissues.is_empty() {
        info!("\tTissues: ALL");
    } else {
        info!("\tTissues: {:?}", settings.tissues);
    }
    if settings.merge_tissues.is_empty() {
        info!("\tMerged tissues: None");
    } else {
        ensure!(settings.merge_tissues.len() >= 2, "--merge-tissues requires at least two tissues");
        ensure!(!settings.merge_label.is_empty(), "--merge-label must not be empty");
        info!("\tMerged tissues: {:?} -> {}", settings.merge_tissues, settings.merge_label);
    }

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    info!("\tTable format: {}", if settings.csv { "CSV" } else { "TSV" });
    Ok(())
}
