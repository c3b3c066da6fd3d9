use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::diversity::DiversitySettings;
use crate::cli::expanded::ExpandedSettings;
use crate::cli::overlap::OverlapSettings;
use crate::cli::usage::UsageSettings;
use crate::cli::venn::VennSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the license summary.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2023-{}     Repoverlap contributors
Distributed under the MIT license. This program comes with ABSOLUTELY NO WARRANTY;
it is intended for research use only.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// Repoverlap, a tool for measuring overlap and diversity across immune repertoires.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Pairwise Jaccard similarity between samples and per-individual tissue pairs
    Overlap(Box<OverlapSettings>),
    /// Venn region sizes for 2 or 3 samples of one individual
    Venn(Box<VennSettings>),
    /// Effective number of species (inverse Simpson) per sample
    Diversity(Box<DiversitySettings>),
    /// Fraction of expanded clonotypes from one tissue found in another
    Expanded(Box<ExpandedSettings>),
    /// V gene usage per sample and pooled
    Usage(Box<UsageSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a folder exists and will otherwise exit
/// # Arguments
/// * `folder` - the folder path to check for
/// * `label` - the label to use for error messages
pub fn check_required_folder(folder: &Path, label: &str) -> anyhow::Result<()> {
    if !folder.is_dir() {
        bail!("{} does not exist or is not a folder: \"{}\"", label, folder.display());
    }

    // folder exists
    Ok(())
}
