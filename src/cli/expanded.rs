
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;

use crate::cli::core::{AFTER_HELP, FULL_VERSION};
use crate::cli::input::{check_input_settings, InputSettings};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ExpandedSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    repoverlap_version: String,

    #[clap(flatten)]
    pub input: InputSettings,

    /// Tissue whose expanded keys are tested
    #[clap(long = "source-tissue")]
    #[clap(value_name = "ABBR")]
    #[clap(default_value = "ME")]
    #[clap(help_heading = Some("Expansion"))]
    pub source_tissue: String,

    /// Tissue searched for the expanded keys
    #[clap(long = "target-tissue")]
    #[clap(value_name = "ABBR")]
    #[clap(default_value = "D")]
    #[clap(help_heading = Some("Expansion"))]
    pub target_tissue: String,

    /// A key is expanded when its summed count is above this value
    #[clap(long = "min-count")]
    #[clap(value_name = "COUNT")]
    #[clap(default_value = "1")]
    #[clap(help_heading = Some("Expansion"))]
    pub min_count: u64,
}

pub fn check_expanded_settings(mut settings: ExpandedSettings) -> anyhow::Result<ExpandedSettings> {
    // hard code the version in
    settings.repoverlap_version = FULL_VERSION.clone();
    info!("Repoverlap version: {:?}", &settings.repoverlap_version);
    info!("Sub-command: expanded");
    check_input_settings(&settings.input)?;

    info!("Expansion:");
    ensure!(
        !settings.source_tissue.eq_ignore_ascii_case(&settings.target_tissue),
        "--source-tissue and --target-tissue must differ"
    );
    info!("\tSource tissue: {}", settings.source_tissue);
    info!("\tTarget tissue: {}", settings.target_tissue);
    info!("\tMinimum count: >{}", settings.min_count);
    Ok(settings)
}
