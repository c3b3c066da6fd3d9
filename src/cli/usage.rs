
use clap::Args;
use log::info;
use serde::Serialize;

use crate::cli::core::{AFTER_HELP, FULL_VERSION};
use crate::cli::input::{check_input_settings, InputSettings};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct UsageSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    repoverlap_version: String,

    #[clap(flatten)]
    pub input: InputSettings,

    /// Only write the pooled usage of each glob, skipping the per-sample rows
    #[clap(long = "pooled-only")]
    #[clap(help_heading = Some("Gene usage"))]
    pub pooled_only: bool,
}

pub fn check_usage_settings(mut settings: UsageSettings) -> anyhow::Result<UsageSettings> {
    // hard code the version in
    settings.repoverlap_version = FULL_VERSION.clone();
    info!("Repoverlap version: {:?}", &settings.repoverlap_version);
    info!("Sub-command: usage");
    check_input_settings(&settings.input)?;

    info!("Gene usage:");
    info!("\tPer-sample rows: {}", if settings.pooled_only { "DISABLED" } else { "ENABLED" });
    Ok(settings)
}
