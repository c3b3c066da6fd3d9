
use clap::Args;
use log::info;
use serde::Serialize;

use crate::cli::core::{AFTER_HELP, FULL_VERSION};
use crate::cli::input::{check_input_settings, InputSettings};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct DiversitySettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    repoverlap_version: String,

    #[clap(flatten)]
    pub input: InputSettings,
}

pub fn check_diversity_settings(mut settings: DiversitySettings) -> anyhow::Result<DiversitySettings> {
    // hard code the version in
    settings.repoverlap_version = FULL_VERSION.clone();
    info!("Repoverlap version: {:?}", &settings.repoverlap_version);
    info!("Sub-command: diversity");
    check_input_settings(&settings.input)?;
    Ok(settings)
}
