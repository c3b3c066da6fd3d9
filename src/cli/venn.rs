
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;

use crate::cli::core::{AFTER_HELP, FULL_VERSION};
use crate::cli::input::{check_input_settings, InputSettings};
use crate::data_types::partition::{RegionKey, REGION_DELIMITER};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct VennSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    repoverlap_version: String,

    #[clap(flatten)]
    pub input: InputSettings,

    /// Two-sample region, e.g. "{sample1}_&_{sample2}"; writes the rows of both samples inside the overlap
    #[clap(short = 'r')]
    #[clap(long = "region")]
    #[clap(value_name = "REGION")]
    #[clap(help_heading = Some("Regions"))]
    pub region: Option<String>,
}

pub fn check_venn_settings(mut settings: VennSettings) -> anyhow::Result<VennSettings> {
    // hard code the version in
    settings.repoverlap_version = FULL_VERSION.clone();
    info!("Repoverlap version: {:?}", &settings.repoverlap_version);
    info!("Sub-command: venn");
    check_input_settings(&settings.input)?;

    info!("Regions:");
    if let Some(region) = settings.region.as_deref() {
        let arity = RegionKey::from_label(region).arity();
        ensure!(arity == 2, "--region must name exactly two samples joined by {REGION_DELIMITER:?}, found {arity}");
        info!("\tRow filter region: {region:?}");
    } else {
        info!("\tRow filter region: None");
    }

    Ok(settings)
}
