
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;

use crate::cli::core::{AFTER_HELP, FULL_VERSION};
use crate::cli::input::{check_input_settings, InputSettings};
use crate::filtering::{ConditionGroups, ConditionSpec};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct OverlapSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    repoverlap_version: String,

    #[clap(flatten)]
    pub input: InputSettings,

    /// Condition assignment formatted as LABEL=ID,ID,...; can be repeated [default: one group with every individual]
    #[clap(short = 'c')]
    #[clap(long = "condition")]
    #[clap(value_name = "LABEL=IDS")]
    #[clap(help_heading = Some("Tissue pairs"))]
    pub conditions: Vec<ConditionSpec>,

    /// Tissue abbreviations that define the tissue pairs, in output order
    #[clap(long = "pair-tissues")]
    #[clap(value_name = "ABBR")]
    #[clap(value_delimiter = ',')]
    #[clap(default_value = "ME,D,ST,HB")]
    #[clap(help_heading = Some("Tissue pairs"))]
    pub pair_tissues: Vec<String>,
}

impl OverlapSettings {
    /// The configured conditions, validated
    pub fn condition_groups(&self) -> anyhow::Result<Option<ConditionGroups>> {
        if self.conditions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ConditionGroups::try_from(self.conditions.as_slice())?))
        }
    }
}

pub fn check_overlap_settings(mut settings: OverlapSettings) -> anyhow::Result<OverlapSettings> {
    // hard code the version in
    settings.repoverlap_version = FULL_VERSION.clone();
    info!("Repoverlap version: {:?}", &settings.repoverlap_version);
    info!("Sub-command: overlap");
    check_input_settings(&settings.input)?;

    info!("Tissue pairs:");
    ensure!(settings.pair_tissues.len() >= 2, "--pair-tissues requires at least two tissues");
    info!("\tTissues: {:?}", settings.pair_tissues);
    match settings.condition_groups()? {
        Some(groups) => {
            for (label, individuals) in groups.iter() {
                info!("\tCondition {label}: {individuals:?}");
            }
        },
        None => info!("\tConditions: None, all individuals are reported together")
    };

    Ok(settings)
}
