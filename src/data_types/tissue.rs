
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Canonical tissue names for the abbreviations used in sample identifiers.
/// Merged pseudo-samples carry the user-provided label instead.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Tissue {
    /// `me`
    Muscularis,
    /// `d`
    Dura,
    /// `st`
    Striatum,
    /// `hb`
    Hindbrain,
    /// Coarse-grained union of several tissues, holds the lower-case merge label
    Merged(String)
}

impl Tissue {
    /// Looks up the canonical tissue for an abbreviation, case-insensitive.
    /// Returns None if the abbreviation is not in the tissue table.
    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        match abbreviation.to_ascii_lowercase().as_str() {
            "me" => Some(Tissue::Muscularis),
            "d" => Some(Tissue::Dura),
            "st" => Some(Tissue::Striatum),
            "hb" => Some(Tissue::Hindbrain),
            _ => None
        }
    }

    /// The lower-case abbreviation as it appears in sample identifiers
    pub fn abbreviation(&self) -> &str {
        match self {
            Tissue::Muscularis => "me",
            Tissue::Dura => "d",
            Tissue::Striatum => "st",
            Tissue::Hindbrain => "hb",
            Tissue::Merged(label) => label.as_str()
        }
    }

    /// Full name, used in output tables
    pub fn name(&self) -> &str {
        match self {
            Tissue::Muscularis => "muscularis",
            Tissue::Dura => "dura",
            Tissue::Striatum => "striatum",
            Tissue::Hindbrain => "hindbrain",
            Tissue::Merged(label) => label.as_str()
        }
    }
}

impl std::fmt::Display for Tissue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Receptor chain encoded at the end of the sample identifiers
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Chain {
    #[strum(ascii_case_insensitive, to_string = "alpha", serialize = "tra")]
    Alpha,
    #[strum(ascii_case_insensitive, to_string = "beta", serialize = "trb")]
    Beta
}

impl Chain {
    /// Parses a chain tag, returning None for anything we do not recognize
    pub fn from_tag(tag: &str) -> Option<Self> {
        Chain::from_str(tag).ok()
    }
}
