/*!
# Sample name parsing
Sample identifiers are underscore-delimited, with the tissue+individual code and the chain tag at fixed positions.
For example, with the default layout `dcr_PKD_ME1_1_alpha` decodes to tissue `me` (muscularis), individual `1`, and chain `alpha`.

## Example usage
```rust
use repoverlap::data_types::tissue::{Chain, Tissue};
use repoverlap::parsing::sample_name::{parse_sample_name, NameLayout, NameLayoutBuilder};

let metadata = parse_sample_name("dcr_PKD_ME1_1_alpha", &NameLayout::default()).unwrap();
assert_eq!(metadata.tissue(), &Tissue::Muscularis);
assert_eq!(metadata.individual(), 1);
assert_eq!(metadata.chain(), Chain::Alpha);

// shorter names just need a different layout
let layout = NameLayoutBuilder::default()
    .tissue_field(1)
    .chain_field(2)
    .build().unwrap();
let metadata = parse_sample_name("T1_D4_beta", &layout).unwrap();
assert_eq!(metadata.tissue(), &Tissue::Dura);
assert_eq!(metadata.individual(), 4);
```
*/
use derive_builder::Builder;
use serde::Serialize;

use crate::data_types::repertoire_error::RepertoireError;
use crate::data_types::sample::SampleMetadata;
use crate::data_types::tissue::{Chain, Tissue};

/// Delimiter between the fields of a sample identifier
pub const NAME_DELIMITER: char = '_';

/// Positions of the metadata fields inside a sample identifier
#[derive(Builder, Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[builder(default)]
pub struct NameLayout {
    /// Field holding the tissue+individual code, e.g. "ME1"
    tissue_field: usize,
    /// Field holding the chain tag, e.g. "alpha"
    chain_field: usize
}

impl Default for NameLayout {
    fn default() -> Self {
        // dcr_PKD_ME1_1_alpha
        Self {
            tissue_field: 2,
            chain_field: 4
        }
    }
}

impl NameLayout {
    /// Constructor
    pub fn new(tissue_field: usize, chain_field: usize) -> Self {
        Self {
            tissue_field,
            chain_field
        }
    }

    // getters
    pub fn tissue_field(&self) -> usize {
        self.tissue_field
    }

    pub fn chain_field(&self) -> usize {
        self.chain_field
    }

    /// Pulls the tissue+individual code out of a sample name
    pub fn tissue_code<'a>(&self, name: &'a str) -> Result<&'a str, RepertoireError> {
        get_field(name, self.tissue_field)
    }

    /// Returns `name` with the tissue code replaced by `code`, all other fields untouched
    pub fn replace_tissue_code(&self, name: &str, code: &str) -> Result<String, RepertoireError> {
        let mut fields: Vec<&str> = name.split(NAME_DELIMITER).collect();
        if self.tissue_field >= fields.len() {
            return Err(RepertoireError::malformed(name, format!("missing field {}", self.tissue_field)));
        }
        fields[self.tissue_field] = code;
        Ok(fields.join(&NAME_DELIMITER.to_string()))
    }
}

/// Gets a single delimited field, failing if it is missing or empty
fn get_field(name: &str, index: usize) -> Result<&str, RepertoireError> {
    match name.split(NAME_DELIMITER).nth(index) {
        Some(field) if !field.is_empty() => Ok(field),
        _ => Err(RepertoireError::malformed(name, format!("missing field {index}")))
    }
}

/// Splits a tissue code into the lower-case tissue abbreviation and the individual id.
/// The individual is the final character of the code.
/// # Arguments
/// * `name` - the full sample name, only used for error messages
/// * `code` - the tissue+individual code, e.g. "ME1"
/// # Errors
/// * if the code is empty or the final character is not a digit
pub fn split_tissue_code(name: &str, code: &str) -> Result<(String, u32), RepertoireError> {
    let last = code.chars().last()
        .ok_or_else(|| RepertoireError::malformed(name, "empty tissue code"))?;
    let individual = last.to_digit(10)
        .ok_or_else(|| RepertoireError::malformed(name, format!("tissue code \"{code}\" does not end in a digit")))?;
    // may be empty, the tissue table lookup rejects it
    let abbreviation = code[..code.len() - last.len_utf8()].to_ascii_lowercase();
    Ok((abbreviation, individual))
}

/// Decodes the metadata of a sample identifier.
/// # Arguments
/// * `name` - the sample identifier
/// * `layout` - where to find each field
/// # Errors
/// * `MalformedIdentifier` if a field is missing, the individual is not numeric, or the chain is unknown
/// * `UnknownTissue` if the abbreviation is not in the tissue table
pub fn parse_sample_name(name: &str, layout: &NameLayout) -> Result<SampleMetadata, RepertoireError> {
    let code = layout.tissue_code(name)?;
    let (abbreviation, individual) = split_tissue_code(name, code)?;
    let tissue = Tissue::from_abbreviation(&abbreviation)
        .ok_or_else(|| RepertoireError::UnknownTissue {
            sample: name.to_string(),
            abbreviation: abbreviation.clone()
        })?;

    let chain_tag = get_field(name, layout.chain_field)?;
    let chain = Chain::from_tag(chain_tag)
        .ok_or_else(|| RepertoireError::malformed(name, format!("unknown chain \"{chain_tag}\"")))?;

    Ok(SampleMetadata::new(code.to_string(), tissue, individual, chain))
}
