
/// Precondition failures raised by the comparison engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RepertoireError {
    #[error("unknown tissue abbreviation \"{abbreviation}\" in sample \"{sample}\"")]
    UnknownTissue { sample: String, abbreviation: String },
    #[error("malformed sample identifier \"{sample}\": {reason}")]
    MalformedIdentifier { sample: String, reason: String },
    #[error("every sample matched the merge set {tissues:?}, no sample is left to use as a naming template")]
    NoTemplateSample { tissues: Vec<String> },
    #[error("region \"{region}\" has {arity} samples, expected {expected}")]
    UnsupportedRegionArity { region: String, arity: usize, expected: String },
    #[error("sample \"{sample}\" has a total count of 0")]
    EmptySample { sample: String },
    #[error("expected {expected} files matching \"{pattern}\", found {found}")]
    UnexpectedFileCount { pattern: String, expected: usize, found: usize },
    #[error("sample \"{sample}\" is already present in the collection")]
    DuplicateSample { sample: String },
    #[error("matrix shapes differ: {left} vs. {right}")]
    MatrixShapeMismatch { left: usize, right: usize },
    #[error("matrix labels differ at position {index}: \"{left}\" vs. \"{right}\"")]
    MatrixLabelMismatch { index: usize, left: String, right: String },
}

impl RepertoireError {
    /// Shorthand for the most common construction site
    pub fn malformed(sample: &str, reason: impl Into<String>) -> Self {
        RepertoireError::MalformedIdentifier {
            sample: sample.to_string(),
            reason: reason.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RepertoireError::UnexpectedFileCount { pattern: "*alpha*tsv".to_string(), expected: 32, found: 31 };
        assert_eq!(err.to_string(), "expected 32 files matching \"*alpha*tsv\", found 31");

        let err = RepertoireError::malformed("dcr_PKD", "missing field 2");
        assert_eq!(err.to_string(), "malformed sample identifier \"dcr_PKD\": missing field 2");
    }
}
