
use log::debug;
use rustc_hash::FxHashSet as HashSet;

use crate::data_types::sample::{IdentityKey, Sample};

/// Default threshold; a key is expanded when its aggregated count is strictly above this
pub const DEFAULT_MIN_COUNT: u64 = 1;

/// Identity keys whose aggregated count exceeds `min_count`, in first-seen order
pub fn expanded_keys(sample: &Sample, key: IdentityKey, min_count: u64) -> Vec<String> {
    sample.identity_counts(key).into_iter()
        .filter(|(_k, count)| *count > min_count)
        .map(|(k, _count)| k)
        .collect()
}

/// Fraction of the expanded keys in `source` that are present anywhere in `target`.
/// Returns None when `source` has no expanded keys.
/// # Arguments
/// * `source` - sample whose expanded keys are tested, e.g. the muscularis sample
/// * `target` - sample searched for those keys, e.g. the dura sample
/// * `key` - identity column
/// * `min_count` - expansion threshold, see [`expanded_keys`]
pub fn expanded_overlap(source: &Sample, target: &Sample, key: IdentityKey, min_count: u64) -> Option<f64> {
    let expanded = expanded_keys(source, key, min_count);
    if expanded.is_empty() {
        debug!("No expanded keys in {}", source.name());
        return None;
    }

    let target_set: HashSet<String> = target.identity_set(key);
    let found = expanded.iter()
        .filter(|k| target_set.contains(*k))
        .count();
    debug!("{} of {} expanded keys from {} found in {}", found, expanded.len(), source.name(), target.name());
    Some(found as f64 / expanded.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::data_types::sample::{Record, SampleMetadata};
    use crate::data_types::tissue::{Chain, Tissue};

    fn build(code: &str, tissue: Tissue, rows: &[(&str, u64)]) -> Sample {
        let metadata = SampleMetadata::new(code.to_string(), tissue, 1, Chain::Beta);
        let records = rows.iter()
            .map(|(junction, count)| Record::new("", junction, "TRBV1*01", "TRBJ1*01", *count))
            .collect();
        Sample::new(format!("dcr_PKD_{code}_1_beta"), metadata, records)
    }

    #[test]
    fn test_expanded_keys() {
        let source = build("ME1", Tissue::Muscularis, &[("CASA", 3), ("CASB", 1), ("CASC", 1), ("CASC", 1), ("CASD", 2)]);
        // CASC is split over two rows but aggregates to 2
        assert_eq!(
            expanded_keys(&source, IdentityKey::Clonotype, DEFAULT_MIN_COUNT),
            vec!["CASA TRBV1 TRBJ1", "CASC TRBV1 TRBJ1", "CASD TRBV1 TRBJ1"]
        );
        assert_eq!(expanded_keys(&source, IdentityKey::Clonotype, 2), vec!["CASA TRBV1 TRBJ1"]);
        // no sequences at all
        assert!(expanded_keys(&source, IdentityKey::Sequence, DEFAULT_MIN_COUNT).is_empty());
    }

    #[test]
    fn test_expanded_overlap() {
        let source = build("ME1", Tissue::Muscularis, &[("CASA", 3), ("CASB", 1), ("CASC", 2), ("CASD", 2)]);
        let target = build("D1", Tissue::Dura, &[("CASA", 1), ("CASB", 5), ("CASD", 1)]);
        let fraction = expanded_overlap(&source, &target, IdentityKey::Clonotype, DEFAULT_MIN_COUNT).unwrap();
        assert_approx_eq!(fraction, 2.0 / 3.0);

        let flat = build("ME1", Tissue::Muscularis, &[("CASA", 1)]);
        assert_eq!(expanded_overlap(&flat, &target, IdentityKey::Clonotype, DEFAULT_MIN_COUNT), None);
    }
}
