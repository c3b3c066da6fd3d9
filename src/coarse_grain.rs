/*!
# Coarse-graining
Merges several tissues of one individual into a single pseudo-sample whose identity set is the union of the merged samples.
The merged sample takes its name from the first kept sample, with the tissue code swapped for `{label}{individual}`.

## Example usage
```rust
use repoverlap::coarse_grain::{coarse_grain, CoarseGrainOutcome};
use repoverlap::data_types::collection::IdentityMap;
use repoverlap::parsing::sample_name::NameLayout;

let mut identities = IdentityMap::new();
identities.insert("dcr_PKD_D1_1_alpha".to_string(), vec!["a".to_string()]);
identities.insert("dcr_PKD_HB1_1_alpha".to_string(), vec!["x".to_string(), "y".to_string()]);
identities.insert("dcr_PKD_ST1_1_alpha".to_string(), vec!["y".to_string(), "z".to_string()]);

let outcome = coarse_grain(&identities, &["HB", "ST"], "BR", &NameLayout::default()).unwrap();
let merged = outcome.identities();
assert_eq!(merged.len(), 2);
assert_eq!(merged["dcr_PKD_BR1_1_alpha"], vec!["x", "y", "z"]);
```
*/
use indexmap::IndexSet;
use log::{debug, warn};

use crate::data_types::collection::{Collection, IdentityMap};
use crate::data_types::repertoire_error::RepertoireError;
use crate::data_types::sample::{Sample, SampleMetadata};
use crate::data_types::tissue::Tissue;
use crate::filtering::{filter_by_individual, individuals};
use crate::parsing::sample_name::{split_tissue_code, NameLayout};

/// Result of a coarse-graining request
#[derive(Clone, Debug, PartialEq)]
pub enum CoarseGrainOutcome<T> {
    /// Fewer than two samples matched the merge set; the input is returned as-is
    Unchanged { data: T, matched: usize },
    /// The matching samples were merged into `merged_name`
    Merged { data: T, merged_name: String }
}

impl<T> CoarseGrainOutcome<T> {
    /// The resulting data, regardless of whether a merge happened
    pub fn into_inner(self) -> T {
        match self {
            CoarseGrainOutcome::Unchanged { data, .. } |
            CoarseGrainOutcome::Merged { data, .. } => data
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, CoarseGrainOutcome::Merged { .. })
    }
}

impl CoarseGrainOutcome<IdentityMap> {
    pub fn identities(&self) -> &IdentityMap {
        match self {
            CoarseGrainOutcome::Unchanged { data, .. } |
            CoarseGrainOutcome::Merged { data, .. } => data
        }
    }
}

/// The part shared by both merge flavors: which names are selected, and what the merged name is
struct MergePlan {
    /// Names of samples that get merged, in input order
    selected: Vec<String>,
    /// The synthesized name of the merged sample
    merged_name: String,
    /// The individual id of the merged sample
    individual: u32
}

/// Decides which samples are merged and what the result is called.
/// Returns Ok(None) when fewer than two samples match.
fn plan_merge<S: AsRef<str>>(names: &[String], merge_tissues: &[S], label: &str, layout: &NameLayout) -> Result<Option<MergePlan>, RepertoireError> {
    let mut selected: Vec<(String, u32)> = vec![];
    let mut first_kept: Option<&String> = None;
    for name in names.iter() {
        let code = layout.tissue_code(name)?;
        let (abbreviation, individual) = split_tissue_code(name, code)?;
        if merge_tissues.iter().any(|t| t.as_ref().eq_ignore_ascii_case(&abbreviation)) {
            selected.push((name.clone(), individual));
        } else if first_kept.is_none() {
            first_kept = Some(name);
        }
    }

    if selected.len() < 2 {
        return Ok(None);
    }

    let template = first_kept.ok_or_else(|| RepertoireError::NoTemplateSample {
        tissues: merge_tissues.iter().map(|t| t.as_ref().to_string()).collect()
    })?;

    let individual = selected[0].1;
    if selected.iter().any(|(_name, i)| *i != individual) {
        debug!("Merging samples from multiple individuals, naming with individual {individual}");
    }

    let merged_name = layout.replace_tissue_code(template, &format!("{label}{individual}"))?;
    Ok(Some(MergePlan {
        selected: selected.into_iter().map(|(name, _i)| name).collect(),
        merged_name,
        individual
    }))
}

/// Merges the identity keys of all samples whose tissue is in `merge_tissues`.
/// # Arguments
/// * `identities` - sample name to identity keys; keys may repeat
/// * `merge_tissues` - tissue abbreviations to merge, case-insensitive
/// * `label` - tissue label for the merged sample, e.g. "BR"
/// * `layout` - sample name layout
/// # Errors
/// * `NoTemplateSample` if every sample would be merged
/// * `MalformedIdentifier` if a name has no parsable tissue code
/// * `DuplicateSample` if a kept sample already uses the merged name
pub fn coarse_grain<S: AsRef<str>>(identities: &IdentityMap, merge_tissues: &[S], label: &str, layout: &NameLayout) -> Result<CoarseGrainOutcome<IdentityMap>, RepertoireError> {
    let names: Vec<String> = identities.keys().cloned().collect();
    let plan = match plan_merge(&names, merge_tissues, label, layout)? {
        Some(p) => p,
        None => {
            let matched = count_matches(&names, merge_tissues, layout);
            warn!("Insufficient tissues to merge: {matched} sample(s) matched {:?}", tissue_list(merge_tissues));
            return Ok(CoarseGrainOutcome::Unchanged { data: identities.clone(), matched });
        }
    };

    let mut union: IndexSet<String> = Default::default();
    for name in plan.selected.iter() {
        union.extend(identities[name].iter().cloned());
    }

    let mut merged: IdentityMap = identities.iter()
        .filter(|(name, _keys)| !plan.selected.contains(*name))
        .map(|(name, keys)| (name.clone(), keys.clone()))
        .collect();
    if merged.contains_key(&plan.merged_name) {
        return Err(RepertoireError::DuplicateSample { sample: plan.merged_name });
    }
    debug!("Merged {:?} into {} with {} unique keys", plan.selected, plan.merged_name, union.len());
    merged.insert(plan.merged_name.clone(), union.into_iter().collect());

    Ok(CoarseGrainOutcome::Merged { data: merged, merged_name: plan.merged_name })
}

/// Same as [`coarse_grain`], but merges full samples so the rows stay available for region filtering.
/// The merged sample holds the concatenated rows of its members and a `Tissue::Merged` tissue.
pub fn coarse_grain_samples<S: AsRef<str>>(collection: &Collection, merge_tissues: &[S], label: &str, layout: &NameLayout) -> Result<CoarseGrainOutcome<Collection>, RepertoireError> {
    let names = collection.names();
    let plan = match plan_merge(&names, merge_tissues, label, layout)? {
        Some(p) => p,
        None => {
            let matched = count_matches(&names, merge_tissues, layout);
            warn!("Insufficient tissues to merge: {matched} sample(s) matched {:?}", tissue_list(merge_tissues));
            return Ok(CoarseGrainOutcome::Unchanged { data: collection.clone(), matched });
        }
    };

    let mut records = vec![];
    let mut chain = None;
    for name in plan.selected.iter() {
        if let Some(sample) = collection.get(name) {
            records.extend(sample.records().iter().cloned());
            chain.get_or_insert(sample.metadata().chain());
        }
    }

    let mut merged = collection.filter(|s| !plan.selected.iter().any(|n| n == s.name()));
    let chain = chain.ok_or_else(|| RepertoireError::malformed(&plan.merged_name, "no merged samples found"))?;
    let metadata = SampleMetadata::new(
        format!("{label}{}", plan.individual),
        Tissue::Merged(label.to_ascii_lowercase()),
        plan.individual,
        chain
    );
    merged.insert(Sample::new(plan.merged_name.clone(), metadata, records))?;

    Ok(CoarseGrainOutcome::Merged { data: merged, merged_name: plan.merged_name })
}

/// Applies [`coarse_grain_samples`] to each individual separately and gathers the results.
/// Samples are regrouped by individual in ascending order.
/// # Errors
/// * `NoTemplateSample` if an individual only has samples from the merge set
pub fn coarse_grain_by_individual<S: AsRef<str>>(collection: &Collection, merge_tissues: &[S], label: &str, layout: &NameLayout) -> Result<Collection, RepertoireError> {
    let mut combined = Collection::default();
    for individual in individuals(collection) {
        let subset = filter_by_individual(collection, individual);
        let outcome = coarse_grain_samples(&subset, merge_tissues, label, layout)?;
        for sample in outcome.into_inner() {
            combined.insert(sample)?;
        }
    }
    Ok(combined)
}

/// Number of names matching the merge set, only used for reporting
fn count_matches<S: AsRef<str>>(names: &[String], merge_tissues: &[S], layout: &NameLayout) -> usize {
    names.iter()
        .filter_map(|name| {
            let code = layout.tissue_code(name).ok()?;
            split_tissue_code(name, code).ok()
        })
        .filter(|(abbreviation, _i)| merge_tissues.iter().any(|t| t.as_ref().eq_ignore_ascii_case(abbreviation)))
        .count()
}

fn tissue_list<S: AsRef<str>>(merge_tissues: &[S]) -> Vec<&str> {
    merge_tissues.iter().map(|t| t.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::sample::{IdentityKey, Record};
    use crate::data_types::tissue::Chain;
    use crate::parsing::sample_name::parse_sample_name;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn mock_identities() -> IdentityMap {
        let mut identities = IdentityMap::new();
        identities.insert("dcr_PKD_D1_1_alpha".to_string(), keys(&["a", "b"]));
        identities.insert("dcr_PKD_HB1_1_alpha".to_string(), keys(&["x", "y", "z", "x"]));
        identities.insert("dcr_PKD_ME1_1_alpha".to_string(), keys(&["c"]));
        identities.insert("dcr_PKD_ST1_1_alpha".to_string(), keys(&["y", "z", "w"]));
        identities
    }

    #[test]
    fn test_union() {
        let identities = mock_identities();
        let outcome = coarse_grain(&identities, &["hb", "ST"], "BR", &NameLayout::default()).unwrap();
        assert!(outcome.is_merged());
        let merged = outcome.into_inner();

        let names: Vec<&String> = merged.keys().collect();
        assert_eq!(names, vec!["dcr_PKD_D1_1_alpha", "dcr_PKD_ME1_1_alpha", "dcr_PKD_BR1_1_alpha"]);
        assert_eq!(merged["dcr_PKD_BR1_1_alpha"], keys(&["x", "y", "z", "w"]));
        // kept entries are untouched
        assert_eq!(merged["dcr_PKD_D1_1_alpha"], identities["dcr_PKD_D1_1_alpha"]);
    }

    #[test]
    fn test_noop() {
        let identities = mock_identities();
        for tissues in [vec!["HB"], vec!["XX"]] {
            let outcome = coarse_grain(&identities, &tissues, "BR", &NameLayout::default()).unwrap();
            let expected_matches = if tissues[0] == "HB" { 1 } else { 0 };
            assert_eq!(outcome, CoarseGrainOutcome::Unchanged { data: identities.clone(), matched: expected_matches });
        }
    }

    #[test]
    fn test_no_template() {
        let mut identities = IdentityMap::new();
        identities.insert("dcr_PKD_HB1_1_alpha".to_string(), keys(&["x"]));
        identities.insert("dcr_PKD_ST1_1_alpha".to_string(), keys(&["y"]));
        let result = coarse_grain(&identities, &["HB", "ST"], "BR", &NameLayout::default());
        assert_eq!(result, Err(RepertoireError::NoTemplateSample { tissues: vec!["HB".to_string(), "ST".to_string()] }));
    }

    #[test]
    fn test_merged_name_taken() {
        // the "D" label renders the merged sample as D1, which is already kept
        let mut identities = IdentityMap::new();
        identities.insert("dcr_PKD_D1_1_alpha".to_string(), keys(&["a", "b"]));
        identities.insert("dcr_PKD_HB1_1_alpha".to_string(), keys(&["x"]));
        identities.insert("dcr_PKD_ST1_1_alpha".to_string(), keys(&["y"]));
        let result = coarse_grain(&identities, &["HB", "ST"], "D", &NameLayout::default());
        assert_eq!(result, Err(RepertoireError::DuplicateSample { sample: "dcr_PKD_D1_1_alpha".to_string() }));
    }

    #[test]
    fn test_merge_samples() {
        let layout = NameLayout::default();
        let samples: Vec<Sample> = [("dcr_PKD_D2_1_beta", "AAA"), ("dcr_PKD_HB2_1_beta", "BBB"), ("dcr_PKD_ST2_1_beta", "BBB")].iter()
            .map(|(name, seq)| {
                let metadata = parse_sample_name(name, &layout).unwrap();
                Sample::new(name.to_string(), metadata, vec![Record::new(seq, "", "", "", 2)])
            })
            .collect();
        let collection = Collection::from_samples(samples).unwrap();

        let outcome = coarse_grain_samples(&collection, &["HB", "ST"], "BR", &layout).unwrap();
        match &outcome {
            CoarseGrainOutcome::Merged { merged_name, .. } => assert_eq!(merged_name, "dcr_PKD_BR2_1_beta"),
            CoarseGrainOutcome::Unchanged { .. } => panic!("expected a merge")
        };
        let merged = outcome.into_inner();
        assert_eq!(merged.len(), 2);

        let br = merged.get("dcr_PKD_BR2_1_beta").unwrap();
        assert_eq!(br.records().len(), 2);
        assert_eq!(br.total_count(), 4);
        assert_eq!(br.identity_set(IdentityKey::Sequence).len(), 1);
        assert_eq!(br.metadata().tissue(), &Tissue::Merged("br".to_string()));
        assert_eq!(br.metadata().individual(), 2);
        assert_eq!(br.metadata().chain(), Chain::Beta);
        assert!(br.metadata().matches_tissue(&["BR"]));

        // a single match leaves the collection alone
        let outcome = coarse_grain_samples(&collection, &["HB"], "BR", &layout).unwrap();
        assert!(!outcome.is_merged());
        assert_eq!(outcome.into_inner(), collection);
    }

    #[test]
    fn test_by_individual() {
        let layout = NameLayout::default();
        let samples: Vec<Sample> = ["dcr_PKD_HB2_1_beta", "dcr_PKD_D1_1_beta", "dcr_PKD_ST2_1_beta", "dcr_PKD_D2_1_beta", "dcr_PKD_HB1_1_beta"].iter()
            .map(|name| Sample::new(name.to_string(), parse_sample_name(name, &layout).unwrap(), vec![Record::new("AAA", "", "", "", 1)]))
            .collect();
        let collection = Collection::from_samples(samples).unwrap();

        let merged = coarse_grain_by_individual(&collection, &["HB", "ST"], "BR", &layout).unwrap();
        // individual 1 only has one brain sample, so it is left alone
        assert_eq!(merged.names(), vec![
            "dcr_PKD_D1_1_beta".to_string(), "dcr_PKD_HB1_1_beta".to_string(),
            "dcr_PKD_D2_1_beta".to_string(), "dcr_PKD_BR2_1_beta".to_string()
        ]);
    }
}
