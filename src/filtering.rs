
use anyhow::{anyhow, ensure, Context};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::str::FromStr;

use crate::data_types::collection::Collection;
use crate::data_types::sample::Sample;

/// Keeps the samples from a single individual.
/// Returns an empty collection if nothing matches.
pub fn filter_by_individual(collection: &Collection, individual: u32) -> Collection {
    collection.filter(|s| s.metadata().individual() == individual)
}

/// Keeps the samples whose tissue abbreviation is in `abbreviations` (case-insensitive)
pub fn filter_by_tissue<S: AsRef<str>>(collection: &Collection, abbreviations: &[S]) -> Collection {
    collection.filter(|s| s.metadata().matches_tissue(abbreviations))
}

/// Keeps the samples passing an arbitrary predicate
pub fn filter_samples<F: Fn(&Sample) -> bool>(collection: &Collection, predicate: F) -> Collection {
    collection.filter(predicate)
}

/// Sorted distinct individual ids present in a collection
pub fn individuals(collection: &Collection) -> Vec<u32> {
    collection.iter()
        .map(|s| s.metadata().individual())
        .sorted()
        .dedup()
        .collect()
}

/// Assigns individuals to experimental conditions, e.g. "PD" -> [1, 2, 3, 4].
/// Conditions are kept in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionGroups {
    /// Lookup from a condition label to its individuals
    groups: IndexMap<String, Vec<u32>>
}

impl ConditionGroups {
    /// Adds a condition
    /// # Errors
    /// * if the label is already present or an individual already belongs to another condition
    pub fn add_condition(&mut self, label: String, individuals: Vec<u32>) -> anyhow::Result<()> {
        ensure!(!self.groups.contains_key(&label), "Duplicate condition label: {label}");
        for individual in individuals.iter() {
            if let Some(other) = self.condition_of(*individual) {
                return Err(anyhow!("Individual {individual} is assigned to both {other} and {label}"));
            }
        }
        self.groups.insert(label, individuals);
        Ok(())
    }

    /// Returns the condition an individual belongs to, if any
    pub fn condition_of(&self, individual: u32) -> Option<&str> {
        self.groups.iter()
            .find(|(_label, members)| members.contains(&individual))
            .map(|(label, _members)| label.as_str())
    }

    /// Iterates over (condition, individuals) in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u32>)> {
        self.groups.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Single group holding every individual, used when no conditions are provided
    pub fn single_group(label: &str, individuals: Vec<u32>) -> Self {
        let mut groups = IndexMap::new();
        groups.insert(label.to_string(), individuals);
        Self { groups }
    }
}

/// A single CLI condition definition, formatted as "LABEL=1,2,3,4"
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConditionSpec {
    pub label: String,
    pub individuals: Vec<u32>
}

impl FromStr for ConditionSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, values) = s.split_once('=')
            .ok_or_else(|| anyhow!("Condition must look like LABEL=1,2,3: {s:?}"))?;
        ensure!(!label.is_empty(), "Condition label is empty: {s:?}");
        let individuals = values.split(',')
            .map(|v| v.trim().parse::<u32>().with_context(|| format!("Invalid individual {v:?} in {s:?}")))
            .collect::<anyhow::Result<Vec<u32>>>()?;
        Ok(Self {
            label: label.to_string(),
            individuals
        })
    }
}

impl TryFrom<&[ConditionSpec]> for ConditionGroups {
    type Error = anyhow::Error;

    fn try_from(specs: &[ConditionSpec]) -> Result<Self, Self::Error> {
        let mut groups = ConditionGroups::default();
        for spec in specs.iter() {
            groups.add_condition(spec.label.clone(), spec.individuals.clone())?;
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::sample::{Record, SampleMetadata};
    use crate::data_types::tissue::{Chain, Tissue};

    fn mock_collection() -> Collection {
        let mut samples = vec![];
        for individual in [1, 2] {
            for tissue in [Tissue::Dura, Tissue::Muscularis, Tissue::Hindbrain] {
                let code = format!("{}{individual}", tissue.abbreviation().to_uppercase());
                let name = format!("dcr_PKD_{code}_1_alpha");
                let metadata = SampleMetadata::new(code, tissue, individual, Chain::Alpha);
                samples.push(Sample::new(name, metadata, vec![Record::new("AAA", "", "", "", 1)]));
            }
        }
        Collection::from_samples(samples).unwrap()
    }

    #[test]
    fn test_filter_by_individual() {
        let collection = mock_collection();
        let filtered = filter_by_individual(&collection, 2);
        assert_eq!(filtered.names(), vec![
            "dcr_PKD_D2_1_alpha".to_string(), "dcr_PKD_ME2_1_alpha".to_string(), "dcr_PKD_HB2_1_alpha".to_string()
        ]);
        assert!(filter_by_individual(&collection, 9).is_empty());
    }

    #[test]
    fn test_filter_by_tissue() {
        let collection = mock_collection();
        let filtered = filter_by_tissue(&collection, &["d", "ME"]);
        assert_eq!(filtered.len(), 4);
        assert!(filtered.iter().all(|s| s.metadata().tissue() != &Tissue::Hindbrain));
    }

    #[test]
    fn test_filters_commute() {
        let collection = mock_collection();
        let a = filter_by_tissue(&filter_by_individual(&collection, 1), &["HB"]);
        let b = filter_by_individual(&filter_by_tissue(&collection, &["HB"]), 1);
        assert_eq!(a, b);
        assert_eq!(a.names(), vec!["dcr_PKD_HB1_1_alpha".to_string()]);

        let c = filter_samples(&collection, |s| s.metadata().individual() == 1 && s.metadata().matches_tissue(&["hb"]));
        assert_eq!(a, c);
    }

    #[test]
    fn test_individuals() {
        assert_eq!(individuals(&mock_collection()), vec![1, 2]);
    }

    #[test]
    fn test_condition_groups() {
        let specs: Vec<ConditionSpec> = ["PD=1,2,3,4", "HC=5, 6,7,8"].iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let groups = ConditionGroups::try_from(specs.as_slice()).unwrap();
        assert_eq!(groups.condition_of(3), Some("PD"));
        assert_eq!(groups.condition_of(6), Some("HC"));
        assert_eq!(groups.condition_of(9), None);
        let labels: Vec<&String> = groups.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["PD", "HC"]);

        // overlapping assignment
        let bad: Vec<ConditionSpec> = vec!["A=1,2".parse().unwrap(), "B=2".parse().unwrap()];
        assert!(ConditionGroups::try_from(bad.as_slice()).is_err());

        assert!("nolabel".parse::<ConditionSpec>().is_err());
        assert!("A=1,x".parse::<ConditionSpec>().is_err());
    }
}
