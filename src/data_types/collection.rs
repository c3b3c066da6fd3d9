
use indexmap::IndexMap;

use crate::data_types::repertoire_error::RepertoireError;
use crate::data_types::sample::{IdentityKey, Sample};

/// Ordered lookup from a sample name to its identity keys; keys may repeat before merging
pub type IdentityMap = IndexMap<String, Vec<String>>;

/// Ordered collection of samples with unique names.
/// Order only matters for deterministic output naming.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    /// Lookup from sample name to the sample, in insertion order
    samples: IndexMap<String, Sample>
}

impl Collection {
    /// Builds a collection from samples, rejecting duplicate names
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, RepertoireError> {
        let mut collection = Self::default();
        for sample in samples.into_iter() {
            collection.insert(sample)?;
        }
        Ok(collection)
    }

    /// Appends a sample at the end of the collection
    /// # Errors
    /// * if a sample with the same name is already present
    pub fn insert(&mut self, sample: Sample) -> Result<(), RepertoireError> {
        if self.samples.contains_key(sample.name()) {
            return Err(RepertoireError::DuplicateSample { sample: sample.name().to_string() });
        }
        self.samples.insert(sample.name().to_string(), sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Sample> {
        self.samples.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Sample> {
        self.samples.get_index(index).map(|(_name, sample)| sample)
    }

    /// Sample names in collection order
    pub fn names(&self) -> Vec<String> {
        self.samples.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.values()
    }

    /// Returns a new collection with the samples passing `predicate`, order preserved
    pub fn filter<F: Fn(&Sample) -> bool>(&self, predicate: F) -> Self {
        let samples = self.samples.iter()
            .filter(|(_name, sample)| predicate(sample))
            .map(|(name, sample)| (name.clone(), sample.clone()))
            .collect();
        Self { samples }
    }

    /// Extracts the identity keys of every sample, nulls dropped and duplicates kept
    pub fn identity_map(&self, key: IdentityKey) -> IdentityMap {
        self.samples.iter()
            .map(|(name, sample)| (name.clone(), sample.identity_keys(key)))
            .collect()
    }
}

impl IntoIterator for Collection {
    type Item = Sample;
    type IntoIter = indexmap::map::IntoValues<String, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_values()
    }
}
