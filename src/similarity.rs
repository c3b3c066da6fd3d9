/*!
# Pairwise similarity
Jaccard indices between every pair of samples in a collection, stored with the triangular convention of [`SimilarityMatrix`].

## Example usage
```rust
use repoverlap::data_types::collection::Collection;
use repoverlap::data_types::sample::{IdentityKey, Record, Sample};
use repoverlap::parsing::sample_name::{parse_sample_name, NameLayout};
use repoverlap::similarity::jaccard_matrix;

let layout = NameLayout::new(1, 2);
let build = |name: &str, seqs: &[&str]| {
    let records = seqs.iter().map(|s| Record::new(s, "", "", "", 1)).collect();
    Sample::new(name.to_string(), parse_sample_name(name, &layout).unwrap(), records)
};
let collection = Collection::from_samples(vec![
    build("T1_D1_alpha", &["AAA", "BBB", "CCC"]),
    build("T1_ME1_alpha", &["BBB", "CCC", "DDD"]),
]).unwrap();

let matrix = jaccard_matrix(&collection, IdentityKey::Sequence);
assert_eq!(matrix.raw(0, 1), 0.5);
assert_eq!(matrix.raw(1, 0), 0.0);
assert!(matrix.raw(0, 0).is_nan());
```
*/
use indexmap::IndexMap;
use log::debug;
use rustc_hash::FxHashSet as HashSet;
use std::hash::{BuildHasher, Hash};

use crate::data_types::collection::Collection;
use crate::data_types::sample::IdentityKey;
use crate::data_types::similarity_matrix::SimilarityMatrix;
use crate::data_types::tissue::Chain;
use crate::filtering::ConditionGroups;

/// Jaccard index |a & b| / |a | b|, defined as 0 when both sets are empty
pub fn jaccard<T: Eq + Hash, S: BuildHasher>(a: &std::collections::HashSet<T, S>, b: &std::collections::HashSet<T, S>) -> f64 {
    // iterate over the smaller set
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|k| large.contains(k)).count();
    let union = a.len() + b.len() - intersection;
    if union > 0 {
        intersection as f64 / union as f64
    } else {
        0.0
    }
}

/// Computes the Jaccard index between every pair of samples.
/// Only the upper triangle is filled; see [`SimilarityMatrix`] for the storage convention.
/// # Arguments
/// * `collection` - the samples, in output order
/// * `key` - identity column for set membership
pub fn jaccard_matrix(collection: &Collection, key: IdentityKey) -> SimilarityMatrix {
    let names = collection.names();
    let sets: Vec<HashSet<String>> = collection.iter()
        .map(|s| s.identity_set(key))
        .collect();

    let mut matrix = SimilarityMatrix::new(names);
    for i in 0..sets.len() {
        for j in (i+1)..sets.len() {
            debug!("Comparing {i}:{} and {j}:{}", matrix.names()[i], matrix.names()[j]);
            let value = jaccard(&sets[i], &sets[j]);
            matrix.set(i, j, value);
        }
    }
    matrix
}

/// Box-plot ready Jaccard values: one entry per (condition, tissue pair, chain), holding one value per individual
#[derive(Clone, Debug, PartialEq)]
pub struct TissuePairSimilarity {
    /// Condition label
    pub condition: String,
    /// First tissue abbreviation, upper case
    pub tissue1: String,
    /// Second tissue abbreviation, upper case
    pub tissue2: String,
    /// Chain of the underlying samples
    pub chain: Chain,
    /// (individual, Jaccard) pairs in condition order
    pub values: Vec<(u32, f64)>
}

/// Collects per-individual tissue-pair similarities grouped by condition.
/// Tissue pairs follow the provided tissue order; pairs where either tissue is missing for an individual are skipped.
/// # Arguments
/// * `per_individual` - (individual, chain) to the Jaccard matrix of that individual's samples
/// * `collections` - (individual, chain) to the samples the matrix was built from
/// * `conditions` - condition groups to report
/// * `tissues` - tissue abbreviations, defines the pairs
pub fn tissue_pair_similarities<S: AsRef<str>>(
    per_individual: &IndexMap<(u32, Chain), (Collection, SimilarityMatrix)>,
    conditions: &ConditionGroups,
    tissues: &[S]
) -> Vec<TissuePairSimilarity> {
    let chains: Vec<Chain> = {
        let mut c: Vec<Chain> = per_individual.keys().map(|(_i, c)| *c).collect();
        c.sort();
        c.dedup();
        c
    };

    let mut results = vec![];
    for (condition, individuals) in conditions.iter() {
        for (t1_index, t1) in tissues.iter().enumerate() {
            for t2 in tissues[(t1_index+1)..].iter() {
                for &chain in chains.iter() {
                    let values: Vec<(u32, f64)> = individuals.iter()
                        .filter_map(|&individual| {
                            let (collection, matrix) = per_individual.get(&(individual, chain))?;
                            let i = position_of(collection, t1.as_ref())?;
                            let j = position_of(collection, t2.as_ref())?;
                            Some((individual, matrix.similarity(i, j)))
                        })
                        .collect();
                    results.push(TissuePairSimilarity {
                        condition: condition.clone(),
                        tissue1: t1.as_ref().to_ascii_uppercase(),
                        tissue2: t2.as_ref().to_ascii_uppercase(),
                        chain,
                        values
                    });
                }
            }
        }
    }
    results
}

/// Index of the first sample with the given tissue abbreviation
fn position_of(collection: &Collection, tissue: &str) -> Option<usize> {
    collection.iter().position(|s| s.metadata().matches_tissue(&[tissue]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::data_types::sample::{Record, Sample};
    use crate::parsing::sample_name::{parse_sample_name, NameLayout};

    fn set(values: &[u32]) -> HashSet<u32> {
        values.iter().cloned().collect()
    }

    fn build(name: &str, seqs: &[&str]) -> Sample {
        let layout = NameLayout::new(1, 2);
        let records = seqs.iter().map(|s| Record::new(s, "", "", "", 1)).collect();
        Sample::new(name.to_string(), parse_sample_name(name, &layout).unwrap(), records)
    }

    #[test]
    fn test_jaccard() {
        let a = set(&[1, 2, 3, 4]);
        let b = set(&[3, 4, 5]);
        assert_approx_eq!(jaccard(&a, &b), 2.0 / 5.0);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &set(&[9])), 0.0);
        // empty union is 0, not NaN
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_jaccard_bounds() {
        let sets = [set(&[]), set(&[1]), set(&[1, 2]), set(&[2, 3, 4]), set(&[5])];
        for a in sets.iter() {
            for b in sets.iter() {
                let value = jaccard(a, b);
                assert!((0.0..=1.0).contains(&value));
                assert_eq!(value, jaccard(b, a));
            }
        }
    }

    #[test]
    fn test_matrix() {
        let collection = Collection::from_samples(vec![
            build("T1_D1_alpha", &["AAA", "BBB", "CCC", "AAA", ""]),
            build("T1_ME1_alpha", &["BBB", "CCC", "DDD"]),
            build("T1_HB1_alpha", &[]),
        ]).unwrap();
        let matrix = jaccard_matrix(&collection, IdentityKey::Sequence);
        assert_eq!(matrix.dimension(), 3);
        assert_eq!(matrix.raw(0, 1), 0.5);
        assert_eq!(matrix.raw(0, 2), 0.0);
        assert_eq!(matrix.raw(1, 2), 0.0);
        for i in 0..3 {
            assert!(matrix.raw(i, i).is_nan());
            for j in 0..i {
                assert_eq!(matrix.raw(i, j), 0.0);
            }
        }
    }

    #[test]
    fn test_tissue_pairs() {
        let mut per_individual = IndexMap::new();
        for (individual, shared) in [(1, "BBB"), (2, "ZZZ")] {
            let collection = Collection::from_samples(vec![
                build(&format!("T1_D{individual}_alpha"), &["AAA", shared]),
                build(&format!("T1_ME{individual}_alpha"), &["CCC", "BBB"]),
            ]).unwrap();
            let matrix = jaccard_matrix(&collection, IdentityKey::Sequence);
            per_individual.insert((individual, Chain::Alpha), (collection, matrix));
        }

        let conditions = ConditionGroups::single_group("all", vec![1, 2, 3]);
        let pairs = tissue_pair_similarities(&per_individual, &conditions, &["ME", "D", "HB"]);
        // 3 tissue pairs, 1 chain
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].tissue1, "ME");
        assert_eq!(pairs[0].tissue2, "D");
        assert_eq!(pairs[0].values.len(), 2);
        assert_approx_eq!(pairs[0].values[0].1, 1.0 / 3.0);
        assert_eq!(pairs[0].values[1], (2, 0.0));
        // hindbrain is never present
        assert!(pairs[1].values.is_empty());
    }
}
