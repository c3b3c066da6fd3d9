/*!
# Venn solver
Splits the identity sets of two or three samples into their Venn regions.
Region sizes come from inclusion-exclusion, member sets from direct membership checks, and the two always agree.

## Example usage
```rust
use repoverlap::data_types::collection::IdentityMap;
use repoverlap::venn_solver::venn_counts;

let mut identities = IdentityMap::new();
identities.insert("A".to_string(), ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect());
identities.insert("B".to_string(), ["3", "4", "5", "6"].iter().map(|s| s.to_string()).collect());
identities.insert("C".to_string(), ["4", "5", "6", "7"].iter().map(|s| s.to_string()).collect());

let counts = venn_counts(&identities).unwrap();
assert_eq!(counts.get_label("A"), Some(&2));
assert_eq!(counts.get_label("A_&_B"), Some(&1));
assert_eq!(counts.get_label("B_&_C"), Some(&2));
assert_eq!(counts.get_label("A_&_B_&_C"), Some(&1));
```
*/
use indexmap::IndexMap;
use log::debug;
use rustc_hash::FxHashSet as HashSet;

use crate::data_types::collection::{Collection, IdentityMap};
use crate::data_types::partition::{Partition, RegionKey, REGION_DELIMITER};
use crate::data_types::repertoire_error::RepertoireError;
use crate::data_types::sample::{IdentityKey, Sample};

/// Member sets for each region
pub type SetPartition = Partition<HashSet<String>>;

/// Deduplicates each sample's keys and checks the number of samples
fn to_sets(identities: &IdentityMap, allowed: &[usize]) -> Result<(Vec<String>, Vec<HashSet<String>>), RepertoireError> {
    if !allowed.contains(&identities.len()) {
        let names: Vec<&str> = identities.keys().map(|k| k.as_str()).collect();
        return Err(RepertoireError::UnsupportedRegionArity {
            region: names.join(REGION_DELIMITER),
            arity: identities.len(),
            expected: allowed.iter().map(|a| a.to_string()).collect::<Vec<String>>().join(" or ")
        });
    }
    let names = identities.keys().cloned().collect();
    let sets = identities.values()
        .map(|keys| keys.iter().cloned().collect())
        .collect();
    Ok((names, sets))
}

/// Region order: singles, then pairs in index order, then the triple
fn region_masks(n: usize) -> Vec<Vec<usize>> {
    let mut masks: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    for i in 0..n {
        for j in (i+1)..n {
            masks.push(vec![i, j]);
        }
    }
    if n == 3 {
        masks.push(vec![0, 1, 2]);
    }
    masks
}

fn region_key(names: &[String], indices: &[usize]) -> RegionKey {
    let members: Vec<&str> = indices.iter().map(|&i| names[i].as_str()).collect();
    RegionKey::new(&members)
}

fn intersect(a: &HashSet<String>, b: &HashSet<String>) -> HashSet<String> {
    a.intersection(b).cloned().collect()
}

/// Two-sample overlap with full (non-exclusive) sets: each sample's own set plus their intersection.
/// # Errors
/// * `UnsupportedRegionArity` if `identities` does not hold exactly 2 samples
pub fn venn2_sets(identities: &IdentityMap) -> Result<SetPartition, RepertoireError> {
    let (names, sets) = to_sets(identities, &[2])?;
    let shared = intersect(&sets[0], &sets[1]);
    debug!("{} shared keys between {} and {}", shared.len(), names[0], names[1]);

    let mut regions = IndexMap::new();
    for (i, set) in sets.into_iter().enumerate() {
        regions.insert(region_key(&names, &[i]), set);
    }
    regions.insert(region_key(&names, &[0, 1]), shared);
    Ok(Partition::new(names, regions))
}

/// Region sizes for 2 or 3 samples.
/// Each region only counts the keys that belong to exactly that combination of samples.
/// # Errors
/// * `UnsupportedRegionArity` for any other number of samples
pub fn venn_counts(identities: &IdentityMap) -> Result<Partition<usize>, RepertoireError> {
    let (names, sets) = to_sets(identities, &[2, 3])?;
    let mut regions = IndexMap::new();

    if sets.len() == 2 {
        let shared = sets[0].intersection(&sets[1]).count();
        regions.insert(region_key(&names, &[0]), sets[0].len() - shared);
        regions.insert(region_key(&names, &[1]), sets[1].len() - shared);
        regions.insert(region_key(&names, &[0, 1]), shared);
    } else {
        let pair_sets: IndexMap<(usize, usize), HashSet<String>> = [(0, 1), (0, 2), (1, 2)].into_iter()
            .map(|(i, j)| ((i, j), intersect(&sets[i], &sets[j])))
            .collect();
        let triple = pair_sets[&(0, 1)].intersection(&sets[2]).count();

        // inclusion-exclusion: the triple overlap is removed twice by the pairwise terms, add it back once
        for i in 0..3 {
            let pairwise: usize = pair_sets.iter()
                .filter(|((a, b), _s)| *a == i || *b == i)
                .map(|(_k, s)| s.len())
                .sum();
            regions.insert(region_key(&names, &[i]), sets[i].len() + triple - pairwise);
        }
        for ((i, j), shared) in pair_sets.iter() {
            regions.insert(region_key(&names, &[*i, *j]), shared.len() - triple);
        }
        regions.insert(region_key(&names, &[0, 1, 2]), triple);
    }

    Ok(Partition::new(names, regions))
}

/// Member sets for 2 or 3 samples, with the same exclusive regions as [`venn_counts`]
/// # Errors
/// * `UnsupportedRegionArity` for any other number of samples
pub fn venn_sets(identities: &IdentityMap) -> Result<SetPartition, RepertoireError> {
    let (names, sets) = to_sets(identities, &[2, 3])?;
    let mut regions = IndexMap::new();
    for mask in region_masks(sets.len()) {
        // anchor on the first member, keep keys present in exactly the masked sets
        let members: HashSet<String> = sets[mask[0]].iter()
            .filter(|key| {
                (0..sets.len()).all(|s| mask.contains(&s) == sets[s].contains(*key))
            })
            .cloned()
            .collect();
        regions.insert(region_key(&names, &mask), members);
    }
    Ok(Partition::new(names, regions))
}

/// Ties a two-sample overlap back to the sample tables.
/// For each constituent sample of `region`, returns its rows whose identity key is in the region's set.
/// # Arguments
/// * `region` - label of the form "{name1}_&_{name2}"
/// * `partition` - the partition the label refers to, usually from [`venn2_sets`]
/// * `collection` - the samples holding the rows
/// * `key` - identity column used to build `partition`
/// # Errors
/// * `UnsupportedRegionArity` if the label does not name exactly 2 samples
/// * `MalformedIdentifier` if the region or a constituent sample cannot be found
pub fn filter_region_rows(region: &str, partition: &SetPartition, collection: &Collection, key: IdentityKey) -> Result<IndexMap<String, Sample>, RepertoireError> {
    let requested = RegionKey::from_label(region);
    if requested.arity() != 2 {
        return Err(RepertoireError::UnsupportedRegionArity {
            region: region.to_string(),
            arity: requested.arity(),
            expected: "2".to_string()
        });
    }

    let members = partition.get(requested.members())
        .ok_or_else(|| RepertoireError::malformed(region, "region is not part of the partition"))?;

    let mut filtered = IndexMap::new();
    for name in partition.sample_names().iter().filter(|n| requested.contains(n)) {
        let sample = collection.get(name)
            .ok_or_else(|| RepertoireError::malformed(name, "sample is not part of the collection"))?;
        let rows = sample.filter_records(|r| {
            r.identity(key).map(|k| members.contains(&k)).unwrap_or(false)
        });
        filtered.insert(name.clone(), rows);
    }
    Ok(filtered)
}
