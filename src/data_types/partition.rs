
use indexmap::IndexMap;
use itertools::Itertools;

/// Separator used when rendering a region as a text label
pub const REGION_DELIMITER: &str = "_&_";

/// Identifies a Venn region by the samples it belongs to.
/// Member names are stored sorted, so lookups do not depend on input order.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RegionKey {
    /// Sorted, deduplicated member names
    members: Vec<String>
}

impl RegionKey {
    /// Builds a key from any ordering of member names
    pub fn new<S: AsRef<str>>(members: &[S]) -> Self {
        let members = members.iter()
            .map(|m| m.as_ref().to_string())
            .sorted()
            .dedup()
            .collect();
        Self { members }
    }

    /// Parses a label such as "A_&_B" back into a key
    pub fn from_label(label: &str) -> Self {
        let parts: Vec<&str> = label.split(REGION_DELIMITER).collect();
        Self::new(&parts)
    }

    /// Number of samples this region belongs to
    pub fn arity(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

/// The result of a Venn-style partition.
/// `T` is either a region size (`usize`) or a member set.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition<T> {
    /// Sample names in collection order, used for label rendering
    order: Vec<String>,
    /// Region lookup, singles first, then pairs, then the triple
    regions: IndexMap<RegionKey, T>
}

impl<T> Partition<T> {
    /// Constructor
    pub fn new(order: Vec<String>, regions: IndexMap<RegionKey, T>) -> Self {
        Self {
            order,
            regions
        }
    }

    /// Sample names in the order they were provided
    pub fn sample_names(&self) -> &[String] {
        &self.order
    }

    /// Order-insensitive lookup
    pub fn get<S: AsRef<str>>(&self, members: &[S]) -> Option<&T> {
        self.regions.get(&RegionKey::new(members))
    }

    /// Lookup with a rendered label, e.g. "A_&_B"
    pub fn get_label(&self, label: &str) -> Option<&T> {
        self.regions.get(&RegionKey::from_label(label))
    }

    /// Renders the label of a region, members listed in collection order
    pub fn label(&self, key: &RegionKey) -> String {
        self.order.iter()
            .filter(|name| key.contains(name))
            .join(REGION_DELIMITER)
    }

    /// Iterates over (key, value) pairs in region order
    pub fn iter(&self) -> impl Iterator<Item = (&RegionKey, &T)> {
        self.regions.iter()
    }

    /// Iterates over (rendered label, value) pairs in region order
    pub fn labeled(&self) -> impl Iterator<Item = (String, &T)> {
        self.regions.iter().map(|(k, v)| (self.label(k), v))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_key() {
        let ab = RegionKey::new(&["B", "A"]);
        assert_eq!(ab, RegionKey::new(&["A", "B"]));
        assert_eq!(ab, RegionKey::from_label("A_&_B"));
        assert_eq!(ab, RegionKey::from_label("B_&_A"));
        assert_eq!(ab.arity(), 2);
        assert!(ab.contains("A"));
        assert!(!ab.contains("C"));

        // names with underscores survive the split
        let key = RegionKey::from_label("dcr_PKD_D1_1_alpha_&_dcr_PKD_ME1_1_alpha");
        assert_eq!(key.members(), &["dcr_PKD_D1_1_alpha".to_string(), "dcr_PKD_ME1_1_alpha".to_string()]);
    }

    #[test]
    fn test_partition_labels() {
        let order = vec!["Z".to_string(), "A".to_string()];
        let mut regions = IndexMap::new();
        regions.insert(RegionKey::new(&["Z"]), 1);
        regions.insert(RegionKey::new(&["A"]), 2);
        regions.insert(RegionKey::new(&["A", "Z"]), 3);
        let partition = Partition::new(order, regions);

        // labels follow collection order, not sorted order
        let labels: Vec<(String, i32)> = partition.labeled().map(|(l, v)| (l, *v)).collect();
        assert_eq!(labels, vec![
            ("Z".to_string(), 1),
            ("A".to_string(), 2),
            ("Z_&_A".to_string(), 3)
        ]);
        assert_eq!(partition.get(&["A", "Z"]), Some(&3));
        assert_eq!(partition.get_label("A_&_Z"), Some(&3));
        assert_eq!(partition.get_label("Q"), None);
        assert_eq!(partition.len(), 3);
    }
}
