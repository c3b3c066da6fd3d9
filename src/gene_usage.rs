
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

use crate::data_types::collection::Collection;
use crate::data_types::sample::Sample;

/// Usage of a single V gene
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneUsage {
    /// Derived gene name, allele removed
    pub gene: String,
    /// Summed duplicate counts of rows using this gene
    pub count: u64,
    /// `count` divided by the total count over rows with a gene
    pub frequency: f64
}

/// V gene usage of one sample, sorted by descending frequency then gene name
pub fn v_gene_usage(sample: &Sample) -> Vec<GeneUsage> {
    let mut counts: IndexMap<String, u64> = Default::default();
    accumulate(sample, &mut counts);
    to_usage(counts)
}

/// V gene usage pooled over every sample in the collection
pub fn pooled_v_gene_usage(collection: &Collection) -> Vec<GeneUsage> {
    let mut counts: IndexMap<String, u64> = Default::default();
    for sample in collection.iter() {
        accumulate(sample, &mut counts);
    }
    to_usage(counts)
}

fn accumulate(sample: &Sample, counts: &mut IndexMap<String, u64>) {
    for record in sample.records().iter() {
        if let Some(gene) = record.v_gene() {
            *counts.entry(gene.to_string()).or_default() += record.count();
        }
    }
}

fn to_usage(counts: IndexMap<String, u64>) -> Vec<GeneUsage> {
    let total: u64 = counts.values().sum();
    let mut usage: Vec<GeneUsage> = counts.into_iter()
        .map(|(gene, count)| GeneUsage {
            gene,
            count,
            frequency: if total > 0 { count as f64 / total as f64 } else { 0.0 }
        })
        .collect();
    usage.sort_by(|a, b| {
        b.frequency.partial_cmp(&a.frequency)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.gene.cmp(&b.gene))
    });
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::data_types::sample::{Record, SampleMetadata};
    use crate::data_types::tissue::{Chain, Tissue};

    fn build(name: &str, rows: &[(&str, u64)]) -> Sample {
        let metadata = SampleMetadata::new("D1".to_string(), Tissue::Dura, 1, Chain::Alpha);
        let records = rows.iter()
            .map(|(v_call, count)| Record::new("", "CAVF", v_call, "TRAJ1", *count))
            .collect();
        Sample::new(name.to_string(), metadata, records)
    }

    #[test]
    fn test_v_gene_usage() {
        let sample = build("s1", &[("TRAV2*01", 2), ("TRAV1*01", 2), ("TRAV1*02", 2), ("", 10), ("TRAV3*01,TRAV4*01", 4)]);
        let usage = v_gene_usage(&sample);
        let genes: Vec<&str> = usage.iter().map(|u| u.gene.as_str()).collect();
        assert_eq!(genes, vec!["TRAV1", "TRAV3", "TRAV2"]);
        assert_eq!(usage[0].count, 4);
        assert_approx_eq!(usage[0].frequency, 0.4);
        assert_approx_eq!(usage[2].frequency, 0.2);
        let total: f64 = usage.iter().map(|u| u.frequency).sum();
        assert_approx_eq!(total, 1.0);
    }

    #[test]
    fn test_ties_sorted_by_name() {
        let sample = build("s1", &[("TRAV9", 1), ("TRAV10", 1)]);
        let genes: Vec<String> = v_gene_usage(&sample).into_iter().map(|u| u.gene).collect();
        assert_eq!(genes, vec!["TRAV10".to_string(), "TRAV9".to_string()]);
    }

    #[test]
    fn test_pooled() {
        let collection = Collection::from_samples(vec![
            build("s1", &[("TRAV1", 1)]),
            build("s2", &[("TRAV2", 3)]),
        ]).unwrap();
        let usage = pooled_v_gene_usage(&collection);
        assert_eq!(usage[0].gene, "TRAV2");
        assert_approx_eq!(usage[0].frequency, 0.75);
        assert_approx_eq!(usage[1].frequency, 0.25);

        assert!(v_gene_usage(&build("empty", &[])).is_empty());
    }
}
