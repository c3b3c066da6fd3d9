
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};

use crate::data_types::tissue::{Chain, Tissue};

/// Selects the column that decides set membership in all overlap computations
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, strum_macros::Display, clap::ValueEnum)]
pub enum IdentityKey {
    /// The raw nucleotide sequence
    #[default]
    #[strum(serialize = "sequence")]
    #[clap(name = "sequence")]
    Sequence,
    /// Junction amino acids plus the V and J genes, space separated
    #[strum(serialize = "clonotype")]
    #[clap(name = "clonotype")]
    Clonotype
}

/// A single row from an AIRR-style repertoire table.
/// Any other columns in the file are ignored.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    /// Full nucleotide sequence
    #[serde(default)]
    pub sequence: Option<String>,
    /// Junction amino acid sequence
    #[serde(default)]
    pub junction_aa: Option<String>,
    /// V gene call, possibly with an allele suffix and/or multiple calls
    #[serde(default)]
    pub v_call: Option<String>,
    /// J gene call, same format as `v_call`
    #[serde(default)]
    pub j_call: Option<String>,
    /// Number of reads/molecules collapsed into this row; missing means 1
    #[serde(default)]
    pub duplicate_count: Option<u64>
}

/// Reduces a raw gene call to the gene: the first call of a list, without the allele.
/// E.g. "TRAV12-2*01,TRAV12-3*01" -> "TRAV12-2"
pub fn derive_gene(call: &str) -> Option<&str> {
    let first = call.split(',').next()?.trim();
    let gene = first.split('*').next()?.trim();
    if gene.is_empty() {
        None
    } else {
        Some(gene)
    }
}

/// Helper that treats empty strings as null
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

impl Record {
    /// Convenience constructor, mostly for building tests
    pub fn new(sequence: &str, junction_aa: &str, v_call: &str, j_call: &str, duplicate_count: u64) -> Self {
        let wrap = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
        Self {
            sequence: wrap(sequence),
            junction_aa: wrap(junction_aa),
            v_call: wrap(v_call),
            j_call: wrap(j_call),
            duplicate_count: Some(duplicate_count)
        }
    }

    /// The row count, missing values count as a single observation
    pub fn count(&self) -> u64 {
        self.duplicate_count.unwrap_or(1)
    }

    /// The derived V gene, if any
    pub fn v_gene(&self) -> Option<&str> {
        non_empty(&self.v_call).and_then(derive_gene)
    }

    /// The derived J gene, if any
    pub fn j_gene(&self) -> Option<&str> {
        non_empty(&self.j_call).and_then(derive_gene)
    }

    /// The clonotype string "{junction_aa} {v_gene} {j_gene}", or None if any part is missing
    pub fn clonotype(&self) -> Option<String> {
        let junction = non_empty(&self.junction_aa)?;
        let v_gene = self.v_gene()?;
        let j_gene = self.j_gene()?;
        Some(format!("{junction} {v_gene} {j_gene}"))
    }

    /// The identity key for this row, None means the row is dropped from set operations
    pub fn identity(&self, key: IdentityKey) -> Option<String> {
        match key {
            IdentityKey::Sequence => non_empty(&self.sequence).map(|s| s.to_string()),
            IdentityKey::Clonotype => self.clonotype()
        }
    }
}

/// Metadata decoded from a sample identifier, validated once at load time
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SampleMetadata {
    /// The tissue+individual field as it appears in the name, e.g. "ME1"
    tissue_code: String,
    /// Canonical tissue
    tissue: Tissue,
    /// Individual (animal/donor) identifier
    individual: u32,
    /// Receptor chain
    chain: Chain
}

impl SampleMetadata {
    /// Constructor
    pub fn new(tissue_code: String, tissue: Tissue, individual: u32, chain: Chain) -> Self {
        Self {
            tissue_code,
            tissue,
            individual,
            chain
        }
    }

    // getters
    pub fn tissue_code(&self) -> &str {
        &self.tissue_code
    }

    pub fn tissue(&self) -> &Tissue {
        &self.tissue
    }

    pub fn individual(&self) -> u32 {
        self.individual
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Case-insensitive check against a set of tissue abbreviations
    pub fn matches_tissue<S: AsRef<str>>(&self, abbreviations: &[S]) -> bool {
        let own = self.tissue.abbreviation();
        abbreviations.iter()
            .any(|a| a.as_ref().eq_ignore_ascii_case(own))
    }
}

/// One sequencing sample: its name, parsed metadata, and table rows
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Sample identifier, usually the file stem
    name: String,
    /// Metadata parsed from `name`
    metadata: SampleMetadata,
    /// All rows in file order
    records: Vec<Record>
}

impl Sample {
    /// Constructor
    pub fn new(name: String, metadata: SampleMetadata, records: Vec<Record>) -> Self {
        Self {
            name,
            metadata,
            records
        }
    }

    // getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sum of all row counts
    pub fn total_count(&self) -> u64 {
        self.records.iter().map(|r| r.count()).sum()
    }

    /// All non-null identity keys in row order; duplicates are kept
    pub fn identity_keys(&self, key: IdentityKey) -> Vec<String> {
        self.records.iter()
            .filter_map(|r| r.identity(key))
            .collect()
    }

    /// The deduplicated, null-filtered identity set
    pub fn identity_set(&self, key: IdentityKey) -> HashSet<String> {
        self.records.iter()
            .filter_map(|r| r.identity(key))
            .collect()
    }

    /// Groups rows by identity key and sums their counts.
    /// Keys are unique in the output and keep first-seen order.
    pub fn identity_counts(&self, key: IdentityKey) -> IndexMap<String, u64> {
        let mut counts: IndexMap<String, u64> = Default::default();
        for record in self.records.iter() {
            if let Some(identity) = record.identity(key) {
                *counts.entry(identity).or_default() += record.count();
            }
        }
        counts
    }

    /// Shortcut for clonotype-level aggregation
    pub fn clonotype_counts(&self) -> IndexMap<String, u64> {
        self.identity_counts(IdentityKey::Clonotype)
    }

    /// Returns a copy with only the rows passing `predicate`
    pub fn filter_records<F: Fn(&Record) -> bool>(&self, predicate: F) -> Self {
        Self {
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            records: self.records.iter().filter(|r| predicate(r)).cloned().collect()
        }
    }
}
