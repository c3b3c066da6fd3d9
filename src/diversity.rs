/*!
# Diversity
Effective number of species (inverse Simpson index) for a count distribution, along with a large-sample dispersion estimate.

For proportions `p_i = n_i / N`, the Simpson index is `S = sum(p_i^2)` and the effective number of species is `1 / S`.
The variance of the plug-in estimate of `S` is approximated with
`Var(S) = [4(N-2)(sum(p_i^3) - S^2) + 2(S - S^2)] / (N(N-1))`,
and the delta method gives the dispersion of `1 / S` as `sqrt(Var(S)) / S^2`.
*/
use serde::Serialize;

use crate::data_types::repertoire_error::RepertoireError;
use crate::data_types::sample::{IdentityKey, Sample};

/// Sample name reported by [`diversity_index`] when it is called on bare counts
pub const UNNAMED_SAMPLE: &str = "unnamed";

/// Diversity statistics for one count vector
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DiversityIndex {
    /// Total count N
    pub total_count: u64,
    /// Number of non-zero categories
    pub categories: usize,
    /// Simpson index, i.e. the probability that two draws share a category
    pub simpson: f64,
    /// Inverse Simpson index
    pub effective_species: f64,
    /// Standard error of `simpson`, None if N < 2
    pub simpson_std_error: Option<f64>,
    /// Standard error of `effective_species`, None if N < 2
    pub effective_species_std_error: Option<f64>
}

/// Computes the effective number of species and its dispersion.
/// # Arguments
/// * `counts` - non-negative counts, one per category; zeros are allowed
/// # Errors
/// * `EmptySample` named [`UNNAMED_SAMPLE`] if all counts are zero (or there are none); [`sample_diversity`] renames it
pub fn diversity_index(counts: &[u64]) -> Result<DiversityIndex, RepertoireError> {
    let total_count: u64 = counts.iter().sum();
    if total_count == 0 {
        return Err(RepertoireError::EmptySample { sample: UNNAMED_SAMPLE.to_string() });
    }

    let n = total_count as f64;
    let mut simpson = 0.0;
    let mut cubed = 0.0;
    for &c in counts.iter() {
        let p = c as f64 / n;
        simpson += p * p;
        cubed += p * p * p;
    }
    let effective_species = 1.0 / simpson;

    let (simpson_std_error, effective_species_std_error) = if total_count >= 2 {
        let numerator = 4.0 * (n - 2.0) * (cubed - simpson * simpson) + 2.0 * (simpson - simpson * simpson);
        // float noise can push an exact zero slightly negative
        let variance = (numerator / (n * (n - 1.0))).max(0.0);
        let std_error = variance.sqrt();
        (Some(std_error), Some(std_error / (simpson * simpson)))
    } else {
        (None, None)
    };

    Ok(DiversityIndex {
        total_count,
        categories: counts.iter().filter(|&&c| c > 0).count(),
        simpson,
        effective_species,
        simpson_std_error,
        effective_species_std_error
    })
}

/// Diversity of a sample after grouping its rows by identity key
/// # Errors
/// * `EmptySample` if the sample has no counted rows
pub fn sample_diversity(sample: &Sample, key: IdentityKey) -> Result<DiversityIndex, RepertoireError> {
    let counts: Vec<u64> = sample.identity_counts(key).into_values().collect();
    diversity_index(&counts).map_err(|e| match e {
        RepertoireError::EmptySample { .. } => RepertoireError::EmptySample { sample: sample.name().to_string() },
        other => other
    })
}
