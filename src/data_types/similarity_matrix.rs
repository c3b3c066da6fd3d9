
use crate::data_types::repertoire_error::RepertoireError;

/// Value stored in the untouched (lower) triangle
pub const FILL_VALUE: f64 = 0.0;

/// Square matrix of pairwise similarities over a collection.
///
/// Storage follows a triangular convention: entry (i, j) with i < j holds the value,
/// the diagonal is NaN, and entries with i > j hold [`FILL_VALUE`].
/// Use [`SimilarityMatrix::similarity`] for symmetric lookups; [`SimilarityMatrix::raw`]
/// exposes the storage as-is.
#[derive(Clone, Debug)]
pub struct SimilarityMatrix {
    /// Row/column labels, matching collection order
    names: Vec<String>,
    /// Row-major values, names.len() squared
    values: Vec<f64>
}

impl SimilarityMatrix {
    /// Creates a matrix with NaN on the diagonal and the fill value everywhere else
    pub fn new(names: Vec<String>) -> Self {
        let n = names.len();
        let mut values = vec![FILL_VALUE; n * n];
        for i in 0..n {
            values[i * n + i] = f64::NAN;
        }
        Self {
            names,
            values
        }
    }

    /// Combines two matrices so that `upper` stays above the diagonal and `lower` is
    /// transposed below it, i.e. `upper + lower^T`. The names of `upper` are kept.
    /// # Errors
    /// * if the two matrices do not have the same dimension
    pub fn stack_triangles(upper: &Self, lower: &Self) -> Result<Self, RepertoireError> {
        if upper.dimension() != lower.dimension() {
            return Err(RepertoireError::MatrixShapeMismatch {
                left: upper.dimension(),
                right: lower.dimension()
            });
        }

        let mut combined = upper.clone();
        let n = combined.dimension();
        for i in 0..n {
            for j in (i+1)..n {
                combined.values[j * n + i] += lower.raw(i, j);
            }
        }
        Ok(combined)
    }

    /// Same as [`SimilarityMatrix::stack_triangles`], but first checks that both matrices
    /// describe the same samples in the same order. `align` maps a label to the part that
    /// must match, e.g. the tissue code when the two matrices hold different chains.
    /// # Errors
    /// * `MatrixShapeMismatch` if the dimensions differ
    /// * `MatrixLabelMismatch` at the first position where the aligned labels differ
    pub fn stack_aligned<K, F>(upper: &Self, lower: &Self, align: F) -> Result<Self, RepertoireError>
    where
        K: PartialEq,
        F: Fn(&str) -> K
    {
        if upper.dimension() != lower.dimension() {
            return Err(RepertoireError::MatrixShapeMismatch {
                left: upper.dimension(),
                right: lower.dimension()
            });
        }
        if let Some((index, (left, right))) = upper.names.iter().zip(lower.names.iter())
            .enumerate()
            .find(|(_i, (left, right))| align(left) != align(right)) {
            return Err(RepertoireError::MatrixLabelMismatch {
                index,
                left: left.clone(),
                right: right.clone()
            });
        }
        Self::stack_triangles(upper, lower)
    }

    pub fn dimension(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sets the value for the pair (i, j); the pair is stored in the upper triangle
    /// # Panics
    /// * if i == j or either index is out of bounds
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i != j, "diagonal entries are fixed");
        let (low, high) = if i < j { (i, j) } else { (j, i) };
        let n = self.dimension();
        self.values[low * n + high] = value;
    }

    /// Raw storage lookup, respecting the triangular convention
    pub fn raw(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.dimension() + j]
    }

    /// Symmetric view of the matrix: (i, j) and (j, i) both return the upper triangle value.
    /// Diagonal entries are NaN.
    pub fn similarity(&self, i: usize, j: usize) -> f64 {
        if i <= j {
            self.raw(i, j)
        } else {
            self.raw(j, i)
        }
    }

    /// Same as [`SimilarityMatrix::similarity`], but by sample name
    pub fn similarity_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.similarity(i, j))
    }

    /// Iterates over the raw rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.dimension().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn test_triangular_storage() {
        let mut matrix = SimilarityMatrix::new(names(3));
        matrix.set(0, 1, 0.5);
        matrix.set(2, 1, 0.25);

        assert!(matrix.raw(0, 0).is_nan());
        assert_eq!(matrix.raw(0, 1), 0.5);
        assert_eq!(matrix.raw(1, 0), FILL_VALUE);
        assert_eq!(matrix.raw(1, 2), 0.25);
        assert_eq!(matrix.raw(2, 1), FILL_VALUE);

        assert_eq!(matrix.similarity(1, 0), 0.5);
        assert_eq!(matrix.similarity(2, 1), 0.25);
        assert!(matrix.similarity(2, 2).is_nan());
        assert_eq!(matrix.similarity_by_name("s2", "s1"), Some(0.25));
        assert_eq!(matrix.similarity_by_name("s2", "missing"), None);
        assert_eq!(matrix.rows().count(), 3);
    }

    #[test]
    fn test_stack_triangles() {
        let mut upper = SimilarityMatrix::new(names(2));
        upper.set(0, 1, 0.5);
        let mut lower = SimilarityMatrix::new(names(2));
        lower.set(0, 1, 0.1);

        let combined = SimilarityMatrix::stack_triangles(&upper, &lower).unwrap();
        assert_eq!(combined.raw(0, 1), 0.5);
        assert_eq!(combined.raw(1, 0), 0.1);
        assert!(combined.raw(0, 0).is_nan());
        assert!(combined.raw(1, 1).is_nan());

        let bad = SimilarityMatrix::new(names(3));
        assert!(matches!(
            SimilarityMatrix::stack_triangles(&upper, &bad),
            Err(RepertoireError::MatrixShapeMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn test_stack_aligned() {
        let tissue = |name: &str| name.split('_').nth(1).map(|c| c.to_string());
        let mut upper = SimilarityMatrix::new(vec!["x_D1_alpha".to_string(), "x_HB1_alpha".to_string()]);
        upper.set(0, 1, 0.5);
        let mut lower = SimilarityMatrix::new(vec!["x_D1_beta".to_string(), "x_HB1_beta".to_string()]);
        lower.set(0, 1, 0.2);

        let combined = SimilarityMatrix::stack_aligned(&upper, &lower, tissue).unwrap();
        assert_eq!(combined.raw(0, 1), 0.5);
        assert_eq!(combined.raw(1, 0), 0.2);

        // same size, but the second column is a different tissue
        let shifted = SimilarityMatrix::new(vec!["x_D1_beta".to_string(), "x_ST1_beta".to_string()]);
        assert_eq!(
            SimilarityMatrix::stack_aligned(&upper, &shifted, tissue).unwrap_err(),
            RepertoireError::MatrixLabelMismatch { index: 1, left: "x_HB1_alpha".to_string(), right: "x_ST1_beta".to_string() }
        );

        let bad = SimilarityMatrix::new(names(3));
        assert!(matches!(
            SimilarityMatrix::stack_aligned(&upper, &bad, tissue),
            Err(RepertoireError::MatrixShapeMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    #[should_panic]
    fn test_diagonal_set() {
        let mut matrix = SimilarityMatrix::new(names(2));
        matrix.set(1, 1, 0.5);
    }
}
