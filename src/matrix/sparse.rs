//! Compressed sparse row (CSR) matrix.
//!
//! This is the operator type the bundled backends and preconditioners work on.
//! Entries are applied in stored order within each row, which fixes the
//! floating-point summation order of every matrix-vector product.

use crate::core::scalar::Scalar;
use crate::error::KError;

/// CSR matrix with owned storage.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Build a CSR matrix from raw row pointers, column indices and values.
    ///
    /// Fails with [`KError::MalformedMatrix`] if the arrays are inconsistent:
    /// wrong `row_ptr` length, decreasing row pointers, a column index out of
    /// range, or mismatched `col_idx`/`values` lengths.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, KError> {
        if row_ptr.len() != nrows + 1 {
            return Err(KError::MalformedMatrix(format!(
                "row_ptr has length {}, expected {}",
                row_ptr.len(),
                nrows + 1
            )));
        }
        if col_idx.len() != values.len() {
            return Err(KError::MalformedMatrix(format!(
                "{} column indices but {} values",
                col_idx.len(),
                values.len()
            )));
        }
        if row_ptr[0] != 0 || row_ptr[nrows] != values.len() {
            return Err(KError::MalformedMatrix(
                "row_ptr must start at 0 and end at nnz".into(),
            ));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(KError::MalformedMatrix("row_ptr is not monotone".into()));
        }
        if let Some(&j) = col_idx.iter().find(|&&j| j >= ncols) {
            return Err(KError::MalformedMatrix(format!(
                "column index {j} out of range for {ncols} columns"
            )));
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Build from `(row, col, value)` triplets. Entries within a row keep the
    /// order in which they were given; duplicates are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, T)],
    ) -> Result<Self, KError> {
        let mut rows: Vec<Vec<(usize, T)>> = vec![Vec::new(); nrows];
        for &(i, j, v) in triplets {
            if i >= nrows || j >= ncols {
                return Err(KError::MalformedMatrix(format!(
                    "entry ({i}, {j}) outside {nrows}x{ncols}"
                )));
            }
            match rows[i].iter_mut().find(|(c, _)| *c == j) {
                Some((_, acc)) => *acc = *acc + v,
                None => rows[i].push((j, v)),
            }
        }
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        row_ptr.push(0);
        for row in rows {
            for (j, v) in row {
                col_idx.push(j);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }
        Self::from_csr(nrows, ncols, row_ptr, col_idx, values)
    }

    /// Diagonal matrix with the given entries.
    pub fn from_diagonal(diag: &[T]) -> Self {
        let n = diag.len();
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: diag.to_vec(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of row `i` as `(column, value)` pairs.
    #[inline]
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Σⱼ aᵢⱼ·xⱼ for row `i`, in stored order.
    #[inline]
    pub(crate) fn row_dot(&self, i: usize, x: &[T]) -> T {
        let mut sum = T::zero();
        for (j, v) in self.row(i) {
            sum = sum + v * x[j];
        }
        sum
    }

    /// Main diagonal, with zeros for rows that store no diagonal entry.
    pub fn diagonal(&self) -> Vec<T> {
        (0..self.nrows.min(self.ncols))
            .map(|i| {
                self.row(i)
                    .filter(|&(j, _)| j == i)
                    .fold(T::zero(), |acc, (_, v)| acc + v)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pattern() {
        // 3×3 identity in CSR: row_ptr=[0,1,2,3], col_idx=[0,1,2], vals=[1,1,1]
        let m = CsrMatrix::from_csr(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0]).unwrap();
        assert_eq!(m, CsrMatrix::from_diagonal(&[1.0, 1.0, 1.0]));
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn simple_pattern() {
        // 2×3 matrix [[1,2,0],[0,3,4]]
        let m = CsrMatrix::from_csr(2, 3, vec![0, 2, 4], vec![0, 1, 1, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let x = [1.0, 1.0, 1.0];
        assert_eq!(m.row_dot(0, &x), 3.0);
        assert_eq!(m.row_dot(1, &x), 7.0);
        assert_eq!(m.diagonal(), vec![1.0, 3.0]);
    }

    #[test]
    fn triplets_sum_duplicates() {
        let m = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 0, -1.0), (0, 0, 2.0), (1, 1, 4.0)]).unwrap();
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 3.0)]);
        assert_eq!(m.row(1).collect::<Vec<_>>(), vec![(0, -1.0), (1, 4.0)]);
    }

    #[test]
    fn rejects_bad_structure() {
        assert!(matches!(
            CsrMatrix::from_csr(2, 2, vec![0, 1], vec![0], vec![1.0]),
            Err(KError::MalformedMatrix(_))
        ));
        assert!(matches!(
            CsrMatrix::from_csr(1, 2, vec![0, 1], vec![5], vec![1.0]),
            Err(KError::MalformedMatrix(_))
        ));
        assert!(matches!(
            CsrMatrix::from_csr(2, 2, vec![0, 2, 1], vec![0, 1], vec![1.0, 1.0]),
            Err(KError::MalformedMatrix(_))
        ));
        assert!(CsrMatrix::<f64>::from_triplets(2, 2, &[(2, 0, 1.0)]).is_err());
    }
}
