// Jacobi preconditioner implementation

use crate::backend::Builtin;
use crate::core::scalar::Scalar;
use crate::error::KError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::Preconditioner;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
#[derive(Clone, Debug)]
pub struct Jacobi<T> {
    matrix: CsrMatrix<T>,
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Scalar> Jacobi<T> {
    /// Build from the system matrix; a zero or missing diagonal entry is a
    /// [`KError::ZeroPivot`].
    pub fn new(matrix: CsrMatrix<T>) -> Result<Self, KError> {
        let inv_diag = invert_diagonal(&matrix)?;
        Ok(Self { matrix, inv_diag })
    }
}

pub(crate) fn invert_diagonal<T: Scalar>(a: &CsrMatrix<T>) -> Result<Vec<T>, KError> {
    a.diagonal()
        .into_iter()
        .enumerate()
        .map(|(i, d)| if d.is_zero() { Err(KError::ZeroPivot(i)) } else { Ok(T::one() / d) })
        .collect()
}

impl<T: Scalar> Preconditioner<Builtin<T>> for Jacobi<T> {
    type Matrix = CsrMatrix<T>;

    fn apply(&self, rhs: &Vec<T>, x: &mut Vec<T>) -> Result<(), KError> {
        for ((xi, &ri), &di) in x.iter_mut().zip(rhs).zip(&self.inv_diag) {
            *xi = di * ri;
        }
        Ok(())
    }

    fn top_matrix(&self) -> &CsrMatrix<T> {
        &self.matrix
    }
}

#[cfg(feature = "rayon")]
mod parallel {
    use super::*;
    use crate::backend::rayon::{ParVector, RayonBackend};
    use rayon::prelude::*;

    impl<T: Scalar> Preconditioner<RayonBackend<T>> for Jacobi<T> {
        type Matrix = CsrMatrix<T>;

        fn apply(&self, rhs: &ParVector<T>, x: &mut ParVector<T>) -> Result<(), KError> {
            let inv_diag = &self.inv_diag;
            rhs.install(|| {
                x.par_iter_mut()
                    .zip(rhs.par_iter())
                    .zip(inv_diag.par_iter())
                    .for_each(|((xi, &ri), &di)| *xi = di * ri);
            });
            Ok(())
        }

        fn top_matrix(&self) -> &CsrMatrix<T> {
            &self.matrix
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_inverse_diagonal() {
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 2.0)]).unwrap();
        let pc = Jacobi::new(a.clone()).unwrap();
        let mut x = vec![0.0; 2];
        Preconditioner::<Builtin<f64>>::apply(&pc, &vec![8.0, 3.0], &mut x).unwrap();
        assert_eq!(x, vec![2.0, 1.5]);
        assert_eq!(Preconditioner::<Builtin<f64>>::top_matrix(&pc), &a);
    }

    #[test]
    fn zero_diagonal_is_rejected() {
        let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 0, 1.0)]).unwrap();
        assert!(matches!(Jacobi::new(a), Err(KError::ZeroPivot(1))));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_apply_in_dedicated_pool() {
        use crate::backend::rayon::{RayonBackend, RayonParams};
        use crate::core::traits::Backend;

        let n = 1000;
        let diag: Vec<f64> = (0..n).map(|i| 1.0 + (i % 5) as f64).collect();
        let pc = Jacobi::new(CsrMatrix::from_diagonal(&diag)).unwrap();
        let r: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();

        let mut expected = vec![0.0; n];
        Preconditioner::<Builtin<f64>>::apply(&pc, &r, &mut expected).unwrap();

        let params = RayonParams::with_threads(1).unwrap();
        let rhs = RayonBackend::vector_from(r, &params);
        let mut x = RayonBackend::<f64>::create_vector(n, &params);
        Preconditioner::<RayonBackend<f64>>::apply(&pc, &rhs, &mut x).unwrap();
        assert_eq!(x.into_inner(), expected);
    }
}
