//! Preconditioned Conjugate Gradient (PCG) per Barrett et al., *Templates*, §2.3.1.
//!
//! The engine is generic over a [`Backend`] and owns the four work vectors
//! (residual `r`, preconditioned residual `s`, direction `p`, and `q = A·p`),
//! allocated once at construction and reused by every solve. The system
//! matrix may change between solves while the preconditioner is kept, which is
//! the usual pattern for time-stepping with slowly varying coefficients.
//!
//! The operator must be symmetric (Hermitian) positive definite and so must
//! the preconditioner. Nothing checks this: a zero `⟨r, s⟩` from the previous
//! step or a zero `⟨q, p⟩` makes the iteration divide by zero, and NaN/Inf then
//! propagate into the returned residual. Such breakdowns are logged at `warn`
//! level but never alter the arithmetic.

use log::{debug, trace, warn};
use num_traits::{One, Zero};

use crate::config::PcgParams;
use crate::core::traits::{Backend, BackendReal, MatrixOps};
use crate::error::KError;
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::{Convergence, SolveStats};

type Monitor<R> = Box<dyn FnMut(usize, R) + Send>;

pub struct Pcg<B: Backend> {
    params: PcgParams<BackendReal<B>>,
    n: usize,
    r: B::Vector,
    s: B::Vector,
    p: B::Vector,
    q: B::Vector,
    monitor: Option<Monitor<BackendReal<B>>>,
}

impl<B: Backend> Pcg<B> {
    /// Preallocate a solver for systems of size `n`.
    ///
    /// Fails with [`KError::InvalidParameter`] if `params.maxiter` is zero or
    /// `params.tol` is negative or NaN.
    pub fn new(
        n: usize,
        params: PcgParams<BackendReal<B>>,
        backend_params: &B::Params,
    ) -> Result<Self, KError> {
        params.validate()?;
        debug!("pcg: n = {}, maxiter = {}, tol = {:?}", n, params.maxiter, params.tol);
        Ok(Self {
            params,
            n,
            r: B::create_vector(n, backend_params),
            s: B::create_vector(n, backend_params),
            p: B::create_vector(n, backend_params),
            q: B::create_vector(n, backend_params),
            monitor: None,
        })
    }

    /// Call `f(iteration, relative_residual)` before the first iteration and
    /// after every iteration of each solve.
    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, BackendReal<B>) + Send + 'static,
    {
        self.monitor = Some(Box::new(f));
        self
    }

    /// System size the work vectors were allocated for.
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn params(&self) -> &PcgParams<BackendReal<B>> {
        &self.params
    }

    /// Solve `A·x = rhs` using preconditioner `precond`.
    ///
    /// `x` holds the initial guess on entry and the approximate solution on
    /// exit. `A` need not be the matrix `precond` was built from. Returns the
    /// number of iterations and the final relative residual ‖rhs − A·x‖/‖rhs‖;
    /// exhausting `maxiter` is reported through those values, not as an error.
    /// Errors only come from `precond.apply` and are returned unchanged.
    ///
    /// A zero `rhs` is solved exactly by `x = 0` with zero iterations.
    pub fn solve<M, P>(
        &mut self,
        a: &M,
        precond: &P,
        rhs: &B::Vector,
        x: &mut B::Vector,
    ) -> Result<SolveStats<BackendReal<B>>, KError>
    where
        M: ?Sized,
        B: MatrixOps<M>,
        P: Preconditioner<B> + ?Sized,
    {
        let Self { params, r, s, p, q, monitor, .. } = self;
        let one = B::Value::one();
        let zero = B::Value::zero();

        B::residual(rhs, a, x, r);

        let norm_of_rhs = B::norm(rhs);
        if norm_of_rhs.is_zero() {
            B::clear(x);
            debug!("pcg: zero right-hand side, returning x = 0");
            return Ok(SolveStats { iterations: 0, residual: norm_of_rhs });
        }

        let conv = Convergence { tol: params.tol, max_iters: params.maxiter };
        let mut rho1 = zero;
        let mut iter = 0;
        let mut res = B::norm(r) / norm_of_rhs;
        if let Some(f) = monitor.as_mut() {
            f(0, res);
        }

        while conv.keep_going(res, iter) {
            precond.apply(r, s)?;

            let rho2 = rho1;
            rho1 = B::inner_product(r, s);

            if iter > 0 {
                if rho2.is_zero() {
                    warn!("pcg: <r, s> vanished at iteration {iter}, direction update divides by zero");
                }
                B::axpby(one, s, rho1 / rho2, p);
            } else {
                B::copy(s, p);
            }

            B::spmv(one, a, p, zero, q);

            let qp = B::inner_product(q, p);
            if qp.is_zero() {
                warn!("pcg: <q, p> vanished at iteration {iter}, step length divides by zero");
            }
            let alpha = rho1 / qp;

            B::axpby(alpha, p, one, x);
            B::axpby(-alpha, q, one, r);

            iter += 1;
            res = B::norm(r) / norm_of_rhs;
            trace!("pcg: iteration {iter}, relative residual {res:?}");
            if let Some(f) = monitor.as_mut() {
                f(iter, res);
            }
        }

        debug!(
            "pcg: {} after {} iterations, relative residual {:?}",
            if res <= params.tol { "converged" } else { "stopped" },
            iter,
            res
        );
        Ok(SolveStats { iterations: iter, residual: res })
    }

    /// Solve against the matrix the preconditioner was built for.
    pub fn solve_top<P>(
        &mut self,
        precond: &P,
        rhs: &B::Vector,
        x: &mut B::Vector,
    ) -> Result<SolveStats<BackendReal<B>>, KError>
    where
        P: Preconditioner<B> + ?Sized,
        B: MatrixOps<P::Matrix>,
    {
        self.solve(precond.top_matrix(), precond, rhs, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Builtin, BuiltinParams};
    use crate::matrix::CsrMatrix;
    use crate::preconditioner::Identity;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    type B = Builtin<f64>;

    fn solver(n: usize, maxiter: usize, tol: f64) -> Pcg<B> {
        Pcg::new(n, PcgParams::new(maxiter, tol), &BuiltinParams).unwrap()
    }

    fn laplace_1d(n: usize) -> CsrMatrix<f64> {
        let mut t = Vec::new();
        for i in 0..n {
            if i > 0 {
                t.push((i, i - 1, -1.0));
            }
            t.push((i, i, 2.0));
            if i + 1 < n {
                t.push((i, i + 1, -1.0));
            }
        }
        CsrMatrix::from_triplets(n, n, &t).unwrap()
    }

    struct FailingPc;

    impl Preconditioner<B> for FailingPc {
        type Matrix = CsrMatrix<f64>;
        fn apply(&self, _rhs: &Vec<f64>, _x: &mut Vec<f64>) -> Result<(), KError> {
            Err(KError::Preconditioner("hierarchy not built".into()))
        }
        fn top_matrix(&self) -> &CsrMatrix<f64> {
            unreachable!("not used by these tests")
        }
    }

    #[test]
    fn diagonal_system_converges_in_one_iteration() {
        let a = CsrMatrix::from_diagonal(&[2.0, 2.0, 2.0]);
        let pc = Identity::new(a);
        let rhs = vec![2.0, 2.0, 2.0];
        let mut x = vec![0.0; 3];
        let stats = solver(3, 10, 1e-8).solve_top(&pc, &rhs, &mut x).unwrap();
        assert_eq!(stats.iterations, 1);
        assert!(stats.residual < 1e-8);
        for xi in x {
            assert_relative_eq!(xi, 1.0);
        }
    }

    #[test]
    fn zero_rhs_clears_solution() {
        let a = laplace_1d(4);
        let mut x = vec![3.0, -1.0, 7.0, 0.5];
        let stats = solver(4, 10, 1e-8)
            .solve(&a, &FailingPc, &vec![0.0; 4], &mut x)
            .unwrap();
        assert_eq!(stats, SolveStats { iterations: 0, residual: 0.0 });
        assert_eq!(x, vec![0.0; 4]);
    }

    #[test]
    fn stops_at_maxiter_without_error() {
        let n = 40;
        let a = laplace_1d(n);
        let rhs = vec![1.0; n];
        let mut x = vec![0.0; n];
        let stats = solver(n, 5, 1e-12).solve(&a, &Identity::new(()), &rhs, &mut x).unwrap();
        assert_eq!(stats.iterations, 5);
        assert!(stats.residual > 1e-12);
        assert!(!stats.converged(1e-12));
    }

    #[test]
    fn preconditioner_error_propagates() {
        let a = laplace_1d(3);
        let mut x = vec![0.0; 3];
        let err = solver(3, 10, 1e-8)
            .solve(&a, &FailingPc, &vec![1.0; 3], &mut x)
            .unwrap_err();
        assert!(matches!(err, KError::Preconditioner(msg) if msg == "hierarchy not built"));
    }

    #[test]
    fn initial_guess_already_converged() {
        let a = CsrMatrix::from_diagonal(&[4.0, 4.0]);
        let mut x = vec![0.5, 0.25];
        let stats = solver(2, 10, 1e-8).solve(&a, &Identity::new(()), &vec![2.0, 1.0], &mut x).unwrap();
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.residual, 0.0);
        assert_eq!(x, vec![0.5, 0.25]);
    }

    #[test]
    fn monitor_sees_every_iteration() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let n = 8;
        let a = laplace_1d(n);
        let mut pcg = solver(n, 100, 1e-10).with_monitor(move |it, res| log.lock().unwrap().push((it, res)));
        let mut x = vec![0.0; n];
        let stats = pcg.solve(&a, &Identity::new(()), &vec![1.0; n], &mut x).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), stats.iterations + 1);
        assert_eq!(seen[0].0, 0);
        assert_relative_eq!(seen[0].1, 1.0);
        assert_eq!(seen.last().copied(), Some((stats.iterations, stats.residual)));
    }

    /// Construction is stricter than the bare parameter struct: a zero
    /// iteration budget or an unusable tolerance fails here instead of
    /// producing solves that silently do nothing.
    #[test]
    fn construction_rejects_params_a_plain_struct_would_accept() {
        assert!(Pcg::<B>::new(3, PcgParams::new(0, 1e-8), &BuiltinParams).is_err());
        assert!(Pcg::<B>::new(3, PcgParams::new(10, -1.0), &BuiltinParams).is_err());
        let pcg = solver(3, 10, 1e-8);
        assert_eq!(pcg.size(), 3);
        assert_eq!(pcg.params(), &PcgParams::new(10, 1e-8));
    }

    /// Indefinite operator: `<q, p>` is exactly zero on the first step. The
    /// division goes through and the non-finite residual is reported, not an error.
    #[test]
    fn zero_curvature_propagates_non_finite_residual() {
        let a = CsrMatrix::from_diagonal(&[1.0, -1.0]);
        let mut x = vec![0.0; 2];
        let stats = solver(2, 10, 1e-8)
            .solve(&a, &Identity::new(()), &vec![1.0, 1.0], &mut x)
            .unwrap();
        assert!(stats.iterations >= 1 && stats.iterations <= 10);
        assert!(!stats.residual.is_finite());
        assert!(!stats.converged(1e-8));
        assert!(x.iter().all(|xi| !xi.is_finite()));
    }
}
