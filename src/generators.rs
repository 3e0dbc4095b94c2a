// src/generators.rs
//! Low-discrepancy point generators for quasi-Monte Carlo integration.
//!
//! # Sequences
//!
//! - **Van der Corput**: radix inversion of the integer index in a fixed base
//! - **Halton**: one Van der Corput sequence per dimension with pairwise
//!   distinct bases
//! - **Good lattice points**: rank-1 lattices, either the 2-D Fibonacci
//!   lattice or an n-dimensional lattice from a caller-supplied generating
//!   vector
//!
//! All generator outputs lie in [0, 1) per coordinate. Randomization
//! operators (shift, per-column permutation) take an explicit RNG handle so
//! randomized QMC stays reproducible under a fixed seed.

use crate::error::{QmcError, QmcResult};
use ndarray::{Array2, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;

/// The n-th element of the Van der Corput sequence in the given base
///
/// Reverses the base-`base` digit expansion of `n` (1-indexed) into a
/// fraction: the most significant digit of `n` becomes the least significant
/// fractional digit.
///
/// # Panics
///
/// Panics if `base < 2`: the digit loop would not terminate. Prime bases
/// give the lowest discrepancy, but any base ≥ 2 is well-defined.
pub fn van_der_corput(base: u32, n: u64) -> f64 {
    assert!(base >= 2, "Van der Corput base must be at least 2");

    let base_f = f64::from(base);
    let base_u = u64::from(base);

    let mut result = 0.0;
    let mut f = 1.0 / base_f;
    let mut i = n;

    while i > 0 {
        result += f * (i % base_u) as f64;
        i /= base_u;
        f /= base_f;
    }

    result
}

/// Halton sequence of `n_points` points in `bases.len()` dimensions
///
/// Dimension j holds `van_der_corput(bases[j], i + 1)` for i in 0..N.
/// Bases sharing a common factor silently degrade the joint uniformity of
/// the sequence; choosing coprime (in practice prime) bases is the caller's
/// responsibility.
pub fn halton(bases: &[u32], n_points: usize) -> Array2<f64> {
    let dim = bases.len();
    let mut sequence = Array2::zeros((n_points, dim));

    for i in 0..n_points {
        for (j, &base) in bases.iter().enumerate() {
            sequence[[i, j]] = van_der_corput(base, (i + 1) as u64);
        }
    }

    sequence
}

/// Fibonacci numbers fib(1) = fib(2) = 1, ..., up to fib(n)
fn fibonacci(n: usize) -> Vec<u64> {
    let mut fib = vec![1u64; n.max(2)];
    for i in 2..n {
        fib[i] = fib[i - 1] + fib[i - 2];
    }
    fib.truncate(n.max(2));
    fib
}

/// 2-D good lattice points from the Fibonacci lattice
///
/// Produces N = fib(m) points with generating vector (1, fib(m-1)):
/// point i (1-indexed) is ((i/N) mod 1, (i·fib(m-1)/N) mod 1).
///
/// # Errors
///
/// `InvalidParameters` if `m < 3` (the lattice is undefined below that).
pub fn good_lattice_points(m: usize) -> QmcResult<Array2<f64>> {
    if m < 3 {
        return Err(QmcError::InvalidParameters {
            parameter: "m".to_string(),
            value: m as f64,
            constraint: "Fibonacci index must be at least 3".to_string(),
        });
    }

    let fib = fibonacci(m);
    let n_points = fib[m - 1] as usize;
    let z1 = fib[m - 2] as f64;
    let n_f = n_points as f64;

    let mut glp = Array2::zeros((n_points, 2));
    for i in 0..n_points {
        let idx = (i + 1) as f64;
        glp[[i, 0]] = (idx / n_f) % 1.0;
        glp[[i, 1]] = (idx * z1 / n_f) % 1.0;
    }

    Ok(glp)
}

/// Good lattice points in arbitrary dimension
///
/// Point i (1-indexed) has coordinates (i·z[j]/N) mod 1. With `z = None` the
/// default generating vector (1, 2, ..., dim) is used. The discrepancy of the
/// lattice depends entirely on `z`; no vector search or optimization is
/// performed here.
///
/// # Errors
///
/// `DimensionMismatch` if a supplied generating vector has length ≠ `dim`.
pub fn good_lattice_points_nd(
    n_points: usize,
    dim: usize,
    z: Option<&[u64]>,
) -> QmcResult<Array2<f64>> {
    let default_z: Vec<u64>;
    let z = match z {
        Some(z) => {
            if z.len() != dim {
                return Err(QmcError::DimensionMismatch {
                    context: "good_lattice_points_nd generating vector".to_string(),
                    expected: dim,
                    actual: z.len(),
                });
            }
            z
        }
        None => {
            default_z = (1..=dim as u64).collect();
            &default_z
        }
    };

    let n_f = n_points as f64;
    let mut glp = Array2::zeros((n_points, dim));
    for i in 0..n_points {
        let idx = (i + 1) as f64;
        for j in 0..dim {
            glp[[i, j]] = (idx * z[j] as f64 / n_f) % 1.0;
        }
    }

    Ok(glp)
}

/// Apply one shared random shift vector to every point, mod 1
///
/// Cranley-Patterson rotation: a randomized-QMC operator that preserves the
/// lattice structure while making the estimator unbiased over the shift.
pub fn random_shift<R: Rng + ?Sized>(points: ArrayView2<f64>, rng: &mut R) -> Array2<f64> {
    let (n, dim) = points.dim();
    let shift: Vec<f64> = (0..dim).map(|_| rng.gen::<f64>()).collect();

    let mut shifted = Array2::zeros((n, dim));
    for i in 0..n {
        for j in 0..dim {
            shifted[[i, j]] = (points[[i, j]] + shift[j]) % 1.0;
        }
    }

    shifted
}

/// Independently permute each coordinate column
///
/// Preserves the marginal set of values per dimension while destroying the
/// joint lattice structure; useful for decorrelation diagnostics.
pub fn random_permutation<R: Rng + ?Sized>(points: ArrayView2<f64>, rng: &mut R) -> Array2<f64> {
    let (n, dim) = points.dim();
    let mut permuted = Array2::zeros((n, dim));

    for j in 0..dim {
        let mut column: Vec<f64> = points.column(j).to_vec();
        column.shuffle(rng);
        for (i, &value) in column.iter().enumerate() {
            permuted[[i, j]] = value;
        }
    }

    permuted
}
