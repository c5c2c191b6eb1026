//! # Spectrum Decompositions
//!
//! Back-ends that turn a local neighborhood (samples × features) into its
//! explained variances, i.e. the eigenvalues of the sample covariance matrix
//! sorted largest first.
//!
//! ## Available
//! - [`NalgebraSvd`]: thin SVD of the centered data, `min(n, d)` values
//! - [`CovarianceEigen`]: symmetric eigen-decomposition of the covariance, `d` values
//! - `FaerSvd` (feature `faer`): thin SVD using faer

use ndarray::{Array1, ArrayView2};

#[cfg(feature = "faer")]
pub mod faer;
pub mod nalgebra;

#[cfg(feature = "faer")]
pub use self::faer::FaerSvd;
pub use self::nalgebra::{CovarianceEigen, NalgebraSvd};

/// Trait for decomposition implementations
pub trait Decomposition: Send + Sync {
    /// Explained variances of `x`, non-negative and sorted in non-increasing order.
    fn explained_variance(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>>;
}

impl<D: Decomposition + ?Sized> Decomposition for Box<D> {
    fn explained_variance(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        (**self).explained_variance(x)
    }
}

/// Clamps round-off negatives to zero and sorts largest first.
pub(crate) fn into_spectrum_order(mut values: Vec<f64>) -> Array1<f64> {
    for v in values.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
    values.sort_by(|a, b| b.total_cmp(a));
    Array1::from(values)
}

/// Explained variance from the singular values of centered data.
pub(crate) fn variance_from_singular_values<I>(singular_values: I, n_samples: usize) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let divisor = n_samples as f64 - 1.0;
    singular_values
        .into_iter()
        .map(|s| s * s / divisor)
        .collect()
}
