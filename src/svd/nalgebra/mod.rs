use crate::dense::{center_columns, sample_covariance};
use crate::svd::{into_spectrum_order, variance_from_singular_values, Decomposition};
use anyhow::anyhow;
use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2};

fn to_dmatrix(x: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = x.dim();
    DMatrix::from_fn(rows, cols, |i, j| x[[i, j]])
}

/// Thin SVD of the centered neighborhood. Returns `min(n, d)` variances, like a
/// PCA that keeps every component.
#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraSvd;

impl Decomposition for NalgebraSvd {
    fn explained_variance(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        let (n_samples, n_features) = x.dim();
        let centered = center_columns(x)?;

        let svd = to_dmatrix(&centered)
            .try_svd(false, false, f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("SVD did not converge"))?;

        debug!(
            "SVD of {} samples × {} features: {} singular values",
            n_samples,
            n_features,
            svd.singular_values.len()
        );

        let variances =
            variance_from_singular_values(svd.singular_values.iter().copied(), n_samples);
        Ok(into_spectrum_order(variances))
    }
}

/// Eigen-decomposition of the `d × d` sample covariance. Always returns `d`
/// variances, padding with zeros when `n <= d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CovarianceEigen;

impl Decomposition for CovarianceEigen {
    fn explained_variance(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        let cov = sample_covariance(x)?;

        let eigen = SymmetricEigen::try_new(to_dmatrix(&cov), f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("Symmetric eigen-decomposition did not converge"))?;

        debug!(
            "eigen-decomposition of {}×{} covariance",
            cov.nrows(),
            cov.ncols()
        );

        Ok(into_spectrum_order(eigen.eigenvalues.iter().copied().collect()))
    }
}
