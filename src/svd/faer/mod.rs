use crate::dense::center_columns;
use crate::svd::{into_spectrum_order, variance_from_singular_values, Decomposition};
use faer_ext::*;
use ndarray::{Array1, ArrayView2};

/// Thin SVD of the centered neighborhood computed with faer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerSvd;

impl Decomposition for FaerSvd {
    fn explained_variance(&self, x: ArrayView2<f64>) -> anyhow::Result<Array1<f64>> {
        let n_samples = x.nrows();
        let centered = center_columns(x)?;

        let faer_mat = centered.view().into_faer();
        let singular_values = faer_mat.singular_values();

        let variances = variance_from_singular_values(singular_values, n_samples);
        Ok(into_spectrum_order(variances))
    }
}
