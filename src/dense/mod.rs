use anyhow::anyhow;
use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

/// Subtracts the column means from every row.
pub fn center_columns(x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| anyhow!("Cannot center a matrix without rows"))?;

    let mut centered = x.to_owned();
    centered
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| {
            row -= &mean;
        });

    Ok(centered)
}

/// Sample covariance of the columns of `x` (divisor `n - 1`).
pub fn sample_covariance(x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let n_samples = x.nrows();
    if n_samples < 2 {
        return Err(anyhow!(
            "Covariance needs at least 2 samples, got {}",
            n_samples
        ));
    }

    let centered = center_columns(x)?;
    Ok(centered.t().dot(&centered) / (n_samples as f64 - 1.0))
}

/// Row and column of the first NaN or infinite entry.
pub fn first_non_finite(x: ArrayView2<f64>) -> Option<(usize, usize)> {
    x.indexed_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(idx, _)| idx)
}
