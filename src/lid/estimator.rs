use crate::dense::first_non_finite;
use crate::error::{LidError, Result};
use crate::lid::rules::select;
use crate::lid::{Estimate, LocalPcaConfig, PcaVersion};
use crate::spectrum::Spectrum;
use crate::svd::Decomposition;
use log::debug;
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::sync::Arc;

pub struct LocalPcaBuilder<D: Decomposition> {
    config: LocalPcaConfig,
    decomposition: Arc<D>,
}

impl<D: Decomposition> LocalPcaBuilder<D> {
    pub fn new(decomposition: D) -> Self {
        LocalPcaBuilder {
            config: LocalPcaConfig::default(),
            decomposition: Arc::new(decomposition),
        }
    }

    pub fn config(mut self, config: LocalPcaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn version(mut self, version: PcaVersion) -> Self {
        self.config.version = version;
        self
    }

    pub fn alpha_ratio(mut self, alpha_ratio: f64) -> Self {
        self.config.alpha_ratio = alpha_ratio;
        self
    }

    pub fn alpha_fo(mut self, alpha_fo: f64) -> Self {
        self.config.alpha_fo = alpha_fo;
        self
    }

    pub fn alpha_fan(mut self, alpha_fan: f64) -> Self {
        self.config.alpha_fan = alpha_fan;
        self
    }

    pub fn beta_fan(mut self, beta_fan: f64) -> Self {
        self.config.beta_fan = beta_fan;
        self
    }

    pub fn p_fan(mut self, p_fan: f64) -> Self {
        self.config.p_fan = p_fan;
        self
    }

    /// Fails with [`LidError::InvalidConfig`] if a parameter is out of range.
    pub fn build(self) -> Result<LocalPca<D>> {
        self.config.validate()?;
        Ok(LocalPca {
            config: self.config,
            decomposition: self.decomposition,
        })
    }
}

/// Local intrinsic dimension estimator using PCA.
///
/// Holds no state between calls; a single instance can estimate many
/// neighborhoods, also from several threads at once.
pub struct LocalPca<D: Decomposition> {
    config: LocalPcaConfig,
    decomposition: Arc<D>,
}

impl<D: Decomposition> Clone for LocalPca<D> {
    fn clone(&self) -> Self {
        LocalPca {
            config: self.config,
            decomposition: Arc::clone(&self.decomposition),
        }
    }
}

impl<D: Decomposition> LocalPca<D> {
    pub fn config(&self) -> &LocalPcaConfig {
        &self.config
    }

    pub fn version(&self) -> PcaVersion {
        self.config.version
    }

    /// Validates `x` (samples × features) and decomposes it into its spectrum.
    pub fn spectrum(&self, x: ArrayView2<f64>) -> Result<Spectrum> {
        validate_neighborhood(x)?;
        let values = self.decomposition.explained_variance(x)?;
        Spectrum::new(values)
    }

    /// Estimates the intrinsic dimension of a single neighborhood.
    ///
    /// # Errors
    /// - [`LidError::InvalidInput`] for fewer than 2 samples or features, or non-finite values
    /// - [`LidError::Decomposition`] if the decomposition fails
    /// - [`LidError::NoCutoffFound`] if the fan rule finds no cutoff
    pub fn estimate(&self, x: ArrayView2<f64>) -> Result<Estimate> {
        let spectrum = self.spectrum(x)?;
        self.estimate_spectrum(&spectrum)
    }

    /// Applies the configured rule to an already computed spectrum.
    pub fn estimate_spectrum(&self, spectrum: &Spectrum) -> Result<Estimate> {
        select(spectrum, &self.config)
    }

    /// Estimates every neighborhood in parallel. A failing neighborhood does not
    /// affect the others; its error is returned at its position.
    pub fn estimate_batch(&self, neighborhoods: &[ArrayView2<f64>]) -> Vec<Result<Estimate>> {
        debug!(
            "estimating {} neighborhoods with version {}",
            neighborhoods.len(),
            self.config.version
        );
        neighborhoods
            .par_iter()
            .map(|x| self.estimate(*x))
            .collect()
    }
}

fn validate_neighborhood(x: ArrayView2<f64>) -> Result<()> {
    let (n_samples, n_features) = x.dim();
    if n_samples < 2 {
        return Err(LidError::InvalidInput(format!(
            "need at least 2 samples, got {}",
            n_samples
        )));
    }
    if n_features < 2 {
        return Err(LidError::InvalidInput(format!(
            "need at least 2 features, got {}",
            n_features
        )));
    }
    if let Some((row, col)) = first_non_finite(x) {
        return Err(LidError::InvalidInput(format!(
            "non-finite value at ({}, {})",
            row, col
        )));
    }
    Ok(())
}
