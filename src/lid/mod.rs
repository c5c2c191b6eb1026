//! # Local Intrinsic Dimension
//!
//! Estimates the intrinsic dimension of a local neighborhood from its PCA
//! spectrum. The neighborhood is assumed small enough that curvature and noise
//! are negligible, so it approximates a uniform sample of a ball of the true
//! dimension.
//!
//! ## Versions
//! - **FO** (Fukunaga-Olsen): counts eigenvalues larger than `alpha_fo` times the largest
//! - **fan** (Fan et al.): subtracts a noise floor, then stops at a large gap or
//!   once `beta_fan` of the corrected variance is covered
//! - **maxgap**: position of the largest ratio between consecutive eigenvalues
//! - **ratio**: number of components whose cumulative variance exceeds `alpha_ratio`
//!
//! ## References
//! - Fukunaga, K. and Olsen, D. R. (1971). An algorithm for finding intrinsic
//!   dimensionality of data. IEEE Trans. Comput., c-20(2):176-183.
//! - Fan, M. et al. (2010). Intrinsic dimension estimation of data by principal
//!   component analysis. arXiv preprint 1002.2050.

use crate::error::{LidError, Result};
use std::fmt;
use std::str::FromStr;

mod estimator;
mod rules;

pub use estimator::{LocalPca, LocalPcaBuilder};
pub use rules::{fan, fukunaga_olsen, max_gap, ratio, select};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PcaVersion {
    #[default]
    FukunagaOlsen,
    Fan,
    MaxGap,
    Ratio,
}

impl PcaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PcaVersion::FukunagaOlsen => "FO",
            PcaVersion::Fan => "fan",
            PcaVersion::MaxGap => "maxgap",
            PcaVersion::Ratio => "ratio",
        }
    }

    /// Whether this version reports a gap statistic with its estimate.
    pub fn reports_gap(&self) -> bool {
        !matches!(self, PcaVersion::Ratio)
    }
}

impl fmt::Display for PcaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PcaVersion {
    type Err = LidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FO" => Ok(PcaVersion::FukunagaOlsen),
            "fan" => Ok(PcaVersion::Fan),
            "maxgap" => Ok(PcaVersion::MaxGap),
            "ratio" => Ok(PcaVersion::Ratio),
            other => Err(LidError::UnknownVersion(other.to_string())),
        }
    }
}

/// Version selection and rule parameters. Only the parameters of the active
/// version are read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPcaConfig {
    pub version: PcaVersion,
    /// `ratio`: threshold on the raw cumulative explained variance.
    pub alpha_ratio: f64,
    /// `FO`: an eigenvalue is significant if larger than `alpha_fo` times the largest one.
    pub alpha_fo: f64,
    /// `fan`: large gap threshold.
    pub alpha_fan: f64,
    /// `fan`: total covariance threshold on the noise-corrected spectrum.
    pub beta_fan: f64,
    /// `fan`: fraction of the total covariance considered non-noise.
    pub p_fan: f64,
}

impl Default for LocalPcaConfig {
    fn default() -> Self {
        LocalPcaConfig {
            version: PcaVersion::FukunagaOlsen,
            alpha_ratio: 0.05,
            alpha_fo: 0.05,
            alpha_fan: 10.0,
            beta_fan: 0.8,
            p_fan: 0.95,
        }
    }
}

impl LocalPcaConfig {
    pub fn with_version(version: PcaVersion) -> Self {
        LocalPcaConfig {
            version,
            ..Default::default()
        }
    }

    /// Checks every parameter against its domain, regardless of the active version.
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("alpha_ratio", self.alpha_ratio)?;
        check_unit_interval("alpha_fo", self.alpha_fo)?;
        check_unit_interval("beta_fan", self.beta_fan)?;
        check_unit_interval("p_fan", self.p_fan)?;

        if !(self.alpha_fan.is_finite() && self.alpha_fan > 0.0) {
            return Err(LidError::InvalidConfig(format!(
                "alpha_fan must be a finite positive number, got {}",
                self.alpha_fan
            )));
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(LidError::InvalidConfig(format!(
            "{} must lie in (0, 1], got {}",
            name, value
        )))
    }
}

/// Result of a single estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Estimated intrinsic dimension, `1 <= dimension <= spectrum length`.
    pub dimension: usize,
    /// Ratio between the eigenvalues around the chosen cutoff. `None` for `ratio`.
    pub gap: Option<f64>,
    /// All eigenvalues were equal (or zero) and the dimension has been clamped to 1.
    pub degenerate: bool,
}

impl Estimate {
    pub(crate) fn new(dimension: usize, gap: Option<f64>) -> Self {
        Estimate {
            dimension,
            gap,
            degenerate: false,
        }
    }
}
