use thiserror::Error;

/// Errors raised while estimating a local intrinsic dimension.
///
/// A degenerate (all-equal or all-zero) spectrum is not an error; it is reported through
/// [`Estimate::degenerate`](crate::lid::Estimate::degenerate).
#[derive(Debug, Error)]
pub enum LidError {
    /// The neighborhood matrix is too small or contains NaN/Inf.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A hand-supplied spectrum is not a usable eigenvalue sequence.
    #[error("invalid spectrum: {0}")]
    InvalidSpectrum(String),

    /// A rule parameter lies outside of its domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A rule identifier other than `FO`, `fan`, `maxgap` or `ratio`.
    #[error("unknown PCA version '{0}', expected one of FO, fan, maxgap, ratio")]
    UnknownVersion(String),

    /// Neither the gap test nor the cumulative variance test of the fan rule
    /// was satisfied anywhere in the noise-corrected spectrum.
    #[error("fan rule found no cutoff (alpha_fan = {alpha_fan}, beta_fan = {beta_fan})")]
    NoCutoffFound { alpha_fan: f64, beta_fan: f64 },

    /// The decomposition back-end could not produce a spectrum.
    #[error("decomposition failed: {0}")]
    Decomposition(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LidError>;
