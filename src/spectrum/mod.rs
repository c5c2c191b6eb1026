//! # Eigenvalue Spectra
//!
//! A [`Spectrum`] is the sorted (non-increasing) sequence of explained variances
//! produced by a PCA of one local neighborhood. This module validates spectra
//! and provides the consecutive-ratio gap sequence shared by the selection rules.

use crate::error::{LidError, Result};
use ndarray::{s, Array1, ArrayView1};
use std::fmt;

/// Explained variances of a local neighborhood, largest first.
///
/// Invariants checked on construction:
/// - at least two values
/// - every value finite and non-negative
/// - sorted in non-increasing order
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    values: Array1<f64>,
}

impl Spectrum {
    pub fn new(values: Array1<f64>) -> Result<Self> {
        if values.len() < 2 {
            return Err(LidError::InvalidSpectrum(format!(
                "need at least 2 eigenvalues, got {}",
                values.len()
            )));
        }

        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(LidError::InvalidSpectrum(format!(
                "eigenvalue {} at position {} is not a finite non-negative number",
                v, i
            )));
        }

        if let Some(i) = (0..values.len() - 1).find(|&i| values[i] < values[i + 1]) {
            return Err(LidError::InvalidSpectrum(format!(
                "eigenvalues must be non-increasing, but {} < {} at position {}",
                values[i],
                values[i + 1],
                i
            )));
        }

        Ok(Spectrum { values })
    }

    pub fn from_vec(values: Vec<f64>) -> Result<Self> {
        Self::new(Array1::from(values))
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`, a spectrum holds at least two values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn largest(&self) -> f64 {
        self.values[0]
    }

    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// Every eigenvalue is equal, including the all-zero spectrum of
    /// coinciding points. No axis separates signal from noise.
    pub fn is_degenerate(&self) -> bool {
        self.largest() == self.smallest()
    }

    pub fn smallest(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Ratios `v[i] / v[i + 1]`, see [`consecutive_ratios`].
    pub fn gaps(&self) -> Array1<f64> {
        consecutive_ratios(self.values.view())
    }

    pub fn cumulative(&self) -> Array1<f64> {
        cumulative_sum(self.values.view())
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.values
    }
}

impl TryFrom<Vec<f64>> for Spectrum {
    type Error = LidError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Spectrum::from_vec(values)
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4e}", v)?;
        }
        write!(f, "]")
    }
}

/// Relative drop between consecutive values: `gaps[i] = v[i] / v[i + 1]`.
///
/// The result has one entry less than `v`. A zero denominator produces `+inf`
/// (or `NaN` for `0 / 0`); these are kept as-is and read as maximal gaps.
pub fn consecutive_ratios(v: ArrayView1<f64>) -> Array1<f64> {
    if v.len() < 2 {
        return Array1::zeros(0);
    }
    &v.slice(s![..-1]) / &v.slice(s![1..])
}

/// Gap belonging to a cutoff after `de` components, `gaps[de - 1]`, clamped to
/// the last available gap. `NaN` if `gaps` is empty.
pub fn gap_at(gaps: ArrayView1<f64>, de: usize) -> f64 {
    if gaps.is_empty() {
        return f64::NAN;
    }
    let idx = de.saturating_sub(1).min(gaps.len() - 1);
    gaps[idx]
}

pub fn cumulative_sum(v: ArrayView1<f64>) -> Array1<f64> {
    v.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Position of the first maximal value, skipping `NaN`s. `+inf` is a valid
/// maximum. Returns `None` if every entry is `NaN` (or `v` is empty).
pub fn nan_argmax(v: ArrayView1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in v.iter().enumerate() {
        if x.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if x <= b => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}

/// Smallest index whose value satisfies `pred`.
pub(crate) fn first_index<F>(v: ArrayView1<f64>, pred: F) -> Option<usize>
where
    F: Fn(f64) -> bool,
{
    v.iter().position(|&x| pred(x))
}
