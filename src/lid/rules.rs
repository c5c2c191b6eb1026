use crate::error::{LidError, Result};
use crate::lid::{Estimate, LocalPcaConfig, PcaVersion};
use crate::spectrum::{
    consecutive_ratios, cumulative_sum, first_index, gap_at, nan_argmax, Spectrum,
};
use log::{debug, trace, warn};
use ndarray::s;

/// Applies the rule selected by `config.version` to `spectrum`.
pub fn select(spectrum: &Spectrum, config: &LocalPcaConfig) -> Result<Estimate> {
    if spectrum.is_degenerate() {
        return Ok(degenerate(spectrum, config.version));
    }

    let estimate = match config.version {
        PcaVersion::FukunagaOlsen => fukunaga_olsen(spectrum, config.alpha_fo),
        PcaVersion::Fan => fan(spectrum, config.alpha_fan, config.beta_fan, config.p_fan)?,
        PcaVersion::MaxGap => max_gap(spectrum),
        PcaVersion::Ratio => ratio(spectrum, config.alpha_ratio),
    };

    debug!(
        "{} estimate for spectrum {}: dimension = {}, gap = {:?}",
        config.version, spectrum, estimate.dimension, estimate.gap
    );
    Ok(estimate)
}

// All eigenvalues are equal (all zero when the points coincide). Every
// version reports a single dimension.
fn degenerate(spectrum: &Spectrum, version: PcaVersion) -> Estimate {
    warn!(
        "degenerate spectrum of length {} (all eigenvalues equal to {}), clamping {} estimate to 1",
        spectrum.len(),
        spectrum.largest(),
        version
    );
    let gap = version
        .reports_gap()
        .then(|| gap_at(spectrum.gaps().view(), 1));
    Estimate {
        dimension: 1,
        gap,
        degenerate: true,
    }
}

/// Fukunaga-Olsen: number of eigenvalues strictly larger than `alpha_fo`
/// times the largest eigenvalue, at least 1.
///
/// With `alpha_fo = 1` no eigenvalue exceeds the threshold and the estimate is 1.
pub fn fukunaga_olsen(spectrum: &Spectrum, alpha_fo: f64) -> Estimate {
    if spectrum.is_degenerate() {
        return degenerate(spectrum, PcaVersion::FukunagaOlsen);
    }

    let threshold = alpha_fo * spectrum.largest();
    let de = spectrum
        .values()
        .iter()
        .filter(|&&v| v > threshold)
        .count()
        .max(1);

    let gaps = spectrum.gaps();
    Estimate::new(de, Some(gap_at(gaps.view(), de)))
}

/// Position of the largest ratio between consecutive eigenvalues. `NaN`
/// ratios are skipped, the first maximum wins.
pub fn max_gap(spectrum: &Spectrum) -> Estimate {
    if spectrum.is_degenerate() {
        return degenerate(spectrum, PcaVersion::MaxGap);
    }

    let gaps = spectrum.gaps();
    trace!("maxgap ratios: {}", gaps);

    let de = nan_argmax(gaps.view()).map_or(1, |i| i + 1);
    Estimate::new(de, Some(gap_at(gaps.view(), de)))
}

/// Smallest number of components whose cumulative explained variance exceeds
/// `alpha_ratio`, or all components if none does.
///
/// The comparison is against the raw cumulative variance, not the fraction
/// of the total. Normalize the spectrum first to threshold on a fraction.
pub fn ratio(spectrum: &Spectrum, alpha_ratio: f64) -> Estimate {
    if spectrum.is_degenerate() {
        return degenerate(spectrum, PcaVersion::Ratio);
    }

    let cumulative = spectrum.cumulative();
    let de = first_index(cumulative.view(), |c| c > alpha_ratio)
        .map_or(spectrum.len(), |i| i + 1);
    Estimate::new(de, None)
}

/// Fan et al.: estimates a noise level from the eigenvalues past the first
/// `p_fan` share of the total variance, subtracts it, and cuts at the first
/// ratio above `alpha_fan` or where the corrected cumulative share exceeds
/// `beta_fan`, whichever comes first.
///
/// The corrected spectrum may contain negative values. The reported gap is
/// taken from the corrected spectrum.
///
/// # Errors
/// [`LidError::NoCutoffFound`] if neither stopping condition holds anywhere.
pub fn fan(spectrum: &Spectrum, alpha_fan: f64, beta_fan: f64, p_fan: f64) -> Result<Estimate> {
    if spectrum.is_degenerate() {
        return Ok(degenerate(spectrum, PcaVersion::Fan));
    }

    let values = spectrum.values();
    let total = spectrum.total();
    let cumulative = spectrum.cumulative();

    // Rounding can keep the last share at or below p_fan; the tail then is the last value.
    let noise_start = first_index(cumulative.view(), |c| c / total > p_fan)
        .unwrap_or(spectrum.len() - 1);
    let sigma = values.slice(s![noise_start..]).mean().unwrap_or(0.0);

    let shifted = values.mapv(|v| v - sigma);
    let gaps = consecutive_ratios(shifted.view());
    let shifted_total = shifted.sum();
    let shifted_cumulative = cumulative_sum(shifted.view());
    trace!(
        "fan noise level {} from index {}, corrected ratios: {}",
        sigma,
        noise_start,
        gaps
    );

    let by_gap = first_index(gaps.view(), |g| g > alpha_fan);
    let by_variance = first_index(shifted_cumulative.view(), |c| c / shifted_total > beta_fan);

    let cut = by_gap
        .into_iter()
        .chain(by_variance)
        .min()
        .ok_or(LidError::NoCutoffFound {
            alpha_fan,
            beta_fan,
        })?;

    let de = cut + 1;
    Ok(Estimate::new(de, Some(gap_at(gaps.view(), de))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spectrum(values: &[f64]) -> Spectrum {
        Spectrum::from_vec(values.to_vec()).unwrap()
    }

    fn example() -> Spectrum {
        spectrum(&[10.0, 9.0, 1.0, 0.9, 0.1])
    }

    #[test]
    fn test_fo_example() {
        let estimate = fukunaga_olsen(&example(), 0.05);

        assert_eq!(estimate.dimension, 4);
        assert_relative_eq!(estimate.gap.unwrap(), 9.0);
        assert!(!estimate.degenerate);
    }

    #[test]
    fn test_fo_threshold_is_strict() {
        // 0.5 * 10 = 5 is not strictly exceeded by the second eigenvalue
        let estimate = fukunaga_olsen(&spectrum(&[10.0, 5.0, 1.0]), 0.5);
        assert_eq!(estimate.dimension, 1);
        assert_relative_eq!(estimate.gap.unwrap(), 2.0);

        let estimate = fukunaga_olsen(&spectrum(&[10.0, 5.0, 1.0]), 0.49);
        assert_eq!(estimate.dimension, 2);
        assert_relative_eq!(estimate.gap.unwrap(), 5.0);
    }

    #[test]
    fn test_fo_alpha_one() {
        let estimate = fukunaga_olsen(&example(), 1.0);
        assert_eq!(estimate.dimension, 1);
        assert_relative_eq!(estimate.gap.unwrap(), 10.0 / 9.0);

        let estimate = fukunaga_olsen(&spectrum(&[2.0, 2.0, 1.0]), 1.0);
        assert_eq!(estimate.dimension, 1);
        assert!(!estimate.degenerate);
    }

    #[test]
    fn test_fo_all_significant_uses_last_gap() {
        let estimate = fukunaga_olsen(&spectrum(&[4.0, 3.0, 2.0]), 0.05);

        assert_eq!(estimate.dimension, 3);
        assert_relative_eq!(estimate.gap.unwrap(), 1.5);
    }

    #[test]
    fn test_maxgap_example() {
        let estimate = max_gap(&example());

        assert_eq!(estimate.dimension, 2);
        assert_relative_eq!(estimate.gap.unwrap(), 9.0);
    }

    #[test]
    fn test_maxgap_single_dominant() {
        let estimate = max_gap(&spectrum(&[50.0, 0.11, 0.1, 0.1, 0.09]));

        assert_eq!(estimate.dimension, 1);
        assert_relative_eq!(estimate.gap.unwrap(), 50.0 / 0.11);
    }

    #[test]
    fn test_maxgap_zero_tail() {
        // [inf, nan]: the infinite ratio is the maximum
        let estimate = max_gap(&spectrum(&[3.0, 0.0, 0.0]));

        assert_eq!(estimate.dimension, 1);
        assert!(estimate.gap.unwrap().is_infinite());

        // [2, inf, nan]
        let estimate = max_gap(&spectrum(&[2.0, 1.0, 0.0, 0.0]));
        assert_eq!(estimate.dimension, 2);
    }

    #[test]
    fn test_ratio_thresholds() {
        let s = example();

        assert_eq!(ratio(&s, 0.05).dimension, 1);
        assert_eq!(ratio(&s, 9.99).dimension, 1);
        assert_eq!(ratio(&s, 10.0).dimension, 2);
        assert!(ratio(&s, 0.05).gap.is_none());
    }

    #[test]
    fn test_ratio_uses_raw_cumulative_variance() {
        let s = spectrum(&[0.5, 0.3, 0.1, 0.05]);

        // cumulative: 0.5, 0.8, 0.9, 0.95
        assert_eq!(ratio(&s, 0.45).dimension, 1);
        assert_eq!(ratio(&s, 0.85).dimension, 3);
        // never exceeded: all components
        assert_eq!(ratio(&s, 1.0).dimension, 4);
    }

    #[test]
    fn test_ratio_above_all_but_last_prefix() {
        let s = spectrum(&[0.4, 0.3, 0.2, 0.1]);

        // cumulative up to the third value is 0.9
        assert_eq!(ratio(&s, 0.95).dimension, 4);
    }

    #[test]
    fn test_fan_example() {
        let estimate = fan(&example(), 10.0, 0.8, 0.95).unwrap();

        assert_eq!(estimate.dimension, 2);
        assert_relative_eq!(estimate.gap.unwrap(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fan_three_signal_axes() {
        let s = spectrum(&[9.0, 8.0, 7.0, 0.5, 0.4, 0.3, 0.2]);
        let estimate = fan(&s, 10.0, 0.8, 0.95).unwrap();

        assert_eq!(estimate.dimension, 3);
        // corrected by the noise level 0.35: 6.65 / 0.15
        assert_relative_eq!(estimate.gap.unwrap(), 6.65 / 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_fan_does_not_mutate_spectrum() {
        let s = example();
        let before = s.clone();

        fan(&s, 10.0, 0.8, 0.95).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn test_fan_no_cutoff_found() {
        // The noise tail covers the whole spectrum; the corrected total is a tiny
        // negative number, so no corrected share exceeds 1 and no ratio exceeds 1e9.
        let s = spectrum(&[100.0, 1.0, 1.0, 0.3]);
        let result = fan(&s, 1e9, 1.0, 0.95);

        assert!(matches!(
            result,
            Err(LidError::NoCutoffFound { alpha_fan, beta_fan })
                if alpha_fan == 1e9 && beta_fan == 1.0
        ));
    }

    #[test]
    fn test_flat_spectrum_clamps_to_one() {
        let s = spectrum(&[2.0, 2.0, 2.0, 2.0]);

        for version in [
            PcaVersion::FukunagaOlsen,
            PcaVersion::Fan,
            PcaVersion::MaxGap,
            PcaVersion::Ratio,
        ] {
            let estimate = select(&s, &LocalPcaConfig::with_version(version)).unwrap();
            assert_eq!(estimate.dimension, 1, "{}", version);
            assert!(estimate.degenerate, "{}", version);
        }

        // every ratio between equal eigenvalues is 1
        assert_relative_eq!(fukunaga_olsen(&s, 0.05).gap.unwrap(), 1.0);
        assert_relative_eq!(max_gap(&s).gap.unwrap(), 1.0);
        assert_eq!(ratio(&s, 0.05).dimension, 1);

        let estimate = fan(&s, 10.0, 0.8, 0.95).unwrap();
        assert_eq!(estimate.dimension, 1);
        assert!(estimate.degenerate);
    }

    #[test]
    fn test_degenerate_spectrum_clamps_to_one() {
        let s = spectrum(&[0.0, 0.0, 0.0]);

        for version in [
            PcaVersion::FukunagaOlsen,
            PcaVersion::Fan,
            PcaVersion::MaxGap,
            PcaVersion::Ratio,
        ] {
            let estimate = select(&s, &LocalPcaConfig::with_version(version)).unwrap();
            assert_eq!(estimate.dimension, 1);
            assert!(estimate.degenerate);
            assert_eq!(estimate.gap.is_some(), version.reports_gap());
        }

        assert!(fukunaga_olsen(&s, 0.05).degenerate);
        assert!(max_gap(&s).degenerate);
        assert_eq!(ratio(&s, 0.05).dimension, 1);
        assert_eq!(fan(&s, 10.0, 0.8, 0.95).unwrap().dimension, 1);
    }

    #[test]
    fn test_dimension_bounds() {
        let spectra = [
            example(),
            spectrum(&[1.0, 1.0]),
            spectrum(&[2.0, 2.0, 2.0, 2.0]),
            spectrum(&[5.0, 4.0, 3.0, 0.1, 0.05, 0.02]),
            spectrum(&[1e-12, 1e-13, 0.0]),
            spectrum(&[7.0, 0.0]),
        ];

        for s in &spectra {
            for version in [
                PcaVersion::FukunagaOlsen,
                PcaVersion::Fan,
                PcaVersion::MaxGap,
                PcaVersion::Ratio,
            ] {
                match select(s, &LocalPcaConfig::with_version(version)) {
                    Ok(estimate) => {
                        assert!(estimate.dimension >= 1, "{} on {}", version, s);
                        assert!(estimate.dimension <= s.len(), "{} on {}", version, s);
                    }
                    Err(LidError::NoCutoffFound { .. }) if version == PcaVersion::Fan => {}
                    Err(e) => panic!("{} on {} failed: {}", version, s, e),
                }
            }
        }
    }

    #[test]
    fn test_select_is_idempotent() {
        let s = example();

        for version in [
            PcaVersion::FukunagaOlsen,
            PcaVersion::Fan,
            PcaVersion::MaxGap,
            PcaVersion::Ratio,
        ] {
            let config = LocalPcaConfig::with_version(version);
            let first = select(&s, &config).unwrap();
            let second = select(&s, &config).unwrap();
            assert_eq!(first, second);
        }
    }
}
