//! Conversion of series between temporal resolutions.

use std::fmt;
use std::str::FromStr;

use crate::error::PriceError;

/// Tolerance absorbing float error when mapping target samples onto source indices.
const INDEX_EPSILON: f64 = 1e-9;

/// How samples are treated when the resolution changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMode {
    /// Piecewise-linear interpolation between source samples.
    Linear,
    /// Samples hold their value until the next one (repeat up, decimate down).
    Step,
}

impl FromStr for ResampleMode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "step" => Ok(Self::Step),
            other => Err(PriceError::InvalidArgument(format!(
                "mode \"{other}\" is invalid, expected \"linear\" or \"step\""
            ))),
        }
    }
}

impl fmt::Display for ResampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Step => write!(f, "step"),
        }
    }
}

/// Resamples `series` by `factor` (target samples per source sample).
///
/// The result has `round(len * factor)` samples. Target sample `i` sits at
/// source position `i / factor`:
///
/// * [`ResampleMode::Step`] takes the source sample at `floor(i / factor)`, so
///   an integer factor `f > 1` repeats every sample `f` times and a factor
///   `1/k` keeps every `k`-th sample starting at index 0. Dropped samples are
///   discarded, not averaged.
/// * [`ResampleMode::Linear`] interpolates between the two neighbouring source
///   samples. Positions past the last sample hold its value.
///
/// A factor of exactly 1 returns a copy of the input.
///
/// # Errors
///
/// Returns `PriceError::InvalidArgument` if `factor` is not a positive finite number.
///
/// # Examples
///
/// ```
/// use price_series::resample::{resample, ResampleMode};
///
/// let up = resample(&[1.0, 2.0], ResampleMode::Step, 2.0).unwrap();
/// assert_eq!(up, vec![1.0, 1.0, 2.0, 2.0]);
///
/// let down = resample(&up, ResampleMode::Step, 0.5).unwrap();
/// assert_eq!(down, vec![1.0, 2.0]);
/// ```
pub fn resample(series: &[f64], mode: ResampleMode, factor: f64) -> Result<Vec<f64>, PriceError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(PriceError::InvalidArgument(format!(
            "resampling factor must be positive, got {factor}"
        )));
    }
    if factor == 1.0 || series.is_empty() {
        return Ok(series.to_vec());
    }

    let new_len = (series.len() as f64 * factor).round() as usize;
    let last = series.len() - 1;

    let resampled = match mode {
        ResampleMode::Step => (0..new_len)
            .map(|i| {
                let idx = (i as f64 / factor + INDEX_EPSILON).floor() as usize;
                series[idx.min(last)]
            })
            .collect(),
        ResampleMode::Linear => (0..new_len)
            .map(|i| {
                let pos = i as f64 / factor;
                let lo = (pos + INDEX_EPSILON).floor() as usize;
                if lo >= last {
                    return series[last];
                }
                let frac = (pos - lo as f64).max(0.0);
                series[lo] + (series[lo + 1] - series[lo]) * frac
            })
            .collect(),
    };
    Ok(resampled)
}

/// Copies `length` samples starting at `offset`.
///
/// # Errors
///
/// Returns `PriceError::IndexOutOfRange` if the window extends past the end of `series`.
pub fn slice(series: &[f64], offset: usize, length: usize) -> Result<Vec<f64>, PriceError> {
    let end = offset.saturating_add(length);
    series
        .get(offset..end)
        .map(<[f64]>::to_vec)
        .ok_or(PriceError::IndexOutOfRange {
            offset,
            end,
            available: series.len(),
        })
}

/// Resamples `series` and extracts the window `[offset, offset + length)`.
///
/// # Errors
///
/// Propagates the errors of [`resample`] and [`slice`].
pub fn resample_window(
    series: &[f64],
    mode: ResampleMode,
    factor: f64,
    offset: usize,
    length: usize,
) -> Result<Vec<f64>, PriceError> {
    if factor == 1.0 {
        return slice(series, offset, length);
    }
    let resampled = resample(series, mode, factor)?;
    slice(&resampled, offset, length)
}
