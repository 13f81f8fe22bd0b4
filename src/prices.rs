//! Price series assembly.
//!
//! Resolves the day-ahead, time-of-use and CO2 series for one scheduling
//! run. Every series is either supplied by the caller or derived from cached
//! quarter-hour reference data, step-resampled to the timer resolution and
//! cut to the simulation horizon.

use crate::cache::ReferenceCache;
use crate::error::PriceError;
use crate::reference::{DatasetKind, NATIVE_RESOLUTION_SECS};
use crate::resample::{ResampleMode, resample_window};
use crate::timer::TimerContext;

/// Caller-supplied overrides for one scheduling run.
#[derive(Debug, Clone, Default)]
pub struct PriceInputs {
    /// Day-ahead prices per timestep of the horizon in ct/kWh.
    pub day_ahead: Option<Vec<f64>>,
    /// Time-of-use prices per timestep of the horizon in ct/kWh.
    pub time_of_use: Option<Vec<f64>>,
    /// CO2 emissions per timestep of the horizon in g/kWh.
    pub co2: Option<Vec<f64>>,
    /// Factor applied to prices for feed-in revenue, usually in `[0, 1]`.
    pub feed_in_factor: f64,
}

/// Price, tariff and emission series aligned to a simulation horizon.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use price_series::cache::ReferenceCache;
/// use price_series::prices::{PriceInputs, PriceSeries};
/// use price_series::reference::ReferenceSource;
/// use price_series::timer::Timer;
///
/// let start = NaiveDate::from_ymd_opt(2015, 1, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let timer = Timer::new(900, 4, None, None, start).unwrap();
/// let mut cache = ReferenceCache::new(ReferenceSource::default());
///
/// let inputs = PriceInputs {
///     day_ahead: Some(vec![3.1, 2.9, 2.7, 3.4]),
///     time_of_use: Some(vec![28.0; 4]),
///     co2: Some(vec![500.0; 4]),
///     feed_in_factor: 0.5,
/// };
/// let prices = PriceSeries::build(&timer, &mut cache, inputs).unwrap();
/// assert_eq!(prices.day_ahead(), &[3.1, 2.9, 2.7, 3.4]);
/// assert_eq!(prices.feed_in_factor(), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    day_ahead: Vec<f64>,
    time_of_use: Vec<f64>,
    co2: Vec<f64>,
    feed_in_factor: f64,
}

impl PriceSeries {
    /// Resolves all three series for `timer`.
    ///
    /// Series missing from `inputs` are taken from `cache`: day-ahead and CO2
    /// from the packaged datasets, time-of-use from the tariff synthesized for
    /// the timer's year.
    ///
    /// # Errors
    ///
    /// * `PriceError::Configuration` if an override does not have `horizon` samples
    /// * `PriceError::FileAccess` / `PriceError::MalformedData` if reference data is unreadable
    /// * `PriceError::IndexOutOfRange` if the horizon runs past the reference year
    pub fn build(
        timer: &impl TimerContext,
        cache: &mut ReferenceCache,
        inputs: PriceInputs,
    ) -> Result<Self, PriceError> {
        let horizon = timer.horizon();
        let factor = f64::from(NATIVE_RESOLUTION_SECS) / f64::from(timer.resolution_secs());
        let window = |reference: &[f64]| {
            resample_window(reference, ResampleMode::Step, factor, timer.offset(), horizon)
        };

        let day_ahead = match inputs.day_ahead {
            Some(series) => checked("day-ahead price", series, horizon)?,
            None => window(
                cache
                    .get_or_load_for_year(DatasetKind::DayAhead, timer.year())?
                    .samples(),
            )?,
        };

        let time_of_use = match inputs.time_of_use {
            Some(series) => checked("time-of-use price", series, horizon)?,
            None => window(cache.get_or_build(timer.year(), timer.is_leap())?.samples())?,
        };

        let co2 = match inputs.co2 {
            Some(series) => checked("CO2 emission", series, horizon)?,
            None => window(
                cache
                    .get_or_load_for_year(DatasetKind::Co2, timer.year())?
                    .samples(),
            )?,
        };

        Ok(Self {
            day_ahead,
            time_of_use,
            co2,
            feed_in_factor: inputs.feed_in_factor,
        })
    }

    /// Day-ahead prices in ct/kWh.
    pub fn day_ahead(&self) -> &[f64] {
        &self.day_ahead
    }

    /// Time-of-use prices in ct/kWh.
    pub fn time_of_use(&self) -> &[f64] {
        &self.time_of_use
    }

    /// CO2 emissions in g/kWh.
    pub fn co2(&self) -> &[f64] {
        &self.co2
    }

    pub fn feed_in_factor(&self) -> f64 {
        self.feed_in_factor
    }

    /// Number of timesteps covered by every series.
    pub fn horizon(&self) -> usize {
        self.day_ahead.len()
    }
}

fn checked(series: &'static str, values: Vec<f64>, horizon: usize) -> Result<Vec<f64>, PriceError> {
    if values.len() != horizon {
        return Err(PriceError::Configuration {
            series,
            expected: horizon,
            actual: values.len(),
        });
    }
    Ok(values)
}
