//! Time-of-use tariff synthesis.
//!
//! A full-year quarter-hour tariff is built from fixed weekday and weekend
//! intraday profiles. Winter runs from Jan 1 to Apr 30 and from Nov 1 to
//! Dec 31, summer from May 1 to Oct 31. Every seasonal window is aligned so
//! that its first day gets the profile of its actual weekday.
//!
//! The season lengths are fixed (120/121, 184 and 61 days); only the first
//! winter window absorbs the leap day.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::error::PriceError;
use crate::reference::{ConsumerPriceTable, PriceLookup, ReferenceSeries, SAMPLES_PER_DAY};

/// Unweighted average of the tier prices, used to normalize to the yearly average.
pub const TIER_AVERAGE: f64 = 9.5;

const LOW: f64 = 7.7;
const MEDIUM: f64 = 11.4;
const HIGH: f64 = 14.0;
const WEEKEND: f64 = 8.7;

/// Quarter hours per tier, in intraday order.
const TIER_QUARTERS: [usize; 5] = [28, 16, 24, 8, 20];
const SUMMER_TIERS: [f64; 5] = [LOW, MEDIUM, HIGH, MEDIUM, LOW];
const WINTER_TIERS: [f64; 5] = [LOW, HIGH, MEDIUM, HIGH, LOW];

const WEEK_LEN: usize = 7 * SAMPLES_PER_DAY;

const DAYS_TO_SUMMER: usize = 120;
const SUMMER_DAYS: usize = 184;
const LATE_WINTER_DAYS: usize = 61;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Season {
    Summer,
    Winter,
}

fn weekday_profile(season: Season) -> Vec<f64> {
    let tiers = match season {
        Season::Summer => SUMMER_TIERS,
        Season::Winter => WINTER_TIERS,
    };
    let mut profile = Vec::with_capacity(SAMPLES_PER_DAY);
    for (price, quarters) in tiers.iter().zip(TIER_QUARTERS) {
        profile.extend(std::iter::repeat_n(*price, quarters));
    }
    profile
}

/// Five weekdays followed by two weekend days, starting on Monday.
fn week_profile(season: Season) -> Vec<f64> {
    let weekday = weekday_profile(season);
    let mut week = Vec::with_capacity(WEEK_LEN);
    for _ in 0..5 {
        week.extend_from_slice(&weekday);
    }
    week.extend(std::iter::repeat_n(WEEKEND, 2 * SAMPLES_PER_DAY));
    week
}

/// Takes `days` days of the repeating `week`, starting at the weekday of `first_day`.
fn aligned_window(week: &[f64], first_day: NaiveDate, days: usize) -> Vec<f64> {
    let start = first_day.weekday().num_days_from_monday() as usize * SAMPLES_PER_DAY;
    week.iter()
        .copied()
        .cycle()
        .skip(start)
        .take(days * SAMPLES_PER_DAY)
        .collect()
}

/// Builds the unscaled tariff curve for `year`.
///
/// The result has `96 * 365` samples, or `96 * 366` if `is_leap`.
pub fn tariff_pattern(year: i32, is_leap: bool) -> Result<Vec<f64>, PriceError> {
    let winter = week_profile(Season::Winter);
    let summer = week_profile(Season::Summer);

    let date = |month: u32| {
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            PriceError::InvalidArgument(format!("year {year} is outside the supported calendar"))
        })
    };

    let days_to_summer = DAYS_TO_SUMMER + usize::from(is_leap);
    let mut pattern = aligned_window(&winter, date(1)?, days_to_summer);
    pattern.extend(aligned_window(&summer, date(5)?, SUMMER_DAYS));
    pattern.extend(aligned_window(&winter, date(11)?, LATE_WINTER_DAYS));
    Ok(pattern)
}

/// Synthesizes the time-of-use tariff for `year`, scaled so that the tier
/// average matches the year's average consumer price.
///
/// Years outside the consumer price table use the nearest listed year and log
/// a warning.
///
/// # Errors
///
/// Returns `PriceError::InvalidArgument` if `year` cannot be represented as a
/// calendar date.
pub fn synthesize(
    year: i32,
    is_leap: bool,
    consumer_prices: &ConsumerPriceTable,
) -> Result<ReferenceSeries, PriceError> {
    let avg_price = match consumer_prices.lookup(year) {
        PriceLookup::Exact(price) => price,
        PriceLookup::Fallback {
            year: used,
            price,
        } => {
            warn!("Year {year} not in consumer price table. Using year {used} instead.");
            price
        }
    };

    let scale = f64::from(avg_price) / TIER_AVERAGE;
    let tariff = tariff_pattern(year, is_leap)?
        .into_iter()
        .map(|p| p * scale)
        .collect();
    Ok(ReferenceSeries::new(tariff))
}
