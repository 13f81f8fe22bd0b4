//! Day-ahead, time-of-use and CO2 series for energy-system scheduling.
//!
//! Series are resolved per scheduling run from a [`timer::TimerContext`]:
//! caller-supplied arrays are checked against the horizon, everything else
//! comes from yearly reference data held in a [`cache::ReferenceCache`],
//! step-resampled to the timer resolution and cut to the horizon.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod prices;
pub mod reference;
pub mod reporting;
pub mod resample;
pub mod tariff;
pub mod timer;

pub use error::{PriceError, TimerError};
