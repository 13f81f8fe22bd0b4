//! Calendar-aware simulation timer.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use tracing::warn;

use crate::error::TimerError;

const SECONDS_PER_HOUR: u32 = 3600;
const SECONDS_PER_YEAR: i64 = 365 * 24 * 3600;

/// Read-only view of the calendar and horizon parameters a price lookup needs.
pub trait TimerContext {
    /// Seconds per timestep.
    fn resolution_secs(&self) -> u32;
    /// Number of timesteps that price data must cover.
    fn horizon(&self) -> usize;
    /// Index of the horizon's first timestep within its calendar year.
    fn offset(&self) -> usize;
    /// Calendar year of the horizon start.
    fn year(&self) -> i32;
    /// Whether `year` is a leap year.
    fn is_leap(&self) -> bool;
}

/// A scheduling timer that keeps an actual date rather than a relative counter.
///
/// The timer distinguishes between the optimization horizon (`op_horizon`),
/// the full simulation horizon for which data must be available
/// (`simu_horizon`), and the step width between two model predictive control
/// runs (`mpc_step_width`).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use price_series::timer::{Timer, TimerContext};
///
/// let start = NaiveDate::from_ymd_opt(2015, 1, 1)
///     .and_then(|d| d.and_hms_opt(1, 0, 0))
///     .unwrap();
/// let timer = Timer::new(3600, 4, Some(8), None, start).unwrap();
/// assert_eq!(timer.offset(), 1);
/// assert_eq!(timer.horizon(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct Timer {
    /// Seconds in one timestep.
    step_size: u32,
    /// Timesteps used in one scheduling optimization.
    op_horizon: usize,
    /// Timesteps in the whole simulation.
    simu_horizon: usize,
    /// Timesteps between two MPC optimizations.
    mpc_step_width: usize,
    initial: NaiveDateTime,
    current: NaiveDateTime,
}

impl Timer {
    /// Creates a timer starting at `initial`.
    ///
    /// # Arguments
    ///
    /// * `step_size` - Seconds per timestep; must divide one hour
    /// * `op_horizon` - Timesteps in one scheduling optimization
    /// * `mpc_horizon` - Timesteps in the whole simulation, defaults to `op_horizon`
    /// * `mpc_step_width` - Timesteps between two MPC runs, defaults to `op_horizon`
    /// * `initial` - Start of the simulation, aligned to `step_size` from Jan 1
    ///
    /// # Errors
    ///
    /// Returns a `TimerError` if `step_size` does not divide 3600, the horizon is
    /// empty, or `initial` is not aligned to the timestep grid of its year.
    pub fn new(
        step_size: u32,
        op_horizon: usize,
        mpc_horizon: Option<usize>,
        mpc_step_width: Option<usize>,
        initial: NaiveDateTime,
    ) -> Result<Self, TimerError> {
        if step_size == 0 || SECONDS_PER_HOUR % step_size != 0 {
            return Err(TimerError::StepSize(step_size));
        }
        if op_horizon == 0 {
            return Err(TimerError::EmptyHorizon);
        }
        if seconds_since_new_year(initial) % i64::from(step_size) != 0 {
            return Err(TimerError::Misaligned { step_size });
        }

        let simu_horizon = mpc_horizon.unwrap_or(op_horizon);
        let steps_per_year = (SECONDS_PER_YEAR / i64::from(step_size)) as usize;
        if simu_horizon > steps_per_year {
            let horizon_name = if mpc_horizon.is_none() {
                "op_horizon"
            } else {
                "mpc_horizon"
            };
            warn!(
                horizon = simu_horizon,
                steps_per_year, "`{horizon_name}` indicates a horizon larger than one year"
            );
        }

        Ok(Self {
            step_size,
            op_horizon,
            simu_horizon,
            mpc_step_width: mpc_step_width.unwrap_or(op_horizon),
            initial,
            current: initial,
        })
    }

    /// Seconds in one timestep.
    pub fn step_size(&self) -> u32 {
        self.step_size
    }

    /// Hours in one timestep.
    pub fn time_slot(&self) -> f64 {
        f64::from(self.step_size) / f64::from(SECONDS_PER_HOUR)
    }

    pub fn op_horizon(&self) -> usize {
        self.op_horizon
    }

    pub fn simu_horizon(&self) -> usize {
        self.simu_horizon
    }

    pub fn mpc_step_width(&self) -> usize {
        self.mpc_step_width
    }

    /// Datetime of the current timestep.
    pub fn datetime(&self) -> NaiveDateTime {
        self.current
    }

    pub fn date(&self) -> NaiveDate {
        self.current.date()
    }

    pub fn weekday(&self) -> Weekday {
        self.current.weekday()
    }

    /// Timesteps passed since Jan 1 00:00 of the current year.
    pub fn time_in_year(&self) -> usize {
        (seconds_since_new_year(self.current) / i64::from(self.step_size)) as usize
    }

    /// Moves `mpc_step_width` timesteps forward.
    pub fn mpc_update(&mut self) {
        self.advance(self.mpc_step_width);
    }

    /// Moves `op_horizon` timesteps forward.
    pub fn op_update(&mut self) {
        self.advance(self.op_horizon);
    }

    /// Returns to the initial datetime.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    fn advance(&mut self, steps: usize) {
        let seconds = i64::from(self.step_size) * steps as i64;
        self.current += TimeDelta::seconds(seconds);
    }
}

impl TimerContext for Timer {
    fn resolution_secs(&self) -> u32 {
        self.step_size
    }

    fn horizon(&self) -> usize {
        self.simu_horizon
    }

    fn offset(&self) -> usize {
        self.time_in_year()
    }

    fn year(&self) -> i32 {
        self.current.year()
    }

    fn is_leap(&self) -> bool {
        NaiveDate::from_ymd_opt(self.current.year(), 2, 29).is_some()
    }
}

fn seconds_since_new_year(dt: NaiveDateTime) -> i64 {
    let new_year = NaiveDate::from_ymd_opt(dt.year(), 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(dt);
    (dt - new_year).num_seconds()
}
