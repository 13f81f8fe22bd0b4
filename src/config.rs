//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::prices::PriceInputs;
use crate::reference::ReferenceSource;
use crate::timer::Timer;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the quarter-hour day scenario. Load
/// from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Resolution, horizons and start of the simulation.
    #[serde(default)]
    pub timer: TimerConfig,
    /// Feed-in factor and explicit price series.
    #[serde(default)]
    pub prices: PricesConfig,
    /// Location of the reference tables.
    #[serde(default)]
    pub data: DataConfig,
}

/// Resolution, horizons and start of the simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerConfig {
    /// Seconds per timestep (must divide 3600).
    pub step_size: u32,
    /// Timesteps in one scheduling optimization (must be > 0).
    pub op_horizon: usize,
    /// Timesteps in the whole simulation; defaults to `op_horizon`.
    pub mpc_horizon: Option<usize>,
    /// Timesteps between two MPC runs; defaults to `op_horizon`.
    pub mpc_step_width: Option<usize>,
    /// Start of the simulation, e.g. `2015-01-01T00:00:00`, quoted or as a
    /// TOML local datetime.
    #[serde(deserialize_with = "deserialize_start")]
    pub start: NaiveDateTime,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            step_size: 900,
            op_horizon: 96,
            mpc_horizon: None,
            mpc_step_width: None,
            start: start_of(2015, 1, 1),
        }
    }
}

/// Feed-in factor and explicit price series.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricesConfig {
    /// Factor applied to prices for feed-in revenue.
    pub feed_in_factor: f64,
    /// Day-ahead prices per timestep (ct/kWh); replaces the reference data.
    pub day_ahead: Option<Vec<f64>>,
    /// Time-of-use prices per timestep (ct/kWh); replaces the synthesized tariff.
    pub time_of_use: Option<Vec<f64>>,
    /// CO2 emissions per timestep (g/kWh); replaces the reference data.
    pub co2: Option<Vec<f64>>,
}

/// Location of the reference tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Directory containing the reference tables.
    pub dir: PathBuf,
    /// Quarter-hour day-ahead prices (EUR/MWh).
    pub day_ahead_file: String,
    /// Quarter-hour CO2 emissions (g/kWh).
    pub co2_file: String,
    /// Yearly average consumer prices (ct/kWh) starting with 2000.
    pub consumer_price_file: String,
    /// Year described by the quarter-hour tables.
    pub dataset_year: i32,
}

impl Default for DataConfig {
    fn default() -> Self {
        let source = ReferenceSource::default();
        Self {
            dir: source.data_dir,
            day_ahead_file: source.day_ahead_file,
            co2_file: source.co2_file,
            consumer_price_file: source.consumer_price_file,
            dataset_year: source.dataset_year,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"timer.step_size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

/// Accepts a TOML local datetime or date, or the same text as a string.
fn deserialize_start<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match toml::Value::deserialize(deserializer)? {
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::String(s) => s,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a datetime, found {}",
                other.type_str()
            )));
        }
    };
    parse_start(&text).map_err(serde::de::Error::custom)
}

fn parse_start(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    if let Ok(dt) = text.parse::<NaiveDateTime>() {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    text.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid start \"{text}\" (expected a local datetime without offset)"))
}

fn start_of(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl ScenarioConfig {
    /// Returns the baseline scenario: one day at quarter-hour resolution from Jan 1, 2015.
    pub fn baseline() -> Self {
        Self {
            timer: TimerConfig::default(),
            prices: PricesConfig::default(),
            data: DataConfig::default(),
        }
    }

    /// Returns the hourly-week preset: one summer week at hourly resolution.
    pub fn hourly_week() -> Self {
        Self {
            timer: TimerConfig {
                step_size: 3600,
                op_horizon: 24,
                mpc_horizon: Some(168),
                mpc_step_width: Some(24),
                start: start_of(2015, 6, 1),
            },
            ..Self::baseline()
        }
    }

    /// Returns the five-minute preset: one spring weekday at 300 s resolution.
    pub fn five_minute_day() -> Self {
        Self {
            timer: TimerConfig {
                step_size: 300,
                op_horizon: 288,
                start: start_of(2015, 3, 2),
                ..TimerConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["quarter_hour_day", "hourly_week", "five_minute_day"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "quarter_hour_day" => Ok(Self::baseline()),
            "hourly_week" => Ok(Self::hourly_week()),
            "five_minute_day" => Ok(Self::five_minute_day()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let t = &self.timer;

        if t.step_size == 0 || 3600 % t.step_size != 0 {
            errors.push(ConfigError {
                field: "timer.step_size".into(),
                message: format!("must be a factor of 3600, got {}", t.step_size),
            });
        }
        if t.op_horizon == 0 {
            errors.push(ConfigError {
                field: "timer.op_horizon".into(),
                message: "must be > 0".into(),
            });
        }
        if t.mpc_horizon == Some(0) {
            errors.push(ConfigError {
                field: "timer.mpc_horizon".into(),
                message: "must be > 0".into(),
            });
        }
        if t.mpc_step_width == Some(0) {
            errors.push(ConfigError {
                field: "timer.mpc_step_width".into(),
                message: "must be > 0".into(),
            });
        }
        if errors.is_empty() {
            if let Err(e) = self.build_timer() {
                errors.push(e);
            }
        }

        let d = &self.data;
        for (field, name) in [
            ("data.day_ahead_file", &d.day_ahead_file),
            ("data.co2_file", &d.co2_file),
            ("data.consumer_price_file", &d.consumer_price_file),
        ] {
            if name.trim().is_empty() {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }

        errors
    }

    /// Builds the simulation timer.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for the `timer` section if the timer rejects
    /// its parameters.
    pub fn build_timer(&self) -> Result<Timer, ConfigError> {
        let t = &self.timer;
        Timer::new(
            t.step_size,
            t.op_horizon,
            t.mpc_horizon,
            t.mpc_step_width,
            t.start,
        )
        .map_err(|e| ConfigError {
            field: "timer".into(),
            message: e.to_string(),
        })
    }

    /// Location of the reference tables.
    pub fn reference_source(&self) -> ReferenceSource {
        let d = &self.data;
        ReferenceSource {
            data_dir: d.dir.clone(),
            day_ahead_file: d.day_ahead_file.clone(),
            co2_file: d.co2_file.clone(),
            consumer_price_file: d.consumer_price_file.clone(),
            dataset_year: d.dataset_year,
        }
    }

    /// Overrides and feed-in factor for price assembly.
    pub fn price_inputs(&self) -> PriceInputs {
        let p = &self.prices;
        PriceInputs {
            day_ahead: p.day_ahead.clone(),
            time_of_use: p.time_of_use.clone(),
            co2: p.co2.clone(),
            feed_in_factor: p.feed_in_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerContext;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[timer]
step_size = 3600
op_horizon = 4
mpc_horizon = 8
start = "2015-01-01T01:00:00"

[prices]
feed_in_factor = 0.4
co2 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]

[data]
dir = "reference"
dataset_year = 2015
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.timer.step_size), Some(3600));
        assert_eq!(cfg.as_ref().map(|c| c.prices.feed_in_factor), Some(0.4));
        assert_eq!(
            cfg.as_ref().map(|c| c.reference_source().data_dir),
            Some(PathBuf::from("reference"))
        );

        let timer = cfg.as_ref().map(ScenarioConfig::build_timer);
        let timer = timer.and_then(Result::ok);
        assert_eq!(timer.as_ref().map(TimerContext::offset), Some(1));
        assert_eq!(timer.as_ref().map(TimerContext::horizon), Some(8));
    }

    #[test]
    fn valid_toml_parses_native_datetime() {
        let toml = r#"
[timer]
step_size = 900
start = 2015-03-01T00:00:00
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "native datetime should parse: {:?}", cfg.err());
        assert_eq!(cfg.ok().map(|c| c.timer.start), Some(start_of(2015, 3, 1)));
    }

    #[test]
    fn native_date_starts_at_midnight() {
        let cfg = ScenarioConfig::from_toml_str("[timer]\nstart = 2016-02-29\n");
        assert_eq!(cfg.ok().map(|c| c.timer.start), Some(start_of(2016, 2, 29)));
    }

    #[test]
    fn offset_datetime_is_rejected() {
        let cfg = ScenarioConfig::from_toml_str("[timer]\nstart = 2015-03-01T00:00:00Z\n");
        assert!(cfg.is_err());
        let cfg = ScenarioConfig::from_toml_str("[timer]\nstart = 2015\n");
        assert!(cfg.is_err());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[timer]
step_size = 900
bogus_field = true
"#;
        let result = ScenarioConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[prices]
feed_in_factor = 0.1
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.timer.step_size), Some(900));
        assert_eq!(cfg.as_ref().map(|c| c.data.dataset_year), Some(2015));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.price_inputs().day_ahead),
            None
        );
    }

    #[test]
    fn validation_catches_bad_step_size() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.timer.step_size = 700;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "timer.step_size"));
    }

    #[test]
    fn validation_catches_misaligned_start() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.timer.step_size = 3600;
        cfg.timer.start = NaiveDate::from_ymd_opt(2015, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 30, 0))
            .unwrap_or_default();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "timer"));
    }

    #[test]
    fn validation_catches_zero_horizon() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.timer.op_horizon = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "timer.op_horizon"));
    }

    #[test]
    fn validation_catches_empty_file_name() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.data.co2_file = " ".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "data.co2_file"));
    }

    #[test]
    fn hourly_week_covers_a_week() {
        let cfg = ScenarioConfig::hourly_week();
        let timer = cfg.build_timer().ok();
        assert_eq!(timer.as_ref().map(TimerContext::horizon), Some(168));
    }
}
