//! Reference dataset loading.
//!
//! Reference tables are flat files with one header line followed by one
//! numeric value per row. The quarter-hour tables span exactly one calendar
//! year; the consumer price table holds one yearly average per row, starting
//! with the year 2000.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PriceError;

/// Seconds per sample of every packaged quarter-hour dataset.
pub const NATIVE_RESOLUTION_SECS: u32 = 900;

/// Samples per day at native resolution.
pub const SAMPLES_PER_DAY: usize = 96;

/// Conversion from EUR/MWh to ct/kWh.
const DAY_AHEAD_UNIT_DIVISOR: f32 = 10.0;

/// A full-year numeric curve at native resolution.
///
/// Immutable once loaded or synthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSeries {
    samples: Vec<f64>,
}

impl ReferenceSeries {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Kinds of quarter-hour data loaded straight from packaged files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Day-ahead market prices in ct/kWh.
    DayAhead,
    /// CO2 emission factors in g/kWh.
    Co2,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayAhead => write!(f, "day-ahead"),
            Self::Co2 => write!(f, "CO2"),
        }
    }
}

/// Location of the packaged reference tables.
#[derive(Debug, Clone)]
pub struct ReferenceSource {
    /// Directory holding all reference tables.
    pub data_dir: PathBuf,
    /// Day-ahead prices per quarter hour in EUR/MWh.
    pub day_ahead_file: String,
    /// CO2 emissions per quarter hour in g/kWh.
    pub co2_file: String,
    /// Average consumer electricity price per year in ct/kWh.
    pub consumer_price_file: String,
    /// Calendar year the quarter-hour datasets describe.
    pub dataset_year: i32,
}

impl Default for ReferenceSource {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            day_ahead_file: "da_prices_quarter-hour_2015.txt".to_string(),
            co2_file: "co2_emissions_quarter-hour_2015.txt".to_string(),
            consumer_price_file: "consumer_prices_yearly.txt".to_string(),
            dataset_year: 2015,
        }
    }
}

impl ReferenceSource {
    /// Default table names inside `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn dataset_path(&self, kind: DatasetKind) -> PathBuf {
        match kind {
            DatasetKind::DayAhead => self.data_dir.join(&self.day_ahead_file),
            DatasetKind::Co2 => self.data_dir.join(&self.co2_file),
        }
    }

    pub fn consumer_price_path(&self) -> PathBuf {
        self.data_dir.join(&self.consumer_price_file)
    }

    /// Loads a quarter-hour dataset, converting day-ahead prices to ct/kWh.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::FileAccess` if the file is missing and
    /// `PriceError::MalformedData` if a row is not a number.
    pub fn load(&self, kind: DatasetKind) -> Result<ReferenceSeries, PriceError> {
        let path = self.dataset_path(kind);
        let mut values = read_table(&path)?;
        if kind == DatasetKind::DayAhead {
            for v in &mut values {
                *v /= DAY_AHEAD_UNIT_DIVISOR;
            }
        }
        debug!(%kind, path = %path.display(), samples = values.len(), "loaded reference dataset");
        Ok(ReferenceSeries::new(
            values.into_iter().map(f64::from).collect(),
        ))
    }

    /// Loads the yearly consumer price table.
    ///
    /// # Errors
    ///
    /// Same as [`ReferenceSource::load`].
    pub fn load_consumer_prices(&self) -> Result<ConsumerPriceTable, PriceError> {
        let path = self.consumer_price_path();
        let values = read_table(&path)?;
        if values.is_empty() {
            return Err(PriceError::MalformedData {
                path,
                line: 1,
                message: "table has no rows".to_string(),
            });
        }
        Ok(ConsumerPriceTable::new(values))
    }
}

/// Average consumer electricity prices per year, indexed by `year - 2000`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerPriceTable {
    prices: Vec<f32>,
}

/// Where a consumer price lookup landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceLookup {
    /// The requested year is in the table.
    Exact(f32),
    /// The requested year is out of range; the nearest listed year was used.
    Fallback { year: i32, price: f32 },
}

impl PriceLookup {
    pub fn price(self) -> f32 {
        match self {
            Self::Exact(price) | Self::Fallback { price, .. } => price,
        }
    }
}

impl ConsumerPriceTable {
    pub const FIRST_YEAR: i32 = 2000;

    /// # Panics
    ///
    /// Panics if `prices` is empty.
    pub fn new(prices: Vec<f32>) -> Self {
        assert!(!prices.is_empty(), "consumer price table must not be empty");
        Self { prices }
    }

    pub fn last_year(&self) -> i32 {
        Self::FIRST_YEAR + self.prices.len() as i32 - 1
    }

    pub fn lookup(&self, year: i32) -> PriceLookup {
        if year < Self::FIRST_YEAR {
            return PriceLookup::Fallback {
                year: Self::FIRST_YEAR,
                price: self.prices[0],
            };
        }
        match self.prices.get((year - Self::FIRST_YEAR) as usize) {
            Some(&price) => PriceLookup::Exact(price),
            None => PriceLookup::Fallback {
                year: self.last_year(),
                price: self.prices[self.prices.len() - 1],
            },
        }
    }
}

fn read_table(path: &Path) -> Result<Vec<f32>, PriceError> {
    let file = File::open(path).map_err(|source| PriceError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PriceError::MalformedData {
            path: path.to_path_buf(),
            line: e.position().map_or(0, csv::Position::line),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let field = record.get(0).unwrap_or("");
        let value = field.parse::<f32>().map_err(|e| PriceError::MalformedData {
            path: path.to_path_buf(),
            line,
            message: format!("\"{field}\": {e}"),
        })?;
        values.push(value);
    }
    Ok(values)
}
