//! Memoized reference series.
//!
//! The cache is an explicit object owned by the caller. Entries are only ever
//! replaced by key: day-ahead and CO2 data by kind, the time-of-use tariff by
//! year. Hosts that construct scenarios from several threads share one
//! [`SharedReferenceCache`] instead.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::PriceError;
use crate::prices::{PriceInputs, PriceSeries};
use crate::reference::{ConsumerPriceTable, DatasetKind, ReferenceSeries, ReferenceSource};
use crate::tariff;
use crate::timer::TimerContext;

#[derive(Debug, Clone)]
struct TariffEntry {
    year: i32,
    is_leap: bool,
    series: ReferenceSeries,
}

/// Reference series loaded or synthesized so far.
#[derive(Debug)]
pub struct ReferenceCache {
    source: ReferenceSource,
    day_ahead: Option<ReferenceSeries>,
    co2: Option<ReferenceSeries>,
    consumer_prices: Option<ConsumerPriceTable>,
    tariff: Option<TariffEntry>,
}

impl ReferenceCache {
    pub fn new(source: ReferenceSource) -> Self {
        Self {
            source,
            day_ahead: None,
            co2: None,
            consumer_prices: None,
            tariff: None,
        }
    }

    pub fn source(&self) -> &ReferenceSource {
        &self.source
    }

    /// Returns the series for `kind`, loading it on first use.
    ///
    /// The packaged data describes a single year and is served for every
    /// requested year.
    ///
    /// # Errors
    ///
    /// Propagates loader errors; a failed load leaves the cache untouched.
    pub fn get_or_load(&mut self, kind: DatasetKind) -> Result<&ReferenceSeries, PriceError> {
        let slot = match kind {
            DatasetKind::DayAhead => &mut self.day_ahead,
            DatasetKind::Co2 => &mut self.co2,
        };
        let series = match slot.take() {
            Some(series) => series,
            None => {
                debug!(%kind, "reference cache miss");
                self.source.load(kind)?
            }
        };
        let series: &ReferenceSeries = slot.insert(series);
        Ok(series)
    }

    /// Same as [`ReferenceCache::get_or_load`], warning when `year` is not
    /// the year the dataset describes.
    pub fn get_or_load_for_year(
        &mut self,
        kind: DatasetKind,
        year: i32,
    ) -> Result<&ReferenceSeries, PriceError> {
        let dataset_year = self.source.dataset_year;
        if year != dataset_year {
            warn!(
                %kind,
                requested = year,
                dataset_year, "reference data is only available for {dataset_year}, reusing it for {year}"
            );
        }
        self.get_or_load(kind)
    }

    /// Returns the time-of-use tariff for `year`, synthesizing it if the
    /// cached tariff belongs to another year.
    ///
    /// # Errors
    ///
    /// Propagates consumer price table and synthesizer errors.
    pub fn get_or_build(&mut self, year: i32, is_leap: bool) -> Result<&ReferenceSeries, PriceError> {
        let cached = self
            .tariff
            .take()
            .filter(|entry| entry.year == year && entry.is_leap == is_leap);
        let entry = match cached {
            Some(entry) => entry,
            None => {
                debug!(year, "building time-of-use tariff");
                let table = match self.consumer_prices.take() {
                    Some(table) => table,
                    None => self.source.load_consumer_prices()?,
                };
                let table = self.consumer_prices.insert(table);
                TariffEntry {
                    year,
                    is_leap,
                    series: tariff::synthesize(year, is_leap, table)?,
                }
            }
        };
        let entry: &TariffEntry = self.tariff.insert(entry);
        Ok(&entry.series)
    }

    pub fn is_cached(&self, kind: DatasetKind) -> bool {
        match kind {
            DatasetKind::DayAhead => self.day_ahead.is_some(),
            DatasetKind::Co2 => self.co2.is_some(),
        }
    }

    /// Year of the cached time-of-use tariff, if any.
    pub fn cached_tariff_year(&self) -> Option<i32> {
        self.tariff.as_ref().map(|entry| entry.year)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.day_ahead = None;
        self.co2 = None;
        self.consumer_prices = None;
        self.tariff = None;
    }
}

/// A [`ReferenceCache`] behind a mutex, for concurrent scenario construction.
#[derive(Debug)]
pub struct SharedReferenceCache {
    inner: Mutex<ReferenceCache>,
}

impl SharedReferenceCache {
    pub fn new(source: ReferenceSource) -> Self {
        Self {
            inner: Mutex::new(ReferenceCache::new(source)),
        }
    }

    /// Builds price series while holding the cache lock.
    ///
    /// # Errors
    ///
    /// Same as [`PriceSeries::build`].
    pub fn build_prices(
        &self,
        timer: &impl TimerContext,
        inputs: PriceInputs,
    ) -> Result<PriceSeries, PriceError> {
        self.with(|cache| PriceSeries::build(timer, cache, inputs))
    }

    /// Runs `f` with exclusive access to the cache.
    ///
    /// A panic in an earlier holder does not leave partial entries behind, so a
    /// poisoned lock is recovered.
    pub fn with<T>(&self, f: impl FnOnce(&mut ReferenceCache) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn source_with(dir: &Path) -> ReferenceSource {
        let source = ReferenceSource::in_dir(dir);
        fs::write(dir.join(&source.co2_file), "co2\n1\n2\n3\n").expect("write co2");
        fs::write(
            dir.join(&source.consumer_price_file),
            "price\n".to_string() + &"19.0\n".repeat(30),
        )
        .expect("write consumer prices");
        source
    }

    #[test]
    fn loads_once_and_reuses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = source_with(dir.path());
        let mut cache = ReferenceCache::new(source.clone());

        assert!(!cache.is_cached(DatasetKind::Co2));
        let first = cache.get_or_load(DatasetKind::Co2).expect("load").clone();
        assert!(cache.is_cached(DatasetKind::Co2));

        // Changes on disk are not picked up once cached
        fs::write(dir.path().join(&source.co2_file), "co2\n9\n").expect("rewrite co2");
        let second = cache.get_or_load(DatasetKind::Co2).expect("cached");
        assert_eq!(&first, second);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = ReferenceCache::new(source_with(dir.path()));
        assert!(cache.get_or_load(DatasetKind::DayAhead).is_err());
        assert!(!cache.is_cached(DatasetKind::DayAhead));
    }

    #[test]
    fn tariff_is_rebuilt_when_year_changes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = ReferenceCache::new(source_with(dir.path()));

        assert_eq!(cache.get_or_build(2015, false).expect("build").len(), 96 * 365);
        assert_eq!(cache.cached_tariff_year(), Some(2015));

        assert_eq!(cache.get_or_build(2016, true).expect("rebuild").len(), 96 * 366);
        assert_eq!(cache.cached_tariff_year(), Some(2016));
    }

    #[test]
    fn clear_drops_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = ReferenceCache::new(source_with(dir.path()));
        cache.get_or_load(DatasetKind::Co2).expect("load");
        cache.get_or_build(2015, false).expect("build");

        cache.clear();
        assert!(!cache.is_cached(DatasetKind::Co2));
        assert_eq!(cache.cached_tariff_year(), None);
    }
}
