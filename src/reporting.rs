use std::fmt;

use crate::prices::PriceSeries;

/// Mean, minimum and maximum of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    /// Returns `None` for an empty series.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean: sum / values.len() as f64,
            min,
            max,
        })
    }
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean={:.3}  min={:.3}  max={:.3}",
            self.mean, self.min, self.max
        )
    }
}

pub fn print_price_report(prices: &PriceSeries) {
    println!("\n--- Price Report ({} timesteps) ---", prices.horizon());
    let rows = [
        ("Day-ahead [ct/kWh]", prices.day_ahead()),
        ("Time-of-use [ct/kWh]", prices.time_of_use()),
        ("CO2 [g/kWh]", prices.co2()),
    ];
    for (label, values) in rows {
        match SeriesStats::of(values) {
            Some(stats) => println!("{label}: {stats}"),
            None => println!("{label}: no data"),
        }
    }
    println!("Feed-in factor: {:.3}", prices.feed_in_factor());
}

#[cfg(test)]
mod tests {
    use super::SeriesStats;

    #[test]
    fn stats_of_empty_series_is_none() {
        assert_eq!(SeriesStats::of(&[]), None);
    }

    #[test]
    fn stats_cover_mean_min_max() {
        let stats = SeriesStats::of(&[1.0, 3.0, 2.0]);
        assert_eq!(
            stats,
            Some(SeriesStats {
                mean: 2.0,
                min: 1.0,
                max: 3.0
            })
        );
    }
}
