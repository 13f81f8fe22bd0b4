//! CSV export for assembled price series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::prices::PriceSeries;

/// Column header for CSV price export. Prices are in ct/kWh, CO2 in g/kWh.
const HEADER: &str = "timestep,day_ahead,time_of_use,co2";

/// Exports price series to a CSV file at the given path.
///
/// Writes a header row followed by one data row per horizon timestep.
/// `first_timestep` numbers the rows, usually the timer's offset in the year.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(prices: &PriceSeries, first_timestep: usize, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(prices, first_timestep, buf)
}

/// Writes price series as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(prices: &PriceSeries, first_timestep: usize, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    let rows = prices
        .day_ahead()
        .iter()
        .zip(prices.time_of_use())
        .zip(prices.co2());
    for (t, ((da, tou), co2)) in rows.enumerate() {
        wtr.write_record(&[
            (first_timestep + t).to_string(),
            format!("{da:.4}"),
            format!("{tou:.4}"),
            format!("{co2:.4}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
