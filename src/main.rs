//! Price series entry point: CLI wiring and config-driven price assembly.

use std::process;

use tracing::{error, info};

use price_series::cache::ReferenceCache;
use price_series::cli::parse_args;
use price_series::config::ScenarioConfig;
use price_series::io::export::export_csv;
use price_series::logging;
use price_series::prices::PriceSeries;
use price_series::reporting::print_price_report;
use price_series::timer::TimerContext;

fn main() {
    logging::init();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            price_series::cli::print_usage();
            process::exit(1);
        }
    };

    // --scenario, then --preset, else the quarter-hour baseline
    let loaded = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::baseline()),
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(dir) = cli.data_dir {
        scenario.data.dir = dir;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let timer = scenario.build_timer().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    info!(
        start = %timer.datetime(),
        step_size = timer.step_size(),
        horizon = timer.horizon(),
        "assembling price series"
    );

    let mut cache = ReferenceCache::new(scenario.reference_source());
    let prices = match PriceSeries::build(&timer, &mut cache, scenario.price_inputs()) {
        Ok(prices) => prices,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    print_price_report(&prices);

    if let Some(ref path) = cli.out {
        if let Err(e) = export_csv(&prices, timer.offset(), path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "price series written");
    }
}
