use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut data_dir = None;
    let mut out = None;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--data-dir" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --data-dir (expected a directory)")?;
                if data_dir.replace(PathBuf::from(path)).is_some() {
                    return Err("--data-dir provided more than once".to_string());
                }
            }
            "--out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --out (expected a file path)")?;
                if out.replace(PathBuf::from(path)).is_some() {
                    return Err("--out provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(CliOptions {
        scenario,
        preset,
        data_dir,
        out,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("price-series: day-ahead, time-of-use and CO2 series for a scheduling horizon");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  price-series [--scenario <path> | --preset <name>] [--data-dir <path>] [--out <path>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset (quarter_hour_day, hourly_week, five_minute_day)");
    eprintln!("                      Without --scenario or --preset, quarter_hour_day is used");
    eprintln!("  --data-dir <path>   Directory holding the reference tables");
    eprintln!("  --out <path>        Export the price series to CSV");
    eprintln!("  --help              Show this help message");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(args(&["--scenario", "scenario.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn no_source_leaves_choice_to_caller() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert!(opts.scenario.is_none());
        assert!(opts.preset.is_none());
        assert!(opts.out.is_none());
    }

    #[test]
    fn supports_data_dir_and_out() {
        let opts = parse_args_from(args(&[
            "--preset",
            "hourly_week",
            "--data-dir",
            "ref",
            "--out",
            "prices.csv",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("hourly_week"));
        assert_eq!(opts.data_dir.as_deref().and_then(|p| p.to_str()), Some("ref"));
        assert_eq!(opts.out.as_deref().and_then(|p| p.to_str()), Some("prices.csv"));
    }

    #[test]
    fn rejects_scenario_with_preset() {
        let err = parse_args_from(args(&["--scenario", "a.toml", "--preset", "hourly_week"]));
        assert!(err.is_err_and(|e| e.contains("mutually exclusive")));
    }

    #[test]
    fn rejects_missing_value() {
        let err = parse_args_from(args(&["--out"]));
        assert!(err.is_err_and(|e| e.contains("--out")));
    }
}
