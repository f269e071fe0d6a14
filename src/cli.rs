use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    /// Application config (TOML).
    pub config: Option<PathBuf>,
    /// Simulation request (JSON).
    pub request: Option<PathBuf>,
    pub preset: Option<String>,
    pub telemetry_out: Option<PathBuf>,
    /// Start the HTTP server instead of a batch run.
    pub serve: bool,
    /// Port override for `--serve`.
    pub port: Option<u16>,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut request = None;
    let mut preset = None;
    let mut telemetry_out = None;
    let mut serve = false;
    let mut port = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--request" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --request (expected a JSON file path)")?;
                if request.replace(PathBuf::from(path)).is_some() {
                    return Err("--request provided more than once".to_string());
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
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--serve" => serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let p = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                if port.replace(p).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                return Ok(CliOptions {
                    config: None,
                    request: None,
                    preset: None,
                    telemetry_out: None,
                    serve: false,
                    port: None,
                    help: true,
                });
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if request.is_some() && preset.is_some() {
        return Err(
            "arguments `--request` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if serve {
        if request.is_some() || preset.is_some() {
            return Err("`--serve` cannot be combined with `--request` or `--preset`".to_string());
        }
        if cfg!(not(feature = "api")) {
            return Err("`--serve` requires the `api` feature".to_string());
        }
    } else if port.is_some() {
        return Err("`--port` only applies with `--serve`".to_string());
    } else if request.is_none() && preset.is_none() {
        preset = Some("demo".to_string());
    }

    Ok(CliOptions {
        config,
        request,
        preset,
        telemetry_out,
        serve,
        port,
        help: false,
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
    eprintln!("microgrid-sim: timestep dispatch for a single microgrid bus");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  microgrid-sim [--config <toml>] [--request <json> | --preset <name>] [--telemetry-out <csv>]"
    );
    eprintln!("  microgrid-sim [--config <toml>] --serve [--port <u16>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Application config (TOML)");
    eprintln!("  --request <path>         Run a simulation request (JSON)");
    eprintln!("  --preset <name>          Run a built-in scenario (demo)");
    eprintln!("  --telemetry-out <path>   Export interval results to CSV");
    eprintln!("  --serve                  Start the HTTP API");
    eprintln!("  --port <u16>             Override the configured port");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("With no source and no --serve, the demo preset is run.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_demo_preset() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("demo"));
        assert!(!opts.serve);
    }

    #[test]
    fn supports_request_cli() {
        let opts = parse_args_from(args(&["--request", "request.json"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.request.as_deref().and_then(|p| p.to_str()),
            Some("request.json")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn supports_preset_and_telemetry_cli() {
        let opts = parse_args_from(args(&["--preset", "demo", "--telemetry-out", "out.csv"]))
            .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("demo"));
        assert_eq!(
            opts.telemetry_out.as_deref().and_then(|p| p.to_str()),
            Some("out.csv")
        );
    }

    #[test]
    fn request_and_preset_are_exclusive() {
        let err = parse_args_from(args(&["--request", "a.json", "--preset", "demo"]));
        assert!(err.is_err());
    }

    #[cfg(feature = "api")]
    #[test]
    fn serve_with_port() {
        let opts = parse_args_from(args(&["--config", "app.toml", "--serve", "--port", "9001"]))
            .expect("parse should succeed");
        assert!(opts.serve);
        assert_eq!(opts.port, Some(9001));
        assert!(opts.preset.is_none());
    }

    #[test]
    fn serve_rejects_batch_source() {
        assert!(parse_args_from(args(&["--serve", "--preset", "demo"])).is_err());
    }

    #[test]
    fn port_without_serve_rejected() {
        assert!(parse_args_from(args(&["--port", "9000"])).is_err());
    }

    #[test]
    fn bad_port_rejected() {
        let err = parse_args_from(args(&["--serve", "--port", "99999"])).unwrap_err();
        assert!(err.contains("99999"));
    }

    #[test]
    fn missing_value_and_unknown_flag() {
        assert!(parse_args_from(args(&["--request"])).is_err());
        assert!(parse_args_from(args(&["--seed", "1"])).is_err());
    }

    #[test]
    fn help_flag() {
        let opts = parse_args_from(args(&["-h"])).expect("parse should succeed");
        assert!(opts.help);
    }
}
