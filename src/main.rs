//! Microgrid simulator entry point: CLI wiring, batch runs, and the API server.

use std::path::Path;
use std::process;

use microgrid_sim::cli::{self, CliOptions};
use microgrid_sim::config::AppConfig;
use microgrid_sim::io::export_csv;
use microgrid_sim::scenario;
use microgrid_sim::sim::simulate;
use microgrid_sim::sim::types::SimulationRequest;
use microgrid_sim::telemetry::init_tracing;

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Loads the application config: TOML file (if given), then `.env` and
/// process environment overrides.
fn load_config(cli: &CliOptions) -> AppConfig {
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::from_toml_file(path).unwrap_or_else(|e| fail(e)),
        None => AppConfig::default(),
    };
    if let Err(e) = config.apply_env() {
        fail(e);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        process::exit(1);
    }
    config
}

fn load_request(cli: &CliOptions) -> SimulationRequest {
    let loaded = match (&cli.request, &cli.preset) {
        (Some(path), _) => scenario::load_request(path),
        (None, Some(name)) => scenario::from_preset(name),
        (None, None) => scenario::from_preset("demo"),
    };
    loaded.unwrap_or_else(|e| fail(e))
}

fn run_batch(cli: &CliOptions) {
    let request = load_request(cli);
    let outcome = simulate(&request).unwrap_or_else(|e| fail(e));

    for r in &outcome.intervals {
        println!("{r}");
    }
    println!("\n{}", outcome.summary);

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&outcome, Path::new(path)) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Telemetry written to {}", path.display());
    }
}

#[cfg(feature = "api")]
fn run_server(config: &AppConfig) {
    use std::net::{IpAddr, SocketAddr};
    use std::sync::Arc;

    use microgrid_sim::api::{AppState, serve};

    let ip: IpAddr = config
        .server
        .bind
        .parse()
        .unwrap_or_else(|_| fail(format!("invalid bind address \"{}\"", config.server.bind)));
    let addr = SocketAddr::new(ip, config.server.port);
    let state = Arc::new(AppState::new(&config.server));

    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
    if let Err(e) = rt.block_on(serve(state, addr)) {
        fail(format!("server error on {addr}: {e}"));
    }
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });
    if cli.help {
        cli::print_usage();
        return;
    }

    // .env is optional; a missing file is not an error.
    let _ = dotenvy::dotenv();
    let config = load_config(&cli);
    init_tracing(&config.logging.filter);

    #[cfg(feature = "api")]
    if cli.serve {
        run_server(&config);
        return;
    }

    run_batch(&cli);
}
