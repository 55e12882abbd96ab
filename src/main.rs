//! windglow entry point: CLI wiring and config-driven service construction.

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use windglow::config::ServiceConfig;
use windglow::forecast::{DataPointProvider, FileForecastProvider, ForecastProvider};
use windglow::io::export::export_curve_csv;
use windglow::service::{DirectiveService, HourSource, Operation};
use windglow::telemetry::TelemetryNotifier;
use windglow::wire::DirectivePayload;

/// Environment variable overriding `provider.api_key`.
const API_KEY_ENV: &str = "DATAPOINT_API_KEY";

/// How long `--once` waits for a queued telemetry event to go out.
const TELEMETRY_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Parsed CLI arguments.
#[derive(Default)]
struct CliArgs {
    config_path: Option<String>,
    location: Option<String>,
    api_key: Option<String>,
    forecast_file: Option<String>,
    once: Option<String>,
    hour: Option<u32>,
    curve_table: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: Option<u16>,
}

impl CliArgs {
    /// Whether the run fetches forecasts (one-shot or server) rather than only exporting.
    fn needs_forecast(&self) -> bool {
        #[cfg(feature = "api")]
        if self.serve || self.curve_table.is_none() {
            return true;
        }
        self.once.is_some()
    }

    /// Whether the run calls DataPoint and so needs a location and API key.
    fn needs_datapoint(&self) -> bool {
        if self.forecast_file.is_some() {
            return false;
        }
        match self.once.as_deref() {
            Some(name) => name
                .parse::<Operation>()
                .is_ok_and(|op| op != Operation::TestData),
            None => self.needs_forecast(),
        }
    }
}

fn print_help() {
    eprintln!("windglow: wind forecast to actuator color/movement directives");
    eprintln!();
    eprintln!("Usage: windglow [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from TOML file");
    eprintln!("  --location <id>          Override DataPoint location id");
    eprintln!("  --api-key <key>          Override DataPoint API key (also ${API_KEY_ENV})");
    eprintln!("  --forecast-file <path>   Read DataPoint JSON from a file instead of HTTP");
    eprintln!("  --once <func>            Compute one directive and print it as JSON");
    eprintln!("                           (current_hour, 24hour_prediction, test_data)");
    eprintln!("  --hour <0-23>            Use a fixed hour instead of the local clock");
    eprintln!("  --curve-table <path>     Write the curve response table as CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start the HTTP API (default with no other action)");
        eprintln!("  --port <u16>             API server port (overrides server.port)");
    }
    eprintln!("  --help                   Show this help message");
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                cli.config_path = Some(next_value(&args, i, "--config", "a path").to_string());
            }
            "--location" => {
                i += 1;
                cli.location = Some(next_value(&args, i, "--location", "an id").to_string());
            }
            "--api-key" => {
                i += 1;
                cli.api_key = Some(next_value(&args, i, "--api-key", "a key").to_string());
            }
            "--forecast-file" => {
                i += 1;
                cli.forecast_file =
                    Some(next_value(&args, i, "--forecast-file", "a path").to_string());
            }
            "--once" => {
                i += 1;
                cli.once = Some(next_value(&args, i, "--once", "an operation name").to_string());
            }
            "--hour" => {
                i += 1;
                let raw = next_value(&args, i, "--hour", "an hour (0-23)");
                match raw.parse::<u32>() {
                    Ok(h) if h < 24 => cli.hour = Some(h),
                    _ => {
                        eprintln!("error: --hour value \"{raw}\" is not an hour in 0-23");
                        process::exit(1);
                    }
                }
            }
            "--curve-table" => {
                i += 1;
                cli.curve_table = Some(next_value(&args, i, "--curve-table", "a path").to_string());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = next_value(&args, i, "--port", "a u16 argument");
                if let Ok(p) = raw.parse::<u16>() {
                    cli.port = Some(p);
                } else {
                    eprintln!("error: --port value \"{raw}\" is not a valid u16");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn load_config(cli: &CliArgs) -> ServiceConfig {
    let mut config = match cli.config_path {
        Some(ref path) => match ServiceConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => ServiceConfig::default(),
    };

    // Precedence: CLI flag, then environment, then file
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.provider.api_key = key;
    }
    if let Some(ref key) = cli.api_key {
        config.provider.api_key = key.clone();
    }
    if let Some(ref location) = cli.location {
        config.provider.location_id = location.clone();
    }
    #[cfg(feature = "api")]
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let mut errors = config.validate();
    if cli.needs_datapoint() {
        errors.extend(config.validate_datapoint());
    }
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    config
}

fn build_provider(cli: &CliArgs, config: &ServiceConfig) -> Arc<dyn ForecastProvider> {
    if let Some(ref path) = cli.forecast_file {
        return Arc::new(FileForecastProvider::new(path));
    }
    match DataPointProvider::new(&config.provider) {
        Ok(p) => {
            info!(url = p.url(), "using DataPoint forecast provider");
            Arc::new(p)
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

async fn run(cli: CliArgs, config: ServiceConfig) {
    let mapper = match config.output_mapper() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    if !mapper.curve().is_non_decreasing() {
        tracing::warn!("turbine.curve is not non-decreasing; green will not track wind speed");
    }

    if let Some(ref path) = cli.curve_table {
        if let Err(e) = export_curve_csv(&mapper.response_table(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Curve table written to {path}");
    }
    if !cli.needs_forecast() {
        return;
    }

    let (notifier, telemetry_task) = match config.telemetry.endpoint.clone() {
        Some(endpoint) => {
            let timeout = Duration::from_secs(config.provider.timeout_secs);
            match TelemetryNotifier::spawn(endpoint, timeout) {
                Ok((n, task)) => (n, Some(task)),
                Err(e) => {
                    eprintln!("error: failed to start telemetry: {e}");
                    process::exit(1);
                }
            }
        }
        None => (TelemetryNotifier::disabled(), None),
    };

    let clock = cli.hour.map_or(HourSource::System, HourSource::Fixed);
    let service = DirectiveService::new(build_provider(&cli, &config), mapper)
        .with_notifier(notifier)
        .with_clock(clock);

    if let Some(ref name) = cli.once {
        let result = match name.parse::<Operation>() {
            Ok(operation) => service.handle(operation).await,
            Err(e) => Err(e),
        };
        let payload = DirectivePayload::from_result(name, result);
        match serde_json::to_string(&payload) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize payload: {e}");
                process::exit(1);
            }
        }

        // Dropping the service closes the channel so the worker can drain and exit.
        drop(service);
        if let Some(task) = telemetry_task {
            if tokio::time::timeout(TELEMETRY_FLUSH_TIMEOUT, task).await.is_err() {
                tracing::warn!("telemetry not flushed before exit");
            }
        }
        return;
    }

    #[cfg(feature = "api")]
    {
        use std::net::{IpAddr, SocketAddr};

        let ip: IpAddr = match config.server.host.parse() {
            Ok(ip) => ip,
            Err(e) => {
                eprintln!(
                    "error: server.host \"{}\" is not an IP address: {e}",
                    config.server.host
                );
                process::exit(1);
            }
        };
        let addr = SocketAddr::new(ip, config.server.port);
        let state = Arc::new(windglow::api::AppState { service });
        if let Err(e) = windglow::api::serve(state, addr).await {
            tracing::error!(error = %e, "server stopped");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = parse_args();
    init_tracing();

    let config = load_config(&cli);

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    rt.block_on(run(cli, config));
}
