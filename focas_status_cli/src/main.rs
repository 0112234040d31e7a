use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use focas_status::codes::StatusDisplay;
use focas_status::config::Config;
use focas_status::driver::sim::SimulatedDriver;
use focas_status::driver::FocasDriver;
use focas_status::error_codes::ErrorRegistry;
use focas_status::report::{self, ReportFormat};
use focas_status::FocasError;

#[derive(Parser, Debug)]
#[command(name = "focas-status")]
#[command(version)]
#[command(about = "Print a FANUC CNC's operating mode and run status")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller address
    #[arg(short, long)]
    address: Option<String>,

    /// Controller port
    #[arg(short, long)]
    port: Option<u16>,

    /// Driver connect timeout in seconds
    #[arg(short, long)]
    timeout: Option<i32>,

    /// Print the run state as the raw code or as its label (raw|decoded)
    #[arg(long)]
    status_display: Option<StatusDisplay>,

    /// Output format (text|json)
    #[arg(long)]
    format: Option<ReportFormat>,

    /// Exit without waiting for Enter
    #[arg(long)]
    no_pause: bool,

    /// Use the simulated driver even when the vendor library is linked
    #[arg(long)]
    simulate: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    focas_status::init_defaults().context("load return-code table")?;
    let cfg = load_config(args)?;

    if let Some(path) = &cfg.error_codes {
        ErrorRegistry::merge_from_path(path)
            .with_context(|| format!("load return codes from {}", path.display()))?;
    }

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(ExitCode::SUCCESS);
    }

    let driver = select_driver(&cfg, args.simulate)?;
    let status = report_and_pause(driver, &cfg, io::stdin().lock(), io::stdout().lock())?;
    Ok(ExitCode::from(status))
}

/// Print the report, wait for Enter when configured, and return the process
/// status: 0 after a report, 1 after a connect failure.
fn report_and_pause<D, R, W>(driver: D, cfg: &Config, input: R, out: W) -> anyhow::Result<u8>
where
    D: FocasDriver,
    R: BufRead,
    W: Write,
{
    let status = match report::run(driver, &cfg.target, &cfg.report, out) {
        Ok(report) => {
            debug!(?report, "report complete");
            0
        }
        Err(FocasError::ConnectFailed(_)) => 1,
        Err(e) => return Err(e).context("report failed"),
    };

    if cfg.report.pause_on_exit {
        report::wait_for_ack(input)?;
    }
    Ok(status)
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    Config::load(args.config.as_deref(), |cfg| apply_overrides(cfg, args))
        .context("load configuration")
}

fn apply_overrides(cfg: &mut Config, args: &Args) {
    if let Some(address) = &args.address {
        cfg.target.address.clone_from(address);
    }
    if let Some(port) = args.port {
        cfg.target.port = port;
    }
    if let Some(timeout) = args.timeout {
        cfg.target.timeout = timeout;
    }
    if let Some(display) = args.status_display {
        cfg.report.status_display = display;
    }
    if let Some(format) = args.format {
        cfg.report.format = format;
    }
    if args.no_pause {
        cfg.report.pause_on_exit = false;
    }
}

fn select_driver(cfg: &Config, simulate: bool) -> anyhow::Result<Box<dyn FocasDriver>> {
    #[cfg(feature = "fwlib")]
    {
        if !simulate {
            let driver = focas_status::driver::fwlib::FwlibDriver::new().map_err(|code| {
                anyhow::anyhow!(
                    "fwlib startup failed: return code {}",
                    focas_status::error_codes::describe_code(code)
                )
            })?;
            return Ok(Box::new(driver));
        }
    }
    #[cfg(not(feature = "fwlib"))]
    {
        if !simulate {
            tracing::info!("built without the fwlib feature; using the simulated driver");
        }
    }
    let sim = cfg.simulator.clone().unwrap_or_default();
    Ok(Box::new(SimulatedDriver::from_config(sim)))
}
