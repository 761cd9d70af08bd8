use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

use proxy_scan_rs::config::{self, FileConfig, Settings};
use proxy_scan_rs::{engine, ports, targets};

/// proxy-scan-rs — probes CIDR ranges for open HTTP, SOCKS4 and SOCKS5 proxies.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "proxy-scan-rs",
    version,
    about = "Probes CIDR ranges for open HTTP, SOCKS4 and SOCKS5 proxies.",
    long_about = None
)]
struct Cli {
    /// Path to the CIDR list file (one CIDR per line).
    #[arg(long, default_value = "Cidr.txt")]
    cidrs: PathBuf,

    /// Path to the port list file (one port or range per line).
    #[arg(long, default_value = "Ports.txt")]
    ports: PathBuf,

    /// Connection/read timeout in seconds [default: 3].
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of concurrent workers [default: 2x CPU count].
    #[arg(long)]
    workers: Option<usize>,

    /// Interval to re-test proxies, in minutes [default: 60]. Accepted for
    /// config compatibility; periodic re-scanning is not implemented yet.
    #[arg(long = "refresh-interval")]
    refresh_interval: Option<u64>,

    /// Directory for the output file [default: .].
    #[arg(long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Log level (quiet|info|debug) [default: info].
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// JSON config file (optional). CLI flags take precedence over it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_cfg = match &cli.config {
        Some(path) => config::load_file_config(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::merge(
        file_cfg,
        cli.timeout,
        cli.workers,
        cli.refresh_interval,
        cli.output_dir.clone(),
        cli.log_level.clone(),
    );

    tracing_subscriber::fmt()
        .with_max_level(level_filter(&settings.log_level))
        .with_target(false)
        .init();
    debug!(
        "refresh interval set to {} min (re-scanning not implemented)",
        settings.refresh_interval_mins
    );

    let cidr_lines = read_lines(&cli.cidrs)
        .with_context(|| format!("failed to read CIDR file: {}", cli.cidrs.display()))?;
    let addrs = targets::parse_cidrs(&cidr_lines);
    if addrs.is_empty() {
        bail!("no valid addresses found in {}", cli.cidrs.display());
    }

    let port_text = fs::read_to_string(&cli.ports)
        .with_context(|| format!("failed to read ports file: {}", cli.ports.display()))?;
    let port_list = ports::parse_port_specs(&port_text);
    if port_list.is_empty() {
        bail!("no valid ports found in {}", cli.ports.display());
    }

    fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            settings.output_dir.display()
        )
    })?;
    let out_path = settings.output_dir.join("proxies.txt");
    let out_file = tokio::fs::File::create(&out_path)
        .await
        .with_context(|| format!("cannot create output file: {}", out_path.display()))?;

    info!(
        "scanning {} addresses x {} ports with {} workers (timeout {:?})",
        addrs.len(),
        port_list.len(),
        settings.scan.workers,
        settings.scan.connect_timeout
    );

    let summary = engine::run_scan(&addrs, &port_list, &settings.scan, out_file).await?;

    info!(
        "done: {} sockets scanned, {} proxies found, results in {}",
        summary.scanned,
        summary.hits,
        out_path.display()
    );
    Ok(())
}

/// Map the `quiet|info|debug` levels onto tracing filters. Unknown values
/// fall back to `info`; this runs before the subscriber is installed, so the
/// complaint goes to stderr directly.
fn level_filter(level: &str) -> LevelFilter {
    match level {
        "quiet" => LevelFilter::ERROR,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        other => {
            eprintln!("unknown log level {other:?}, using info");
            LevelFilter::INFO
        }
    }
}

/// Read all non-empty trimmed lines from a text file.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let lines = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    Ok(lines)
}
