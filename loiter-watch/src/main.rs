//! loiter-watch: report aircraft that keep showing up over a bounding box.
//!
//! Polls the OpenSky states API every five minutes and prints the ICAO24 of
//! any aircraft seen in at least `--count` of the last twelve polls.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use loiter_core::config::{self, BoundingBox, Credentials};
use loiter_core::types::*;

mod fetch;
mod watch;

use fetch::{OpenSkyClient, DEFAULT_API_URL};
use watch::Watch;

#[derive(Parser)]
#[command(
    name = "loiter-watch",
    version,
    about = "Find aircraft loitering within a bounding box",
    after_help = "Alternatively, you may write username:password to ~/.opensky",
    allow_negative_numbers = true
)]
struct Cli {
    /// OpenSky Network username. Will prompt for password.
    #[arg(short, long)]
    username: Option<String>,

    /// Count of 5 min intervals per hour for an aircraft to be considered loitering
    #[arg(short, long, default_value_t = DEFAULT_LOITER_COUNT)]
    count: i32,

    /// Redirect output to this file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Seconds before an API request is abandoned
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// States endpoint
    #[arg(long, env = "OPENSKY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Min latitude for bounding box
    lamin: f64,
    /// Max latitude for bounding box
    lamax: f64,
    /// Min longitude for bounding box
    lomin: f64,
    /// Max longitude for bounding box
    lomax: f64,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let credentials = resolve_credentials(cli.username.as_deref()).unwrap_or_else(|e| {
        eprintln!("{e}");
        eprintln!("You must either provide a --username argument,");
        eprintln!("or write username:password to {}", config::dotfile_path().display());
        std::process::exit(1);
    });

    let bbox = BoundingBox::new(cli.lamin, cli.lamax, cli.lomin, cli.lomax);
    if !bbox.is_valid() {
        warn!(%bbox, "bounding box looks wrong; the API will likely return nothing");
    }
    if cli.count < 1 {
        warn!(count = cli.count, "count below 1 reports every tracked aircraft each cycle");
    }

    let out: Box<dyn Write + Send> = match &cli.out {
        Some(path) => Box::new(File::create(path).unwrap_or_else(|e| {
            eprintln!("Error opening {}: {e}", path.display());
            std::process::exit(1);
        })),
        None => Box::new(io::stdout()),
    };

    let client = OpenSkyClient::new(
        &cli.api_url,
        bbox,
        credentials,
        Duration::from_secs(cli.timeout),
    )
    .unwrap_or_else(|e| {
        eprintln!("Error building HTTP client: {e}");
        std::process::exit(1);
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        });

    let mut watcher = Watch::new(cli.count, out);
    info!(
        url = client.url(),
        %bbox,
        count = watcher.tracker().threshold(),
        interval_secs = POLL_INTERVAL_SECS,
        "watching"
    );

    runtime.block_on(watch::run(
        &mut watcher,
        &client,
        Duration::from_secs(POLL_INTERVAL_SECS),
        watch::shutdown_signal(),
    ));

    let stats = watcher.finish();
    eprintln!();
    eprintln!("Total records observed: {}", stats.records);
    eprintln!(
        "  Cycles: {} ({} failed polls), {} reports",
        stats.cycles, stats.failed_polls, stats.reports
    );
}

/// `--username` plus a password prompt, else the dotfile.
fn resolve_credentials(username: Option<&str>) -> Result<Credentials> {
    match username {
        Some(user) => {
            let password = rpassword::prompt_password("Password: ")?;
            Ok(Credentials::new(user, password))
        }
        None => config::load_dotfile(&config::dotfile_path()),
    }
}
