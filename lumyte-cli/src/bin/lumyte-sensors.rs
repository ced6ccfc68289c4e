//! `lumyte-sensors`: samples the ambient light sensor and publishes
//! smoothed, rate-limited brightness.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::Parser;
use log::info;

use lumyte::Brightness;
use lumyte::ambient::bh1750::{Bh1750, DEFAULT_BUS_PATH};
use lumyte::ambient::controller::AmbientController;
use lumyte::broker::client::{BrokerClient, DEFAULT_SOCKET_PATH, keys};

#[derive(Parser, Debug)]
#[command(name = "lumyte-sensors", version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::Relaxed))
        .context("install signal handler")?;

    let sensor =
        Bh1750::open(DEFAULT_BUS_PATH).with_context(|| format!("open {DEFAULT_BUS_PATH}"))?;

    let Some(mut broker) = BrokerClient::connect_with_backoff(DEFAULT_SOCKET_PATH, &running)
    else {
        return Ok(());
    };

    // Resume the ramp from wherever the last run left the sign.
    let initial = broker
        .get(keys::PLAYER_BRIGHTNESS)?
        .and_then(|raw| String::from_utf8(raw).ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(Brightness::clamped)
        .unwrap_or(Brightness::MAX);
    info!("starting brightness ramp at {initial}");

    let mut controller = AmbientController::new(sensor, initial);
    controller.run(&mut broker, &running)?;
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
