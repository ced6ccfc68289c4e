//! `lumyte-sender`: pops frames off the broker queue and pumps them to
//! the FPGA receiver over raw Ethernet at 240 fps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::Parser;
use log::info;

use lumyte::broker::client::{BrokerClient, DEFAULT_SOCKET_PATH};
use lumyte::transport::sender::Sender;
use lumyte::wire::RawLink;
use lumyte::wire::socket::DEFAULT_INTERFACE;
use lumyte::{DEFAULT_FPS, SignGeometry};

#[derive(Parser, Debug)]
#[command(name = "lumyte-sender", version)]
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

    // Raw socket first: failing here is a configuration error the
    // supervisor should see as a non-zero exit.
    let link = RawLink::open(DEFAULT_INTERFACE)
        .with_context(|| format!("open raw packet socket on {DEFAULT_INTERFACE}"))?;
    info!("raw link up on {DEFAULT_INTERFACE}");

    let Some(mut broker) = BrokerClient::connect_with_backoff(DEFAULT_SOCKET_PATH, &running)
    else {
        return Ok(());
    };

    let mut sender = Sender::new(link, SignGeometry::canonical(), DEFAULT_FPS);
    sender.run(&mut broker, &running)?;
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
