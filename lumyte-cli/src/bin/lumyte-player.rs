//! `lumyte-player`: renders the movie and keeps the frame queue fed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::Parser;
use log::info;

use lumyte::broker::client::{BrokerClient, DEFAULT_SOCKET_PATH, Subscriber, keys};
use lumyte::timeline::functions::default_movie;
use lumyte::{Director, Player, TimelineRegistry};

#[derive(Parser, Debug)]
#[command(name = "lumyte-player", version)]
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

    let movie = default_movie().context("build default movie")?;
    let player =
        Player::new(TimelineRegistry::builtin(), &movie).context("compile default movie")?;
    info!(
        "default movie loaded: {} frames per cycle at {} fps",
        player.frame_count(),
        player.fps()
    );

    let Some(broker) = BrokerClient::connect_with_backoff(DEFAULT_SOCKET_PATH, &running) else {
        return Ok(());
    };
    let subscriber = Subscriber::connect(DEFAULT_SOCKET_PATH, keys::BRIGHTNESS_CHANNEL)
        .context("subscribe to brightness channel")?;

    let mut director = Director::new(broker, subscriber, player)?;
    director.run(&running)?;
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
