//! The orchestrator: drives the player and keeps the frame queue fed
//! without letting it grow unbounded when the transport stalls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{error, info, warn};

use crate::broker::client::{BrokerClient, Subscriber, keys};
use crate::foundation::core::Brightness;
use crate::foundation::error::LumyteResult;
use crate::player::Player;

/// Wait before re-checking a full queue, long enough for a healthy
/// transport to pop at least one frame.
const FULL_RECHECK_DELAY: Duration = Duration::from_millis(5);
/// Pause after flushing a stalled transport's queue.
const FLUSH_BACKOFF: Duration = Duration::from_millis(100);
/// Pause after an unexpected error before resuming the loop.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Drives one [`Player`], pushing each rendered frame onto the broker
/// queue with fps-bounded backpressure, and feeds brightness updates from
/// the pub/sub channel into the renderer.
pub struct Director {
    broker: BrokerClient,
    subscriber: Subscriber,
    player: Player,
}

impl Director {
    /// Wire up the orchestrator and restore persisted brightness.
    pub fn new(
        mut broker: BrokerClient,
        subscriber: Subscriber,
        mut player: Player,
    ) -> LumyteResult<Self> {
        if let Some(raw) = broker.get(keys::PLAYER_BRIGHTNESS)? {
            match std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
            {
                Some(value) => {
                    let brightness = Brightness::clamped(value);
                    info!("restored brightness {brightness}");
                    player.set_brightness(brightness);
                }
                None => warn!("ignoring malformed {} value", keys::PLAYER_BRIGHTNESS),
            }
        }

        Ok(Self {
            broker,
            subscriber,
            player,
        })
    }

    /// The driven player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// One orchestration step: drain brightness updates, render one
    /// frame, enqueue it, and apply backpressure.
    ///
    /// The RPUSH reply is the new queue length. A full second of frames
    /// in the queue means the transport has not popped for a while; if a
    /// short grace period doesn't clear it, the transport is presumed
    /// stalled and the queue is flushed wholesale so it never grows past
    /// `fps` entries.
    pub fn tick(&mut self) -> LumyteResult<()> {
        self.drain_brightness()?;

        self.player.play()?;
        let len = self.broker.rpush(keys::FRAMES, self.player.image_data())?;

        if len >= i64::from(self.player.fps()) {
            std::thread::sleep(FULL_RECHECK_DELAY);
            let len = self.broker.llen(keys::FRAMES)?;
            if len >= i64::from(self.player.fps()) {
                warn!("transport stalled at queue length {len}; flushing");
                self.broker.del(keys::FRAMES)?;
                std::thread::sleep(FLUSH_BACKOFF);
            }
        }
        Ok(())
    }

    /// Run until the running flag clears. Broker failures reconnect with
    /// 1 s backoff; everything else logs and backs off a second.
    pub fn run(&mut self, running: &AtomicBool) -> LumyteResult<()> {
        while running.load(Ordering::Relaxed) {
            match self.tick() {
                Ok(()) => {}
                Err(err) if err.is_broker_io() => {
                    warn!("broker i/o failed: {err}");
                    if !self.broker.reconnect(running) || !self.subscriber.reconnect(running) {
                        break;
                    }
                }
                Err(err) => {
                    error!("orchestration error: {err}");
                    std::thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        info!("director shutdown");
        Ok(())
    }

    fn drain_brightness(&mut self) -> LumyteResult<()> {
        while let Some(payload) = self.subscriber.try_message()? {
            match std::str::from_utf8(&payload)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
            {
                Some(value) => self.player.set_brightness(Brightness::clamped(value)),
                None => warn!("ignoring malformed brightness message"),
            }
        }
        Ok(())
    }
}
