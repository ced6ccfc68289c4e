//! The frame pump: pops rendered frames off the broker queue and emits
//! them to the FPGA on a hard 1/fps deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};

use crate::broker::client::{BrokerClient, keys};
use crate::foundation::core::SignGeometry;
use crate::foundation::error::{LumyteError, LumyteResult};
use crate::transport::clock::{FrameClock, monotonic_raw_now};
use crate::wire::packet::{
    COMMIT_ETHER_TYPE, ROW_ETHER_TYPE, commit_packet, fill_row_packet, row_packet_len,
};
use crate::wire::socket::LinkTx;

/// How long one queue pop may block before the pump checks back in.
const POP_TIMEOUT_SECS: u32 = 1;
/// Back-off when the queue had nothing for us.
const EMPTY_QUEUE_BACKOFF: Duration = Duration::from_micros(100);
/// Hardware brightness seeded into the broker when the key is absent.
const DEFAULT_HARDWARE_BRIGHTNESS: u8 = 255;

/// The transport: repackages BGRA frames into row + commit packets and
/// holds the emission cadence.
///
/// Generic over [`LinkTx`] so the packet stream can be captured in tests;
/// production uses [`crate::wire::RawLink`]. The row buffer is allocated
/// once and reused for all 64 rows of every frame.
pub struct Sender<L: LinkTx> {
    link: L,
    geometry: SignGeometry,
    fps: u32,
    row_buf: Vec<u8>,
    brightness: u8,
}

impl<L: LinkTx> Sender<L> {
    /// Create a pump for the given link and sign geometry.
    pub fn new(link: L, geometry: SignGeometry, fps: u32) -> Self {
        Self {
            link,
            geometry,
            fps,
            row_buf: vec![0; row_packet_len(geometry.width)],
            brightness: DEFAULT_HARDWARE_BRIGHTNESS,
        }
    }

    /// The underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Current hardware brightness (0–255) stamped into commit packets.
    pub fn hardware_brightness(&self) -> u8 {
        self.brightness
    }

    /// Update the hardware brightness, clamping out-of-range values.
    pub fn set_hardware_brightness(&mut self, value: i64) {
        if !(0..=255).contains(&value) {
            warn!("brightness {value} out of range, clamping to 0-255");
        }
        self.brightness = value.clamp(0, 255) as u8;
    }

    /// Emit all rows of one frame (no commit).
    ///
    /// A frame whose length is not W·H·4 is a protocol error and is
    /// rejected before anything reaches the wire. Individual row send
    /// failures are logged and skipped; a short frame beats a stalled
    /// cadence, and the receiver tolerates it until the next commit.
    pub fn emit_frame(&mut self, frame: &[u8]) -> LumyteResult<()> {
        let expected = self.geometry.frame_len();
        if frame.len() != expected {
            return Err(LumyteError::protocol(format!(
                "frame is {} bytes, want {expected}",
                frame.len()
            )));
        }

        let row_bytes = self.geometry.width as usize * 4;
        for (row, pixels) in frame.chunks_exact(row_bytes).enumerate() {
            fill_row_packet(&mut self.row_buf, row as u8, self.geometry.width, pixels)?;
            if let Err(err) = self.link.send(ROW_ETHER_TYPE, &self.row_buf) {
                warn!("row {row} send failed: {err}");
            }
        }
        Ok(())
    }

    /// Emit the commit packet that latches the accumulated rows onto the
    /// LEDs. Send failures are logged; the cadence never stops for them.
    pub fn emit_commit(&mut self) {
        let payload = commit_packet(self.brightness);
        if let Err(err) = self.link.send(COMMIT_ETHER_TYPE, &payload) {
            warn!("commit send failed: {err}");
        }
    }

    /// Run the pump until the running flag clears.
    ///
    /// Each iteration pops a frame and the current brightness in one
    /// pipelined broker round trip, queues the 64 row packets, rides the
    /// hybrid wait to the 1/fps deadline, and commits. An empty queue
    /// backs off 100 µs without committing and without re-anchoring the
    /// deadline clock, so the first frame after a stall goes out
    /// immediately. Broker I/O failures reconnect with 1 s backoff,
    /// forever.
    pub fn run(&mut self, broker: &mut BrokerClient, running: &AtomicBool) -> LumyteResult<()> {
        self.seed_brightness(broker)?;

        let period = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        let mut clock = FrameClock::new(period)?;
        let mut sends: u32 = 0;
        let mut stat_start = monotonic_raw_now()?;

        while running.load(Ordering::Relaxed) {
            let frame = match self.poll(broker) {
                Ok(frame) => frame,
                Err(err) if err.is_broker_io() => {
                    warn!("broker read failed: {err}");
                    if !broker.reconnect(running) {
                        break;
                    }
                    continue;
                }
                Err(err) => {
                    warn!("dropping frame: {err}");
                    std::thread::sleep(EMPTY_QUEUE_BACKOFF);
                    continue;
                }
            };

            let Some(frame) = frame else {
                // Queue empty. The deadline anchor stays put so the next
                // available frame is emitted immediately.
                std::thread::sleep(EMPTY_QUEUE_BACKOFF);
                continue;
            };

            if let Err(err) = self.emit_frame(&frame) {
                warn!("dropping frame: {err}");
                std::thread::sleep(EMPTY_QUEUE_BACKOFF);
                continue;
            }

            clock.wait_for_deadline()?;
            clock.mark()?;
            self.emit_commit();

            sends += 1;
            if sends == self.fps {
                let now = monotonic_raw_now()?;
                let span = now.saturating_sub(stat_start).as_secs_f64();
                if span > 0.0 {
                    debug!(
                        "fps target {} actual {:.4}",
                        self.fps,
                        f64::from(sends) / span
                    );
                }
                stat_start = now;
                sends = 0;
            }
        }

        info!("sender shutdown");
        Ok(())
    }

    /// One pipelined pop: frame (or `None` on timeout) plus brightness.
    fn poll(&mut self, broker: &mut BrokerClient) -> LumyteResult<Option<Vec<u8>>> {
        let (frame, brightness) =
            broker.blpop_with_get(keys::FRAMES, keys::SENDER_BRIGHTNESS, POP_TIMEOUT_SECS)?;

        if let Some(raw) = brightness {
            if let Some(value) = std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
            {
                self.set_hardware_brightness(value);
            } else {
                warn!("ignoring malformed {} value", keys::SENDER_BRIGHTNESS);
            }
        }

        Ok(frame)
    }

    fn seed_brightness(&mut self, broker: &mut BrokerClient) -> LumyteResult<()> {
        if broker.get(keys::SENDER_BRIGHTNESS)?.is_none() {
            info!(
                "seeding {} to {DEFAULT_HARDWARE_BRIGHTNESS}",
                keys::SENDER_BRIGHTNESS
            );
            broker.set(
                keys::SENDER_BRIGHTNESS,
                DEFAULT_HARDWARE_BRIGHTNESS.to_string().as_bytes(),
            )?;
        }
        Ok(())
    }
}
