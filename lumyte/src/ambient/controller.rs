//! Maps lux readings to published brightness, smoothed and rate-limited.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};

use crate::ambient::bh1750::LightSensor;
use crate::broker::client::{BrokerClient, keys};
use crate::foundation::core::Brightness;
use crate::foundation::error::LumyteResult;

/// Lux level treated as fully bright daylight.
const LUX_SATURATION: f64 = 400.0;
/// Perceptual gamma applied to the normalized lux (boosts low light).
const MAPPING_GAMMA: f64 = 0.6;
/// Rolling-mean window, in readings.
const WINDOW_LEN: usize = 10;
/// Largest brightness change per cycle.
const MAX_STEP: i64 = 5;
/// Idle sleep when the target already matches the current value.
const STEADY_SLEEP: Duration = Duration::from_secs(1);
/// Sleep after a sensor failure (the bus handle was already reopened).
const SENSOR_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// The pure mapping pipeline from lux readings to brightness values.
///
/// `lux` is normalized against 400 lx, raised to 0.6 to match perceived
/// light levels, and mapped onto 1–100. A rolling mean over the last ten
/// readings suppresses shadow flicker, and movement toward the target is
/// limited to ±5 per observation so the sign never visibly jumps.
#[derive(Debug, Clone)]
pub struct BrightnessFilter {
    window: VecDeque<u32>,
    current: u8,
}

impl BrightnessFilter {
    /// Start the filter at the given brightness.
    pub fn new(initial: Brightness) -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_LEN),
            current: initial.get(),
        }
    }

    /// The most recent output value.
    pub fn current(&self) -> Brightness {
        Brightness::clamped(i64::from(self.current))
    }

    /// Feed one lux reading; returns the new brightness when it moved.
    pub fn observe(&mut self, lux: u32) -> Option<Brightness> {
        let normalized = (f64::from(lux) / LUX_SATURATION).min(1.0);
        let mapped = normalized.powf(MAPPING_GAMMA) * 99.0 + 1.0;

        if self.window.len() == WINDOW_LEN {
            self.window.pop_front();
        }
        self.window.push_back(mapped.round() as u32);

        let sum: u64 = self.window.iter().map(|&v| u64::from(v)).sum();
        let target = (sum / self.window.len() as u64) as i64;

        let diff = target - i64::from(self.current);
        if diff == 0 {
            return None;
        }

        let step = diff.signum() * diff.abs().min(MAX_STEP);
        self.current = (i64::from(self.current) + step).clamp(1, 100) as u8;
        Some(self.current())
    }
}

/// The ambient controller process body: sample, filter, publish.
pub struct AmbientController<S: LightSensor> {
    sensor: S,
    filter: BrightnessFilter,
}

impl<S: LightSensor> AmbientController<S> {
    /// Build a controller starting from the given brightness.
    pub fn new(sensor: S, initial: Brightness) -> Self {
        Self {
            sensor,
            filter: BrightnessFilter::new(initial),
        }
    }

    /// One sample/filter/publish cycle.
    ///
    /// When the filter moves, the new value is published on the
    /// brightness channel, persisted for the orchestrator, and written on
    /// the transport's 0–255 hardware scale. Returns the published value,
    /// or `None` when the brightness is already on target.
    pub fn tick(&mut self, broker: &mut BrokerClient) -> LumyteResult<Option<Brightness>> {
        let lux = self.sensor.read_lux()?;
        let Some(brightness) = self.filter.observe(lux) else {
            return Ok(None);
        };
        debug!("lux {lux} -> brightness {brightness}");

        let value = brightness.to_string();
        broker.publish(keys::BRIGHTNESS_CHANNEL, value.as_bytes())?;
        broker.set(keys::PLAYER_BRIGHTNESS, value.as_bytes())?;
        broker.set(
            keys::SENDER_BRIGHTNESS,
            brightness.to_hardware().to_string().as_bytes(),
        )?;
        Ok(Some(brightness))
    }

    /// Run until the running flag clears.
    ///
    /// The 180 ms measurement wait paces the loop while the brightness is
    /// moving; a steady target idles for a second between samples. Sensor
    /// errors back off a second (the driver already reopened the bus);
    /// broker failures reconnect with 1 s backoff.
    pub fn run(&mut self, broker: &mut BrokerClient, running: &AtomicBool) -> LumyteResult<()> {
        while running.load(Ordering::Relaxed) {
            match self.tick(broker) {
                Ok(Some(_)) => {}
                Ok(None) => std::thread::sleep(STEADY_SLEEP),
                Err(err) if err.is_broker_io() => {
                    warn!("broker write failed: {err}");
                    if !broker.reconnect(running) {
                        break;
                    }
                }
                Err(err) => {
                    warn!("sensor cycle failed: {err}");
                    std::thread::sleep(SENSOR_ERROR_BACKOFF);
                }
            }
        }
        info!("ambient controller shutdown");
        Ok(())
    }
}
