//! BH1750FVI ambient light sensor on a Linux I2C bus.

use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_hal::i2c::I2c as _;
use linux_embedded_hal::I2cdev;
use log::warn;

use crate::foundation::error::{LumyteError, LumyteResult};

/// Default I2C character device (bus 1).
pub const DEFAULT_BUS_PATH: &str = "/dev/i2c-1";
/// The sensor's fixed 7-bit address.
pub const SENSOR_ADDR: u8 = 0x23;

const CMD_POWER_ON: u8 = 0x01;
const CMD_ONE_TIME_HIRES: u8 = 0x21;
/// Datasheet worst-case measurement time in high-resolution mode.
const MEASUREMENT_DELAY: Duration = Duration::from_millis(180);
/// Raw counts per lux in high-resolution mode.
const COUNTS_PER_LUX: f64 = 1.2;

/// Source of ambient illuminance readings.
///
/// The controller is generic over this so its mapping pipeline can be
/// driven by scripted lux sequences in tests.
pub trait LightSensor {
    /// One illuminance measurement in lux.
    fn read_lux(&mut self) -> LumyteResult<u32>;
}

/// BH1750 in one-time high-resolution mode.
///
/// Each reading powers the sensor on, triggers a single measurement,
/// waits out the conversion, and reads the 16-bit big-endian result; the
/// sensor powers itself down afterwards. An I2C failure closes and
/// reopens the bus handle before surfacing the error.
pub struct Bh1750 {
    dev: I2cdev,
    path: PathBuf,
}

impl Bh1750 {
    /// Open the sensor on the given I2C character device.
    pub fn open(path: impl AsRef<Path>) -> LumyteResult<Self> {
        let path = path.as_ref().to_path_buf();
        let dev = I2cdev::new(&path)
            .map_err(|e| LumyteError::sensor(format!("open {}: {e}", path.display())))?;
        Ok(Self { dev, path })
    }

    fn measure(&mut self) -> LumyteResult<u32> {
        self.dev
            .write(SENSOR_ADDR, &[CMD_POWER_ON])
            .map_err(|e| LumyteError::sensor(format!("power on: {e}")))?;
        self.dev
            .write(SENSOR_ADDR, &[CMD_ONE_TIME_HIRES])
            .map_err(|e| LumyteError::sensor(format!("trigger measurement: {e}")))?;

        std::thread::sleep(MEASUREMENT_DELAY);

        let mut raw = [0u8; 2];
        self.dev
            .read(SENSOR_ADDR, &mut raw)
            .map_err(|e| LumyteError::sensor(format!("read measurement: {e}")))?;

        let counts = u16::from_be_bytes(raw);
        Ok((f64::from(counts) / COUNTS_PER_LUX).floor() as u32)
    }

    fn reopen(&mut self) {
        match I2cdev::new(&self.path) {
            Ok(dev) => self.dev = dev,
            Err(err) => warn!("reopening {} failed: {err}", self.path.display()),
        }
    }
}

impl LightSensor for Bh1750 {
    fn read_lux(&mut self) -> LumyteResult<u32> {
        match self.measure() {
            Ok(lux) => Ok(lux),
            Err(err) => {
                warn!("i2c error ({err}); reopening bus");
                self.reopen();
                Err(err)
            }
        }
    }
}
