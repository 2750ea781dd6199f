//! DMP bring-up configuration and firmware inputs

use super::image::FirmwareImage;
use crate::sensors::{AccelFullScale, ClockSource, Dlpf, GyroFullScale};

/// Default DMP program start address (MotionApps 2.0)
pub const DEFAULT_PROGRAM_START: u16 = 0x0300;

/// Sensor and DMP settings applied by `setup`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmpConfig {
    /// Gyroscope range; also selects the rate conversion divisor
    pub gyro_range: GyroFullScale,
    /// Accelerometer range; also selects the acceleration conversion divisor
    pub accel_range: AccelFullScale,
    /// Digital low-pass filter
    pub dlpf: Dlpf,
    /// Clock source
    pub clock_source: ClockSource,
    /// Sample rate divider, output rate = 1 kHz / (1 + divider) with the DLPF on
    pub sample_rate_divider: u8,
    /// Address written to `DMP_CFG_1`/`DMP_CFG_2` after upload
    pub program_start: u16,
}

impl Default for DmpConfig {
    fn default() -> Self {
        Self {
            gyro_range: GyroFullScale::Dps500,
            accel_range: AccelFullScale::G8,
            dlpf: Dlpf::Hz44,
            clock_source: ClockSource::PllGyroZ,
            sample_rate_divider: 4,
            program_start: DEFAULT_PROGRAM_START,
        }
    }
}

impl DmpConfig {
    /// Set the gyroscope range
    #[must_use]
    pub const fn with_gyro_range(mut self, range: GyroFullScale) -> Self {
        self.gyro_range = range;
        self
    }

    /// Set the accelerometer range
    #[must_use]
    pub const fn with_accel_range(mut self, range: AccelFullScale) -> Self {
        self.accel_range = range;
        self
    }

    /// Set the low-pass filter
    #[must_use]
    pub const fn with_dlpf(mut self, dlpf: Dlpf) -> Self {
        self.dlpf = dlpf;
        self
    }

    /// Set the clock source
    #[must_use]
    pub const fn with_clock_source(mut self, source: ClockSource) -> Self {
        self.clock_source = source;
        self
    }

    /// Set the sample rate divider
    #[must_use]
    pub const fn with_sample_rate_divider(mut self, divider: u8) -> Self {
        self.sample_rate_divider = divider;
        self
    }

    /// Set the program start address
    #[must_use]
    pub const fn with_program_start(mut self, address: u16) -> Self {
        self.program_start = address;
        self
    }

    /// Output data rate in Hz for the configured divider (DLPF enabled)
    #[must_use]
    pub fn sample_rate_hz(&self) -> f32 {
        1000.0 / (1.0 + f32::from(self.sample_rate_divider))
    }
}

/// Vendor DMP program plus its configuration records
///
/// The crate ships no program image; the application links in the one it is
/// licensed to use.
#[derive(Debug, Clone, Copy)]
pub struct DmpFirmware<'a> {
    /// Program bytes, written contiguously from bank 0 offset 0
    pub program: &'a [u8],
    /// Configuration records applied after the program
    pub configuration: FirmwareImage<'a>,
}

impl<'a> DmpFirmware<'a> {
    /// Pair a program with its configuration image
    pub const fn new(program: &'a [u8], configuration: FirmwareImage<'a>) -> Self {
        Self {
            program,
            configuration,
        }
    }
}
