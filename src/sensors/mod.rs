//! Sensor front-end configuration
//!
//! Ranges, filter and clock selections written during bring-up. The ranges
//! also carry the divisors used to convert FIFO readings to physical units.

pub mod accelerometer;
pub mod gyroscope;

pub use accelerometer::AccelFullScale;
pub use gyroscope::GyroFullScale;

/// Digital low-pass filter (`CONFIG.DLPF_CFG`), named by accelerometer bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dlpf {
    /// 260 Hz, filter bypassed
    Hz260 = 0,
    /// 184 Hz
    Hz184 = 1,
    /// 94 Hz
    Hz94 = 2,
    /// 44 Hz (gyro 42 Hz)
    #[default]
    Hz44 = 3,
    /// 21 Hz
    Hz21 = 4,
    /// 10 Hz
    Hz10 = 5,
    /// 5 Hz
    Hz5 = 6,
}

impl Dlpf {
    /// Field value for `CONFIG`
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Clock source (`PWR_MGMT_1.CLKSEL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 8 MHz oscillator
    Internal = 0,
    /// PLL with X gyro reference
    PllGyroX = 1,
    /// PLL with Y gyro reference
    PllGyroY = 2,
    /// PLL with Z gyro reference
    #[default]
    PllGyroZ = 3,
}

impl ClockSource {
    /// Field value for `PWR_MGMT_1`
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}
