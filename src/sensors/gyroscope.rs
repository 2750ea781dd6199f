//! Gyroscope range and conversion

/// Gyroscope full-scale range (`GYRO_CONFIG.FS_SEL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
    /// ±250°/s range
    Dps250 = 0,
    /// ±500°/s range
    Dps500 = 1,
    /// ±1000°/s range
    Dps1000 = 2,
    /// ±2000°/s range
    Dps2000 = 3,
}

impl GyroFullScale {
    /// Sensitivity in LSB/(°/s)
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// Field value for `GYRO_CONFIG`
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Convert a raw reading to °/s
    #[must_use]
    pub fn to_dps(self, raw: i16) -> f32 {
        f32::from(raw) / self.sensitivity()
    }
}

impl Default for GyroFullScale {
    fn default() -> Self {
        Self::Dps500
    }
}
