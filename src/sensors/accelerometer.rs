//! Accelerometer range and conversion

/// Accelerometer full-scale range (`ACCEL_CONFIG.AFS_SEL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    /// ±2g range
    G2 = 0,
    /// ±4g range
    G4 = 1,
    /// ±8g range
    G8 = 2,
    /// ±16g range
    G16 = 3,
}

impl AccelFullScale {
    /// Sensitivity in LSB/g
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::G2 => 16384.0,
            Self::G4 => 8192.0,
            Self::G8 => 4096.0,
            Self::G16 => 2048.0,
        }
    }

    /// Field value for `ACCEL_CONFIG`
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Convert a raw reading to g
    #[must_use]
    pub fn to_g(self, raw: i16) -> f32 {
        f32::from(raw) / self.sensitivity()
    }
}

impl Default for AccelFullScale {
    fn default() -> Self {
        Self::G8
    }
}
