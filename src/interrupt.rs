//! Interrupt status decoding
//!
//! `INT_STATUS` (0x3A) is cleared by reading it, so the driver reads it once
//! per FIFO check and decodes the snapshot here.

/// Snapshot of `INT_STATUS`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptStatus {
    /// Raw data ready (bit 0)
    pub data_ready: bool,
    /// DMP interrupt (bit 1)
    pub dmp: bool,
    /// PLL ready (bit 2)
    pub pll_ready: bool,
    /// I2C master interrupt (bit 3)
    pub i2c_master: bool,
    /// FIFO overflow (bit 4)
    pub fifo_overflow: bool,
    /// Zero motion (bit 5)
    pub zero_motion: bool,
    /// Motion detected (bit 6)
    pub motion: bool,
    /// Free fall (bit 7)
    pub free_fall: bool,
}

impl InterruptStatus {
    /// Decode a raw register value
    #[must_use]
    pub const fn from_raw(value: u8) -> Self {
        Self {
            data_ready: value & 0x01 != 0,
            dmp: value & 0x02 != 0,
            pll_ready: value & 0x04 != 0,
            i2c_master: value & 0x08 != 0,
            fifo_overflow: value & 0x10 != 0,
            zero_motion: value & 0x20 != 0,
            motion: value & 0x40 != 0,
            free_fall: value & 0x80 != 0,
        }
    }

    /// Encode back to the register layout
    #[must_use]
    pub const fn to_raw(&self) -> u8 {
        let mut value = 0u8;
        if self.data_ready {
            value |= 0x01;
        }
        if self.dmp {
            value |= 0x02;
        }
        if self.pll_ready {
            value |= 0x04;
        }
        if self.i2c_master {
            value |= 0x08;
        }
        if self.fifo_overflow {
            value |= 0x10;
        }
        if self.zero_motion {
            value |= 0x20;
        }
        if self.motion {
            value |= 0x40;
        }
        if self.free_fall {
            value |= 0x80;
        }
        value
    }

    /// Check if any flag is set
    #[must_use]
    pub const fn any_set(&self) -> bool {
        self.to_raw() != 0
    }
}

impl From<u8> for InterruptStatus {
    fn from(value: u8) -> Self {
        Self::from_raw(value)
    }
}
