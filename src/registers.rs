//! Register map for the MPU-6050
//!
//! The map is a plain table of addresses and [`BitField`] descriptors. It is
//! built once as a `const` and only ever read, so every layer shares the same
//! immutable description of the device.
//!
//! Field positions are MSB-first (see [`crate::bits`]).

use crate::bits::BitField;

/// Register addresses used by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Registers {
    /// Accelerometer X offset, high byte (Y and Z follow at +2 and +4)
    pub xa_offset_h: u8,
    /// Accelerometer Y offset, high byte
    pub ya_offset_h: u8,
    /// Accelerometer Z offset, high byte
    pub za_offset_h: u8,
    /// Gyroscope X offset, high byte
    pub xg_offset_h: u8,
    /// Gyroscope Y offset, high byte
    pub yg_offset_h: u8,
    /// Gyroscope Z offset, high byte
    pub zg_offset_h: u8,
    /// Sample rate divider
    pub smplrt_div: u8,
    /// Frame sync and digital low-pass filter
    pub config: u8,
    /// Gyroscope full-scale range
    pub gyro_config: u8,
    /// Accelerometer full-scale range
    pub accel_config: u8,
    /// Interrupt enable
    pub int_enable: u8,
    /// Interrupt status (clears on read)
    pub int_status: u8,
    /// Temperature, high byte
    pub temp_out_h: u8,
    /// User control: DMP/FIFO enable and reset
    pub user_ctrl: u8,
    /// Power management 1
    pub pwr_mgmt_1: u8,
    /// DMP memory bank select
    pub bank_sel: u8,
    /// DMP memory start address within the bank
    pub mem_start_addr: u8,
    /// DMP memory data port (auto-increments)
    pub mem_r_w: u8,
    /// DMP program start address, high byte
    pub dmp_cfg_1: u8,
    /// DMP program start address, low byte
    pub dmp_cfg_2: u8,
    /// FIFO byte count, high byte
    pub fifo_count_h: u8,
    /// FIFO data port
    pub fifo_r_w: u8,
    /// Device identity
    pub who_am_i: u8,
}

/// Bit fields used by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fields {
    /// `USER_CTRL.DMP_EN`
    pub dmp_enable: BitField,
    /// `USER_CTRL.FIFO_EN`
    pub fifo_enable: BitField,
    /// `USER_CTRL.DMP_RESET`
    pub dmp_reset: BitField,
    /// `USER_CTRL.FIFO_RESET`
    pub fifo_reset: BitField,
    /// `PWR_MGMT_1.DEVICE_RESET`
    pub device_reset: BitField,
    /// `PWR_MGMT_1.SLEEP`
    pub sleep: BitField,
    /// `PWR_MGMT_1.CLKSEL`
    pub clock_source: BitField,
    /// `CONFIG.DLPF_CFG`
    pub dlpf: BitField,
    /// `GYRO_CONFIG.FS_SEL`
    pub gyro_full_scale: BitField,
    /// `ACCEL_CONFIG.AFS_SEL`
    pub accel_full_scale: BitField,
    /// `INT_STATUS.FIFO_OFLOW_INT`
    pub fifo_overflow: BitField,
}

/// Complete device description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// 7-bit bus address
    pub device_address: u8,
    /// Expected `WHO_AM_I` value
    pub identity: u8,
    /// Register addresses
    pub registers: Registers,
    /// Bit fields
    pub fields: Fields,
    /// `INT_ENABLE` value written by the enable-interrupts firmware record
    pub dmp_interrupt_sources: u8,
}

const REGISTERS: Registers = Registers {
    xa_offset_h: 0x06,
    ya_offset_h: 0x08,
    za_offset_h: 0x0A,
    xg_offset_h: 0x13,
    yg_offset_h: 0x15,
    zg_offset_h: 0x17,
    smplrt_div: 0x19,
    config: 0x1A,
    gyro_config: 0x1B,
    accel_config: 0x1C,
    int_enable: 0x38,
    int_status: 0x3A,
    temp_out_h: 0x41,
    user_ctrl: 0x6A,
    pwr_mgmt_1: 0x6B,
    bank_sel: 0x6D,
    mem_start_addr: 0x6E,
    mem_r_w: 0x6F,
    dmp_cfg_1: 0x70,
    dmp_cfg_2: 0x71,
    fifo_count_h: 0x72,
    fifo_r_w: 0x74,
    who_am_i: 0x75,
};

impl RegisterMap {
    /// MPU-6050 with AD0 low
    pub const MPU6050: Self = Self {
        device_address: crate::I2C_ADDRESS_AD0_LOW,
        identity: crate::WHO_AM_I_VALUE,
        registers: REGISTERS,
        fields: Fields {
            dmp_enable: BitField::new(REGISTERS.user_ctrl, 0, 1),
            fifo_enable: BitField::new(REGISTERS.user_ctrl, 1, 1),
            dmp_reset: BitField::new(REGISTERS.user_ctrl, 4, 1),
            fifo_reset: BitField::new(REGISTERS.user_ctrl, 5, 1),
            device_reset: BitField::new(REGISTERS.pwr_mgmt_1, 0, 1),
            sleep: BitField::new(REGISTERS.pwr_mgmt_1, 1, 1),
            clock_source: BitField::new(REGISTERS.pwr_mgmt_1, 5, 3),
            dlpf: BitField::new(REGISTERS.config, 5, 3),
            gyro_full_scale: BitField::new(REGISTERS.gyro_config, 3, 2),
            accel_full_scale: BitField::new(REGISTERS.accel_config, 3, 2),
            fifo_overflow: BitField::new(REGISTERS.int_status, 3, 1),
        },
        dmp_interrupt_sources: 0x32,
    };

    /// Same device with AD0 pulled high
    #[must_use]
    pub const fn with_device_address(mut self, address: u8) -> Self {
        self.device_address = address;
        self
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::MPU6050
    }
}
