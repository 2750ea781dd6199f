#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bits;
pub mod bus;
pub mod device;
pub mod dmp;
pub mod fifo;
pub mod interface;
pub mod interrupt;
pub mod registers;
pub mod sample;
pub mod sensors;

// Re-export main types
pub use bits::BitField;
pub use bus::{
    BusError, BusMaster, BusTiming, ControllerRegister, ControllerRegisters, I2cBus, RegisterBus,
};
pub use device::{AcquisitionConfig, Mpu6050Driver};
pub use dmp::{
    DmpConfig, DmpFailure, DmpFirmware, FirmwareImage, FirmwareProgrammer, MotionApps20,
    OrientationMath,
};
pub use fifo::{FIFO_PACKET_SIZE, FifoPacket};
pub use interface::DeviceInterface;
pub use interrupt::InterruptStatus;
pub use registers::RegisterMap;
pub use sample::{Sample, SampleStatus};
pub use sensors::{AccelFullScale, ClockSource, Dlpf, GyroFullScale};

/// MPU-6050 I2C address when AD0 is low
pub const I2C_ADDRESS_AD0_LOW: u8 = 0x68;

/// MPU-6050 I2C address when AD0 is high
pub const I2C_ADDRESS_AD0_HIGH: u8 = 0x69;

/// Expected value of `WHO_AM_I`, the identity in [`RegisterMap::MPU6050`]
pub const WHO_AM_I_VALUE: u8 = 0x68;

/// Device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceStatus {
    /// Identity not (yet) confirmed
    #[default]
    Disconnected,
    /// Identity confirmed, DMP not running
    Connected,
    /// Firmware loaded and DMP streaming into the FIFO
    DmpReady,
}

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error on the bus
    Bus(E),
    /// `WHO_AM_I` never matched within the retry ceiling
    DeviceNotResponding,
    /// DMP bring-up failed after the device answered; rerun `setup`
    DmpInitFailed(DmpFailure),
    /// Firmware upload failed
    FirmwareUpload(DmpFailure),
    /// Bit field start/width outside the 8-bit register
    InvalidBitField,
    /// Averaging requested over zero samples
    InvalidSampleCount,
    /// Samples requested before `setup` completed
    NotReady,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
