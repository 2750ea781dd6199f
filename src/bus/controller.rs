//! Register-level view of the two-wire bus controller
//!
//! The controller is a memory-mapped peripheral with a mode word, a status
//! word and a handful of data/configuration registers. The protocol code in
//! [`super::BusMaster`] never touches memory directly; it goes through
//! [`ControllerRegisters`], so a board crate maps the names to its peripheral
//! and tests can plug in a simulated controller.

use bitflags::bitflags;

/// Controller registers the bus master reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerRegister {
    /// Module clock prescaler
    Prescaler,
    /// Serial clock low-time divider
    ClockLow,
    /// Serial clock high-time divider
    ClockHigh,
    /// Interrupt enable mask
    InterruptEnable,
    /// Status flags (write one to clear)
    Status,
    /// Hardware byte counter for non-repeat transfers
    Count,
    /// Received data
    DataReceive,
    /// Target (slave) address
    SlaveAddress,
    /// Data to transmit
    DataTransmit,
    /// Mode word
    Mode,
}

/// Access to the controller's registers as opaque 16-bit words
pub trait ControllerRegisters {
    /// Read a controller register
    fn read(&mut self, register: ControllerRegister) -> u16;

    /// Write a controller register
    fn write(&mut self, register: ControllerRegister, value: u16);
}

impl<T: ControllerRegisters + ?Sized> ControllerRegisters for &mut T {
    fn read(&mut self, register: ControllerRegister) -> u16 {
        T::read(self, register)
    }

    fn write(&mut self, register: ControllerRegister, value: u16) {
        T::write(self, register, value);
    }
}

bitflags! {
    /// Mode word flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u16 {
        /// Send NACK on the next acknowledge cycle
        const NACK_MODE = 1 << 15;
        /// Keep running on debugger breakpoints
        const FREE = 1 << 14;
        /// Generate a START condition
        const START = 1 << 13;
        /// Generate a STOP condition (automatic when the byte counter expires in non-repeat mode)
        const STOP = 1 << 11;
        /// Master mode
        const MASTER = 1 << 10;
        /// Transmitter mode
        const TRANSMIT = 1 << 9;
        /// 10-bit addressing
        const EXPANDED_ADDRESS = 1 << 8;
        /// Repeat mode, byte counter ignored
        const REPEAT = 1 << 7;
        /// Digital loopback
        const LOOPBACK = 1 << 6;
        /// Module out of reset
        const ENABLE = 1 << 5;
        /// START byte mode
        const START_BYTE = 1 << 4;
        /// Free data format
        const FREE_FORMAT = 1 << 3;
    }
}

impl Mode {
    /// Start a streamed write: master transmitter in repeat mode
    pub const TRANSMIT_START: Self = Self::START
        .union(Self::MASTER)
        .union(Self::TRANSMIT)
        .union(Self::REPEAT)
        .union(Self::ENABLE);

    /// End a streamed write
    pub const TRANSMIT_STOP: Self = Self::STOP
        .union(Self::MASTER)
        .union(Self::TRANSMIT)
        .union(Self::REPEAT)
        .union(Self::ENABLE);

    /// Counted read: receiver, non-repeat, stop when the counter expires
    pub const COUNTED_RECEIVE: Self = Self::START
        .union(Self::STOP)
        .union(Self::MASTER)
        .union(Self::ENABLE);

    /// Idle configuration after initialization: master receiver, enabled
    pub const IDLE: Self = Self::MASTER.union(Self::ENABLE);
}

bitflags! {
    /// Status word flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u16 {
        /// Arbitration lost to another master
        const ARBITRATION_LOST = 1 << 0;
        /// No acknowledge received
        const NACK = 1 << 1;
        /// Registers ready to be accessed
        const REGISTERS_READY = 1 << 2;
        /// Received byte available
        const RECEIVE_READY = 1 << 3;
        /// Transmit register empty
        const TRANSMIT_READY = 1 << 4;
        /// STOP condition detected
        const STOP_DETECTED = 1 << 5;
        /// Bus busy
        const BUS_BUSY = 1 << 12;
    }
}

/// Clock and polling parameters for the bus master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Module clock prescaler (module clock = system clock / (prescaler + 1))
    pub prescaler: u16,
    /// Serial clock low-time divider, must be non-zero
    pub clock_low: u16,
    /// Serial clock high-time divider, must be non-zero
    pub clock_high: u16,
    /// Iteration ceiling for register-ready polls on the read path
    pub ready_poll_limit: u32,
    /// Spin count after recovering a wedged bus
    pub recovery_settle_spins: u32,
}

impl BusTiming {
    /// Timing used by the reference board
    pub const DEFAULT: Self = Self {
        prescaler: 89,
        clock_low: 10,
        clock_high: 5,
        ready_poll_limit: 65_000,
        recovery_settle_spins: 30_000,
    };

    /// Set the clock prescaler
    #[must_use]
    pub const fn with_prescaler(mut self, prescaler: u16) -> Self {
        self.prescaler = prescaler;
        self
    }

    /// Set the serial clock low/high dividers
    #[must_use]
    pub const fn with_clock_dividers(mut self, low: u16, high: u16) -> Self {
        self.clock_low = low;
        self.clock_high = high;
        self
    }

    /// Set the register-ready poll ceiling
    #[must_use]
    pub const fn with_ready_poll_limit(mut self, limit: u32) -> Self {
        self.ready_poll_limit = limit;
        self
    }

    /// Set the post-recovery settle spin count
    #[must_use]
    pub const fn with_recovery_settle_spins(mut self, spins: u32) -> Self {
        self.recovery_settle_spins = spins;
        self
    }
}

impl Default for BusTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}
