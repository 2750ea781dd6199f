//! Two-wire bus master
//!
//! [`BusMaster`] runs the master side of the bus protocol on top of a
//! register-level [`ControllerRegisters`] implementation: start/stop framing,
//! streamed writes in repeat mode, counted reads with the hardware byte
//! counter, NACK handling and recovery from a wedged bus.
//!
//! ## Waiting on the controller
//!
//! Two kinds of waits appear in the protocol and they are deliberately kept
//! apart:
//!
//! - **Bounded** polls: every register-ready/receive-ready wait on the read
//!   path gives up after [`BusTiming::ready_poll_limit`] iterations. The
//!   controller is then recovered and [`BusError::Timeout`] is returned.
//! - **Unbounded** spins: stop-bit clear, bus-busy clear, stop detected,
//!   master released and transmit-ready on the write path. These flags are
//!   driven by bus hardware that always resolves in bounded real time, so no
//!   iteration ceiling is applied. Adding one here would only introduce false
//!   timeouts.
//!
//! The device layer talks to any bus through [`RegisterBus`], which
//! [`BusMaster`] implements directly and [`I2cBus`] provides for any
//! `embedded-hal` I2C implementation.

pub mod controller;
mod hal;

pub use controller::{BusTiming, ControllerRegister, ControllerRegisters, Mode, Status};
pub use embedded_hal::i2c::NoAcknowledgeSource;
pub use hal::I2cBus;

use crate::bits::BitField;
use core::hint::spin_loop;

/// Automatic retries after a NACK on the register byte of a write
pub const WRITE_NACK_RETRIES: u8 = 1;

/// Bus transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// A bounded register-ready poll expired; the controller was reset and re-initialized
    Timeout,
    /// Another master won arbitration; the caller may retry
    ArbitrationLoss,
    /// The target did not acknowledge
    NoAcknowledge(NoAcknowledgeSource),
    /// The transfer does not fit the 16-bit hardware byte counter
    TransferTooLong,
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::ErrorKind;
        match *self {
            Self::ArbitrationLoss => ErrorKind::ArbitrationLoss,
            Self::NoAcknowledge(source) => ErrorKind::NoAcknowledge(source),
            Self::Timeout | Self::TransferTooLong => ErrorKind::Other,
        }
    }
}

/// Register-oriented access to devices on a bus
///
/// The bit helpers read the containing byte, replace the field and write the
/// byte back; bits outside the field are preserved.
pub trait RegisterBus {
    /// Transport error type
    type Error;

    /// Program the bus hardware for operation
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be initialized.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Write `data` to consecutive registers starting at `register`
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn write_bytes(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read `buffer.len()` bytes from consecutive registers starting at `register`
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn read_bytes(&mut self, address: u8, register: u8, buffer: &mut [u8])
    -> Result<(), Self::Error>;

    /// Read a single register
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn read_byte(&mut self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut byte = [0u8; 1];
        self.read_bytes(address, register, &mut byte)?;
        Ok(byte[0])
    }

    /// Write a single register
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn write_byte(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write_bytes(address, register, &[value])
    }

    /// Read a field, right-aligned
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn read_field(&mut self, address: u8, field: BitField) -> Result<u8, Self::Error> {
        let byte = self.read_byte(address, field.register())?;
        Ok(field.extract(byte))
    }

    /// Read-modify-write the low `field.width()` bits of `value` into the field
    ///
    /// # Errors
    ///
    /// Returns an error if either transfer fails.
    fn write_bit_field(
        &mut self,
        address: u8,
        field: BitField,
        value: u8,
    ) -> Result<(), Self::Error> {
        let byte = self.read_byte(address, field.register())?;
        self.write_byte(address, field.register(), field.insert(byte, value))
    }

    /// Read one bit (a width-1 field)
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails.
    fn read_bit(&mut self, address: u8, bit: BitField) -> Result<bool, Self::Error> {
        Ok(self.read_field(address, bit)? != 0)
    }

    /// Set or clear one bit (a width-1 field)
    ///
    /// # Errors
    ///
    /// Returns an error if either transfer fails.
    fn write_bit(&mut self, address: u8, bit: BitField, set: bool) -> Result<(), Self::Error> {
        self.write_bit_field(address, bit, u8::from(set))
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        T::initialize(self)
    }

    fn write_bytes(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write_bytes(self, address, register, data)
    }

    fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        T::read_bytes(self, address, register, buffer)
    }
}

/// Master-only, single-master bus protocol driver
pub struct BusMaster<C> {
    controller: C,
    timing: BusTiming,
}

impl<C> BusMaster<C>
where
    C: ControllerRegisters,
{
    /// Wrap a controller using [`BusTiming::DEFAULT`]
    ///
    /// The controller is not touched until [`BusMaster::initialize`].
    pub const fn new(controller: C) -> Self {
        Self::with_timing(controller, BusTiming::DEFAULT)
    }

    /// Wrap a controller with explicit timing
    pub const fn with_timing(controller: C, timing: BusTiming) -> Self {
        Self { controller, timing }
    }

    /// Current timing parameters
    pub const fn timing(&self) -> &BusTiming {
        &self.timing
    }

    /// Consume the master and return the controller
    pub fn release(self) -> C {
        self.controller
    }

    /// Program clock dividers, mask controller interrupts and enter idle master-receiver mode
    pub fn initialize(&mut self) {
        self.controller
            .write(ControllerRegister::Prescaler, self.timing.prescaler);
        self.controller
            .write(ControllerRegister::ClockLow, self.timing.clock_low);
        self.controller
            .write(ControllerRegister::ClockHigh, self.timing.clock_high);
        // Polled operation only
        self.controller.write(ControllerRegister::InterruptEnable, 0);
        self.set_mode(Mode::IDLE);
    }

    /// Write `data` to registers starting at `register` on device `address`
    ///
    /// The register byte and payload are streamed in one repeat-mode frame.
    /// A NACK on the register byte stops the bus and resends the whole frame
    /// once; a NACK during the payload aborts without retry.
    ///
    /// # Errors
    ///
    /// [`BusError::ArbitrationLoss`] if another master took the bus,
    /// [`BusError::NoAcknowledge`] if the device did not acknowledge.
    pub fn write_bytes(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), BusError> {
        self.write_with_retry(
            address,
            core::iter::once(register).chain(data.iter().copied()),
        )
    }

    /// Read `buffer.len()` bytes from registers starting at `register` on device `address`
    ///
    /// # Errors
    ///
    /// [`BusError::Timeout`] if the controller did not become ready within the
    /// poll ceiling (the controller is recovered before returning),
    /// [`BusError::ArbitrationLoss`] or [`BusError::NoAcknowledge`] on bus faults.
    pub fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), BusError> {
        if buffer.is_empty() {
            return Ok(());
        }
        let count = u16::try_from(buffer.len()).map_err(|_| BusError::TransferTooLong)?;

        // Register phase in transmit mode
        self.begin(address, Mode::TRANSMIT_START)?;
        self.poll_until(Status::REGISTERS_READY)?;
        self.controller
            .write(ControllerRegister::DataTransmit, u16::from(register));
        self.poll_until(Status::REGISTERS_READY)?;

        if self.status().contains(Status::NACK) {
            self.clear_status(Status::NACK);
            self.send_stop();
            #[cfg(feature = "defmt")]
            defmt::debug!("bus: register phase of read not acknowledged by 0x{:02X}", address);
            return Err(BusError::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        // Manual stop to leave repeat mode before the counted read
        let mode = self.mode();
        self.set_mode(mode | Mode::STOP);
        self.wait_stop_cleared();

        self.receive_counted(count, buffer)
    }

    /// Read without a register phase (plain receive from the device's current pointer)
    ///
    /// # Errors
    ///
    /// Same as [`BusMaster::read_bytes`].
    pub fn receive(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), BusError> {
        if buffer.is_empty() {
            return Ok(());
        }
        let count = u16::try_from(buffer.len()).map_err(|_| BusError::TransferTooLong)?;
        self.controller
            .write(ControllerRegister::SlaveAddress, u16::from(address));
        self.wait_stop_cleared();
        self.wait_bus_idle();
        self.receive_counted(count, buffer)
    }

    pub(crate) fn write_with_retry<I>(&mut self, address: u8, frame: I) -> Result<(), BusError>
    where
        I: Iterator<Item = u8> + Clone,
    {
        let mut retries = 0;
        loop {
            match self.write_frame(address, frame.clone()) {
                Err(BusError::NoAcknowledge(NoAcknowledgeSource::Address))
                    if retries < WRITE_NACK_RETRIES =>
                {
                    retries += 1;
                    #[cfg(feature = "defmt")]
                    defmt::warn!("bus: write to 0x{:02X} not acknowledged, retrying", address);
                }
                result => return result,
            }
        }
    }

    /// One streamed write; the first byte of `frame` is the register address
    fn write_frame<I>(&mut self, address: u8, mut frame: I) -> Result<(), BusError>
    where
        I: Iterator<Item = u8>,
    {
        let Some(register) = frame.next() else {
            return Ok(());
        };

        self.begin(address, Mode::TRANSMIT_START)?;
        self.wait_until(Status::REGISTERS_READY);
        self.controller
            .write(ControllerRegister::DataTransmit, u16::from(register));
        self.wait_until(Status::REGISTERS_READY);

        if self.status().contains(Status::NACK) {
            self.clear_status(Status::NACK);
            self.send_stop();
            return Err(BusError::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for byte in frame {
            self.wait_until(Status::REGISTERS_READY | Status::TRANSMIT_READY);
            self.controller
                .write(ControllerRegister::DataTransmit, u16::from(byte));

            if self.status().contains(Status::NACK) {
                self.clear_status(Status::NACK);
                self.set_mode(Mode::empty());
                #[cfg(feature = "defmt")]
                defmt::warn!("bus: payload byte to 0x{:02X} not acknowledged", address);
                return Err(BusError::NoAcknowledge(NoAcknowledgeSource::Data));
            }
        }

        self.send_stop();
        Ok(())
    }

    /// Counted, non-repeat receive with automatic stop
    fn receive_counted(&mut self, count: u16, buffer: &mut [u8]) -> Result<(), BusError> {
        self.controller.write(ControllerRegister::Count, count);
        self.set_mode(Mode::COUNTED_RECEIVE);
        self.check_arbitration()?;

        for byte in buffer.iter_mut() {
            self.poll_until(Status::RECEIVE_READY)?;
            let word = self.controller.read(ControllerRegister::DataReceive);
            *byte = word.to_be_bytes()[1];
        }

        self.wait_master_released();
        Ok(())
    }

    /// Load the target address, wait for the previous stop and an idle bus, issue `mode`
    fn begin(&mut self, address: u8, mode: Mode) -> Result<(), BusError> {
        self.controller
            .write(ControllerRegister::SlaveAddress, u16::from(address));
        self.wait_stop_cleared();
        self.wait_bus_idle();
        self.set_mode(mode);
        self.check_arbitration()
    }

    fn check_arbitration(&mut self) -> Result<(), BusError> {
        if self.status().contains(Status::ARBITRATION_LOST) {
            self.clear_status(Status::ARBITRATION_LOST);
            #[cfg(feature = "defmt")]
            defmt::warn!("bus: arbitration lost");
            return Err(BusError::ArbitrationLoss);
        }
        Ok(())
    }

    fn send_stop(&mut self) {
        self.set_mode(Mode::TRANSMIT_STOP);
        self.wait_stop_detected();
        self.wait_master_released();
    }

    /// Reset and re-initialize after a read poll expired
    fn recover(&mut self) {
        self.clear_status(Status::REGISTERS_READY);
        let mode = self.mode();
        self.set_mode(mode | Mode::STOP);
        self.set_mode(Mode::empty());
        self.initialize();
        for _ in 0..self.timing.recovery_settle_spins {
            spin_loop();
        }
    }

    /// Bounded poll (read path)
    fn poll_until(&mut self, flags: Status) -> Result<(), BusError> {
        for _ in 0..self.timing.ready_poll_limit {
            if self.status().intersects(flags) {
                return Ok(());
            }
        }
        #[cfg(feature = "defmt")]
        defmt::error!(
            "bus: controller not ready after {} polls, recovering",
            self.timing.ready_poll_limit
        );
        self.recover();
        Err(BusError::Timeout)
    }

    // Unbounded spins below: hardware-resolved flags, see module docs.

    fn wait_until(&mut self, flags: Status) {
        while !self.status().intersects(flags) {
            spin_loop();
        }
    }

    fn wait_stop_cleared(&mut self) {
        while self.mode().contains(Mode::STOP) {
            spin_loop();
        }
    }

    fn wait_bus_idle(&mut self) {
        while self.status().contains(Status::BUS_BUSY) {
            spin_loop();
        }
    }

    fn wait_stop_detected(&mut self) {
        self.wait_until(Status::STOP_DETECTED);
        self.clear_status(Status::STOP_DETECTED);
    }

    fn wait_master_released(&mut self) {
        while self.mode().contains(Mode::MASTER) {
            spin_loop();
        }
    }

    fn mode(&mut self) -> Mode {
        Mode::from_bits_retain(self.controller.read(ControllerRegister::Mode))
    }

    fn set_mode(&mut self, mode: Mode) {
        self.controller.write(ControllerRegister::Mode, mode.bits());
    }

    fn status(&mut self) -> Status {
        Status::from_bits_retain(self.controller.read(ControllerRegister::Status))
    }

    fn clear_status(&mut self, flags: Status) {
        self.controller
            .write(ControllerRegister::Status, flags.bits());
    }
}

impl<C> RegisterBus for BusMaster<C>
where
    C: ControllerRegisters,
{
    type Error = BusError;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        BusMaster::initialize(self);
        Ok(())
    }

    fn write_bytes(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        BusMaster::write_bytes(self, address, register, data)
    }

    fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        BusMaster::read_bytes(self, address, register, buffer)
    }
}
