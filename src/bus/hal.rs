//! `embedded-hal` glue in both directions
//!
//! - [`BusMaster`] implements [`embedded_hal::i2c::I2c`], so other drivers can
//!   share the bit-level master. A write followed by a read is sent as stop
//!   then start, never as a repeated start.
//! - [`I2cBus`] adapts any `embedded-hal` I2C implementation to
//!   [`RegisterBus`], so the device layer can run on a vendor HAL instead.

use super::{BusError, BusMaster, ControllerRegisters, RegisterBus};
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

impl<C: ControllerRegisters> ErrorType for BusMaster<C> {
    type Error = BusError;
}

impl<C: ControllerRegisters> I2c<SevenBitAddress> for BusMaster<C> {
    /// Adjacent writes are merged into one streamed frame. Reads are counted
    /// receives that end with a stop, so a write-then-read pair becomes the
    /// stop/start sequence the MPU-6050 expects.
    ///
    /// This does not meet the `I2c` contract, which asks for a repeated start
    /// between operations of different types. Devices that lose their
    /// register pointer on a stop cannot be read through `write_read` here.
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut index = 0;
        while index < operations.len() {
            if let Operation::Read(buffer) = &mut operations[index] {
                self.receive(address, buffer)?;
                index += 1;
                continue;
            }

            let run_end = operations[index..]
                .iter()
                .position(|op| matches!(op, Operation::Read(_)))
                .map_or(operations.len(), |offset| index + offset);
            let frame = operations[index..run_end].iter().flat_map(|op| match op {
                Operation::Write(bytes) => bytes.iter().copied(),
                Operation::Read(_) => (&[] as &[u8]).iter().copied(),
            });
            self.write_with_retry(address, frame)?;
            index = run_end;
        }
        Ok(())
    }
}

/// [`RegisterBus`] over an `embedded-hal` I2C bus
pub struct I2cBus<I2C> {
    i2c: I2C,
}

impl<I2C> I2cBus<I2C> {
    /// Wrap an I2C peripheral
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consume the adapter and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterBus for I2cBus<I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = E;

    // Peripheral setup belongs to the HAL
    fn initialize(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write_bytes(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.transaction(
            address,
            &mut [Operation::Write(&[register]), Operation::Write(data)],
        )
    }

    fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.write_read(address, &[register], buffer)
    }
}
