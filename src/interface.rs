//! Register-level access to the MPU-6050
//!
//! [`DeviceInterface`] pairs a [`RegisterBus`] with the [`RegisterMap`] so the
//! layers above can speak in register names and bit fields instead of bus
//! addresses.

use crate::Error;
use crate::bits::BitField;
use crate::bus::RegisterBus;
use crate::registers::RegisterMap;

/// Register I/O bound to one device on a bus
pub struct DeviceInterface<B> {
    bus: B,
    map: RegisterMap,
}

impl<B> DeviceInterface<B>
where
    B: RegisterBus,
{
    /// Create an interface for the MPU-6050 at its default address (0x68)
    pub const fn new(bus: B) -> Self {
        Self::with_map(bus, RegisterMap::MPU6050)
    }

    /// Create an interface with a custom register map (e.g. AD0 high)
    pub const fn with_map(bus: B, map: RegisterMap) -> Self {
        Self { bus, map }
    }

    /// Register map in use
    pub const fn map(&self) -> &RegisterMap {
        &self.map
    }

    /// Consume the interface and return the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Bring up the underlying bus hardware
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to initialize.
    pub fn initialize_bus(&mut self) -> Result<(), Error<B::Error>> {
        self.bus.initialize()?;
        Ok(())
    }

    /// Write one register
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Error<B::Error>> {
        self.bus
            .write_byte(self.map.device_address, register, value)?;
        Ok(())
    }

    /// Write consecutive registers starting at `register`
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn write_bytes(&mut self, register: u8, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.bus
            .write_bytes(self.map.device_address, register, data)?;
        Ok(())
    }

    /// Read one register
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_byte(&mut self, register: u8) -> Result<u8, Error<B::Error>> {
        Ok(self.bus.read_byte(self.map.device_address, register)?)
    }

    /// Read consecutive registers starting at `register`
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_bytes(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<B::Error>> {
        self.bus
            .read_bytes(self.map.device_address, register, buffer)?;
        Ok(())
    }

    /// Read a big-endian 16-bit register pair
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_i16(&mut self, register: u8) -> Result<i16, Error<B::Error>> {
        let mut buffer = [0u8; 2];
        self.read_bytes(register, &mut buffer)?;
        Ok(i16::from_be_bytes(buffer))
    }

    /// Write a big-endian 16-bit register pair
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn write_i16(&mut self, register: u8, value: i16) -> Result<(), Error<B::Error>> {
        self.write_bytes(register, &value.to_be_bytes())
    }

    /// Read a field, right-aligned
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_field(&mut self, field: BitField) -> Result<u8, Error<B::Error>> {
        Ok(self.bus.read_field(self.map.device_address, field)?)
    }

    /// Read-modify-write a field
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn write_field(&mut self, field: BitField, value: u8) -> Result<(), Error<B::Error>> {
        self.bus
            .write_bit_field(self.map.device_address, field, value)?;
        Ok(())
    }

    /// Set or clear a single-bit field
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn write_flag(&mut self, field: BitField, set: bool) -> Result<(), Error<B::Error>> {
        self.bus.write_bit(self.map.device_address, field, set)?;
        Ok(())
    }

    /// Read a single-bit field
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_flag(&mut self, field: BitField) -> Result<bool, Error<B::Error>> {
        Ok(self.bus.read_bit(self.map.device_address, field)?)
    }

    /// Read-modify-write `width` bits at MSB-first position `start` of `register`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBitField`] unless `width >= 1` and `start + width <= 8`;
    /// otherwise returns an error on bus failure.
    pub fn write_bits(
        &mut self,
        register: u8,
        start: u8,
        width: u8,
        value: u8,
    ) -> Result<(), Error<B::Error>> {
        let field = BitField::try_new(register, start, width).ok_or(Error::InvalidBitField)?;
        self.write_field(field, value)
    }

    /// Read `width` bits at MSB-first position `start` of `register`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBitField`] for an invalid field shape, or a bus error.
    pub fn read_bits(&mut self, register: u8, start: u8, width: u8) -> Result<u8, Error<B::Error>> {
        let field = BitField::try_new(register, start, width).ok_or(Error::InvalidBitField)?;
        self.read_field(field)
    }

    /// Select a DMP memory bank
    ///
    /// `BANK_SEL` packs the bank number in bits 0..=4, the user-bank flag in
    /// bit 5 and the prefetch flag in bit 6.
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn select_memory_bank(
        &mut self,
        bank: u8,
        prefetch: bool,
        user_bank: bool,
    ) -> Result<(), Error<B::Error>> {
        let mut value = bank & 0x1F;
        if user_bank {
            value |= 0x20;
        }
        if prefetch {
            value |= 0x40;
        }
        self.write_byte(self.map.registers.bank_sel, value)
    }

    /// Set the start address within the selected DMP memory bank
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn set_memory_start_address(&mut self, address: u8) -> Result<(), Error<B::Error>> {
        self.write_byte(self.map.registers.mem_start_addr, address)
    }
}
