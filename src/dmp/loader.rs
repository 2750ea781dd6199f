//! DMP memory programming
//!
//! The DMP's memory is reached through three registers: `BANK_SEL` picks a
//! 256-byte bank, `MEM_START_ADDR` sets the offset within it, and `MEM_R_W`
//! streams bytes from there with auto-increment. Uploads are split into
//! chunks of at most [`MEMORY_CHUNK_SIZE`] bytes that never cross a bank
//! boundary; the bank and offset are reselected before every chunk.

use super::image::{FirmwareImage, Record, SpecialOp};
use crate::Error;
use crate::bus::RegisterBus;
use crate::interface::DeviceInterface;

/// Maximum bytes per `MEM_R_W` write
pub const MEMORY_CHUNK_SIZE: usize = 16;

/// DMP memory bank size in bytes
pub const MEMORY_BANK_SIZE: usize = 256;

/// Number of addressable memory banks
pub const MEMORY_BANKS: usize = 32;

/// Reasons a DMP upload or bring-up can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmpFailure {
    /// A bus transfer failed
    Bus,
    /// Read-back differed from what was written
    VerifyMismatch {
        /// Bank of the failing chunk
        bank: u8,
        /// Offset of the failing chunk
        offset: u8,
    },
    /// A special record carried an opcode with no known action
    UnknownSpecial(u8),
    /// The block would run past the last memory bank
    OutOfRange {
        /// Requested bank
        bank: u8,
        /// Requested offset
        offset: u8,
        /// Requested length
        len: usize,
    },
}

/// Uploads program and configuration data into DMP memory
pub struct FirmwareProgrammer<'a, B> {
    io: &'a mut DeviceInterface<B>,
}

impl<'a, B> FirmwareProgrammer<'a, B>
where
    B: RegisterBus,
{
    /// Borrow a device interface for programming
    pub fn new(io: &'a mut DeviceInterface<B>) -> Self {
        Self { io }
    }

    /// Write `data` starting at `(bank, offset)`, optionally reading each chunk back
    ///
    /// The whole block is checked against the memory size before any bus
    /// traffic. A verify mismatch aborts the block; there is no partial
    /// success, the caller restarts the whole block.
    ///
    /// # Errors
    ///
    /// [`Error::FirmwareUpload`] with [`DmpFailure::OutOfRange`] or
    /// [`DmpFailure::VerifyMismatch`], or a bus error.
    pub fn upload_memory_block(
        &mut self,
        data: &[u8],
        bank: u8,
        offset: u8,
        verify: bool,
    ) -> Result<(), Error<B::Error>> {
        if data.is_empty() {
            return Ok(());
        }
        let start = usize::from(bank) * MEMORY_BANK_SIZE + usize::from(offset);
        if start + data.len() > MEMORY_BANKS * MEMORY_BANK_SIZE {
            return Err(Error::FirmwareUpload(DmpFailure::OutOfRange {
                bank,
                offset,
                len: data.len(),
            }));
        }

        let mem_r_w = self.io.map().registers.mem_r_w;
        let mut bank = bank;
        let mut offset = offset;
        let mut readback = [0u8; MEMORY_CHUNK_SIZE];
        let mut remaining = data;

        self.select(bank, offset)?;
        while !remaining.is_empty() {
            let room = MEMORY_BANK_SIZE - usize::from(offset);
            let len = MEMORY_CHUNK_SIZE.min(remaining.len()).min(room);
            let (chunk, rest) = remaining.split_at(len);

            self.io.write_bytes(mem_r_w, chunk)?;

            if verify {
                self.select(bank, offset)?;
                let readback = &mut readback[..len];
                self.io.read_bytes(mem_r_w, readback)?;
                if readback != chunk {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("dmp: verify mismatch at bank {} offset {}", bank, offset);
                    return Err(Error::FirmwareUpload(DmpFailure::VerifyMismatch {
                        bank,
                        offset,
                    }));
                }
            }

            remaining = rest;
            #[allow(clippy::cast_possible_truncation)]
            {
                offset = offset.wrapping_add(len as u8);
            }
            if !remaining.is_empty() {
                if offset == 0 {
                    bank += 1;
                }
                self.select(bank, offset)?;
            }
        }

        Ok(())
    }

    /// Apply every record of a configuration image in order
    ///
    /// Blocks are written with verify. The first failing record aborts the
    /// image; nothing is rolled back.
    ///
    /// # Errors
    ///
    /// [`Error::FirmwareUpload`] with [`DmpFailure::UnknownSpecial`] for an
    /// unrecognized opcode, or any error from
    /// [`FirmwareProgrammer::upload_memory_block`].
    pub fn upload_firmware_image(
        &mut self,
        image: &FirmwareImage<'_>,
    ) -> Result<(), Error<B::Error>> {
        for record in image.records() {
            match record {
                Record::Block { bank, offset, data } => {
                    self.upload_memory_block(data, bank, offset, true)?;
                }
                Record::Special { opcode } => {
                    let op = SpecialOp::try_from(opcode)
                        .map_err(|op| Error::FirmwareUpload(DmpFailure::UnknownSpecial(op)))?;
                    self.apply_special(op)?;
                }
            }
        }
        Ok(())
    }

    fn apply_special(&mut self, op: SpecialOp) -> Result<(), Error<B::Error>> {
        match op {
            SpecialOp::EnableInterrupts => {
                let map = *self.io.map();
                self.io
                    .write_byte(map.registers.int_enable, map.dmp_interrupt_sources)
            }
        }
    }

    fn select(&mut self, bank: u8, offset: u8) -> Result<(), Error<B::Error>> {
        self.io.select_memory_bank(bank, false, false)?;
        self.io.set_memory_start_address(offset)
    }
}
