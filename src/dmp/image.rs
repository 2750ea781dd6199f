//! DMP configuration image records
//!
//! An image is a flat byte stream of records. Each record starts with
//! `bank, offset, length`. A non-zero length is followed by that many data
//! bytes to place at `(bank, offset)`. A zero length is followed by a single
//! special opcode with no payload.

/// Image parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// A record header or payload runs past the end of the stream
    Truncated {
        /// Byte position of the record that is incomplete
        position: usize,
    },
}

/// Named side-effect operations triggered by special records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SpecialOp {
    /// Enable the DMP interrupt sources in `INT_ENABLE`
    EnableInterrupts = 0x01,
}

impl TryFrom<u8> for SpecialOp {
    type Error = u8;

    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        match opcode {
            0x01 => Ok(Self::EnableInterrupts),
            other => Err(other),
        }
    }
}

/// One image record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Bytes to write at `(bank, offset)`
    Block {
        /// Memory bank
        bank: u8,
        /// Start offset within the bank
        offset: u8,
        /// Payload, never empty
        data: &'a [u8],
    },
    /// Special opcode sentinel
    Special {
        /// Raw opcode, see [`SpecialOp`]
        opcode: u8,
    },
}

/// A validated record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareImage<'a> {
    bytes: &'a [u8],
}

impl<'a> FirmwareImage<'a> {
    /// Validate `bytes` as a complete record stream
    ///
    /// # Errors
    ///
    /// [`ImageError::Truncated`] if any record is incomplete.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ImageError> {
        let mut records = Records { bytes, position: 0 };
        while records.position < bytes.len() {
            records.next_record()?;
        }
        Ok(Self { bytes })
    }

    /// Empty image
    #[must_use]
    pub const fn empty() -> Self {
        Self { bytes: &[] }
    }

    /// Raw stream
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Iterate records in order
    #[must_use]
    pub const fn records(&self) -> Records<'a> {
        Records {
            bytes: self.bytes,
            position: 0,
        }
    }
}

/// Iterator over the records of a [`FirmwareImage`]
#[derive(Debug, Clone)]
pub struct Records<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Records<'a> {
    fn next_record(&mut self) -> Result<Record<'a>, ImageError> {
        let start = self.position;
        let truncated = ImageError::Truncated { position: start };

        let header = self.bytes.get(start..start + 3).ok_or(truncated)?;
        let (bank, offset, length) = (header[0], header[1], usize::from(header[2]));
        let body = start + 3;

        if length == 0 {
            let opcode = *self.bytes.get(body).ok_or(truncated)?;
            self.position = body + 1;
            return Ok(Record::Special { opcode });
        }

        let data = self.bytes.get(body..body + length).ok_or(truncated)?;
        self.position = body + length;
        Ok(Record::Block { bank, offset, data })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.bytes.len() {
            return None;
        }
        // Streams are validated in `FirmwareImage::parse`; stop rather than panic otherwise
        self.next_record().ok()
    }
}
