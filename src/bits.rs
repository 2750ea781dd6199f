//! Bit-field descriptors for 8-bit device registers
//!
//! Fields are addressed MSB-first: start bit 0 is the most significant bit of
//! the register byte. A field of `width` bits starting at `start` covers the
//! bit positions `start..start + width` counted from the left.

/// A contiguous run of bits inside one 8-bit register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    register: u8,
    start: u8,
    width: u8,
}

impl BitField {
    /// Build a field for a constant register table
    ///
    /// Use [`BitField::try_new`] for runtime input.
    ///
    /// # Panics
    ///
    /// Panics unless `width >= 1` and `start + width <= 8`. In a `const`
    /// context this is a compile error instead.
    #[must_use]
    pub const fn new(register: u8, start: u8, width: u8) -> Self {
        assert!(width >= 1 && start as u16 + width as u16 <= 8);
        Self {
            register,
            start,
            width,
        }
    }

    /// Build a field from runtime values
    ///
    /// Returns `None` unless `width >= 1` and `start + width <= 8`.
    #[must_use]
    pub const fn try_new(register: u8, start: u8, width: u8) -> Option<Self> {
        if width == 0 || start as u16 + width as u16 > 8 {
            return None;
        }
        Some(Self {
            register,
            start,
            width,
        })
    }

    /// Single-bit field at MSB-first position `bit`
    #[must_use]
    pub const fn bit(register: u8, bit: u8) -> Option<Self> {
        Self::try_new(register, bit, 1)
    }

    /// Register address the field lives in
    #[must_use]
    pub const fn register(self) -> u8 {
        self.register
    }

    /// MSB-first start position
    #[must_use]
    pub const fn start(self) -> u8 {
        self.start
    }

    /// Field width in bits
    #[must_use]
    pub const fn width(self) -> u8 {
        self.width
    }

    const fn shift(self) -> u8 {
        8 - self.start - self.width
    }

    /// Mask of the bits covered by the field, in register position
    #[must_use]
    pub const fn mask(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let ones = ((1u16 << self.width) - 1) as u8;
        ones << self.shift()
    }

    /// Replace the field inside `byte` with the low `width` bits of `value`
    ///
    /// Bits outside the field are returned unchanged.
    #[must_use]
    pub const fn insert(self, byte: u8, value: u8) -> u8 {
        let mask = self.mask();
        #[allow(clippy::cast_possible_truncation)]
        let placed = ((value as u16) << self.shift()) as u8;
        (byte & !mask) | (placed & mask)
    }

    /// Extract the field value from `byte`, right-aligned
    #[must_use]
    pub const fn extract(self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.shift()
    }
}
