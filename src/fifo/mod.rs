//! FIFO framing for DMP output
//!
//! With the DMP running, the FIFO carries fixed-size packets. The byte count
//! is read from `FIFO_COUNTH`/`FIFO_COUNTL`; a full FIFO wraps and corrupts
//! packet alignment, so the acquisition loop resets it before the count gets
//! there.

/// FIFO capacity in bytes
pub const FIFO_SIZE: u16 = 1024;

/// Size of one MotionApps 2.0 packet
pub const FIFO_PACKET_SIZE: usize = 42;

/// Byte count at which buffered data is treated as overflowed
pub const DEFAULT_OVERFLOW_THRESHOLD: u16 = FIFO_SIZE;

/// One raw DMP packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoPacket {
    bytes: [u8; FIFO_PACKET_SIZE],
}

impl FifoPacket {
    /// Wrap packet bytes as read from `FIFO_R_W`
    #[must_use]
    pub const fn new(bytes: [u8; FIFO_PACKET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FIFO_PACKET_SIZE] {
        &self.bytes
    }

    /// Big-endian signed 16-bit word at `offset`
    ///
    /// Returns 0 past the end of the packet.
    #[must_use]
    pub fn i16_at(&self, offset: usize) -> i16 {
        match self.bytes.get(offset..offset + 2) {
            Some(&[high, low]) => i16::from_be_bytes([high, low]),
            _ => 0,
        }
    }
}

impl From<[u8; FIFO_PACKET_SIZE]> for FifoPacket {
    fn from(bytes: [u8; FIFO_PACKET_SIZE]) -> Self {
        Self::new(bytes)
    }
}
