//! Digital Motion Processor support
//!
//! The DMP has no resident firmware. On every power-up the host writes the
//! program into the DMP's banked memory, applies a stream of configuration
//! records, and points the DMP at the program start before enabling it.
//!
//! - [`image`]: configuration record stream
//! - [`loader`]: chunked, verified memory upload
//! - [`config`]: bring-up settings and firmware inputs
//! - [`packet`]: packet decoding and orientation math

pub mod config;
pub mod image;
pub mod loader;
pub mod packet;

pub use config::{DEFAULT_PROGRAM_START, DmpConfig, DmpFirmware};
pub use image::{FirmwareImage, ImageError, Record, Records, SpecialOp};
pub use loader::{DmpFailure, FirmwareProgrammer, MEMORY_BANK_SIZE, MEMORY_BANKS, MEMORY_CHUNK_SIZE};
pub use packet::{Gravity, MotionApps20, OrientationMath, Quaternion, Vector3, YawPitchRoll};
