//! High-level driver: setup and acquisition
//!
//! [`Mpu6050Driver`] owns the device interface and walks the device through
//! `Disconnected → Connected → DmpReady`. Once the DMP is running it streams
//! packets out of the FIFO and converts them into [`Sample`]s.

use crate::bus::RegisterBus;
use crate::dmp::{
    DmpConfig, DmpFailure, DmpFirmware, FirmwareProgrammer, MotionApps20, OrientationMath,
};
use crate::fifo::{DEFAULT_OVERFLOW_THRESHOLD, FIFO_PACKET_SIZE, FifoPacket};
use crate::interface::DeviceInterface;
use crate::interrupt::InterruptStatus;
use crate::registers::RegisterMap;
use crate::sample::{
    Sample, SampleAccumulator, SampleStatus, celsius_from_raw, degrees, fahrenheit_from_celsius,
};
use crate::{DeviceStatus, Error};
use embedded_hal::delay::DelayNs;
use libm::sqrtf;

/// Identity retries made by `setup` before giving up
pub const DEFAULT_IDENTITY_RETRIES: u16 = 600;

/// Settling time after a device reset
const RESET_DELAY_MS: u32 = 30;

/// Acquisition loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Extra `WHO_AM_I` reads after the first one fails
    pub identity_retries: u16,
    /// FIFO byte count treated as overflow
    pub overflow_threshold: u16,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            identity_retries: DEFAULT_IDENTITY_RETRIES,
            overflow_threshold: DEFAULT_OVERFLOW_THRESHOLD,
        }
    }
}

impl AcquisitionConfig {
    /// Set the identity retry ceiling
    #[must_use]
    pub const fn with_identity_retries(mut self, retries: u16) -> Self {
        self.identity_retries = retries;
        self
    }

    /// Set the overflow threshold
    #[must_use]
    pub const fn with_overflow_threshold(mut self, threshold: u16) -> Self {
        self.overflow_threshold = threshold;
        self
    }
}

/// MPU-6050 driver with DMP sensor fusion
pub struct Mpu6050Driver<B, M = MotionApps20> {
    io: DeviceInterface<B>,
    math: M,
    dmp_config: DmpConfig,
    config: AcquisitionConfig,
    status: DeviceStatus,
}

impl<B> Mpu6050Driver<B, MotionApps20>
where
    B: RegisterBus,
{
    /// Create a driver for the MPU-6050 at 0x68 with default settings
    ///
    /// Nothing is sent on the bus until [`Mpu6050Driver::setup`].
    pub fn new(bus: B) -> Self {
        Self::with_math(DeviceInterface::new(bus), MotionApps20)
    }
}

impl<B, M> Mpu6050Driver<B, M>
where
    B: RegisterBus,
    M: OrientationMath,
{
    /// Create a driver over an existing interface with custom orientation math
    pub fn with_math(io: DeviceInterface<B>, math: M) -> Self {
        Self {
            io,
            math,
            dmp_config: DmpConfig::default(),
            config: AcquisitionConfig::default(),
            status: DeviceStatus::Disconnected,
        }
    }

    /// Replace the sensor/DMP settings used by the next `setup`
    #[must_use]
    pub fn with_dmp_config(mut self, config: DmpConfig) -> Self {
        self.dmp_config = config;
        self
    }

    /// Replace the acquisition settings
    #[must_use]
    pub fn with_acquisition_config(mut self, config: AcquisitionConfig) -> Self {
        self.config = config;
        self
    }

    /// Current lifecycle state
    pub const fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Sensor/DMP settings
    pub const fn dmp_config(&self) -> &DmpConfig {
        &self.dmp_config
    }

    /// Register map in use
    pub const fn map(&self) -> &RegisterMap {
        self.io.map()
    }

    /// Direct register access
    pub fn interface(&mut self) -> &mut DeviceInterface<B> {
        &mut self.io
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> B {
        self.io.release()
    }

    /// Bring the device from power-up to a running DMP
    ///
    /// Initializes the bus, waits for the identity register, configures the
    /// sensors, uploads `firmware` with verification and starts the DMP with
    /// the FIFO enabled. On failure the whole sequence must be rerun; partial
    /// DMP state is never reused.
    ///
    /// # Errors
    ///
    /// - [`Error::Bus`] if the bus itself cannot be initialized
    /// - [`Error::DeviceNotResponding`] if the identity never matched
    /// - [`Error::DmpInitFailed`] for any failure after the device answered
    pub fn setup<D>(
        &mut self,
        firmware: &DmpFirmware<'_>,
        delay: &mut D,
    ) -> Result<(), Error<B::Error>>
    where
        D: DelayNs,
    {
        self.status = DeviceStatus::Disconnected;
        self.io.initialize_bus()?;

        if !self.wait_for_identity() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "setup: no identity after {} attempts",
                u32::from(self.config.identity_retries) + 1
            );
            return Err(Error::DeviceNotResponding);
        }
        self.status = DeviceStatus::Connected;

        self.start_dmp(firmware, delay).map_err(|error| match error {
            Error::Bus(_) => Error::DmpInitFailed(DmpFailure::Bus),
            Error::FirmwareUpload(failure) => Error::DmpInitFailed(failure),
            other => other,
        })?;

        self.status = DeviceStatus::DmpReady;
        #[cfg(feature = "defmt")]
        defmt::info!("setup: DMP running");
        Ok(())
    }

    fn wait_for_identity(&mut self) -> bool {
        for _attempt in 0..=self.config.identity_retries {
            if matches!(self.check_identity(), Ok(true)) {
                return true;
            }
        }
        false
    }

    fn start_dmp<D>(
        &mut self,
        firmware: &DmpFirmware<'_>,
        delay: &mut D,
    ) -> Result<(), Error<B::Error>>
    where
        D: DelayNs,
    {
        let fields = self.io.map().fields;
        let registers = self.io.map().registers;
        let config = self.dmp_config;

        self.io.write_flag(fields.device_reset, true)?;
        delay.delay_ms(RESET_DELAY_MS);
        self.io.write_flag(fields.sleep, false)?;
        self.io
            .write_field(fields.clock_source, config.clock_source.bits())?;
        self.io
            .write_byte(registers.smplrt_div, config.sample_rate_divider)?;
        self.io.write_field(fields.dlpf, config.dlpf.bits())?;
        self.io
            .write_field(fields.gyro_full_scale, config.gyro_range.bits())?;
        self.io
            .write_field(fields.accel_full_scale, config.accel_range.bits())?;

        #[cfg(feature = "defmt")]
        defmt::debug!("setup: uploading {} program bytes", firmware.program.len());
        let mut programmer = FirmwareProgrammer::new(&mut self.io);
        programmer.upload_memory_block(firmware.program, 0, 0, true)?;
        programmer.upload_firmware_image(&firmware.configuration)?;

        self.io
            .write_bytes(registers.dmp_cfg_1, &config.program_start.to_be_bytes())?;

        self.io.write_flag(fields.fifo_enable, true)?;
        self.io.write_flag(fields.dmp_enable, true)?;
        self.reset_fifo()
    }

    /// Read one fused sample
    ///
    /// Spins on the FIFO count until a whole packet is buffered. If the
    /// overflow flag is set or the count reached the overflow threshold, the
    /// FIFO is reset and the wait starts over; stale data is never returned.
    ///
    /// # Errors
    ///
    /// [`Error::NotReady`] before a successful `setup`, or a bus error.
    pub fn read_sample(&mut self) -> Result<Sample, Error<B::Error>> {
        if self.status != DeviceStatus::DmpReady {
            return Err(Error::NotReady);
        }

        let packet = self.next_packet()?;
        let temperature_f = self.read_temperature_fahrenheit()?;
        Ok(self.convert(&packet, temperature_f))
    }

    /// Mean of `count` consecutive samples
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSampleCount`] when `count` is zero, otherwise as
    /// [`Mpu6050Driver::read_sample`].
    pub fn read_averaged_sample(&mut self, count: u32) -> Result<Sample, Error<B::Error>> {
        let mut accumulator = SampleAccumulator::new();
        for _ in 0..count {
            let sample = self.read_sample()?;
            accumulator.add(&sample);
        }
        accumulator.mean().ok_or(Error::InvalidSampleCount)
    }

    fn next_packet(&mut self) -> Result<FifoPacket, Error<B::Error>> {
        loop {
            // Unbounded: the DMP keeps producing packets at the configured rate
            let mut count = self.fifo_count()?;
            while usize::from(count) < FIFO_PACKET_SIZE {
                count = self.fifo_count()?;
            }

            if self.fifo_overflowed()? || count >= self.config.overflow_threshold {
                #[cfg(feature = "defmt")]
                defmt::warn!("fifo: overflow at {} bytes, resetting", count);
                self.reset_fifo()?;
                continue;
            }

            let mut bytes = [0u8; FIFO_PACKET_SIZE];
            self.io
                .read_bytes(self.io.map().registers.fifo_r_w, &mut bytes)?;
            return Ok(FifoPacket::new(bytes));
        }
    }

    /// Reads (and so clears) `INT_STATUS`, testing the map's overflow field
    fn fifo_overflowed(&mut self) -> Result<bool, Error<B::Error>> {
        let map = *self.io.map();
        let raw = self.io.read_byte(map.registers.int_status)?;
        Ok(map.fields.fifo_overflow.extract(raw) != 0)
    }

    fn convert(&self, packet: &FifoPacket, temperature_f: f32) -> Sample {
        let quaternion = self.math.quaternion(packet);
        let gravity = self.math.gravity(&quaternion);
        let accel = self.math.raw_accel(packet);
        let gyro = self.math.raw_gyro(packet);
        let ypr = self.math.yaw_pitch_roll(&quaternion, &gravity);

        let accel_range = self.dmp_config.accel_range;
        let gyro_range = self.dmp_config.gyro_range;
        let accel_x = accel_range.to_g(accel.x) - gravity.x;
        let accel_y = accel_range.to_g(accel.y) - gravity.y;
        let accel_z = accel_range.to_g(accel.z) - gravity.z;

        Sample {
            status: SampleStatus::Valid,
            roll: degrees(ypr.roll),
            pitch: degrees(ypr.pitch),
            yaw: degrees(ypr.yaw),
            roll_rate: gyro_range.to_dps(gyro.x),
            pitch_rate: gyro_range.to_dps(gyro.y),
            yaw_rate: gyro_range.to_dps(gyro.z),
            accel_x,
            accel_y,
            accel_z,
            accel_magnitude: sqrtf(accel_x * accel_x + accel_y * accel_y + accel_z * accel_z),
            temperature_f,
        }
    }

    /// Bytes currently buffered in the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn fifo_count(&mut self) -> Result<u16, Error<B::Error>> {
        let mut bytes = [0u8; 2];
        self.io
            .read_bytes(self.io.map().registers.fifo_count_h, &mut bytes)?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Discard everything in the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn reset_fifo(&mut self) -> Result<(), Error<B::Error>> {
        let field = self.io.map().fields.fifo_reset;
        self.io.write_flag(field, true)
    }

    /// Reset the DMP's internal state without reloading firmware
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn reset_dmp(&mut self) -> Result<(), Error<B::Error>> {
        let field = self.io.map().fields.dmp_reset;
        self.io.write_flag(field, true)
    }

    /// Read and clear `INT_STATUS`
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn interrupt_status(&mut self) -> Result<InterruptStatus, Error<B::Error>> {
        let raw = self.io.read_byte(self.io.map().registers.int_status)?;
        Ok(InterruptStatus::from_raw(raw))
    }

    /// Raw die temperature
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_temperature_raw(&mut self) -> Result<i16, Error<B::Error>> {
        self.io.read_i16(self.io.map().registers.temp_out_h)
    }

    /// Die temperature in °C
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_temperature_celsius(&mut self) -> Result<f32, Error<B::Error>> {
        Ok(celsius_from_raw(self.read_temperature_raw()?))
    }

    /// Die temperature in °F
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn read_temperature_fahrenheit(&mut self) -> Result<f32, Error<B::Error>> {
        Ok(fahrenheit_from_celsius(self.read_temperature_celsius()?))
    }

    /// Whether `WHO_AM_I` matches the expected identity
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn check_identity(&mut self) -> Result<bool, Error<B::Error>> {
        let map = *self.io.map();
        Ok(self.io.read_byte(map.registers.who_am_i)? == map.identity)
    }

    /// Write the gyroscope user offsets (X, Y, Z)
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn set_gyro_offsets(&mut self, x: i16, y: i16, z: i16) -> Result<(), Error<B::Error>> {
        let registers = self.io.map().registers;
        self.io.write_i16(registers.xg_offset_h, x)?;
        self.io.write_i16(registers.yg_offset_h, y)?;
        self.io.write_i16(registers.zg_offset_h, z)
    }

    /// Write the accelerometer offsets (X, Y, Z)
    ///
    /// # Errors
    ///
    /// Returns an error on bus failure.
    pub fn set_accel_offsets(&mut self, x: i16, y: i16, z: i16) -> Result<(), Error<B::Error>> {
        let registers = self.io.map().registers;
        self.io.write_i16(registers.xa_offset_h, x)?;
        self.io.write_i16(registers.ya_offset_h, y)?;
        self.io.write_i16(registers.za_offset_h, z)
    }
}
