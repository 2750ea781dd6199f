//! Physical-unit samples and averaging

/// Outcome flag carried by every sample
///
/// Samples are only ever returned when complete, so the only variant is
/// `Valid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleStatus {
    /// Every field holds a converted reading
    #[default]
    Valid,
}

/// One orientation/motion reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Outcome flag
    pub status: SampleStatus,
    /// Roll in degrees
    pub roll: f32,
    /// Pitch in degrees
    pub pitch: f32,
    /// Yaw in degrees
    pub yaw: f32,
    /// Angular velocity about X in °/s
    pub roll_rate: f32,
    /// Angular velocity about Y in °/s
    pub pitch_rate: f32,
    /// Angular velocity about Z in °/s
    pub yaw_rate: f32,
    /// Linear acceleration along X with gravity removed, in g
    pub accel_x: f32,
    /// Linear acceleration along Y with gravity removed, in g
    pub accel_y: f32,
    /// Linear acceleration along Z with gravity removed, in g
    pub accel_z: f32,
    /// Euclidean norm of the linear acceleration, in g
    pub accel_magnitude: f32,
    /// Die temperature in °F
    pub temperature_f: f32,
}

/// Convert a raw `TEMP_OUT` reading to °C
#[must_use]
pub fn celsius_from_raw(raw: i16) -> f32 {
    f32::from(raw) / 340.0 + 36.53
}

/// Convert °C to °F
#[must_use]
pub fn fahrenheit_from_celsius(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Convert radians to degrees
#[must_use]
pub fn degrees(radians: f32) -> f32 {
    radians.to_degrees()
}

/// Running per-field sum for averaging
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAccumulator {
    sum: Sample,
    count: u32,
}

impl SampleAccumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample
    pub fn add(&mut self, sample: &Sample) {
        let sum = &mut self.sum;
        sum.roll += sample.roll;
        sum.pitch += sample.pitch;
        sum.yaw += sample.yaw;
        sum.roll_rate += sample.roll_rate;
        sum.pitch_rate += sample.pitch_rate;
        sum.yaw_rate += sample.yaw_rate;
        sum.accel_x += sample.accel_x;
        sum.accel_y += sample.accel_y;
        sum.accel_z += sample.accel_z;
        sum.accel_magnitude += sample.accel_magnitude;
        sum.temperature_f += sample.temperature_f;
        self.count += 1;
    }

    /// Number of samples added
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Arithmetic mean of every field, or `None` if nothing was added
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<Sample> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f32;
        let sum = &self.sum;
        Some(Sample {
            status: SampleStatus::Valid,
            roll: sum.roll / n,
            pitch: sum.pitch / n,
            yaw: sum.yaw / n,
            roll_rate: sum.roll_rate / n,
            pitch_rate: sum.pitch_rate / n,
            yaw_rate: sum.yaw_rate / n,
            accel_x: sum.accel_x / n,
            accel_y: sum.accel_y / n,
            accel_z: sum.accel_z / n,
            accel_magnitude: sum.accel_magnitude / n,
            temperature_f: sum.temperature_f / n,
        })
    }
}
