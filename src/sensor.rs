//! Unified sensor reporting

use core::mem;

use nalgebra::Vector3;

/// Kind of quantity a sensor reports
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorType {
    /// Magnetic field, in microtesla
    MagneticField,
}

/// A timestamped measurement
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SensorEvent {
    /// Size of this record in bytes
    pub version: i32,
    /// Identifier of the reporting sensor
    pub sensor_id: i32,
    /// Kind of measurement
    pub kind: SensorType,
    /// Caller supplied time of the measurement, in milliseconds
    pub timestamp: u32,
    /// Magnetic field in microtesla
    pub magnetic: Vector3<f32>,
}

impl SensorEvent {
    /// Empty magnetic field event
    pub fn new(sensor_id: i32, timestamp: u32) -> Self {
        SensorEvent { version: mem::size_of::<SensorEvent>() as i32,
                      sensor_id,
                      kind: SensorType::MagneticField,
                      timestamp,
                      magnetic: Vector3::zeros() }
    }
}

/// Static description of a sensor
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SensorInfo {
    /// Part name
    pub name: &'static str,
    /// Driver version
    pub version: i32,
    /// Identifier of the sensor
    pub sensor_id: i32,
    /// Kind of measurement
    pub kind: SensorType,
    /// Minimum delay between events in microseconds, 0 if not applicable
    pub min_delay: i32,
    /// Lowest reportable value
    pub min_value: f32,
    /// Highest reportable value
    pub max_value: f32,
    /// Smallest distinguishable change
    pub resolution: f32,
}

/// Something that produces timestamped events and describes itself
pub trait Sensor {
    /// Error raised while taking a measurement
    type Error;

    /// Takes a measurement stamped with `timestamp` (ms)
    fn event(&mut self, timestamp: u32) -> Result<SensorEvent, Self::Error>;

    /// Static metadata, independent of the current configuration
    fn sensor_info(&self) -> SensorInfo;
}
