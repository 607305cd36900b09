//! A platform agnostic driver to interface with the LIS3MDL (3-axis
//! magnetometer)
//!
//! This driver was built using [`embedded-hal`] traits and talks to the
//! device over either I2C or SPI.
//!
//! # Example
//!
//! ```ignore
//! let mut lis3mdl = Lis3mdl::new_i2c(i2c, lis3mdl::ADDRESS, delay);
//! lis3mdl.init()?;
//! lis3mdl.set_range(Range::_8_Ga)?;
//! let gauss = lis3mdl.read()?.gauss;
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![deny(missing_docs)]
#![no_std]

extern crate cast;
extern crate embedded_hal as hal;
extern crate nalgebra;

mod conf;
mod interface;
mod register;
mod sensor;

use core::fmt;

use cast::{f32, u16};
use hal::delay::DelayNs;
use hal::i2c::I2c;
use hal::spi::SpiDevice;
use log::{debug, trace, warn};

pub use nalgebra::Vector3;

pub use conf::{Config, DataRate, InterruptConfig, InterruptSource,
               OperationMode, PerformanceMode, Range};
pub use interface::{I2cInterface, RegisterBus, SpiInterface, Transport,
                    TransportError, SPI_MODE};
pub use register::{ADDRESS, ADDRESS_ALT, DEVICE_ID};
pub use sensor::{Sensor, SensorEvent, SensorInfo, SensorType};

use conf::RegisterBits;
use register::{Field, Register};

const GAUSS_TO_MICROTESLA: f32 = 100.0;

const RESET_DELAY_MS: u32 = 10;
const DATA_RATE_DELAY_MS: u32 = 10;

const TEMP_LSB_PER_DEGREE: f32 = 8.0;
const TEMP_ZERO_OFFSET: f32 = 25.0;

/// Driver error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transfer failed
    Bus(E),
    /// `WHO_AM_I` returned something else than [`DEVICE_ID`]
    ///
    /// [`DEVICE_ID`]: ./constant.DEVICE_ID.html
    WrongDevice(u8),
    /// The data rate field holds a pattern without a defined rate
    UnknownDataRate(u8),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::WrongDevice(id) => {
                write!(f, "unexpected device id {:#04x}", id)
            }
            Error::UnknownDataRate(bits) => {
                write!(f, "unknown data rate pattern {:#06b}", bits)
            }
        }
    }
}

/// A magnetometer sample
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Raw counts
    pub raw: Vector3<i16>,
    /// Field in gauss, converted with the range cached at read time
    pub gauss: Vector3<f32>,
}

impl Measurement {
    /// Field in microtesla
    pub fn microtesla(&self) -> Vector3<f32> {
        self.gauss * GAUSS_TO_MICROTESLA
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Measurement { raw: Vector3::zeros(),
                      gauss: Vector3::zeros() }
    }
}

/// LIS3MDL driver
pub struct Lis3mdl<B, D> {
    bus: B,
    delay: D,
    range: Range,
    sensor_id: i32,
    last: Measurement,
}

impl<I2C, D> Lis3mdl<I2cInterface<I2C>, D>
    where I2C: I2c,
          D: DelayNs
{
    /// Creates a new driver from a I2C peripheral and the device `address`
    /// ([`ADDRESS`] or [`ADDRESS_ALT`]). Call [`init`] before use.
    ///
    /// [`ADDRESS`]: ./constant.ADDRESS.html
    /// [`ADDRESS_ALT`]: ./constant.ADDRESS_ALT.html
    /// [`init`]: #method.init
    pub fn new_i2c(i2c: I2C, address: u8, delay: D) -> Self {
        Lis3mdl::new(I2cInterface::new(i2c, address), delay)
    }
}

impl<SPI, D> Lis3mdl<SpiInterface<SPI>, D>
    where SPI: SpiDevice,
          D: DelayNs
{
    /// Creates a new driver from a SPI device, configured in [`SPI_MODE`].
    /// Call [`init`] before use.
    ///
    /// [`SPI_MODE`]: ./constant.SPI_MODE.html
    /// [`init`]: #method.init
    pub fn new_spi(spi: SPI, delay: D) -> Self {
        Lis3mdl::new(SpiInterface::new(spi), delay)
    }
}

impl<I2C, SPI, D> Lis3mdl<Transport<I2C, SPI>, D>
    where I2C: I2c,
          SPI: SpiDevice,
          D: DelayNs
{
    /// Creates a driver without transport; select one with [`begin_i2c`] or
    /// [`begin_spi`]
    ///
    /// [`begin_i2c`]: #method.begin_i2c
    /// [`begin_spi`]: #method.begin_spi
    pub fn unconfigured(delay: D) -> Self {
        Lis3mdl::new(Transport::Unconfigured, delay)
    }

    /// Switches to I2C, dropping the previous transport, and initializes the
    /// device
    pub fn begin_i2c(&mut self,
                     i2c: I2C,
                     address: u8)
                     -> Result<(), Error<TransportError<I2C::Error, SPI::Error>>>
    {
        self.bus = Transport::I2c(I2cInterface::new(i2c, address));
        self.init()
    }

    /// Switches to SPI, dropping the previous transport, and initializes the
    /// device
    pub fn begin_spi(&mut self,
                     spi: SPI)
                     -> Result<(), Error<TransportError<I2C::Error, SPI::Error>>>
    {
        self.bus = Transport::Spi(SpiInterface::new(spi));
        self.init()
    }
}

impl<B, D, E> Lis3mdl<B, D>
    where B: RegisterBus<Error = E>,
          D: DelayNs
{
    /// Creates a new driver on top of any register bus. No bus traffic
    /// happens until [`init`].
    ///
    /// [`init`]: #method.init
    pub fn new(bus: B, delay: D) -> Self {
        Lis3mdl { bus,
                  delay,
                  range: Range::default(),
                  sensor_id: 0,
                  last: Measurement::default() }
    }

    /// Sets the identifier reported in sensor events
    pub fn with_sensor_id(mut self, sensor_id: i32) -> Self {
        self.sensor_id = sensor_id;
        self
    }

    /// Checks the device identity, resets it and applies the default
    /// configuration: ultra high performance, 155 Hz, +/- 4 gauss,
    /// continuous conversion.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        let id = self.read_register(Register::WHO_AM_I)?;
        if id != DEVICE_ID {
            warn!("LIS3MDL: unexpected WHO_AM_I {:#04x}", id);
            return Err(Error::WrongDevice(id));
        }

        self.reset()?;
        self.set_performance_mode(PerformanceMode::UltraHighPerformance)?;
        self.set_data_rate(DataRate::_155_Hz)?;
        self.set_range(Range::_4_Ga)?;
        self.set_operation_mode(OperationMode::Continuous)?;

        debug!("LIS3MDL: initialized");
        Ok(())
    }

    /// Applies every setting present in `config`
    pub fn configure(&mut self, config: &Config) -> Result<(), Error<E>> {
        if let Some(mode) = config.performance_mode {
            self.set_performance_mode(mode)?;
        }
        if let Some(data_rate) = config.data_rate {
            self.set_data_rate(data_rate)?;
        }
        if let Some(range) = config.range {
            self.set_range(range)?;
        }
        if let Some(mode) = config.operation_mode {
            self.set_operation_mode(mode)?;
        }
        if let Some(enable) = config.temperature_sensor {
            self.set_temperature_sensor(enable)?;
        }
        if let Some(enable) = config.block_data_update {
            self.set_block_data_update(enable)?;
        }
        Ok(())
    }

    /// Software reset. Every register goes back to its power-on value; the
    /// range cache is synchronized afterwards.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_field(register::SOFT_RST, 1)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.range()?;

        debug!("LIS3MDL: reset, range {:?}", self.range);
        Ok(())
    }

    /// Sets the performance mode of all three axes
    pub fn set_performance_mode(&mut self,
                                mode: PerformanceMode)
                                -> Result<(), Error<E>> {
        self.write_setting(register::OM_XY, mode)?;
        self.write_setting(register::OM_Z, mode)
    }

    /// Performance mode of the X and Y axes
    pub fn performance_mode(&mut self) -> Result<PerformanceMode, Error<E>> {
        let bits = self.read_field(register::OM_XY)?;
        Ok(PerformanceMode::from_value(bits))
    }

    /// Sets the operation mode
    pub fn set_operation_mode(&mut self,
                              mode: OperationMode)
                              -> Result<(), Error<E>> {
        self.write_setting(register::MODE, mode)
    }

    /// Operation mode
    pub fn operation_mode(&mut self) -> Result<OperationMode, Error<E>> {
        let bits = self.read_field(register::MODE)?;
        Ok(OperationMode::from_value(bits))
    }

    /// Sets the output data rate.
    ///
    /// 155, 300, 560 and 1000 Hz also change the performance mode, see
    /// [`DataRate::required_performance_mode`].
    ///
    /// [`DataRate::required_performance_mode`]: ./enum.DataRate.html#method.required_performance_mode
    pub fn set_data_rate(&mut self, data_rate: DataRate) -> Result<(), Error<E>> {
        if let Some(mode) = data_rate.required_performance_mode() {
            trace!("LIS3MDL: {:?} forces {:?}", data_rate, mode);
            self.set_performance_mode(mode)?;
        }
        self.delay.delay_ms(DATA_RATE_DELAY_MS);
        self.write_setting(register::DATA_RATE, data_rate)
    }

    /// Output data rate
    pub fn data_rate(&mut self) -> Result<DataRate, Error<E>> {
        let bits = self.read_field(register::DATA_RATE)?;
        DataRate::from_value(bits).ok_or(Error::UnknownDataRate(bits))
    }

    /// Sets the full scale; later reads are converted with it
    pub fn set_range(&mut self, range: Range) -> Result<(), Error<E>> {
        self.write_setting(register::FULL_SCALE, range)?;
        self.range = range;
        Ok(())
    }

    /// Reads the full scale from the device and refreshes the range cache
    pub fn range(&mut self) -> Result<Range, Error<E>> {
        let bits = self.read_field(register::FULL_SCALE)?;
        self.range = Range::from_value(bits);
        Ok(self.range)
    }

    /// Range used to convert samples, without bus traffic
    pub fn cached_range(&self) -> Range {
        self.range
    }

    /// Sets the interrupt threshold; bit 15 is always cleared
    pub fn set_int_threshold(&mut self, value: u16) -> Result<(), Error<E>> {
        let value = value & 0x7FFF;
        self.write_registers(Register::INT_THS_L, &value.to_le_bytes())
    }

    /// Interrupt threshold
    pub fn int_threshold(&mut self) -> Result<u16, Error<E>> {
        let mut buffer = [0u8; 2];
        self.read_registers(Register::INT_THS_L, &mut buffer)?;
        Ok(u16(buffer[0]) | (u16(buffer[1]) << 8))
    }

    /// Writes the interrupt configuration
    pub fn configure_interrupt(&mut self,
                               config: InterruptConfig)
                               -> Result<(), Error<E>> {
        self.write_register(Register::INT_CFG, config.value())
    }

    /// Reads (and, when latched, clears) the interrupt source
    pub fn interrupt_source(&mut self) -> Result<InterruptSource, Error<E>> {
        self.read_register(Register::INT_SRC).map(InterruptSource)
    }

    /// Enables or disables the self-test
    pub fn set_self_test(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.write_field(register::SELF_TEST, enable as u8)
    }

    /// Whether the self-test is enabled
    pub fn self_test(&mut self) -> Result<bool, Error<E>> {
        Ok(self.read_field(register::SELF_TEST)? != 0)
    }

    /// Enables or disables the temperature sensor
    pub fn set_temperature_sensor(&mut self,
                                  enable: bool)
                                  -> Result<(), Error<E>> {
        self.write_field(register::TEMP_EN, enable as u8)
    }

    /// Output registers are not updated until both bytes have been read
    pub fn set_block_data_update(&mut self,
                                 enable: bool)
                                 -> Result<(), Error<E>> {
        self.write_field(register::BDU, enable as u8)
    }

    /// Temperature in Celsius. The sensor must be enabled with
    /// [`set_temperature_sensor`].
    ///
    /// [`set_temperature_sensor`]: #method.set_temperature_sensor
    pub fn temperature(&mut self) -> Result<f32, Error<E>> {
        let raw = self.raw_temperature()?;
        Ok(f32(raw) / TEMP_LSB_PER_DEGREE + TEMP_ZERO_OFFSET)
    }

    /// Raw temperature sensor measurement
    pub fn raw_temperature(&mut self) -> Result<i16, Error<E>> {
        let mut buffer = [0u8; 2];
        self.read_registers(Register::TEMP_OUT_L, &mut buffer)?;
        Ok((u16(buffer[0]) | (u16(buffer[1]) << 8)) as i16)
    }

    /// Reads X, Y and Z and converts them to gauss with the cached range.
    /// The result is also kept, see [`measurement`].
    ///
    /// [`measurement`]: #method.measurement
    pub fn read(&mut self) -> Result<Measurement, Error<E>> {
        let mut buffer = [0u8; 6];
        self.read_registers(Register::OUT_X_L, &mut buffer)?;

        let raw = Vector3::new((u16(buffer[0]) | (u16(buffer[1]) << 8)) as i16,
                               (u16(buffer[2]) | (u16(buffer[3]) << 8)) as i16,
                               (u16(buffer[4]) | (u16(buffer[5]) << 8)) as i16);
        let scale = self.range.lsb_per_gauss();

        self.last = Measurement { raw,
                                  gauss: raw.map(|v| f32(v) / scale) };
        Ok(self.last)
    }

    /// Last sample taken by [`read`]
    ///
    /// [`read`]: #method.read
    pub fn measurement(&self) -> Measurement {
        self.last
    }

    /// Reads the magnetic field in microtesla
    ///
    /// Converts with the cached range, like [`read`], rather than a fixed
    /// ±4 gauss factor. The sample also replaces [`measurement`].
    ///
    /// [`read`]: #method.read
    /// [`measurement`]: #method.measurement
    pub fn read_magnetic_field(&mut self) -> Result<Vector3<f32>, Error<E>> {
        self.read().map(|m| m.microtesla())
    }

    /// Whether a new X, Y, Z sample is available
    pub fn magnetic_field_available(&mut self) -> Result<bool, Error<E>> {
        Ok(self.read_field(register::DATA_READY)? != 0)
    }

    /// Output data rate in Hz, 0 if the data rate field holds an unknown
    /// pattern
    pub fn magnetic_field_sample_rate(&mut self) -> Result<f32, Error<E>> {
        let bits = self.read_field(register::DATA_RATE)?;
        Ok(DataRate::from_value(bits).map_or(0.0, |rate| rate.hz()))
    }

    /// Destroys the driver, releasing the bus and the delay
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn write_setting<S>(&mut self, field: Field, setting: S) -> Result<(), Error<E>>
        where S: RegisterBits
    {
        self.write_field(field, setting.value())
    }

    fn read_field(&mut self, field: Field) -> Result<u8, Error<E>> {
        let r = self.read_register(field.register)?;
        Ok(field.get(r))
    }

    fn write_field(&mut self, field: Field, value: u8) -> Result<(), Error<E>> {
        self.modify_register(field.register, |r| field.set(r, value))
    }

    fn modify_register<F>(&mut self, reg: Register, f: F) -> Result<(), Error<E>>
        where F: FnOnce(u8) -> u8
    {
        let r = self.read_register(reg)?;
        self.write_register(reg, f(r))
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.read_registers(reg, &mut buffer)?;
        Ok(buffer[0])
    }

    fn read_registers(&mut self,
                      reg: Register,
                      buffer: &mut [u8])
                      -> Result<(), Error<E>> {
        self.bus.read_registers(reg.addr(), buffer).map_err(Error::Bus)
    }

    fn write_register(&mut self, reg: Register, byte: u8) -> Result<(), Error<E>> {
        self.write_registers(reg, &[byte])
    }

    fn write_registers(&mut self, reg: Register, data: &[u8]) -> Result<(), Error<E>> {
        self.bus.write_registers(reg.addr(), data).map_err(Error::Bus)
    }
}

impl<B, D, E> Sensor for Lis3mdl<B, D>
    where B: RegisterBus<Error = E>,
          D: DelayNs
{
    type Error = Error<E>;

    fn event(&mut self, timestamp: u32) -> Result<SensorEvent, Error<E>> {
        let mut event = SensorEvent::new(self.sensor_id, timestamp);
        event.magnetic = self.read()?.microtesla();
        Ok(event)
    }

    fn sensor_info(&self) -> SensorInfo {
        SensorInfo { name: "LIS3MDL",
                     version: 1,
                     sensor_id: self.sensor_id,
                     kind: SensorType::MagneticField,
                     min_delay: 0,
                     // +/- 16 gauss
                     min_value: -1600.0,
                     max_value: 1600.0,
                     // 100 / 6842 uT per LSB at +/- 4 gauss
                     resolution: 0.015 }
    }
}
