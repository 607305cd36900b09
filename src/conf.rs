/// A setting stored in a register bit field
pub(crate) trait RegisterBits: Copy {
    /// Content of the bit field, unshifted
    fn value(&self) -> u8;
}

/// Operative mode, trades power consumption against noise.
///
/// Applies to the X/Y axes and to the Z axis, which the device configures
/// separately. The device powers up in low power; `init` selects ultra high
/// performance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PerformanceMode {
    /// Low power
    LowPower = 0b00,
    /// Medium performance
    MediumPerformance = 0b01,
    /// High performance
    HighPerformance = 0b10,
    /// Ultra high performance
    UltraHighPerformance = 0b11,
}

impl Default for PerformanceMode {
    fn default() -> Self {
        PerformanceMode::UltraHighPerformance
    }
}

impl RegisterBits for PerformanceMode {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl PerformanceMode {
    pub(crate) fn from_value(value: u8) -> Self {
        match value & 0b11 {
            0b00 => PerformanceMode::LowPower,
            0b01 => PerformanceMode::MediumPerformance,
            0b10 => PerformanceMode::HighPerformance,
            _ => PerformanceMode::UltraHighPerformance,
        }
    }
}

/// Output data rate, including the FAST_ODR flag in bit 0
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
pub enum DataRate {
    /// 0.625 Hz
    _0_625_Hz = 0b0000,
    /// 1.25 Hz
    _1_25_Hz = 0b0010,
    /// 2.5 Hz
    _2_5_Hz = 0b0100,
    /// 5 Hz
    _5_Hz = 0b0110,
    /// 10 Hz
    _10_Hz = 0b1000,
    /// 20 Hz
    _20_Hz = 0b1010,
    /// 40 Hz
    _40_Hz = 0b1100,
    /// 80 Hz
    _80_Hz = 0b1110,
    /// 155 Hz, FAST_ODR with ultra high performance
    _155_Hz = 0b0001,
    /// 300 Hz, FAST_ODR with high performance
    _300_Hz = 0b0011,
    /// 560 Hz, FAST_ODR with medium performance
    _560_Hz = 0b0101,
    /// 1000 Hz, FAST_ODR with low power
    _1000_Hz = 0b0111,
}

impl Default for DataRate {
    fn default() -> Self {
        DataRate::_155_Hz
    }
}

impl RegisterBits for DataRate {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl DataRate {
    /// `None` for the FAST_ODR patterns that have no defined rate
    pub(crate) fn from_value(value: u8) -> Option<Self> {
        use self::DataRate::*;

        Some(match value {
            0b0000 => _0_625_Hz,
            0b0010 => _1_25_Hz,
            0b0100 => _2_5_Hz,
            0b0110 => _5_Hz,
            0b1000 => _10_Hz,
            0b1010 => _20_Hz,
            0b1100 => _40_Hz,
            0b1110 => _80_Hz,
            0b0001 => _155_Hz,
            0b0011 => _300_Hz,
            0b0101 => _560_Hz,
            0b0111 => _1000_Hz,
            _ => return None,
        })
    }

    /// Output data rate in Hz
    pub fn hz(&self) -> f32 {
        use self::DataRate::*;

        match self {
            _0_625_Hz => 0.625,
            _1_25_Hz => 1.25,
            _2_5_Hz => 2.5,
            _5_Hz => 5.0,
            _10_Hz => 10.0,
            _20_Hz => 20.0,
            _40_Hz => 40.0,
            _80_Hz => 80.0,
            _155_Hz => 155.0,
            _300_Hz => 300.0,
            _560_Hz => 560.0,
            _1000_Hz => 1000.0,
        }
    }

    /// Performance mode the device requires to produce this rate, if any.
    ///
    /// Only the FAST_ODR rates are tied to a performance mode.
    pub fn required_performance_mode(&self) -> Option<PerformanceMode> {
        match self {
            DataRate::_155_Hz => Some(PerformanceMode::UltraHighPerformance),
            DataRate::_300_Hz => Some(PerformanceMode::HighPerformance),
            DataRate::_560_Hz => Some(PerformanceMode::MediumPerformance),
            DataRate::_1000_Hz => Some(PerformanceMode::LowPower),
            _ => None,
        }
    }
}

/// Magnetometer full scale
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
pub enum Range {
    /// +/- 4 gauss
    _4_Ga = 0b00,
    /// +/- 8 gauss
    _8_Ga = 0b01,
    /// +/- 12 gauss
    _12_Ga = 0b10,
    /// +/- 16 gauss
    _16_Ga = 0b11,
}

impl Default for Range {
    fn default() -> Self {
        Range::_4_Ga
    }
}

impl RegisterBits for Range {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl Range {
    pub(crate) fn from_value(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Range::_4_Ga,
            0b01 => Range::_8_Ga,
            0b10 => Range::_12_Ga,
            _ => Range::_16_Ga,
        }
    }

    /// Sensitivity in LSB/gauss
    pub fn lsb_per_gauss(&self) -> f32 {
        match self {
            Range::_4_Ga => 6842.0,
            Range::_8_Ga => 3421.0,
            Range::_12_Ga => 2281.0,
            Range::_16_Ga => 1711.0,
        }
    }
}

/// Magnetometer operation mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationMode {
    /// Continuous conversion
    Continuous = 0b00,
    /// Single conversion
    Single = 0b01,
    /// Power down
    PowerDown = 0b11,
}

impl Default for OperationMode {
    fn default() -> Self {
        OperationMode::Continuous
    }
}

impl RegisterBits for OperationMode {
    fn value(&self) -> u8 {
        *self as u8
    }
}

impl OperationMode {
    // 0b10 is a second power-down encoding
    pub(crate) fn from_value(value: u8) -> Self {
        match value & 0b11 {
            0b00 => OperationMode::Continuous,
            0b01 => OperationMode::Single,
            _ => OperationMode::PowerDown,
        }
    }
}

/// Content of `INT_CFG`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptConfig {
    /// Interrupt generation on X axis
    pub x: bool,
    /// Interrupt generation on Y axis
    pub y: bool,
    /// Interrupt generation on Z axis
    pub z: bool,
    /// INT pin is active high
    pub active_high: bool,
    /// INT stays asserted until `INT_SRC` is read
    pub latch: bool,
    /// Interrupt enabled on the INT pin
    pub enable: bool,
}

impl InterruptConfig {
    // bits 4:3 must read 0b01
    const RESERVED: u8 = 0b0000_1000;

    pub(crate) fn value(&self) -> u8 {
        Self::RESERVED
        | (self.x as u8) << 7
        | (self.y as u8) << 6
        | (self.z as u8) << 5
        | (self.active_high as u8) << 2
        | (self.latch as u8) << 1
        | self.enable as u8
    }
}

/// Content of `INT_SRC`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptSource(pub u8);

impl InterruptSource {
    /// X value exceeded the threshold on the positive side
    pub fn positive_x(&self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Y value exceeded the threshold on the positive side
    pub fn positive_y(&self) -> bool {
        self.0 & 0x40 != 0
    }

    /// Z value exceeded the threshold on the positive side
    pub fn positive_z(&self) -> bool {
        self.0 & 0x20 != 0
    }

    /// X value exceeded the threshold on the negative side
    pub fn negative_x(&self) -> bool {
        self.0 & 0x10 != 0
    }

    /// Y value exceeded the threshold on the negative side
    pub fn negative_y(&self) -> bool {
        self.0 & 0x08 != 0
    }

    /// Z value exceeded the threshold on the negative side
    pub fn negative_z(&self) -> bool {
        self.0 & 0x04 != 0
    }

    /// Internal measurement range overflow
    pub fn overflow(&self) -> bool {
        self.0 & 0x02 != 0
    }

    /// An interrupt event has occurred
    pub fn interrupt(&self) -> bool {
        self.0 & 0x01 != 0
    }
}

/// Configuration of Lis3mdl
///
/// Settings left unset are not touched by [`Lis3mdl::configure`].
///
/// [`Lis3mdl::configure`]: ./struct.Lis3mdl.html#method.configure
#[derive(Copy, Clone, Debug, Default)]
pub struct Config {
    pub(crate) performance_mode: Option<PerformanceMode>,
    pub(crate) data_rate: Option<DataRate>,
    pub(crate) range: Option<Range>,
    pub(crate) operation_mode: Option<OperationMode>,
    pub(crate) temperature_sensor: Option<bool>,
    pub(crate) block_data_update: Option<bool>,
}

impl Config {
    /// Creates an empty configuration
    pub fn new() -> Self {
        Config::default()
    }

    /// Sets performance mode ([`PerformanceMode`])
    ///
    /// [`PerformanceMode`]: ./enum.PerformanceMode.html
    pub fn performance_mode(&mut self, mode: PerformanceMode) -> &mut Self {
        self.performance_mode = Some(mode);
        self
    }

    /// Sets output data rate ([`DataRate`]). A FAST_ODR rate overrides the
    /// performance mode.
    ///
    /// [`DataRate`]: ./enum.DataRate.html
    pub fn data_rate(&mut self, data_rate: DataRate) -> &mut Self {
        self.data_rate = Some(data_rate);
        self
    }

    /// Sets full reading scale ([`Range`])
    ///
    /// [`Range`]: ./enum.Range.html
    pub fn range(&mut self, range: Range) -> &mut Self {
        self.range = Some(range);
        self
    }

    /// Sets operation mode ([`OperationMode`])
    ///
    /// [`OperationMode`]: ./enum.OperationMode.html
    pub fn operation_mode(&mut self, mode: OperationMode) -> &mut Self {
        self.operation_mode = Some(mode);
        self
    }

    /// Enables or disables the temperature sensor
    pub fn temperature_sensor(&mut self, enable: bool) -> &mut Self {
        self.temperature_sensor = Some(enable);
        self
    }

    /// Enables or disables block data update
    pub fn block_data_update(&mut self, enable: bool) -> &mut Self {
        self.block_data_update = Some(enable);
        self
    }
}
