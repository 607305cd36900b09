//! Register map and bit-field table

/// I2C address with SDO/SA1 pulled low
pub const ADDRESS: u8 = 0x1C;
/// I2C address with SDO/SA1 pulled high
pub const ADDRESS_ALT: u8 = 0x1E;

/// Content of `WHO_AM_I`
pub const DEVICE_ID: u8 = 0x3D;

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    WHO_AM_I = 0x0F,
    CTRL_REG1 = 0x20,
    CTRL_REG2 = 0x21,
    CTRL_REG3 = 0x22,
    CTRL_REG4 = 0x23,
    CTRL_REG5 = 0x24,
    STATUS_REG = 0x27,
    /// X, Y, Z follow as little-endian pairs
    OUT_X_L = 0x28,
    TEMP_OUT_L = 0x2E,
    INT_CFG = 0x30,
    INT_SRC = 0x31,
    INT_THS_L = 0x32,
}

impl Register {
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}

/// A setting stored in `width` bits of `register`, starting at bit `shift`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub register: Register,
    pub shift: u8,
    pub width: u8,
}

impl Field {
    const fn new(register: Register, shift: u8, width: u8) -> Self {
        Field { register, shift, width }
    }

    /// Mask of the field, in register position
    pub fn mask(&self) -> u8 {
        (((1u16 << self.width) - 1) as u8) << self.shift
    }

    /// Extracts the field from a register value
    pub fn get(&self, reg: u8) -> u8 {
        (reg & self.mask()) >> self.shift
    }

    /// Replaces the field in a register value; bits of `value` that do not
    /// fit the field are dropped
    pub fn set(&self, reg: u8, value: u8) -> u8 {
        (reg & !self.mask()) | ((value << self.shift) & self.mask())
    }
}

pub const TEMP_EN: Field = Field::new(Register::CTRL_REG1, 7, 1);
/// X and Y axes operative mode
pub const OM_XY: Field = Field::new(Register::CTRL_REG1, 5, 2);
/// DO[2:0] + FAST_ODR
pub const DATA_RATE: Field = Field::new(Register::CTRL_REG1, 1, 4);
pub const SELF_TEST: Field = Field::new(Register::CTRL_REG1, 0, 1);

pub const FULL_SCALE: Field = Field::new(Register::CTRL_REG2, 5, 2);
pub const SOFT_RST: Field = Field::new(Register::CTRL_REG2, 2, 1);

pub const MODE: Field = Field::new(Register::CTRL_REG3, 0, 2);

/// Z axis operative mode
pub const OM_Z: Field = Field::new(Register::CTRL_REG4, 2, 2);

pub const BDU: Field = Field::new(Register::CTRL_REG5, 6, 1);

/// ZYXDA
pub const DATA_READY: Field = Field::new(Register::STATUS_REG, 3, 1);
