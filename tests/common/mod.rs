//! Simulated LIS3MDL register file with I2C and SPI front ends

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, NoAcknowledgeSource};
use embedded_hal::spi;

pub const CTRL_REG1: usize = 0x20;
pub const CTRL_REG2: usize = 0x21;
pub const CTRL_REG3: usize = 0x22;
pub const CTRL_REG4: usize = 0x23;
pub const CTRL_REG5: usize = 0x24;
pub const STATUS_REG: usize = 0x27;
pub const OUT_X_L: usize = 0x28;
pub const TEMP_OUT_L: usize = 0x2E;
pub const INT_CFG: usize = 0x30;
pub const INT_SRC: usize = 0x31;
pub const INT_THS_L: usize = 0x32;
pub const INT_THS_H: usize = 0x33;

const SOFT_RST: u8 = 1 << 2;

pub struct Chip {
    pub regs: [u8; 0x40],
    pub resets: u32,
}

impl Chip {
    pub fn new() -> Self {
        let mut chip = Chip { regs: [0; 0x40], resets: 0 };
        chip.regs[0x0F] = 0x3D;
        chip.power_on();
        chip
    }

    pub fn with_id(id: u8) -> Self {
        let mut chip = Chip::new();
        chip.regs[0x0F] = id;
        chip
    }

    fn power_on(&mut self) {
        self.regs[CTRL_REG1] = 0x10;
        self.regs[CTRL_REG2] = 0x00;
        self.regs[CTRL_REG3] = 0x03;
        self.regs[CTRL_REG4] = 0x00;
        self.regs[CTRL_REG5] = 0x00;
        self.regs[INT_CFG] = 0xE8;
        self.regs[INT_THS_L] = 0x00;
        self.regs[INT_THS_H] = 0x00;
    }

    pub fn read(&self, reg: usize) -> u8 {
        self.regs[reg & 0x3F]
    }

    pub fn write(&mut self, reg: usize, value: u8) {
        let reg = reg & 0x3F;
        if reg == CTRL_REG2 && value & SOFT_RST != 0 {
            self.resets += 1;
            self.power_on();
            return;
        }
        self.regs[reg] = value;
    }

    pub fn set_sample(&mut self, bytes: [u8; 6]) {
        self.regs[OUT_X_L..OUT_X_L + 6].copy_from_slice(&bytes);
    }

    pub fn set_raw(&mut self, x: i16, y: i16, z: i16) {
        let mut bytes = [0u8; 6];
        bytes[0..2].copy_from_slice(&x.to_le_bytes());
        bytes[2..4].copy_from_slice(&y.to_le_bytes());
        bytes[4..6].copy_from_slice(&z.to_le_bytes());
        self.set_sample(bytes);
    }
}

pub type SharedChip = Rc<RefCell<Chip>>;

pub fn chip() -> SharedChip {
    Rc::new(RefCell::new(Chip::new()))
}

/// I2C front end, the register pointer auto-increments
pub struct FakeI2c {
    chip: SharedChip,
    address: u8,
    reject_writes: bool,
}

impl FakeI2c {
    pub fn new(chip: &SharedChip, address: u8) -> Self {
        FakeI2c { chip: chip.clone(),
                  address,
                  reject_writes: false }
    }

    /// Register pointer updates still go through, data bytes are refused
    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = i2c::ErrorKind;
}

impl i2c::I2c for FakeI2c {
    fn transaction(&mut self,
                   address: u8,
                   operations: &mut [i2c::Operation<'_>])
                   -> Result<(), Self::Error> {
        if address != self.address {
            return Err(i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        let mut chip = self.chip.borrow_mut();
        let mut pointer: Option<usize> = None;
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => {
                    for byte in bytes.iter() {
                        match pointer {
                            None => pointer = Some(*byte as usize),
                            Some(_) if self.reject_writes => {
                                return Err(i2c::ErrorKind::Other);
                            }
                            Some(p) => {
                                chip.write(p, *byte);
                                pointer = Some(p + 1);
                            }
                        }
                    }
                }
                i2c::Operation::Read(buffer) => {
                    let mut p = pointer.unwrap_or(0);
                    for byte in buffer.iter_mut() {
                        *byte = chip.read(p);
                        p += 1;
                    }
                    pointer = Some(p);
                }
            }
        }
        Ok(())
    }
}

/// SPI front end; records every address byte it receives
pub struct FakeSpi {
    chip: SharedChip,
    pub addresses: Rc<RefCell<Vec<u8>>>,
}

impl FakeSpi {
    pub fn new(chip: &SharedChip) -> Self {
        FakeSpi { chip: chip.clone(),
                  addresses: Rc::new(RefCell::new(Vec::new())) }
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = spi::ErrorKind;
}

impl spi::SpiDevice for FakeSpi {
    fn transaction(&mut self,
                   operations: &mut [spi::Operation<'_, u8>])
                   -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        let mut header: Option<(usize, bool)> = None;

        for op in operations.iter_mut() {
            match op {
                spi::Operation::Write(bytes) => {
                    for byte in bytes.iter() {
                        match header {
                            None => {
                                self.addresses.borrow_mut().push(*byte);
                                header = Some(((*byte & 0x3F) as usize,
                                               *byte & 0x40 != 0));
                            }
                            Some((reg, inc)) => {
                                chip.write(reg, *byte);
                                header = Some((if inc { reg + 1 } else { reg }, inc));
                            }
                        }
                    }
                }
                spi::Operation::Read(buffer) => {
                    let (mut reg, inc) = header.ok_or(spi::ErrorKind::Other)?;
                    for byte in buffer.iter_mut() {
                        *byte = chip.read(reg);
                        if inc {
                            reg += 1;
                        }
                    }
                    header = Some((reg, inc));
                }
                _ => return Err(spi::ErrorKind::Other),
            }
        }
        Ok(())
    }
}

/// Delay that only counts
#[derive(Clone, Default)]
pub struct CountingDelay {
    pub ns: Rc<Cell<u64>>,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        self.ns.get() / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns.set(self.ns.get() + u64::from(ns));
    }
}
