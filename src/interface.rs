//! Register access over I2C or SPI

use hal::i2c::{self, I2c};
use hal::spi::{Mode, Operation, SpiDevice, MODE_0};

/// SPI mode the device expects; MSB first
pub const SPI_MODE: Mode = MODE_0;

/// Byte-level access to the device registers
pub trait RegisterBus {
    /// Bus error
    type Error;

    /// Reads `buffer.len()` consecutive registers starting at `reg`
    fn read_registers(&mut self,
                      reg: u8,
                      buffer: &mut [u8])
                      -> Result<(), Self::Error>;

    /// Writes `data` to consecutive registers starting at `reg`
    fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;
}

/// I2C front end
#[derive(Debug)]
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Uses `i2c` to talk to the device at the 7-bit `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        I2cInterface { i2c, address }
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Releases the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterBus for I2cInterface<I2C> where I2C: I2c
{
    type Error = I2C::Error;

    fn read_registers(&mut self,
                      reg: u8,
                      buffer: &mut [u8])
                      -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[reg], buffer)
    }

    fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        // adjacent writes go out as one frame, without a repeated start
        self.i2c.transaction(self.address,
                             &mut [i2c::Operation::Write(&[reg]),
                                   i2c::Operation::Write(data)])
    }
}

/// SPI front end
///
/// Chip select, clock frequency and pin assignment belong to the
/// `SpiDevice`, which may be a hardware peripheral or a bit-banged bus.
#[derive(Debug)]
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Uses `spi` to talk to the device
    pub fn new(spi: SPI) -> Self {
        SpiInterface { spi }
    }

    /// Releases the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

const READ: u8 = 1 << 7;
const AUTO_INCREMENT: u8 = 1 << 6;

fn spi_address(reg: u8, len: usize) -> u8 {
    if len > 1 {
        reg | AUTO_INCREMENT
    } else {
        reg
    }
}

impl<SPI> RegisterBus for SpiInterface<SPI> where SPI: SpiDevice
{
    type Error = SPI::Error;

    fn read_registers(&mut self,
                      reg: u8,
                      buffer: &mut [u8])
                      -> Result<(), Self::Error> {
        let addr = spi_address(reg, buffer.len()) | READ;
        self.spi
            .transaction(&mut [Operation::Write(&[addr]), Operation::Read(buffer)])
    }

    fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        let addr = spi_address(reg, data.len());
        self.spi
            .transaction(&mut [Operation::Write(&[addr]), Operation::Write(data)])
    }
}

/// Transport selected at run time
///
/// Selecting a transport drops the previously active one.
#[derive(Debug)]
pub enum Transport<I2C, SPI> {
    /// No transport; every access fails
    Unconfigured,
    /// I2C
    I2c(I2cInterface<I2C>),
    /// SPI
    Spi(SpiInterface<SPI>),
}

impl<I2C, SPI> Default for Transport<I2C, SPI> {
    fn default() -> Self {
        Transport::Unconfigured
    }
}

/// Error of a [`Transport`](./enum.Transport.html)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<I, S> {
    /// No transport selected
    Unconfigured,
    /// I2C error
    I2c(I),
    /// SPI error
    Spi(S),
}

impl<I2C, SPI> RegisterBus for Transport<I2C, SPI>
    where I2C: I2c,
          SPI: SpiDevice
{
    type Error = TransportError<I2C::Error, SPI::Error>;

    fn read_registers(&mut self,
                      reg: u8,
                      buffer: &mut [u8])
                      -> Result<(), Self::Error> {
        match self {
            Transport::Unconfigured => Err(TransportError::Unconfigured),
            Transport::I2c(i2c) => {
                i2c.read_registers(reg, buffer).map_err(TransportError::I2c)
            }
            Transport::Spi(spi) => {
                spi.read_registers(reg, buffer).map_err(TransportError::Spi)
            }
        }
    }

    fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        match self {
            Transport::Unconfigured => Err(TransportError::Unconfigured),
            Transport::I2c(i2c) => {
                i2c.write_registers(reg, data).map_err(TransportError::I2c)
            }
            Transport::Spi(spi) => {
                spi.write_registers(reg, data).map_err(TransportError::Spi)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spi_address_byte() {
        assert_eq!(spi_address(0x28, 6) | READ, 0xE8);
        assert_eq!(spi_address(0x0F, 1) | READ, 0x8F);
        assert_eq!(spi_address(0x32, 2), 0x72);
        assert_eq!(spi_address(0x20, 1), 0x20);
    }
}
