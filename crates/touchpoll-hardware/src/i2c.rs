//! Register bus over an embedded-hal I2C peripheral.
//!
//! The controller uses 8-bit register addresses and 8-bit values. A block read
//! writes the start offset and reads back `buf.len()` consecutive registers in
//! one repeated-start transaction.

use crate::config::TouchscreenConfig;
use crate::error::{HardwareError, Result};
use crate::traits::RegisterBus;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource, SevenBitAddress};
use touchpoll_core::constants::DEFAULT_I2C_ADDRESS;

/// [`RegisterBus`] backed by any blocking embedded-hal I2C bus.
#[derive(Debug)]
pub struct I2cRegisterBus<I> {
    i2c: I,
    address: SevenBitAddress,
}

impl<I: I2c> I2cRegisterBus<I> {
    /// Bus talking to the controller at `address`.
    pub fn new(i2c: I, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// Bus talking to the controller at its usual address, 0x38.
    pub fn with_default_address(i2c: I) -> Self {
        Self::new(i2c, DEFAULT_I2C_ADDRESS)
    }

    /// Bus talking to the controller at the configured `i2c_address`.
    ///
    /// # Errors
    ///
    /// Returns a setup failure if the configuration does not validate.
    pub fn from_config(i2c: I, config: &TouchscreenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(i2c, config.i2c_address))
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Give back the underlying peripheral.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    fn read_block(&mut self, offset: u8, buf: &mut [u8]) -> Result<()> {
        let address = self.address;
        self.i2c
            .write_read(address, &[offset], buf)
            .map_err(|e| match e.kind() {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => {
                    HardwareError::disconnected(format!("touch controller at {address:#04x}"))
                }
                kind => HardwareError::read_failed(offset, format!("{kind:?}")),
            })
    }
}
