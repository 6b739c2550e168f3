#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! Driver core for the TI BQ4050 Smart Battery System fuel gauge.
//!
//! Ordinary SBS registers are read with a command byte followed by a repeated-start read, see
//! [`access`]. Extended data goes through the Manufacturer Access (0x44) mailbox, see [`mac`].
//!
//! ```no_run
//! # async fn example<I: embedded_hal_async::i2c::I2c, D: embedded_hal_async::delay::DelayNs>(
//! #     i2c: I,
//! #     mut delay: D,
//! # ) -> Result<(), bq4050::Error<I::Error>> {
//! use bq4050::{mac::{commands, MacRequest}, Bq4050, Catalog, Config};
//!
//! let mut gauge = Bq4050::new(i2c, Config::default(), Catalog::bq4050());
//!
//! let voltage = gauge.read(0x09).await?;
//! let firmware = gauge
//!     .mac_command(MacRequest::new(commands::FIRMWARE_VERSION, 12), &mut delay)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod catalog;
pub mod codec;
mod error;
pub mod flags;
pub mod mac;
pub mod shared;

#[cfg(test)]
mod test_util;

pub use catalog::{Catalog, RegisterDescriptor};
pub use codec::{Value, WireType};
pub use error::Error;
pub use shared::SharedBq4050;

/// 7-bit SMBus address of the BQ4050 (0x16 in 8-bit notation).
pub const DEFAULT_ADDRESS: u8 = 0x0B;

/// Wait between the MAC command and reading its reply.
///
/// The minimum the device needs is not documented. Tune it on real hardware with
/// [`Config::settle_delay_us`].
pub const DEFAULT_SETTLE_DELAY_US: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit bus address.
    pub address: u8,

    /// Delay between the command and reply phases of a MAC exchange, in μs.
    pub settle_delay_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            settle_delay_us: DEFAULT_SETTLE_DELAY_US,
        }
    }
}

pub struct Bq4050<'a, I> {
    i2c: I,
    config: Config,
    catalog: Catalog<'a>,
}

impl<'a, I> Bq4050<'a, I> {
    pub const fn new(i2c: I, config: Config, catalog: Catalog<'a>) -> Self {
        Self {
            i2c,
            config,
            catalog,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> Catalog<'a> {
        self.catalog
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.i2c
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }
}
