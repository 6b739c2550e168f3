//! Plain SBS register reads and writes.
//!
//! A read is the command code, a repeated start, then the reply. A write is a single
//! stop-terminated write of the command code and the encoded value. Neither is retried here.

use device_descriptor::{Proxy, ReadOnlyRegister, Register, RegisterWidthType};
use embedded_hal_async::i2c::I2c;
use register_access::AsyncRegisterAccess;

use crate::{
    catalog::{RegisterDescriptor, MAX_BLOCK_READ},
    codec::Value,
    flags::{BatteryStatus, ErrorCode},
    Bq4050, Error,
};

pub async fn read_register<I: I2c>(
    i2c: &mut I,
    address: u8,
    descriptor: &RegisterDescriptor,
) -> Result<Value, Error<I::Error>> {
    let mut buffer = [0; MAX_BLOCK_READ];
    let buffer = &mut buffer[..descriptor.read_len()];

    logger::trace!(
        "Reading {} ({:#x}), {} bytes",
        descriptor.name,
        descriptor.address,
        buffer.len()
    );

    i2c.write_read(address, &[descriptor.address], buffer)
        .await
        .map_err(Error::Transport)?;

    descriptor
        .decode(buffer)
        .map_err(|err| Error::from_codec(err, descriptor.address))
}

/// Encodes and writes `value`. Read-only registers fail before anything is sent.
pub async fn write_register<I: I2c>(
    i2c: &mut I,
    address: u8,
    descriptor: &RegisterDescriptor,
    value: &Value,
) -> Result<(), Error<I::Error>> {
    let encoded = descriptor
        .encode(value)
        .map_err(|err| Error::from_codec(err, descriptor.address))?;

    logger::trace!(
        "Writing {} ({:#x}): {:?}",
        descriptor.name,
        descriptor.address,
        encoded.as_slice()
    );

    let len = 1 + encoded.len();

    let mut frame = [0; 1 + MAX_BLOCK_READ];
    frame[0] = descriptor.address;
    frame[1..len].copy_from_slice(&encoded);

    i2c.write(address, &frame[..len])
        .await
        .map_err(Error::Transport)
}

impl<I> Bq4050<'_, I>
where
    I: I2c,
{
    fn descriptor(&self, address: u8) -> Result<RegisterDescriptor, Error<I::Error>> {
        self.catalog
            .lookup(address)
            .copied()
            .ok_or(Error::NotFound(address))
    }

    pub async fn read(&mut self, address: u8) -> Result<Value, Error<I::Error>> {
        let descriptor = self.descriptor(address)?;
        read_register(&mut self.i2c, self.config.address, &descriptor).await
    }

    pub async fn write(&mut self, address: u8, value: &Value) -> Result<(), Error<I::Error>> {
        let descriptor = self.descriptor(address)?;
        write_register(&mut self.i2c, self.config.address, &descriptor, value).await
    }

    /// Returns the status code of the last SMBus command, from the low nibble of BatteryStatus.
    ///
    /// `None` means the device reported one of the undocumented codes.
    pub async fn last_error_code(&mut self) -> Result<Option<ErrorCode>, Error<I::Error>> {
        let status = self.read_register_async::<BatteryStatus>().await?;
        Ok(status.error_code().read())
    }
}

impl<I> AsyncRegisterAccess for Bq4050<'_, I>
where
    I: I2c,
{
    type Error = Error<I::Error>;

    async fn read_register_async<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister,
    {
        let bits = match self.read(R::ADDRESS).await? {
            Value::Bitfield(bits) | Value::Unsigned(bits) => bits,
            _ => return Err(Error::ValueMismatch),
        };

        let width = R::RegisterWidth::WIDTH as u32;
        if width < u32::BITS && bits >> width != 0 {
            return Err(Error::ValueMismatch);
        }

        Ok(R::from_bits(R::RegisterWidth::from_32(bits)))
    }

    async fn write_register_async<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register,
    {
        self.write(R::ADDRESS, &Value::Bitfield(reg.bits().to_32()))
            .await
    }
}
