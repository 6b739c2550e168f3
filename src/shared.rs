//! A gauge shared between tasks.
//!
//! The lock is held for a whole operation. For MAC exchanges that includes the settle delay, so
//! another task can never slip a command in between a command and its reply.

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    flags::{ErrorCode, OperationStatus},
    mac::{MacRequest, MacResponse},
    Bq4050, Error, Value,
};

pub struct SharedBq4050<'a, M: RawMutex, I> {
    gauge: Mutex<M, Bq4050<'a, I>>,
}

impl<'a, M: RawMutex, I> SharedBq4050<'a, M, I> {
    pub const fn new(gauge: Bq4050<'a, I>) -> Self {
        Self {
            gauge: Mutex::new(gauge),
        }
    }

    /// Locks the gauge so that several operations run without interruption.
    pub async fn lock(&self) -> MutexGuard<'_, M, Bq4050<'a, I>> {
        self.gauge.lock().await
    }

    pub fn into_inner(self) -> Bq4050<'a, I> {
        self.gauge.into_inner()
    }
}

impl<M: RawMutex, I: I2c> SharedBq4050<'_, M, I> {
    pub async fn read(&self, address: u8) -> Result<Value, Error<I::Error>> {
        self.lock().await.read(address).await
    }

    pub async fn write(&self, address: u8, value: &Value) -> Result<(), Error<I::Error>> {
        self.lock().await.write(address, value).await
    }

    pub async fn last_error_code(&self) -> Result<Option<ErrorCode>, Error<I::Error>> {
        self.lock().await.last_error_code().await
    }

    pub async fn mac_command<D: DelayNs>(
        &self,
        request: MacRequest,
        delay: &mut D,
    ) -> Result<MacResponse, Error<I::Error>> {
        self.lock().await.mac_command(request, delay).await
    }

    pub async fn mac_send(&self, sub_command: u16) -> Result<(), Error<I::Error>> {
        self.lock().await.mac_send(sub_command).await
    }

    pub async fn mac_write(&self, sub_command: u16, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.lock().await.mac_write(sub_command, data).await
    }

    pub async fn read_data_flash<D: DelayNs>(
        &self,
        address: u16,
        buffer: &mut [u8],
        delay: &mut D,
    ) -> Result<(), Error<I::Error>> {
        self.lock()
            .await
            .read_data_flash(address, buffer, delay)
            .await
    }

    pub async fn write_data_flash(&self, address: u16, data: &[u8]) -> Result<(), Error<I::Error>> {
        self.lock().await.write_data_flash(address, data).await
    }

    pub async fn operation_status_via_mac<D: DelayNs>(
        &self,
        delay: &mut D,
    ) -> Result<OperationStatus, Error<I::Error>> {
        self.lock().await.operation_status_via_mac(delay).await
    }
}
