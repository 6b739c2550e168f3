#![no_std]
#![allow(async_fn_in_trait)]

//! Typed register access on top of `device-descriptor` register views.
//!
//! A driver implements [`AsyncRegisterAccess`] once; every register declared with
//! `device_descriptor::device!` can then be read with `Reg::read_async(&mut driver)` or written
//! with `reg.write_async(&mut driver)`.

use device_descriptor::{ReadOnlyRegister, Register};

pub trait AsyncRegisterReader: Sized {
    async fn read_async<E>(iface: &mut impl AsyncRegisterAccess<Error = E>) -> Result<Self, E>;
}

pub trait AsyncRegisterWriter {
    async fn write_async<E>(self, iface: &mut impl AsyncRegisterAccess<Error = E>)
        -> Result<(), E>;
}

impl<T: ReadOnlyRegister> AsyncRegisterReader for T {
    async fn read_async<E>(iface: &mut impl AsyncRegisterAccess<Error = E>) -> Result<Self, E> {
        iface.read_register_async().await
    }
}

impl<T: Register> AsyncRegisterWriter for T {
    async fn write_async<E>(
        self,
        iface: &mut impl AsyncRegisterAccess<Error = E>,
    ) -> Result<(), E> {
        iface.write_register_async(self).await
    }
}

pub trait AsyncRegisterAccess {
    type Error;

    async fn read_register_async<R>(&mut self) -> Result<R, Self::Error>
    where
        R: ReadOnlyRegister;

    async fn write_register_async<R>(&mut self, reg: R) -> Result<(), Self::Error>
    where
        R: Register;

    /// Reads the register, lets `f` change it and writes the result back.
    async fn modify_register_async<R>(
        &mut self,
        f: impl Fn(R::Writer) -> R::Writer,
    ) -> Result<R, Self::Error>
    where
        R: Register,
    {
        let reg = self.read_register_async::<R>().await?.modify(f);
        self.write_register_async(reg).await?;
        Ok(reg)
    }
}
