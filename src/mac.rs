//! Manufacturer Access Command (MAC) exchanges.
//!
//! A MAC command is written to the 0x44 mailbox as a block write carrying a little-endian
//! sub-command. After a settle delay the reply is block-read from the same mailbox; it starts
//! with the echoed sub-command and the payload follows. An exchange that fails at any phase has
//! to be restarted from the command write.

use device_descriptor::Proxy;
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    codec::{self, Bytes, CodecError, Value, WireType, MAX_BLOCK_LEN},
    flags::OperationStatus,
    Bq4050, Error,
};

/// The SBS command code used as the MAC mailbox.
pub const MANUFACTURER_ACCESS: u8 = 0x44;

/// Longest MAC reply: the echoed sub-command and a full block.
pub const MAX_REPLY_LEN: usize = 2 + MAX_BLOCK_LEN;

const ECHO_LEN: usize = 2;

pub mod commands {
    pub const DEVICE_TYPE: u16 = 0x0001;
    /// Reply is a 12-byte status bundle, echo included.
    pub const FIRMWARE_VERSION: u16 = 0x0002;
    pub const LIFETIME_DATA_COLLECTION: u16 = 0x0023;
    pub const SECURITY_KEYS: u16 = 0x0035;
    pub const AUTHENTICATION_KEY: u16 = 0x0037;
    pub const DEVICE_RESET: u16 = 0x0041;
    /// Reply is 7 bytes, echo included.
    pub const OPERATION_STATUS: u16 = 0x0054;

    /// Data flash is addressed through the sub-command space.
    pub const DATA_FLASH_START: u16 = 0x4000;
    pub const DATA_FLASH_END: u16 = 0x5FFF;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacRequest {
    pub sub_command: u16,
    /// Includes the 2-byte echo.
    pub reply_len: usize,
}

impl MacRequest {
    pub const fn new(sub_command: u16, reply_len: usize) -> Self {
        Self {
            sub_command,
            reply_len,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacResponse {
    /// The echoed sub-command. Always equal to the one that was sent.
    pub sub_command: u16,
    /// The reply without the echo, `reply_len - 2` bytes.
    pub payload: Bytes,
}

impl MacResponse {
    pub fn decode(&self, wire_type: WireType) -> Result<Value, CodecError> {
        codec::decode(wire_type, &self.payload)
    }
}

/// Writes `data` to the mailbox under `sub_command`: `[0x44, 2 + len, lo, hi, data...]`.
pub async fn write<I: I2c>(
    i2c: &mut I,
    address: u8,
    sub_command: u16,
    data: &[u8],
) -> Result<(), Error<I::Error>> {
    if data.len() > MAX_BLOCK_LEN {
        return Err(Error::InvalidLength(data.len()));
    }

    let [lo, hi] = sub_command.to_le_bytes();
    let len = 4 + data.len();

    let mut frame = [0; 4 + MAX_BLOCK_LEN];
    frame[..4].copy_from_slice(&[
        MANUFACTURER_ACCESS,
        (ECHO_LEN + data.len()) as u8,
        lo,
        hi,
    ]);
    frame[4..len].copy_from_slice(data);

    logger::trace!("MAC {:#x}: writing {} bytes", sub_command, data.len());

    i2c.write(address, &frame[..len])
        .await
        .map_err(Error::Transport)
}

pub async fn send<I: I2c>(
    i2c: &mut I,
    address: u8,
    sub_command: u16,
) -> Result<(), Error<I::Error>> {
    write(i2c, address, sub_command, &[]).await
}

/// Runs a full exchange: command, settle delay, reply.
///
/// The reply buffer starts zeroed, so a device that has not processed the command yet shows up
/// as an echo mismatch.
pub async fn command<I: I2c, D: DelayNs>(
    i2c: &mut I,
    delay: &mut D,
    address: u8,
    settle_delay_us: u32,
    request: MacRequest,
) -> Result<MacResponse, Error<I::Error>> {
    if !(ECHO_LEN..=MAX_REPLY_LEN).contains(&request.reply_len) {
        return Err(Error::InvalidLength(request.reply_len));
    }

    send(i2c, address, request.sub_command).await?;

    delay.delay_us(settle_delay_us).await;

    logger::trace!(
        "MAC {:#x}: reading {} bytes",
        request.sub_command,
        request.reply_len
    );

    let mut buffer = [0; MAX_REPLY_LEN];
    let reply = &mut buffer[..request.reply_len];
    i2c.write_read(address, &[MANUFACTURER_ACCESS], reply)
        .await
        .map_err(Error::Transport)?;

    let (echo, payload) = reply.split_at(ECHO_LEN);
    let echoed = u16::from_le_bytes([echo[0], echo[1]]);
    if echoed != request.sub_command {
        return Err(Error::Framing {
            sent: request.sub_command,
            echoed,
        });
    }

    let payload = Bytes::from_slice(payload).map_err(|_| Error::InvalidLength(payload.len()))?;

    logger::debug!(
        "MAC {:#x}: {} byte payload",
        request.sub_command,
        payload.len()
    );

    Ok(MacResponse {
        sub_command: echoed,
        payload,
    })
}

fn check_data_flash_range<E>(address: u16, len: usize) -> Result<(), Error<E>> {
    let start = commands::DATA_FLASH_START as usize;
    let end = commands::DATA_FLASH_END as usize;

    let first = address as usize;
    let last = first + len.saturating_sub(1);

    if first < start || last > end {
        return Err(Error::InvalidDataFlashAddress(address));
    }

    Ok(())
}

impl<I> Bq4050<'_, I>
where
    I: I2c,
{
    pub async fn mac_command<D: DelayNs>(
        &mut self,
        request: MacRequest,
        delay: &mut D,
    ) -> Result<MacResponse, Error<I::Error>> {
        command(
            &mut self.i2c,
            delay,
            self.config.address,
            self.config.settle_delay_us,
            request,
        )
        .await
    }

    /// Issues a sub-command without reading a reply, e.g. [`commands::DEVICE_RESET`].
    pub async fn mac_send(&mut self, sub_command: u16) -> Result<(), Error<I::Error>> {
        send(&mut self.i2c, self.config.address, sub_command).await
    }

    pub async fn mac_write(
        &mut self,
        sub_command: u16,
        data: &[u8],
    ) -> Result<(), Error<I::Error>> {
        write(&mut self.i2c, self.config.address, sub_command, data).await
    }

    /// Fills `buffer` with data flash contents starting at `address`.
    ///
    /// Every 32-byte chunk is a separate MAC exchange. On error, `buffer` may be partially filled.
    pub async fn read_data_flash<D: DelayNs>(
        &mut self,
        address: u16,
        buffer: &mut [u8],
        delay: &mut D,
    ) -> Result<(), Error<I::Error>> {
        check_data_flash_range(address, buffer.len())?;

        for (idx, chunk) in buffer.chunks_mut(MAX_BLOCK_LEN).enumerate() {
            let chunk_address = address + (idx * MAX_BLOCK_LEN) as u16;

            let response = self
                .mac_command(MacRequest::new(chunk_address, MAX_REPLY_LEN), delay)
                .await?;

            chunk.copy_from_slice(&response.payload[..chunk.len()]);
        }

        Ok(())
    }

    pub async fn write_data_flash(
        &mut self,
        address: u16,
        data: &[u8],
    ) -> Result<(), Error<I::Error>> {
        if data.len() > MAX_BLOCK_LEN {
            return Err(Error::InvalidLength(data.len()));
        }
        check_data_flash_range(address, data.len())?;

        self.mac_write(address, data).await
    }

    /// Reads OperationStatus through the MAC mailbox instead of its own command code.
    pub async fn operation_status_via_mac<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<OperationStatus, Error<I::Error>> {
        let response = self
            .mac_command(MacRequest::new(commands::OPERATION_STATUS, 7), delay)
            .await?;

        let bits = response
            .decode(WireType::Bitfield32)
            .map_err(|err| Error::from_codec(err, MANUFACTURER_ACCESS))?
            .as_bits()
            .ok_or(Error::ValueMismatch)?;

        Ok(OperationStatus::from_bits(bits))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        catalog::Catalog,
        flags::SecurityMode,
        test_util::{init_test, Event, MockBus, Simulator},
        Config,
    };

    fn gauge(sim: &Simulator, config: Config) -> Bq4050<'static, MockBus> {
        Bq4050::new(sim.bus(), config, Catalog::bq4050())
    }

    #[async_std::test]
    async fn matching_echo_yields_the_payload() {
        init_test();

        let sim = Simulator::new();
        sim.set_mac_reply(0x0054, &[0x54, 0x00, 0x07, 0x03, 0x00, 0x00, 0xAA]);
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let response = gauge
            .mac_command(MacRequest::new(0x0054, 7), &mut delay)
            .await
            .unwrap();

        assert_eq!(response.sub_command, 0x0054);
        assert_eq!(&response.payload[..], &[0x07, 0x03, 0x00, 0x00, 0xAA]);
    }

    #[async_std::test]
    async fn mismatched_echo_is_a_framing_error() {
        init_test();

        let sim = Simulator::new();
        sim.set_mac_reply(0x0054, &[0x00, 0x00, 0x07, 0x03, 0x00, 0x00, 0xAA]);
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let result = gauge
            .mac_command(MacRequest::new(0x0054, 7), &mut delay)
            .await;

        assert_eq!(
            result,
            Err(Error::Framing {
                sent: 0x0054,
                echoed: 0x0000
            })
        );
    }

    #[async_std::test]
    async fn phases_run_in_order_with_the_settle_delay_between() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        gauge
            .mac_command(MacRequest::new(commands::FIRMWARE_VERSION, 12), &mut delay)
            .await
            .unwrap();

        assert_eq!(
            sim.events(),
            [
                Event::Write(vec![0x44, 0x02, 0x02, 0x00]),
                Event::Delay { ns: 10_000_000 },
                Event::WriteRead {
                    write: vec![0x44],
                    read_len: 12
                },
            ]
        );
    }

    #[async_std::test]
    async fn skipping_the_settle_delay_reads_a_stale_reply() {
        init_test();

        let sim = Simulator::new();
        sim.set_min_settle_us(500);
        let mut delay = sim.delay();

        let hasty = Config {
            settle_delay_us: 0,
            ..Config::default()
        };
        let result = gauge(&sim, hasty)
            .mac_command(MacRequest::new(0x0054, 7), &mut delay)
            .await;
        assert_eq!(
            result,
            Err(Error::Framing {
                sent: 0x0054,
                echoed: 0x0000
            })
        );

        let patient = Config {
            settle_delay_us: 500,
            ..Config::default()
        };
        let result = gauge(&sim, patient)
            .mac_command(MacRequest::new(0x0054, 7), &mut delay)
            .await;
        assert!(result.is_ok());
    }

    #[async_std::test]
    async fn reply_length_is_validated_before_the_bus() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        for len in [0, 1, MAX_REPLY_LEN + 1] {
            assert_eq!(
                gauge
                    .mac_command(MacRequest::new(0x0001, len), &mut delay)
                    .await,
                Err(Error::InvalidLength(len))
            );
        }

        let too_long = [0; MAX_BLOCK_LEN + 1];
        assert_eq!(
            gauge.mac_write(0x0001, &too_long).await,
            Err(Error::InvalidLength(33))
        );

        assert_eq!(sim.call_count(), 0);
    }

    #[async_std::test]
    async fn echo_only_reply_has_empty_payload() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let response = gauge
            .mac_command(MacRequest::new(commands::DEVICE_TYPE, 2), &mut delay)
            .await
            .unwrap();

        assert!(response.payload.is_empty());
    }

    #[async_std::test]
    async fn payload_decodes_with_the_callers_wire_type() {
        init_test();

        let sim = Simulator::new();
        sim.set_mac_reply(commands::DEVICE_TYPE, &[0x01, 0x00, 0x50, 0x40]);
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let response = gauge
            .mac_command(MacRequest::new(commands::DEVICE_TYPE, 4), &mut delay)
            .await
            .unwrap();

        assert_eq!(response.decode(WireType::U16), Ok(Value::Unsigned(0x4050)));
        assert_eq!(
            response.decode(WireType::U32),
            Err(CodecError::InsufficientBytes {
                required: 4,
                available: 2
            })
        );
    }

    #[async_std::test]
    async fn transport_failure_aborts_the_exchange() {
        init_test();

        let sim = Simulator::new();
        sim.set_nack(true);
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let result = gauge
            .mac_command(MacRequest::new(0x0054, 7), &mut delay)
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(sim.call_count(), 1);
        assert!(sim.events().is_empty());
    }

    #[async_std::test]
    async fn send_and_write_frame_the_sub_command() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());

        gauge.mac_send(commands::DEVICE_RESET).await.unwrap();
        gauge
            .mac_write(commands::SECURITY_KEYS, &[0x14, 0x04, 0x72, 0x36])
            .await
            .unwrap();

        assert_eq!(
            sim.events(),
            [
                Event::Write(vec![0x44, 0x02, 0x41, 0x00]),
                Event::Write(vec![0x44, 0x06, 0x35, 0x00, 0x14, 0x04, 0x72, 0x36]),
            ]
        );
    }

    #[async_std::test]
    async fn data_flash_is_read_in_block_sized_chunks() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let mut buffer = [0; 40];
        gauge
            .read_data_flash(0x4010, &mut buffer, &mut delay)
            .await
            .unwrap();

        assert_eq!(buffer.to_vec(), sim.data_flash(0x4010, 40));

        let command_writes = sim
            .events()
            .into_iter()
            .filter(|event| matches!(event, Event::Write(_)))
            .collect::<Vec<_>>();
        assert_eq!(
            command_writes,
            [
                Event::Write(vec![0x44, 0x02, 0x10, 0x40]),
                Event::Write(vec![0x44, 0x02, 0x30, 0x40]),
            ]
        );
        assert_eq!(sim.call_count(), 4);
    }

    #[async_std::test]
    async fn data_flash_writes_are_read_back() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        gauge
            .write_data_flash(0x4A00, &[0xDE, 0xAD, 0xBE, 0xEF])
            .await
            .unwrap();

        let mut buffer = [0; 4];
        gauge
            .read_data_flash(0x4A00, &mut buffer, &mut delay)
            .await
            .unwrap();

        assert_eq!(buffer, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[async_std::test]
    async fn data_flash_range_is_checked_before_the_bus() {
        init_test();

        let sim = Simulator::new();
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let mut buffer = [0; 32];
        assert_eq!(
            gauge.read_data_flash(0x3FFF, &mut buffer, &mut delay).await,
            Err(Error::InvalidDataFlashAddress(0x3FFF))
        );
        assert_eq!(
            gauge.read_data_flash(0x5FF0, &mut buffer, &mut delay).await,
            Err(Error::InvalidDataFlashAddress(0x5FF0))
        );
        assert_eq!(
            gauge.write_data_flash(0x6000, &[0]).await,
            Err(Error::InvalidDataFlashAddress(0x6000))
        );
        assert_eq!(sim.call_count(), 0);

        gauge
            .read_data_flash(0x5FE0, &mut buffer, &mut delay)
            .await
            .unwrap();
        assert_eq!(buffer.to_vec(), sim.data_flash(0x5FE0, 32));
    }

    #[async_std::test]
    async fn operation_status_through_the_mailbox() {
        init_test();

        let sim = Simulator::new();
        sim.set_mac_reply(
            commands::OPERATION_STATUS,
            &[0x54, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00],
        );
        let mut gauge = gauge(&sim, Config::default());
        let mut delay = sim.delay();

        let status = gauge.operation_status_via_mac(&mut delay).await.unwrap();

        assert_eq!(status.bits(), 0x0200);
        assert_eq!(
            status.security_mode().read(),
            Some(SecurityMode::Unsealed)
        );
    }
}
