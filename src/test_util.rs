//! A simulated BQ4050 on a mock SMBus, with a delay that advances the simulated clock.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use embassy_futures::yield_now;
use embedded_hal_async::{
    delay::DelayNs,
    i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation},
};

use crate::{
    mac::{commands, MANUFACTURER_ACCESS},
    DEFAULT_ADDRESS,
};

pub fn init_test() {
    _ = simple_logger::SimpleLogger::new().env().init();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A transaction that only wrote, ended by a stop condition.
    Write(Vec<u8>),
    /// Write, repeated start, read.
    WriteRead { write: Vec<u8>, read_len: usize },
    Delay { ns: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusError;

impl i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

const FLASH_SIZE: usize = (commands::DATA_FLASH_END - commands::DATA_FLASH_START) as usize + 1;

struct Device {
    address: u8,
    nack: bool,
    calls: usize,
    operations: usize,
    events: Vec<Event>,

    registers: HashMap<u8, Vec<u8>>,
    mac_replies: HashMap<u16, Vec<u8>>,
    data_flash: Vec<u8>,

    /// Sub-command of the last MAC write and the time elapsed since, in ns.
    pending: Option<(u16, u64)>,
    min_settle_ns: u64,
}

impl Device {
    fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            nack: false,
            calls: 0,
            operations: 0,
            events: Vec::new(),
            registers: HashMap::new(),
            mac_replies: HashMap::new(),
            data_flash: (0..FLASH_SIZE).map(|i| i as u8).collect(),
            pending: None,
            min_settle_ns: 0,
        }
    }

    fn flash_offset(sub_command: u16) -> Option<usize> {
        (commands::DATA_FLASH_START..=commands::DATA_FLASH_END)
            .contains(&sub_command)
            .then(|| (sub_command - commands::DATA_FLASH_START) as usize)
    }

    fn write(&mut self, data: &[u8]) {
        match data {
            [MANUFACTURER_ACCESS, count, lo, hi, payload @ ..] if *count as usize >= 2 => {
                let sub_command = u16::from_le_bytes([*lo, *hi]);

                if let Some(offset) = Self::flash_offset(sub_command) {
                    let end = (offset + payload.len()).min(FLASH_SIZE);
                    self.data_flash[offset..end].copy_from_slice(&payload[..end - offset]);
                }

                self.pending = Some((sub_command, 0));
            }
            [register, payload @ ..] if !payload.is_empty() => {
                self.registers.insert(*register, payload.to_vec());
            }
            _ => {}
        }
    }

    fn mac_reply(&self) -> Vec<u8> {
        let Some((sub_command, elapsed)) = self.pending else {
            return Vec::new();
        };

        // Reading too early returns whatever the mailbox held before.
        if elapsed < self.min_settle_ns {
            return Vec::new();
        }

        if let Some(reply) = self.mac_replies.get(&sub_command) {
            return reply.clone();
        }

        let mut reply = sub_command.to_le_bytes().to_vec();
        if let Some(offset) = Self::flash_offset(sub_command) {
            let end = (offset + 32).min(FLASH_SIZE);
            reply.extend_from_slice(&self.data_flash[offset..end]);
        }
        reply
    }

    fn reply(&self, written: &[u8]) -> Vec<u8> {
        match written {
            [MANUFACTURER_ACCESS] => self.mac_reply(),
            [register] => self.registers.get(register).cloned().unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), BusError> {
        self.calls += 1;
        self.operations += operations.len();

        if self.nack || address != self.address {
            return Err(BusError);
        }

        let mut written = Vec::new();
        for op in operations.iter() {
            if let Operation::Write(data) = op {
                written.extend_from_slice(data);
            }
        }

        let mut reply = self.reply(&written).into_iter();
        let mut read_len = 0;
        for op in operations.iter_mut() {
            if let Operation::Read(buffer) = op {
                read_len += buffer.len();
                for byte in buffer.iter_mut() {
                    *byte = reply.next().unwrap_or(0);
                }
            }
        }

        if read_len == 0 {
            self.write(&written);
            self.events.push(Event::Write(written));
        } else {
            self.events.push(Event::WriteRead {
                write: written,
                read_len,
            });
        }

        Ok(())
    }
}

/// Handle to the simulated device. Clones share the same device.
#[derive(Clone)]
pub struct Simulator {
    device: Rc<RefCell<Device>>,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            device: Rc::new(RefCell::new(Device::new())),
        }
    }

    pub fn bus(&self) -> MockBus {
        MockBus {
            device: self.device.clone(),
        }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay {
            device: self.device.clone(),
        }
    }

    /// Raw reply of a register read, including the count byte of block registers.
    pub fn set_register(&self, register: u8, reply: &[u8]) {
        self.device
            .borrow_mut()
            .registers
            .insert(register, reply.to_vec());
    }

    pub fn register(&self, register: u8) -> Option<Vec<u8>> {
        self.device.borrow().registers.get(&register).cloned()
    }

    /// Raw reply of the MAC read phase, starting with the echoed sub-command.
    pub fn set_mac_reply(&self, sub_command: u16, reply: &[u8]) {
        self.device
            .borrow_mut()
            .mac_replies
            .insert(sub_command, reply.to_vec());
    }

    pub fn data_flash(&self, address: u16, len: usize) -> Vec<u8> {
        let offset = (address - commands::DATA_FLASH_START) as usize;
        self.device.borrow().data_flash[offset..offset + len].to_vec()
    }

    pub fn set_min_settle_us(&self, us: u32) {
        self.device.borrow_mut().min_settle_ns = us as u64 * 1_000;
    }

    pub fn set_nack(&self, nack: bool) {
        self.device.borrow_mut().nack = nack;
    }

    /// Number of bus transactions attempted, including failed ones.
    pub fn call_count(&self) -> usize {
        self.device.borrow().calls
    }

    /// Number of operations across all attempted transactions.
    pub fn operation_count(&self) -> usize {
        self.device.borrow().operations
    }

    pub fn events(&self) -> Vec<Event> {
        self.device.borrow().events.clone()
    }
}

pub struct MockBus {
    device: Rc<RefCell<Device>>,
}

impl ErrorType for MockBus {
    type Error = BusError;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.device.borrow_mut().transaction(address, operations)
    }
}

pub struct MockDelay {
    device: Rc<RefCell<Device>>,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        {
            let mut device = self.device.borrow_mut();
            if let Some((_, elapsed)) = device.pending.as_mut() {
                *elapsed += ns as u64;
            }
            device.events.push(Event::Delay { ns });
        }

        // Lets other tasks touch the bus while this one waits.
        yield_now().await;
    }
}
