//! The SBS register map of the BQ4050.

use crate::codec::{self, CodecError, Encoded, Value, WireType};

use WireType::*;

/// Largest reply of a block read: one count byte and up to 32 payload bytes.
pub const MAX_BLOCK_READ: usize = codec::MAX_WINDOW_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// SMBus transaction shape the register answers with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    /// Read byte/word: the reply is exactly the value.
    Word,
    /// Block read: the reply starts with the number of valid bytes that follow.
    Block,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDescriptor {
    pub address: u8,
    pub name: &'static str,
    pub wire_type: WireType,
    pub access: Access,
    pub protocol: Protocol,
}

impl RegisterDescriptor {
    pub const fn read_only(address: u8, name: &'static str, wire_type: WireType) -> Self {
        Self {
            address,
            name,
            wire_type,
            access: Access::ReadOnly,
            protocol: Protocol::Word,
        }
    }

    pub const fn read_write(address: u8, name: &'static str, wire_type: WireType) -> Self {
        Self {
            address,
            name,
            wire_type,
            access: Access::ReadWrite,
            protocol: Protocol::Word,
        }
    }

    pub const fn block(self) -> Self {
        Self {
            protocol: Protocol::Block,
            ..self
        }
    }

    pub const fn is_writable(&self) -> bool {
        matches!(self.access, Access::ReadWrite)
    }

    /// Number of bytes to clock out of the device when reading this register.
    pub const fn read_len(&self) -> usize {
        match (self.wire_type.width(), self.protocol) {
            (Some(width), Protocol::Word) => width,
            (Some(width), Protocol::Block) => width + 1,
            (None, _) => MAX_BLOCK_READ,
        }
    }

    /// Decodes a raw reply of this register, stripping the block count byte where the register
    /// answers with a block read.
    pub fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        match (self.protocol, self.wire_type) {
            // Block32 does its own slicing.
            (Protocol::Block, WireType::Block32) | (Protocol::Word, _) => {
                codec::decode(self.wire_type, raw)
            }
            (Protocol::Block, wire_type) => codec::decode(wire_type, codec::block_payload(raw)?),
        }
    }

    /// Encodes `value` for writing. Only the value bytes are returned, without the command code.
    pub fn encode(&self, value: &Value) -> Result<Encoded, CodecError> {
        if !self.is_writable() {
            return Err(CodecError::UnsupportedWrite);
        }

        codec::encode(self.wire_type, value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CatalogError {
    DuplicateAddress(u8),
}

/// An immutable set of register descriptors, unique by address.
#[derive(Clone, Copy, Debug)]
pub struct Catalog<'a> {
    entries: &'a [RegisterDescriptor],
}

impl<'a> Catalog<'a> {
    pub fn new(entries: &'a [RegisterDescriptor]) -> Result<Self, CatalogError> {
        for (idx, entry) in entries.iter().enumerate() {
            if entries[idx + 1..]
                .iter()
                .any(|other| other.address == entry.address)
            {
                return Err(CatalogError::DuplicateAddress(entry.address));
            }
        }

        Ok(Self { entries })
    }

    pub fn lookup(&self, address: u8) -> Option<&'a RegisterDescriptor> {
        self.entries.iter().find(|entry| entry.address == address)
    }

    pub fn by_name(&self, name: &str) -> Option<&'a RegisterDescriptor> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RegisterDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog<'static> {
    /// The standard BQ4050 register map.
    pub const fn bq4050() -> Self {
        Self {
            entries: BQ4050_REGISTERS,
        }
    }
}

const fn ro(address: u8, name: &'static str, wire_type: WireType) -> RegisterDescriptor {
    RegisterDescriptor::read_only(address, name, wire_type)
}

const fn rw(address: u8, name: &'static str, wire_type: WireType) -> RegisterDescriptor {
    RegisterDescriptor::read_write(address, name, wire_type)
}

#[rustfmt::skip]
pub const BQ4050_REGISTERS: &[RegisterDescriptor] = &[
    rw(0x01, "RemainingCapacityAlarm", U16),
    rw(0x02, "RemainingTimeAlarm", U16),
    rw(0x03, "BatteryMode", Bitfield16),
    rw(0x04, "AtRate", I16),
    ro(0x05, "AtRateTimeToFull", U16),
    ro(0x06, "AtRateTimeToEmpty", U16),
    ro(0x07, "AtRateOK", U16),
    ro(0x08, "Temperature", U16),
    ro(0x09, "Voltage", U16),
    ro(0x0a, "Current", I16),
    ro(0x0b, "AverageCurrent", I16),
    ro(0x0c, "MaxError", U8),
    ro(0x0d, "RelativeStateOfCharge", U8),
    ro(0x0e, "AbsoluteStateOfCharge", U8),
    ro(0x0f, "RemainingCapacity", U16),
    ro(0x10, "FullChargeCapacity", U16),
    ro(0x11, "RunTimeToEmpty", U16),
    ro(0x12, "AverageTimeToEmpty", U16),
    ro(0x13, "AverageTimeToFull", U16),
    ro(0x14, "ChargingCurrent", U16),
    ro(0x15, "ChargingVoltage", U16),
    ro(0x16, "BatteryStatus", Bitfield16),
    ro(0x17, "CycleCount", U16),
    ro(0x18, "DesignCapacity", U16),
    ro(0x19, "DesignVoltage", U16),
    ro(0x1a, "SpecificationInfo", Bitfield16),
    ro(0x1b, "ManufactureDate", U16),
    ro(0x1c, "SerialNumber", Bitfield16),
    ro(0x20, "ManufacturerName", VariableString).block(),
    ro(0x21, "DeviceName", VariableString).block(),
    ro(0x22, "DeviceChemistry", VariableString).block(),
    ro(0x23, "ManufacturerData", Block32).block(),
    ro(0x3c, "CellVoltage3", U16),
    ro(0x3d, "CellVoltage2", U16),
    ro(0x3e, "CellVoltage1", U16),
    ro(0x3f, "CellVoltage0", U16),
    rw(0x4a, "BTPDischargeSet", I16),
    rw(0x4b, "BTPChargeSet", I16),
    ro(0x4f, "StateOfHealth", U16),
    ro(0x50, "SafetyAlert", Bitfield32).block(),
    ro(0x51, "SafetyStatus", Bitfield32).block(),
    ro(0x52, "PFAlert", Bitfield32).block(),
    ro(0x53, "PFStatus", Bitfield32).block(),
    ro(0x54, "OperationStatus", Bitfield32).block(),
    ro(0x55, "ChargingStatus", Bitfield32).block(),
    ro(0x56, "GaugingStatus", Bitfield32).block(),
    ro(0x57, "ManufacturingStatus", Bitfield32).block(),
    ro(0x58, "AFERegister", Block32).block(),
    ro(0x60, "LifetimeDataBlock1", Block32).block(),
    ro(0x61, "LifetimeDataBlock2", Block32).block(),
    ro(0x62, "LifetimeDataBlock3", Block32).block(),
    ro(0x63, "LifetimeDataBlock4", Block32).block(),
    ro(0x64, "LifetimeDataBlock5", Block32).block(),
    ro(0x70, "ManufacturerInfo", Block32).block(),
    ro(0x71, "DAStatus1", Block32).block(),
    ro(0x72, "DAStatus2", Block32).block(),
];
