//! Conversion between raw SMBus byte windows and typed values.
//!
//! Multi-byte values are little-endian. Block values follow the SMBus block read convention: the
//! first byte counts the valid payload bytes that follow it.

use heapless::Vec;

/// Maximum payload of an SMBus block transfer.
pub const MAX_BLOCK_LEN: usize = 32;

/// A count byte and a full block.
pub const MAX_WINDOW_LEN: usize = MAX_BLOCK_LEN + 1;

pub type Bytes = Vec<u8, MAX_BLOCK_LEN>;

/// A whole read window, which is what a string register without a count byte decodes to.
pub type Text = Vec<u8, MAX_WINDOW_LEN>;

pub type Encoded = Vec<u8, MAX_WINDOW_LEN>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    Bitfield16,
    Bitfield32,
    /// Little-endian IEEE-754 single precision.
    Float,
    /// Every byte of the window, as text.
    VariableString,
    /// Count-prefixed block.
    Block32,
}

impl WireType {
    /// `None` for variable-length types.
    pub const fn width(self) -> Option<usize> {
        match self {
            WireType::U8 | WireType::I8 => Some(1),
            WireType::U16 | WireType::I16 | WireType::Bitfield16 => Some(2),
            WireType::U32 | WireType::I32 | WireType::Bitfield32 | WireType::Float => Some(4),
            WireType::VariableString | WireType::Block32 => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    Unsigned(u32),
    Signed(i32),
    /// Raw bit pattern, see [`crate::flags`] for typed views.
    Bitfield(u32),
    Float(f32),
    Text(Text),
    Block(Bytes),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(bytes) => core::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(text) => Some(text.as_slice()),
            Value::Block(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u32> {
        match self {
            Value::Unsigned(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<i32> {
        match self {
            Value::Signed(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bits(&self) -> Option<u32> {
        match self {
            Value::Bitfield(bits) => Some(*bits),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    InsufficientBytes { required: usize, available: usize },
    UnsupportedWrite,
    /// The value's variant does not belong to the wire type, or does not fit in it.
    ValueMismatch,
    /// A block or window longer than its value can hold.
    BlockTooLong { count: u8 },
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    bytes
        .get(..N)
        .and_then(|window| window.try_into().ok())
        .ok_or(CodecError::InsufficientBytes {
            required: N,
            available: bytes.len(),
        })
}

fn to_vec<const N: usize>(bytes: &[u8]) -> Result<Vec<u8, N>, CodecError> {
    Vec::from_slice(bytes).map_err(|_| CodecError::BlockTooLong {
        count: bytes.len().min(u8::MAX as usize) as u8,
    })
}

/// Returns the valid part of a block read reply: `raw[1..1 + raw[0]]`.
pub fn block_payload(raw: &[u8]) -> Result<&[u8], CodecError> {
    let Some((&count, rest)) = raw.split_first() else {
        return Err(CodecError::InsufficientBytes {
            required: 1,
            available: 0,
        });
    };

    if count as usize > MAX_BLOCK_LEN {
        return Err(CodecError::BlockTooLong { count });
    }

    rest.get(..count as usize)
        .ok_or(CodecError::InsufficientBytes {
            required: 1 + count as usize,
            available: raw.len(),
        })
}

pub fn decode(wire_type: WireType, bytes: &[u8]) -> Result<Value, CodecError> {
    let value = match wire_type {
        WireType::U8 => Value::Unsigned(fixed::<1>(bytes)?[0] as u32),
        WireType::U16 => Value::Unsigned(u16::from_le_bytes(fixed(bytes)?) as u32),
        WireType::U32 => Value::Unsigned(u32::from_le_bytes(fixed(bytes)?)),
        WireType::I8 => Value::Signed(fixed::<1>(bytes)?[0] as i8 as i32),
        WireType::I16 => Value::Signed(i16::from_le_bytes(fixed(bytes)?) as i32),
        WireType::I32 => Value::Signed(i32::from_le_bytes(fixed(bytes)?)),
        WireType::Bitfield16 => Value::Bitfield(u16::from_le_bytes(fixed(bytes)?) as u32),
        WireType::Bitfield32 => Value::Bitfield(u32::from_le_bytes(fixed(bytes)?)),
        WireType::Float => Value::Float(f32::from_le_bytes(fixed(bytes)?)),
        WireType::VariableString => Value::Text(to_vec(bytes)?),
        WireType::Block32 => Value::Block(to_vec(block_payload(bytes)?)?),
    };

    Ok(value)
}

fn narrow<T: TryFrom<V>, V>(value: V) -> Result<T, CodecError> {
    T::try_from(value).map_err(|_| CodecError::ValueMismatch)
}

/// Inverse of [`decode`]. Integers are range-checked against the wire type.
pub fn encode(wire_type: WireType, value: &Value) -> Result<Encoded, CodecError> {
    let mut out = Encoded::new();

    let pushed = match (wire_type, value) {
        (WireType::U8, Value::Unsigned(v)) => {
            out.extend_from_slice(&narrow::<u8, _>(*v)?.to_le_bytes())
        }
        (WireType::U16, Value::Unsigned(v)) => {
            out.extend_from_slice(&narrow::<u16, _>(*v)?.to_le_bytes())
        }
        (WireType::U32, Value::Unsigned(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (WireType::I8, Value::Signed(v)) => {
            out.extend_from_slice(&narrow::<i8, _>(*v)?.to_le_bytes())
        }
        (WireType::I16, Value::Signed(v)) => {
            out.extend_from_slice(&narrow::<i16, _>(*v)?.to_le_bytes())
        }
        (WireType::I32, Value::Signed(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (WireType::Bitfield16, Value::Bitfield(v)) => {
            out.extend_from_slice(&narrow::<u16, _>(*v)?.to_le_bytes())
        }
        (WireType::Bitfield32, Value::Bitfield(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (WireType::Float, Value::Float(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (WireType::VariableString, Value::Text(bytes)) => out.extend_from_slice(bytes),
        (WireType::Block32, Value::Block(bytes)) => out
            .push(bytes.len() as u8)
            .map_err(|_| ())
            .and_then(|_| out.extend_from_slice(bytes)),
        _ => return Err(CodecError::ValueMismatch),
    };

    // `Encoded` fits a full window, or a count byte and a full block.
    pushed.map_err(|_| CodecError::ValueMismatch)?;

    Ok(out)
}
