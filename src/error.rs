use crate::codec::CodecError;

/// Failures surfaced by the register and MAC engines. `E` is the bus error type.
///
/// Nothing in this crate retries: a failed MAC exchange must be restarted from its command
/// phase by the caller.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The register address is not in the catalog.
    NotFound(u8),
    /// The device returned fewer bytes than the value needs.
    InsufficientBytes { required: usize, available: usize },
    /// The register is read-only. Nothing was sent on the bus.
    UnsupportedWrite(u8),
    Transport(E),
    /// The MAC reply did not echo the sub-command that was sent.
    Framing { sent: u16, echoed: u16 },
    /// The value does not match the register's wire type.
    ValueMismatch,
    BlockTooLong { count: u8 },
    /// A MAC reply or payload length outside what the protocol can carry. Nothing was sent on
    /// the bus.
    InvalidLength(usize),
    /// The data flash range does not lie within `0x4000..=0x5FFF`. Nothing was sent on the bus.
    InvalidDataFlashAddress(u16),
}

impl<E> Error<E> {
    pub(crate) fn from_codec(err: CodecError, address: u8) -> Self {
        match err {
            CodecError::InsufficientBytes {
                required,
                available,
            } => Error::InsufficientBytes {
                required,
                available,
            },
            CodecError::UnsupportedWrite => Error::UnsupportedWrite(address),
            CodecError::ValueMismatch => Error::ValueMismatch,
            CodecError::BlockTooLong { count } => Error::BlockTooLong { count },
        }
    }
}
