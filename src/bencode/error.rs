use thiserror::Error;

/// Errors produced while decoding bencode. Positions are byte offsets into
/// the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BencodeError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    #[error("invalid integer at offset {pos}: {reason}")]
    InvalidInteger { pos: usize, reason: &'static str },

    #[error("invalid string length at offset {0}")]
    InvalidStringLength(usize),

    #[error("unexpected byte {byte:#04x} at offset {pos}")]
    UnexpectedByte { byte: u8, pos: usize },

    #[error("dictionary key at offset {0} is not a byte string")]
    NonStringKey(usize),

    #[error("trailing data after value at offset {0}")]
    TrailingData(usize),

    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}
