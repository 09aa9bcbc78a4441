//! Configuration error types.
//!
//! Rule configurations are validated when they are built or decoded from a
//! parameter table. Nothing in the event path returns these errors.

use std::fmt;

/// Errors raised while loading a rule or engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Parameter table has the wrong number of entries.
    ParameterCount { expected: usize, found: usize },
    /// Parameter at this index is NaN or infinite.
    NonFiniteParameter(usize),
    /// Channel value outside 0-15 (or 1-16 in a parameter table).
    ChannelOutOfRange(i64),
    /// Note or controller value outside 0-127.
    NoteOutOfRange(i64),
    /// Transpose amount outside -127..=127.
    TransposeOutOfRange(i64),
    /// A chord mapping has a different number of output slots than the rule.
    OutputArity {
        trigger: u8,
        expected: usize,
        found: usize,
    },
    /// A chord rule was declared with zero output slots per mapping.
    EmptyArity,
    /// Packet list cannot hold even a single encoded message.
    PacketListTooSmall { capacity: usize, minimum: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterCount { expected, found } => write!(
                f,
                "Parameter table has {} entries, expected {}",
                found, expected
            ),
            Self::NonFiniteParameter(index) => {
                write!(f, "Parameter {} is not a finite number", index)
            }
            Self::ChannelOutOfRange(value) => write!(f, "Channel out of range: {}", value),
            Self::NoteOutOfRange(value) => write!(f, "Note number out of range: {}", value),
            Self::TransposeOutOfRange(value) => {
                write!(f, "Transpose amount out of range: {}", value)
            }
            Self::OutputArity {
                trigger,
                expected,
                found,
            } => write!(
                f,
                "Chord mapping for note {} has {} output slots, expected {}",
                trigger, found, expected
            ),
            Self::EmptyArity => write!(f, "Chord rule needs at least one output slot"),
            Self::PacketListTooSmall { capacity, minimum } => write!(
                f,
                "Packet list capacity {} bytes is below the {} byte minimum",
                capacity, minimum
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Check a 0-15 channel value.
pub(crate) fn check_channel(value: i64) -> ConfigResult<u8> {
    if (0..=15).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ConfigError::ChannelOutOfRange(value))
    }
}

/// Check a 0-127 note/data value.
pub(crate) fn check_note(value: i64) -> ConfigResult<u8> {
    if (0..=127).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ConfigError::NoteOutOfRange(value))
    }
}

/// Check a -127..=127 transpose amount.
pub(crate) fn check_transpose(value: i64) -> ConfigResult<i8> {
    if (-127..=127).contains(&value) {
        Ok(value as i8)
    } else {
        Err(ConfigError::TransposeOutOfRange(value))
    }
}
