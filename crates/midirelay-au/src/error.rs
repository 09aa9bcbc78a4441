//! Output error types.

use std::fmt;

/// Status code returned by host callbacks (`OSStatus`).
pub type OsStatus = i32;

/// Error type for MIDI output delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// The host's output callback returned a non-zero status.
    SinkFailed(OsStatus),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinkFailed(status) => write!(f, "MIDI output callback failed: {}", status),
        }
    }
}

impl std::error::Error for OutputError {}

impl OutputError {
    /// Status code to report back to the host.
    pub fn to_os_status(&self) -> OsStatus {
        match self {
            Self::SinkFailed(status) => *status,
        }
    }
}

/// Result type alias for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Convert a host status code into a result.
#[inline]
pub fn check_status(status: OsStatus) -> OutputResult<()> {
    if status == os_status::NO_ERR {
        Ok(())
    } else {
        Err(OutputError::SinkFailed(status))
    }
}

// OSStatus error codes used around MIDI output
pub mod os_status {
    /// No error.
    pub const NO_ERR: i32 = 0;

    /// Render operation failed.
    pub const K_AUDIO_UNIT_ERR_RENDER: i32 = -10877;
}
