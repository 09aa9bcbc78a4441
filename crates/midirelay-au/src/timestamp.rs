//! Render-cycle timestamp passed through to the output callback.

/// Timestamp of a render cycle, shaped like Core Audio's `AudioTimeStamp`.
///
/// The engine never interprets it; every delivery of one flush carries the
/// same value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioTimeStamp {
    /// Sample position of the first frame of the cycle.
    pub sample_time: f64,
    /// Host clock time of the first frame.
    pub host_time: u64,
    /// Which fields are valid (see [`AudioTimeStamp::SAMPLE_TIME_VALID`]).
    pub flags: u32,
}

impl AudioTimeStamp {
    /// `sample_time` is valid.
    pub const SAMPLE_TIME_VALID: u32 = 1 << 0;
    /// `host_time` is valid.
    pub const HOST_TIME_VALID: u32 = 1 << 1;

    /// Timestamp carrying only a sample position.
    pub const fn from_sample_time(sample_time: f64) -> Self {
        Self {
            sample_time,
            host_time: 0,
            flags: Self::SAMPLE_TIME_VALID,
        }
    }

    /// Add a host clock time.
    pub const fn with_host_time(mut self, host_time: u64) -> Self {
        self.host_time = host_time;
        self.flags |= Self::HOST_TIME_VALID;
        self
    }

    /// Whether the sample position is valid.
    #[inline]
    pub const fn has_sample_time(&self) -> bool {
        self.flags & Self::SAMPLE_TIME_VALID != 0
    }

    /// Whether the host time is valid.
    #[inline]
    pub const fn has_host_time(&self) -> bool {
        self.flags & Self::HOST_TIME_VALID != 0
    }
}
