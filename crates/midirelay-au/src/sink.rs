//! Host MIDI output contract.

use crate::error::{check_status, OsStatus, OutputResult};
use crate::packet::PacketList;
use crate::timestamp::AudioTimeStamp;

/// Receiver of encoded packet lists, usually the host's MIDI output callback.
///
/// Called on the render thread. Implementations must not block and are
/// called at most once per sub-batch; a failure is never retried.
pub trait MidiOutputSink {
    /// Deliver one packet list.
    ///
    /// `offset` is the sample offset of the delivery within the cycle. The
    /// flush engine always passes 0; per-event offsets travel in each
    /// packet's time stamp.
    fn send(&mut self, timestamp: &AudioTimeStamp, offset: u32, packets: &PacketList) -> OutputResult<()>;
}

/// Any closure with the host callback's shape is a sink.
///
/// A non-zero status maps to [`OutputError::SinkFailed`](crate::OutputError::SinkFailed).
impl<F> MidiOutputSink for F
where
    F: FnMut(&AudioTimeStamp, u32, &PacketList) -> OsStatus,
{
    #[inline]
    fn send(&mut self, timestamp: &AudioTimeStamp, offset: u32, packets: &PacketList) -> OutputResult<()> {
        check_status(self(timestamp, offset, packets))
    }
}
