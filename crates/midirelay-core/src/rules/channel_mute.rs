//! Channel mute: silence note starts on selected channels.

use crate::midi::{MidiChannel, MidiEvent, MidiStatus, CHANNEL_COUNT};

/// Drops note-ons on muted channels.
///
/// On a muted channel NoteOn is dropped and NoteOff is forwarded, so notes
/// that were already sounding still get released. A NoteOff for note
/// number 0 on a muted channel is dropped as well. All other messages pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelMuteRule {
    muted: [bool; CHANNEL_COUNT],
}

impl ChannelMuteRule {
    /// Rule with every channel audible.
    pub const fn new() -> Self {
        Self {
            muted: [false; CHANNEL_COUNT],
        }
    }

    /// Rule from a per-channel mute table.
    pub const fn from_mask(muted: [bool; CHANNEL_COUNT]) -> Self {
        Self { muted }
    }

    /// Mute one channel. Out-of-range channels are ignored.
    pub fn with_muted(mut self, channel: MidiChannel) -> Self {
        self.set_muted(channel, true);
        self
    }

    /// Set the mute state of one channel. Out-of-range channels are ignored.
    pub fn set_muted(&mut self, channel: MidiChannel, muted: bool) {
        if let Some(slot) = self.muted.get_mut(channel as usize) {
            *slot = muted;
        }
    }

    /// Whether `channel` is muted.
    #[inline]
    pub fn is_muted(&self, channel: MidiChannel) -> bool {
        self.muted.get(channel as usize).copied().unwrap_or(false)
    }

    /// The full mute table.
    pub fn mask(&self) -> &[bool; CHANNEL_COUNT] {
        &self.muted
    }

    /// Forward the event unless it is suppressed.
    #[inline]
    pub fn apply<F: FnMut(MidiEvent)>(&self, event: &MidiEvent, mut emit: F) {
        if !self.suppresses(event) {
            emit(*event);
        }
    }

    fn suppresses(&self, event: &MidiEvent) -> bool {
        if !self.is_muted(event.channel) {
            return false;
        }
        match event.status.normalized() {
            MidiStatus::NoteOn => true,
            MidiStatus::NoteOff => event.data1 == 0,
            _ => false,
        }
    }
}
