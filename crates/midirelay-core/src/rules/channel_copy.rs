//! Channel copy: forward a channel's traffic and duplicate it elsewhere.

use crate::error::{check_channel, check_note, check_transpose, ConfigResult};
use crate::midi::{MidiChannel, MidiEvent, MidiStatus, MAX_DATA};

/// Copies events from one channel onto another.
///
/// The source event is always forwarded first. A copy on `to_channel` is
/// appended when the event is on `from_channel` and passes the filters:
///
/// | Status | Copied when |
/// |--------|-------------|
/// | NoteOn / NoteOff | `data1 >= key_range_min` and `data2 <= key_range_max`, note transposed |
/// | CC 64 (damper) | `pass_damper` |
/// | Other CC | `pass_other_cc` |
/// | Pitch bend | `pass_pitch_bend` |
/// | Anything else | `pass_other_messages` |
///
/// The note filter compares the *velocity* (`data2`) against
/// `key_range_max`, not the note number.
///
/// A transposed note that falls outside 0-127 is not copied; the source
/// event is still forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelCopyRule {
    /// Channel whose events are copied (0-15).
    pub from_channel: MidiChannel,
    /// Channel the copies are sent on (0-15).
    pub to_channel: MidiChannel,
    /// Lowest note number copied.
    pub key_range_min: u8,
    /// Upper bound checked against the note velocity.
    pub key_range_max: u8,
    /// Semitones added to copied notes (-127..=127).
    pub transpose: i8,
    /// Copy damper pedal (CC 64) messages.
    pub pass_damper: bool,
    /// Copy all other control changes.
    pub pass_other_cc: bool,
    /// Copy pitch bend.
    pub pass_pitch_bend: bool,
    /// Copy every other message kind (pressure, program change, ...).
    pub pass_other_messages: bool,
}

impl ChannelCopyRule {
    /// Copy everything from `from_channel` to `to_channel` without transposing.
    pub const fn new(from_channel: MidiChannel, to_channel: MidiChannel) -> Self {
        Self {
            from_channel,
            to_channel,
            key_range_min: 0,
            key_range_max: MAX_DATA,
            transpose: 0,
            pass_damper: true,
            pass_other_cc: true,
            pass_pitch_bend: true,
            pass_other_messages: true,
        }
    }

    /// Set the note filter bounds.
    pub const fn with_key_range(mut self, min: u8, max: u8) -> Self {
        self.key_range_min = min;
        self.key_range_max = max;
        self
    }

    /// Set the transpose amount in semitones.
    pub const fn with_transpose(mut self, semitones: i8) -> Self {
        self.transpose = semitones;
        self
    }

    /// Set which non-note messages are copied.
    pub const fn with_pass_flags(
        mut self,
        damper: bool,
        other_cc: bool,
        pitch_bend: bool,
        other_messages: bool,
    ) -> Self {
        self.pass_damper = damper;
        self.pass_other_cc = other_cc;
        self.pass_pitch_bend = pitch_bend;
        self.pass_other_messages = other_messages;
        self
    }

    /// Check channel, key range and transpose values.
    pub fn validate(&self) -> ConfigResult<()> {
        check_channel(self.from_channel as i64)?;
        check_channel(self.to_channel as i64)?;
        check_note(self.key_range_min as i64)?;
        check_note(self.key_range_max as i64)?;
        check_transpose(self.transpose as i64)?;
        Ok(())
    }

    /// Forward the event, then its copy if one is produced.
    #[inline]
    pub fn apply<F: FnMut(MidiEvent)>(&self, event: &MidiEvent, mut emit: F) {
        emit(*event);
        if let Some(copy) = self.copy_of(event) {
            emit(copy);
        }
    }

    /// The copy for `event` on `to_channel`, if the filters let it through.
    pub fn copy_of(&self, event: &MidiEvent) -> Option<MidiEvent> {
        if event.channel != self.from_channel {
            return None;
        }

        let passes = match event.status.normalized() {
            MidiStatus::NoteOn | MidiStatus::NoteOff => {
                if event.data1 < self.key_range_min || event.data2 > self.key_range_max {
                    return None;
                }
                let note = self.transposed(event.data1)?;
                return Some(event.with_data1(note).with_channel(self.to_channel));
            }
            MidiStatus::ControlChange if event.is_damper() => self.pass_damper,
            MidiStatus::ControlChange => self.pass_other_cc,
            MidiStatus::PitchBend => self.pass_pitch_bend,
            MidiStatus::Other(_) => self.pass_other_messages,
        };

        passes.then(|| event.with_channel(self.to_channel))
    }

    /// Apply the transpose amount, or `None` if the result leaves 0-127.
    fn transposed(&self, note: u8) -> Option<u8> {
        let shifted = note as i16 + self.transpose as i16;
        if (0..=MAX_DATA as i16).contains(&shifted) {
            Some(shifted as u8)
        } else {
            None
        }
    }
}

impl Default for ChannelCopyRule {
    fn default() -> Self {
        Self::new(0, 1)
    }
}
