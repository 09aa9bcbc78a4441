//! Transformation rules.
//!
//! A [`TransformRule`] maps one incoming [`MidiEvent`] to zero or more
//! outgoing events. Rules are plain values: they hold no state between
//! events and never fail. Output order is the order in which the rule calls
//! `emit`, and callers must preserve it.
//!
//! # Variants
//!
//! | Rule | Behavior |
//! |------|----------|
//! | [`TransformRule::Through`] | Forward every event unchanged |
//! | [`ChannelCopyRule`] | Forward, then append a filtered/transposed copy on another channel |
//! | [`ChordExpandRule`] | Replace mapped trigger notes with a list of chord notes |
//! | [`ChannelMuteRule`] | Drop note-ons on muted channels |
//!
//! # Example
//!
//! ```
//! use midirelay_core::{ChannelCopyRule, MidiEvent, TransformRule};
//!
//! let rule = TransformRule::ChannelCopy(ChannelCopyRule::new(0, 1).with_transpose(12));
//! let mut out = Vec::new();
//! rule.apply(&MidiEvent::note_on(0, 60, 100, 0), |event| out.push(event));
//!
//! assert_eq!(out, vec![
//!     MidiEvent::note_on(0, 60, 100, 0),
//!     MidiEvent::note_on(1, 72, 100, 0),
//! ]);
//! ```

mod channel_copy;
mod channel_mute;
mod chord_expand;

pub use channel_copy::ChannelCopyRule;
pub use channel_mute::ChannelMuteRule;
pub use chord_expand::{ChordExpandRule, ChordMapping, NO_OUTPUT};

use crate::error::ConfigResult;
use crate::midi::MidiEvent;

/// The active transformation, dispatched by variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformRule {
    /// Forward every event unchanged.
    #[default]
    Through,
    /// Copy one channel's traffic onto another.
    ChannelCopy(ChannelCopyRule),
    /// Expand trigger notes into chords.
    ChordExpand(ChordExpandRule),
    /// Mute notes on selected channels.
    ChannelMute(ChannelMuteRule),
}

impl TransformRule {
    /// Apply the rule to one event, calling `emit` for each output in order.
    ///
    /// This never allocates and never fails; unknown statuses fall through to
    /// each rule's passthrough branch.
    #[inline]
    pub fn apply<F: FnMut(MidiEvent)>(&self, event: &MidiEvent, mut emit: F) {
        match self {
            Self::Through => emit(*event),
            Self::ChannelCopy(rule) => rule.apply(event, emit),
            Self::ChordExpand(rule) => rule.apply(event, emit),
            Self::ChannelMute(rule) => rule.apply(event, emit),
        }
    }

    /// Collect the outputs for one event into a new vector.
    ///
    /// Allocates; use [`apply`](Self::apply) on the render thread.
    pub fn outputs(&self, event: &MidiEvent) -> Vec<MidiEvent> {
        let mut out = Vec::new();
        self.apply(event, |e| out.push(e));
        out
    }

    /// Check that every value in the rule is within its MIDI range.
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            Self::Through | Self::ChannelMute(_) => Ok(()),
            Self::ChannelCopy(rule) => rule.validate(),
            Self::ChordExpand(rule) => rule.validate(),
        }
    }

    /// Short name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Through => "through",
            Self::ChannelCopy(_) => "channel-copy",
            Self::ChordExpand(_) => "chord-expand",
            Self::ChannelMute(_) => "channel-mute",
        }
    }
}

impl From<ChannelCopyRule> for TransformRule {
    fn from(rule: ChannelCopyRule) -> Self {
        Self::ChannelCopy(rule)
    }
}

impl From<ChordExpandRule> for TransformRule {
    fn from(rule: ChordExpandRule) -> Self {
        Self::ChordExpand(rule)
    }
}

impl From<ChannelMuteRule> for TransformRule {
    fn from(rule: ChannelMuteRule) -> Self {
        Self::ChannelMute(rule)
    }
}
