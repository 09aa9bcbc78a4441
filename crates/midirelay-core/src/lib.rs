//! # midirelay-core
//!
//! Core types for the midirelay real-time MIDI transformer.
//!
//! This crate is format-agnostic: it knows nothing about how events reach
//! the plugin or how they are delivered to the host. It provides the event
//! model and the rule engine that decides, per incoming message, which
//! messages go out.
//!
//! ## Types
//!
//! - [`MidiEvent`] / [`MidiStatus`] - MIDI 1.0 messages with a start frame
//! - [`TransformRule`] - The active transformation (channel copy, chord
//!   expand, channel mute, or through)
//! - [`SharedRule`] - Atomically swappable rule for cross-thread updates
//! - [`ConfigError`] - Errors raised while loading configurations
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for rules and `MidiStatus`

pub mod error;
pub mod midi;
pub mod params;
pub mod rules;
pub mod shared;

// Re-exports for convenience
pub use error::{ConfigError, ConfigResult};
pub use midi::{cc, MidiChannel, MidiEvent, MidiNote, MidiStatus, CHANNEL_COUNT, MAX_MESSAGE_LEN};
pub use params::{
    chord_parameter_count, default_chord_parameters, CHANNEL_COPY_PARAMETER_COUNT,
    CHANNEL_MUTE_PARAMETER_COUNT, CHORD_INPUTS, CHORD_OUTPUTS, CHORD_TRIGGER_PARAMETER_COUNT,
};
pub use rules::{
    ChannelCopyRule, ChannelMuteRule, ChordExpandRule, ChordMapping, TransformRule, NO_OUTPUT,
};
pub use shared::SharedRule;
