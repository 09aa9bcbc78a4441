//! # midirelay
//!
//! Real-time MIDI transformer: channel copy with transposition, chord
//! expansion and channel muting, delivered to the host as packet lists.
//!
//! ## Architecture
//!
//! ```text
//! incoming MIDI
//!        ↓
//! TransformRule::apply   (midirelay-core)
//!        ↓
//! MidiOutputHelper       (midirelay-au, pending queue + packet lists)
//!        ↓
//! MidiOutputSink         (host output callback)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use midirelay::prelude::*;
//!
//! let rule = ChordExpandRule::new(0, 5)
//!     .and_then(|rule| rule.with_mapping(48, &[52, 55, 59, 0, 0]))
//!     .unwrap();
//!
//! let mut processor = MidiProcessor::with_rule(rule.into(), EngineConfig::new()).unwrap();
//! processor.set_sink(|_: &AudioTimeStamp, _: u32, packets: &PacketList| {
//!     let notes: Vec<u8> = packets.packets().map(|p| p.data[1]).collect();
//!     assert_eq!(notes, [52, 55, 59]);
//!     os_status::NO_ERR
//! });
//!
//! processor.handle_midi_event(0x90, 0, 48, 90, 5);
//! processor.render(os_status::NO_ERR, &AudioTimeStamp::default());
//! ```

// Re-export sub-crates
pub use midirelay_au as au;
pub use midirelay_core as core;

/// Prelude module for convenient imports.
///
/// ```rust
/// use midirelay::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use midirelay_core::{
        // Events
        cc, MidiChannel, MidiEvent, MidiNote, MidiStatus,
        // Rules
        ChannelCopyRule, ChannelMuteRule, ChordExpandRule, ChordMapping, SharedRule,
        TransformRule, NO_OUTPUT,
        // Errors
        ConfigError, ConfigResult,
    };

    // Output side
    pub use midirelay_au::{
        os_status, AudioTimeStamp, EngineConfig, EngineState, FlushReport, MidiOutputHelper,
        MidiOutputSink, MidiProcessor, OsStatus, OutputError, OutputResult, PacketList,
    };
}
