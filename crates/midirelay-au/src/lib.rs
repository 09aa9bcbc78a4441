//! # midirelay-au
//!
//! Host-output layer for the midirelay engine.
//!
//! Events produced by a [`midirelay_core::TransformRule`] are queued during
//! a render cycle and delivered to the host once per cycle as CoreMIDI-style
//! packet lists:
//!
//! ```text
//! host MIDI handler
//!        ↓
//! MidiProcessor::handle_midi_event   (rule applied, outputs queued)
//!        ↓
//! MidiProcessor::render              (once per cycle, on success)
//!        ↓
//! MidiOutputHelper::flush            (split into PacketLists)
//!        ↓
//! MidiOutputSink                     (host output callback)
//! ```
//!
//! ## Usage
//!
//! ```
//! use midirelay_au::{AudioTimeStamp, EngineConfig, MidiProcessor, PacketList, os_status};
//! use midirelay_core::ChannelCopyRule;
//!
//! let rule = ChannelCopyRule::new(0, 1).with_transpose(12);
//! let mut processor = MidiProcessor::with_rule(rule.into(), EngineConfig::new()).unwrap();
//! processor.set_sink(|_: &AudioTimeStamp, _: u32, packets: &PacketList| {
//!     assert_eq!(packets.len(), 2);
//!     os_status::NO_ERR
//! });
//!
//! processor.handle_midi_event(0x90, 0, 60, 100, 0);
//! let report = processor.render(os_status::NO_ERR, &AudioTimeStamp::from_sample_time(0.0));
//! assert_eq!(report.map(|r| r.events_sent), Some(2));
//! ```
//!
//! ## Real-Time Safety
//!
//! - **Pre-allocated packet list**: encoding never touches the heap
//! - **Bounded flush**: overflow splits in a loop, one delivery per full list
//! - **Lock-free rule reads**: the rule is an `Arc` snapshot taken between cycles
//! - **Failures are logged**: a rejected delivery never stops the flush
//!
//! ## Features
//!
//! - `packet-list-256` / `packet-list-1024` / `packet-list-2048`: default
//!   packet list size (512 bytes otherwise)

pub mod config;
pub mod error;
pub mod output;
pub mod packet;
pub mod processor;
pub mod sink;
pub mod timestamp;

pub use config::{EngineConfig, DEFAULT_PACKET_LIST_SIZE, DEFAULT_QUEUE_RESERVE};
pub use error::{check_status, os_status, OsStatus, OutputError, OutputResult};
pub use output::{EngineState, FlushReport, MidiOutputHelper};
pub use packet::{Packet, PacketList, Packets};
pub use processor::MidiProcessor;
pub use sink::MidiOutputSink;
pub use timestamp::AudioTimeStamp;
