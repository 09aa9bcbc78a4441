//! Per-render-cycle driver: rule intake plus output flush.

use std::sync::Arc;

use midirelay_core::{ConfigResult, MidiEvent, SharedRule, TransformRule};

use crate::config::EngineConfig;
use crate::error::{os_status, OsStatus};
use crate::output::{EngineState, FlushReport, MidiOutputHelper};
use crate::sink::MidiOutputSink;
use crate::timestamp::AudioTimeStamp;

/// Applies the active rule to incoming MIDI and flushes the results once
/// per render cycle.
///
/// The rule is read from a [`SharedRule`] at construction and again after
/// every flush, so an update made mid-cycle takes effect at the next cycle
/// boundary and all events of one cycle see the same rule.
pub struct MidiProcessor {
    rules: SharedRule,
    active: Arc<TransformRule>,
    output: MidiOutputHelper,
}

impl MidiProcessor {
    /// Create a processor reading its rule from `rules`.
    pub fn new(rules: SharedRule, config: EngineConfig) -> ConfigResult<Self> {
        let output = MidiOutputHelper::new(config)?;
        let active = rules.snapshot();
        Ok(Self {
            rules,
            active,
            output,
        })
    }

    /// Create a processor with its own rule handle holding `rule`.
    pub fn with_rule(rule: TransformRule, config: EngineConfig) -> ConfigResult<Self> {
        rule.validate()?;
        Self::new(SharedRule::new(rule), config)
    }

    /// Handle for updating the rule from another thread.
    #[inline]
    pub fn rules(&self) -> &SharedRule {
        &self.rules
    }

    /// Rule applied during the current cycle.
    #[inline]
    pub fn active_rule(&self) -> &TransformRule {
        &self.active
    }

    /// Register the host's MIDI output.
    pub fn set_sink<S>(&mut self, sink: S)
    where
        S: MidiOutputSink + Send + 'static,
    {
        self.output.set_sink(sink);
    }

    /// Remove the host's MIDI output.
    pub fn clear_sink(&mut self) {
        self.output.clear_sink();
    }

    /// The output engine.
    #[inline]
    pub fn output(&self) -> &MidiOutputHelper {
        &self.output
    }

    /// Shortcut for `output().state()`.
    #[inline]
    pub fn state(&self) -> EngineState {
        self.output.state()
    }

    /// Host MIDI handler entry point.
    ///
    /// Runs the active rule over the message and queues its outputs. The
    /// event is returned unchanged so the caller can pass it on through the
    /// host's own MIDI path.
    pub fn handle_midi_event(
        &mut self,
        status: u8,
        channel: u8,
        data1: u8,
        data2: u8,
        start_frame: u32,
    ) -> MidiEvent {
        let event = MidiEvent::from_raw(status, channel, data1, data2, start_frame);
        self.process_event(&event);
        event
    }

    /// Run the active rule over an already-decoded event.
    pub fn process_event(&mut self, event: &MidiEvent) {
        let output = &mut self.output;
        self.active.apply(event, |out| output.enqueue(out));
    }

    /// End of a render cycle.
    ///
    /// Flushes only if the upstream render returned [`os_status::NO_ERR`];
    /// otherwise the queue is kept for the next successful cycle and `None`
    /// is returned.
    pub fn render(&mut self, result: OsStatus, timestamp: &AudioTimeStamp) -> Option<FlushReport> {
        if result != os_status::NO_ERR {
            return None;
        }
        Some(self.flush(timestamp))
    }

    /// Flush unconditionally and pick up the latest rule.
    ///
    /// Dropping the previous snapshot never frees it here: [`SharedRule`]
    /// keeps replaced rules until the writer side releases them.
    pub fn flush(&mut self, timestamp: &AudioTimeStamp) -> FlushReport {
        let report = self.output.flush(timestamp);
        self.active = self.rules.snapshot();
        report
    }
}

impl std::fmt::Debug for MidiProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiProcessor")
            .field("rule", &self.active.name())
            .field("output", &self.output)
            .finish()
    }
}
