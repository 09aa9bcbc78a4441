//! Event batching and flush engine.
//!
//! [`MidiOutputHelper`] owns the pending queue for one render cycle. Events
//! are appended during intake and, once per cycle, [`MidiOutputHelper::flush`]
//! encodes them into packet lists and hands each list to the registered
//! [`MidiOutputSink`]. When a list fills up, it is delivered and the
//! remaining events go into the next one, all with the same timestamp.
//!
//! The queue and the packet list are allocated at construction. Intake only
//! allocates if a cycle produces more events than the configured reserve.

use midirelay_core::{ConfigResult, MidiEvent};

use crate::config::EngineConfig;
use crate::packet::PacketList;
use crate::sink::MidiOutputSink;
use crate::timestamp::AudioTimeStamp;

/// Observable state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing pending.
    Idle,
    /// Events are waiting for the next flush.
    Accumulating,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Packet lists handed to the sink.
    pub deliveries: usize,
    /// Deliveries the sink rejected.
    pub failures: usize,
    /// Events in accepted deliveries.
    pub events_sent: usize,
    /// Events discarded: rejected deliveries, no sink, or too large for a
    /// packet list.
    pub events_dropped: usize,
}

impl FlushReport {
    /// Returns true if every pending event reached the sink.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures == 0 && self.events_dropped == 0
    }
}

/// Pending queue plus packet-list encoder for one output.
pub struct MidiOutputHelper {
    pending: Vec<MidiEvent>,
    packets: PacketList,
    sink: Option<Box<dyn MidiOutputSink + Send>>,
}

impl MidiOutputHelper {
    /// Create an idle engine with no sink.
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            pending: Vec::with_capacity(config.queue_reserve),
            packets: PacketList::with_capacity(config.packet_list_capacity),
            sink: None,
        })
    }

    /// Register the output sink, replacing any previous one.
    pub fn set_sink<S>(&mut self, sink: S)
    where
        S: MidiOutputSink + Send + 'static,
    {
        log::debug!("MIDI output sink registered");
        self.sink = Some(Box::new(sink));
    }

    /// Remove the output sink. Later flushes discard their events.
    pub fn clear_sink(&mut self) {
        if self.sink.take().is_some() {
            log::debug!("MIDI output sink removed");
        }
    }

    /// Whether a sink is registered.
    #[inline]
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Append an event to the pending queue.
    ///
    /// Events are delivered in arrival order, so a cycle's packet lists are
    /// in non-decreasing start-frame order as long as the host hands over
    /// its events in frame order. An event that goes back in time is still
    /// queued in place and logged.
    #[inline]
    pub fn enqueue(&mut self, event: MidiEvent) {
        if let Some(last) = self.pending.last() {
            if event.start_frame < last.start_frame {
                log::warn!(
                    "MIDI event at frame {} queued after frame {}",
                    event.start_frame,
                    last.start_frame
                );
            }
        }
        self.pending.push(event);
    }

    /// Events waiting for the next flush, in arrival order.
    #[inline]
    pub fn pending(&self) -> &[MidiEvent] {
        &self.pending
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> EngineState {
        if self.pending.is_empty() {
            EngineState::Idle
        } else {
            EngineState::Accumulating
        }
    }

    /// Byte capacity of one delivery.
    #[inline]
    pub fn packet_list_capacity(&self) -> usize {
        self.packets.capacity()
    }

    /// Deliver every pending event and return to [`EngineState::Idle`].
    ///
    /// Never fails: a rejected delivery is logged and counted, and the
    /// following sub-batches are still attempted. An empty queue makes no
    /// sink call.
    pub fn flush(&mut self, timestamp: &AudioTimeStamp) -> FlushReport {
        let mut report = FlushReport::default();
        let total = self.pending.len();
        if total == 0 {
            return report;
        }

        let Some(sink) = self.sink.as_mut() else {
            log::debug!("No MIDI output sink, discarding {} events", total);
            report.events_dropped = total;
            self.pending.clear();
            return report;
        };

        // Each pass consumes at least one event, so this runs at most
        // `total` times.
        let mut start = 0;
        while start < total {
            self.packets.clear();
            let mut end = start;
            while end < total && self.packets.try_add_event(&self.pending[end]) {
                end += 1;
            }

            if end == start {
                log::warn!(
                    "MIDI event {:?} does not fit a {} byte packet list, dropping",
                    self.pending[start].status,
                    self.packets.capacity()
                );
                report.events_dropped += 1;
                start += 1;
                continue;
            }

            if end < total {
                log::debug!(
                    "Packet list full after {} events, {} left for the next delivery",
                    end - start,
                    total - end
                );
            }

            let batch = end - start;
            report.deliveries += 1;
            match sink.send(timestamp, 0, &self.packets) {
                Ok(()) => report.events_sent += batch,
                Err(err) => {
                    log::warn!("{} ({} events lost)", err, batch);
                    report.failures += 1;
                    report.events_dropped += batch;
                }
            }
            start = end;
        }

        self.pending.clear();
        self.packets.clear();
        report
    }
}

impl std::fmt::Debug for MidiOutputHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiOutputHelper")
            .field("pending", &self.pending.len())
            .field("packet_list_capacity", &self.packets.capacity())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{OutputError, OutputResult};
    use std::sync::{Arc, Mutex};

    /// One captured sink call.
    #[derive(Debug, Clone)]
    pub(crate) struct Delivery {
        pub timestamp: AudioTimeStamp,
        pub offset: u32,
        pub byte_len: usize,
        pub events: Vec<MidiEvent>,
    }

    /// Sink that records every delivery and can reject chosen ones.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub deliveries: Arc<Mutex<Vec<Delivery>>>,
        pub fail_on: Vec<usize>,
    }

    impl RecordingSink {
        pub fn failing_on(calls: &[usize]) -> Self {
            Self {
                fail_on: calls.to_vec(),
                ..Self::default()
            }
        }

        pub fn take(&self) -> Vec<Delivery> {
            std::mem::take(&mut *self.deliveries.lock().unwrap())
        }
    }

    impl MidiOutputSink for RecordingSink {
        fn send(&mut self, timestamp: &AudioTimeStamp, offset: u32, packets: &PacketList) -> OutputResult<()> {
            let mut deliveries = self.deliveries.lock().unwrap();
            let call = deliveries.len();
            deliveries.push(Delivery {
                timestamp: *timestamp,
                offset,
                byte_len: packets.byte_len(),
                events: packets.packets().filter_map(|p| p.to_event()).collect(),
            });
            if self.fail_on.contains(&call) {
                Err(OutputError::SinkFailed(-1))
            } else {
                Ok(())
            }
        }
    }

    fn helper_with(sink: &RecordingSink) -> MidiOutputHelper {
        let mut helper = MidiOutputHelper::new(EngineConfig::new().with_packet_list_capacity(512)).unwrap();
        helper.set_sink(sink.clone());
        helper
    }

    fn notes(count: usize) -> Vec<MidiEvent> {
        (0..count)
            .map(|i| MidiEvent::note_on((i % 16) as u8, (i % 128) as u8, 100, i as u32))
            .collect()
    }

    #[test]
    fn test_new_rejects_tiny_packet_list() {
        let config = EngineConfig::new().with_packet_list_capacity(4);
        assert!(MidiOutputHelper::new(config).is_err());
    }

    #[test]
    fn test_state_transitions() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        assert_eq!(helper.state(), EngineState::Idle);

        helper.enqueue(MidiEvent::note_on(0, 60, 100, 0));
        assert_eq!(helper.state(), EngineState::Accumulating);
        assert_eq!(helper.pending().len(), 1);

        helper.flush(&AudioTimeStamp::default());
        assert_eq!(helper.state(), EngineState::Idle);
    }

    #[test]
    fn test_empty_flush_makes_no_call() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        let report = helper.flush(&AudioTimeStamp::default());
        assert_eq!(report, FlushReport::default());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_single_delivery() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        let events = notes(3);
        for event in &events {
            helper.enqueue(*event);
        }

        let ts = AudioTimeStamp::from_sample_time(256.0);
        let report = helper.flush(&ts);
        assert_eq!(report.deliveries, 1);
        assert_eq!(report.events_sent, 3);
        assert!(report.is_clean());

        let deliveries = sink.take();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].events, events);
        assert_eq!(deliveries[0].timestamp, ts);
        assert_eq!(deliveries[0].offset, 0);
    }

    #[test]
    fn test_overflow_splits_in_order() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        let events = notes(100);
        for event in &events {
            helper.enqueue(*event);
        }

        let ts = AudioTimeStamp::from_sample_time(1024.0);
        let report = helper.flush(&ts);
        assert_eq!(report.deliveries, 3);
        assert_eq!(report.events_sent, 100);

        let deliveries = sink.take();
        let sizes: Vec<usize> = deliveries.iter().map(|d| d.events.len()).collect();
        assert_eq!(sizes, vec![39, 39, 22]);
        for delivery in &deliveries {
            assert!(delivery.byte_len <= 512);
            assert_eq!(delivery.timestamp, ts);
        }

        let delivered: Vec<MidiEvent> = deliveries.into_iter().flat_map(|d| d.events).collect();
        assert_eq!(delivered, events);
        assert!(helper.pending().is_empty());
    }

    #[test]
    fn test_failure_does_not_block_later_batches() {
        let sink = RecordingSink::failing_on(&[0]);
        let mut helper = helper_with(&sink);
        for event in notes(50) {
            helper.enqueue(event);
        }

        let report = helper.flush(&AudioTimeStamp::default());
        assert_eq!(report.deliveries, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(report.events_dropped, 39);
        assert_eq!(report.events_sent, 11);
        assert_eq!(sink.take().len(), 2);
        assert_eq!(helper.state(), EngineState::Idle);
    }

    #[test]
    fn test_flush_twice_is_noop() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        helper.enqueue(MidiEvent::note_on(0, 60, 100, 0));

        assert_eq!(helper.flush(&AudioTimeStamp::default()).deliveries, 1);
        assert_eq!(helper.flush(&AudioTimeStamp::default()).deliveries, 0);
        assert_eq!(sink.take().len(), 1);
    }

    #[test]
    fn test_mixed_frames_delivered_in_frame_order() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        // Frames of one cycle, repeated where a rule emits several outputs.
        let frames = [0u32, 3, 3, 3, 7, 7, 20];
        for (i, &frame) in frames.iter().enumerate() {
            helper.enqueue(MidiEvent::note_on(0, 60 + i as u8, 100, frame));
        }

        helper.flush(&AudioTimeStamp::default());
        let delivered: Vec<u32> = sink
            .take()
            .into_iter()
            .flat_map(|d| d.events)
            .map(|e| e.start_frame)
            .collect();
        assert_eq!(delivered, frames);
        assert!(delivered.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_out_of_order_frames_keep_arrival_order() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        helper.enqueue(MidiEvent::note_on(0, 60, 100, 10));
        helper.enqueue(MidiEvent::note_on(0, 61, 100, 4));

        helper.flush(&AudioTimeStamp::default());
        let notes: Vec<u8> = sink.take()[0].events.iter().map(|e| e.data1).collect();
        assert_eq!(notes, vec![60, 61]);
    }

    #[test]
    fn test_no_sink_discards() {
        let mut helper = MidiOutputHelper::new(EngineConfig::default()).unwrap();
        assert!(!helper.has_sink());
        for event in notes(5) {
            helper.enqueue(event);
        }

        let report = helper.flush(&AudioTimeStamp::default());
        assert_eq!(report.deliveries, 0);
        assert_eq!(report.events_dropped, 5);
        assert_eq!(helper.state(), EngineState::Idle);
    }

    #[test]
    fn test_clear_sink() {
        let sink = RecordingSink::default();
        let mut helper = helper_with(&sink);
        assert!(helper.has_sink());
        helper.clear_sink();
        assert!(!helper.has_sink());

        helper.enqueue(MidiEvent::note_on(0, 60, 100, 0));
        helper.flush(&AudioTimeStamp::default());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_mixed_message_lengths_fill_exactly() {
        // Header + one 3-byte packet + one 2-byte packet.
        let capacity = 4 + 13 + 12;
        let sink = RecordingSink::default();
        let mut helper = MidiOutputHelper::new(EngineConfig::new().with_packet_list_capacity(capacity)).unwrap();
        helper.set_sink(sink.clone());

        let program = MidiEvent::new(midirelay_core::MidiStatus::Other(0xC0), 0, 3, 0, 0);
        helper.enqueue(MidiEvent::note_on(0, 60, 100, 0));
        helper.enqueue(program);
        helper.enqueue(MidiEvent::note_off(0, 60, 0, 10));

        let report = helper.flush(&AudioTimeStamp::default());
        assert_eq!(report.deliveries, 2);
        let sizes: Vec<usize> = sink.take().iter().map(|d| d.events.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
    }
}
