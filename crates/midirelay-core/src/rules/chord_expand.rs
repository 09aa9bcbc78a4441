//! Chord expansion: replace a trigger note with a fixed set of notes.

use crate::error::{check_channel, check_note, ConfigError, ConfigResult};
use crate::midi::{MidiChannel, MidiEvent, MidiNote};

/// Output slot value meaning "no note".
pub const NO_OUTPUT: MidiNote = 0;

/// One trigger note and the notes it expands to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChordMapping {
    /// Incoming note number that triggers the chord.
    pub trigger: MidiNote,
    /// Output note numbers, [`NO_OUTPUT`] for unused slots.
    pub outputs: Vec<MidiNote>,
}

impl ChordMapping {
    /// Iterate over the used output slots in order.
    pub fn notes(&self) -> impl Iterator<Item = MidiNote> + '_ {
        self.outputs.iter().copied().filter(|&note| note != NO_OUTPUT)
    }
}

/// Expands trigger notes on one channel into chords.
///
/// Only NoteOn/NoteOff on `channel` are considered. Mappings are scanned in
/// order and the first one whose trigger equals the note number wins; its
/// non-zero output slots are emitted with the incoming status, channel,
/// velocity and start frame, and the trigger event itself is dropped.
/// Later mappings with the same trigger are never reached.
///
/// Unmapped notes and all other traffic pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChordExpandRule {
    channel: MidiChannel,
    arity: usize,
    mappings: Vec<ChordMapping>,
}

impl ChordExpandRule {
    /// Create an empty rule with `arity` output slots per mapping.
    pub fn new(channel: MidiChannel, arity: usize) -> ConfigResult<Self> {
        check_channel(channel as i64)?;
        if arity == 0 {
            return Err(ConfigError::EmptyArity);
        }
        Ok(Self {
            channel,
            arity,
            mappings: Vec::new(),
        })
    }

    /// Append a mapping. `outputs` must have exactly `arity` slots.
    pub fn add_mapping(&mut self, trigger: MidiNote, outputs: &[MidiNote]) -> ConfigResult<()> {
        check_note(trigger as i64)?;
        if outputs.len() != self.arity {
            return Err(ConfigError::OutputArity {
                trigger,
                expected: self.arity,
                found: outputs.len(),
            });
        }
        for &note in outputs {
            check_note(note as i64)?;
        }
        self.mappings.push(ChordMapping {
            trigger,
            outputs: outputs.to_vec(),
        });
        Ok(())
    }

    /// Builder form of [`add_mapping`](Self::add_mapping).
    pub fn with_mapping(mut self, trigger: MidiNote, outputs: &[MidiNote]) -> ConfigResult<Self> {
        self.add_mapping(trigger, outputs)?;
        Ok(self)
    }

    /// Channel the rule listens on.
    pub fn channel(&self) -> MidiChannel {
        self.channel
    }

    /// Output slots per mapping.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Mappings in scan order.
    pub fn mappings(&self) -> &[ChordMapping] {
        &self.mappings
    }

    /// First mapping for `note`, if any.
    pub fn mapping_for(&self, note: MidiNote) -> Option<&ChordMapping> {
        self.mappings.iter().find(|m| m.trigger == note)
    }

    /// Re-check every value, e.g. after deserializing.
    pub fn validate(&self) -> ConfigResult<()> {
        check_channel(self.channel as i64)?;
        if self.arity == 0 {
            return Err(ConfigError::EmptyArity);
        }
        for mapping in &self.mappings {
            check_note(mapping.trigger as i64)?;
            if mapping.outputs.len() != self.arity {
                return Err(ConfigError::OutputArity {
                    trigger: mapping.trigger,
                    expected: self.arity,
                    found: mapping.outputs.len(),
                });
            }
            for &note in &mapping.outputs {
                check_note(note as i64)?;
            }
        }
        Ok(())
    }

    /// Expand or forward one event.
    #[inline]
    pub fn apply<F: FnMut(MidiEvent)>(&self, event: &MidiEvent, mut emit: F) {
        if event.channel != self.channel || !event.status.is_note() {
            emit(*event);
            return;
        }

        match self.mapping_for(event.data1) {
            Some(mapping) => {
                for note in mapping.notes() {
                    emit(event.with_data1(note));
                }
            }
            None => emit(*event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiStatus;

    fn outputs(rule: &ChordExpandRule, event: MidiEvent) -> Vec<MidiEvent> {
        let mut out = Vec::new();
        rule.apply(&event, |e| out.push(e));
        out
    }

    fn c_minor() -> ChordExpandRule {
        ChordExpandRule::new(0, 5)
            .unwrap()
            .with_mapping(48, &[52, 55, 59, 0, 0])
            .unwrap()
    }

    #[test]
    fn test_trigger_expands_and_suppresses_original() {
        let out = outputs(&c_minor(), MidiEvent::note_on(0, 48, 90, 5));
        assert_eq!(
            out,
            vec![
                MidiEvent::note_on(0, 52, 90, 5),
                MidiEvent::note_on(0, 55, 90, 5),
                MidiEvent::note_on(0, 59, 90, 5),
            ]
        );
    }

    #[test]
    fn test_note_off_expands_with_same_status() {
        let out = outputs(&c_minor(), MidiEvent::note_off(0, 48, 0, 9));
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|e| e.status == MidiStatus::NoteOff));
        assert!(out.iter().all(|e| e.start_frame == 9 && e.data2 == 0));
    }

    #[test]
    fn test_unmapped_note_passes_alone() {
        let event = MidiEvent::note_on(0, 60, 100, 0);
        assert_eq!(outputs(&c_minor(), event), vec![event]);
    }

    #[test]
    fn test_other_channel_and_status_pass() {
        let rule = c_minor();
        let event = MidiEvent::note_on(1, 48, 100, 0);
        assert_eq!(outputs(&rule, event), vec![event]);

        let event = MidiEvent::control_change(0, 48, 100, 0);
        assert_eq!(outputs(&rule, event), vec![event]);
    }

    #[test]
    fn test_first_matching_mapping_wins() {
        let rule = c_minor().with_mapping(48, &[60, 64, 67, 0, 0]).unwrap();
        let out = outputs(&rule, MidiEvent::note_on(0, 48, 90, 0));
        let notes: Vec<u8> = out.iter().map(|e| e.data1).collect();
        assert_eq!(notes, vec![52, 55, 59]);
    }

    #[test]
    fn test_all_empty_slots_swallow_trigger() {
        let rule = ChordExpandRule::new(0, 3)
            .unwrap()
            .with_mapping(0, &[0, 0, 0])
            .unwrap();
        assert!(outputs(&rule, MidiEvent::note_on(0, 0, 100, 0)).is_empty());
        assert_eq!(outputs(&rule, MidiEvent::note_on(0, 1, 100, 0)).len(), 1);
    }

    #[test]
    fn test_arity_generalizes() {
        let rule = ChordExpandRule::new(2, 8)
            .unwrap()
            .with_mapping(36, &[36, 40, 43, 47, 50, 53, 57, 0])
            .unwrap();
        assert_eq!(outputs(&rule, MidiEvent::note_on(2, 36, 80, 0)).len(), 7);
    }

    #[test]
    fn test_configuration_errors() {
        assert_eq!(ChordExpandRule::new(0, 0), Err(ConfigError::EmptyArity));
        assert_eq!(
            ChordExpandRule::new(16, 5),
            Err(ConfigError::ChannelOutOfRange(16))
        );
        let err = c_minor().with_mapping(50, &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutputArity {
                trigger: 50,
                expected: 5,
                found: 3
            }
        );
        let err = c_minor().with_mapping(50, &[1, 2, 3, 4, 200]).unwrap_err();
        assert_eq!(err, ConfigError::NoteOutOfRange(200));
    }
}
