//! Decoding rules from flat parameter tables.
//!
//! Hosts store plugin settings as an indexed table of `f32` values. This
//! module converts such a table into a validated rule and back. Values are
//! rounded to the nearest integer; channels are stored in display form
//! (1-16) and converted to 0-15.
//!
//! # Layouts
//!
//! **Channel copy** ([`CHANNEL_COPY_PARAMETER_COUNT`] entries):
//!
//! | Index | Value |
//! |-------|-------|
//! | 0 | From channel (1-16) |
//! | 1 | To channel (1-16) |
//! | 2 | Key range min (0-127) |
//! | 3 | Key range max (0-127) |
//! | 4 | Transpose (-127..127) |
//! | 5-8 | Pass damper, other CC, pitch bend, other messages (non-zero = on) |
//!
//! **Chord expand** (`1 + inputs * (arity + 1)` entries): index 0 is the
//! channel (1-16), followed by one block per input holding the trigger
//! note and `arity` output notes.
//!
//! **Channel mute** ([`CHANNEL_MUTE_PARAMETER_COUNT`] entries): one value
//! per channel, non-zero = muted.

use crate::error::{check_channel, check_note, check_transpose, ConfigError, ConfigResult};
use crate::midi::CHANNEL_COUNT;
use crate::rules::{ChannelCopyRule, ChannelMuteRule, ChordExpandRule};

/// Parameter count of a channel copy table.
pub const CHANNEL_COPY_PARAMETER_COUNT: usize = 9;

/// Parameter count of a channel mute table.
pub const CHANNEL_MUTE_PARAMETER_COUNT: usize = CHANNEL_COUNT;

/// Trigger notes in the reference chord layout.
pub const CHORD_INPUTS: usize = 5;

/// Output notes per trigger in the reference chord layout.
pub const CHORD_OUTPUTS: usize = 5;

/// Parameter count of the reference 5 x 5 chord table.
pub const CHORD_TRIGGER_PARAMETER_COUNT: usize = chord_parameter_count(CHORD_INPUTS, CHORD_OUTPUTS);

/// Index of the channel parameter in a chord table.
pub const CHORD_CHANNEL_PARAMETER: usize = 0;

/// Parameter count of a chord table with `inputs` triggers of `arity` outputs.
pub const fn chord_parameter_count(inputs: usize, arity: usize) -> usize {
    1 + inputs * (arity + 1)
}

/// Index of the trigger parameter for input `input` (0-based).
pub const fn chord_trigger_index(input: usize, arity: usize) -> usize {
    1 + input * (arity + 1)
}

/// Default chord table: channel 1, every trigger and output 0.
pub fn default_chord_parameters(inputs: usize, arity: usize) -> Vec<f32> {
    let mut values = vec![0.0; chord_parameter_count(inputs, arity)];
    values[CHORD_CHANNEL_PARAMETER] = 1.0;
    values
}

/// Rounded integer at `index`. NaN and infinities are rejected.
fn int_at(values: &[f32], index: usize) -> ConfigResult<i64> {
    let value = values[index];
    if value.is_finite() {
        Ok(value.round() as i64)
    } else {
        Err(ConfigError::NonFiniteParameter(index))
    }
}

#[inline]
fn bool_at(values: &[f32], index: usize) -> ConfigResult<bool> {
    Ok(int_at(values, index)? != 0)
}

/// Channel at `index`, stored as 1-16.
fn channel_at(values: &[f32], index: usize) -> ConfigResult<u8> {
    let channel = int_at(values, index)?;
    channel
        .checked_sub(1)
        .and_then(|zero_based| check_channel(zero_based).ok())
        .ok_or(ConfigError::ChannelOutOfRange(channel))
}

fn check_count(values: &[f32], expected: usize) -> ConfigResult<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ConfigError::ParameterCount {
            expected,
            found: values.len(),
        })
    }
}

#[inline]
fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl ChannelCopyRule {
    /// Decode from a channel copy parameter table.
    pub fn from_parameters(values: &[f32]) -> ConfigResult<Self> {
        check_count(values, CHANNEL_COPY_PARAMETER_COUNT)?;
        let rule = Self {
            from_channel: channel_at(values, 0)?,
            to_channel: channel_at(values, 1)?,
            key_range_min: check_note(int_at(values, 2)?)?,
            key_range_max: check_note(int_at(values, 3)?)?,
            transpose: check_transpose(int_at(values, 4)?)?,
            pass_damper: bool_at(values, 5)?,
            pass_other_cc: bool_at(values, 6)?,
            pass_pitch_bend: bool_at(values, 7)?,
            pass_other_messages: bool_at(values, 8)?,
        };
        Ok(rule)
    }

    /// Encode into a channel copy parameter table.
    pub fn to_parameters(&self) -> [f32; CHANNEL_COPY_PARAMETER_COUNT] {
        [
            (self.from_channel + 1) as f32,
            (self.to_channel + 1) as f32,
            self.key_range_min as f32,
            self.key_range_max as f32,
            self.transpose as f32,
            flag(self.pass_damper),
            flag(self.pass_other_cc),
            flag(self.pass_pitch_bend),
            flag(self.pass_other_messages),
        ]
    }
}

impl ChordExpandRule {
    /// Decode from a chord table with `inputs` triggers of `arity` outputs.
    pub fn from_parameters(values: &[f32], inputs: usize, arity: usize) -> ConfigResult<Self> {
        check_count(values, chord_parameter_count(inputs, arity))?;
        let mut rule = Self::new(channel_at(values, CHORD_CHANNEL_PARAMETER)?, arity)?;

        let mut outputs = Vec::with_capacity(arity);
        for input in 0..inputs {
            let base = chord_trigger_index(input, arity);
            let trigger = check_note(int_at(values, base)?)?;
            outputs.clear();
            for index in base + 1..base + 1 + arity {
                outputs.push(check_note(int_at(values, index)?)?);
            }
            rule.add_mapping(trigger, &outputs)?;
        }
        Ok(rule)
    }

    /// Decode from the reference 5 x 5 chord table.
    pub fn from_reference_parameters(values: &[f32]) -> ConfigResult<Self> {
        Self::from_parameters(values, CHORD_INPUTS, CHORD_OUTPUTS)
    }

    /// Encode into a chord table.
    pub fn to_parameters(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(chord_parameter_count(self.mappings().len(), self.arity()));
        values.push((self.channel() + 1) as f32);
        for mapping in self.mappings() {
            values.push(mapping.trigger as f32);
            values.extend(mapping.outputs.iter().map(|&note| note as f32));
        }
        values
    }
}

impl ChannelMuteRule {
    /// Decode from a channel mute table.
    pub fn from_parameters(values: &[f32]) -> ConfigResult<Self> {
        check_count(values, CHANNEL_MUTE_PARAMETER_COUNT)?;
        let mut muted = [false; CHANNEL_COUNT];
        for (index, slot) in muted.iter_mut().enumerate() {
            *slot = bool_at(values, index)?;
        }
        Ok(Self::from_mask(muted))
    }

    /// Encode into a channel mute table.
    pub fn to_parameters(&self) -> [f32; CHANNEL_MUTE_PARAMETER_COUNT] {
        let mask = *self.mask();
        mask.map(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiEvent;

    #[test]
    fn test_reference_chord_layout() {
        assert_eq!(CHORD_TRIGGER_PARAMETER_COUNT, 31);
        assert_eq!(chord_trigger_index(0, 5), 1);
        assert_eq!(chord_trigger_index(4, 5), 25);
    }

    #[test]
    fn test_chord_from_parameters() {
        let mut values = default_chord_parameters(CHORD_INPUTS, CHORD_OUTPUTS);
        values[0] = 2.0;
        values[1] = 48.0;
        values[2..5].copy_from_slice(&[52.0, 55.0, 59.0]);

        let rule = ChordExpandRule::from_reference_parameters(&values).unwrap();
        assert_eq!(rule.channel(), 1);
        assert_eq!(rule.mappings().len(), 5);
        assert_eq!(rule.mappings()[0].outputs, vec![52, 55, 59, 0, 0]);

        let mut out = Vec::new();
        rule.apply(&MidiEvent::note_on(1, 48, 90, 0), |e| out.push(e));
        let notes: Vec<u8> = out.iter().map(|e| e.data1).collect();
        assert_eq!(notes, vec![52, 55, 59]);

        assert_eq!(rule.to_parameters(), values);
    }

    #[test]
    fn test_default_chord_table_swallows_note_zero() {
        let values = default_chord_parameters(CHORD_INPUTS, CHORD_OUTPUTS);
        let rule = ChordExpandRule::from_reference_parameters(&values).unwrap();
        assert_eq!(rule.channel(), 0);

        let mut count = 0;
        rule.apply(&MidiEvent::note_on(0, 0, 100, 0), |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_chord_parameter_errors() {
        assert_eq!(
            ChordExpandRule::from_reference_parameters(&[1.0; 30]),
            Err(ConfigError::ParameterCount {
                expected: 31,
                found: 30
            })
        );

        let mut values = default_chord_parameters(1, 2);
        values[0] = 17.0;
        assert_eq!(
            ChordExpandRule::from_parameters(&values, 1, 2),
            Err(ConfigError::ChannelOutOfRange(17))
        );

        let mut values = default_chord_parameters(1, 2);
        values[3] = 128.0;
        assert_eq!(
            ChordExpandRule::from_parameters(&values, 1, 2),
            Err(ConfigError::NoteOutOfRange(128))
        );
    }

    #[test]
    fn test_channel_copy_round_trip() {
        let values = [1.0, 2.0, 1.0, 127.0, 12.0, 1.0, 0.0, 1.0, 0.0];
        let rule = ChannelCopyRule::from_parameters(&values).unwrap();
        assert_eq!(rule.from_channel, 0);
        assert_eq!(rule.to_channel, 1);
        assert_eq!(rule.transpose, 12);
        assert!(rule.pass_damper && !rule.pass_other_cc);
        assert!(rule.pass_pitch_bend && !rule.pass_other_messages);
        assert_eq!(rule.to_parameters(), values);
    }

    #[test]
    fn test_channel_copy_rounds_values() {
        let values = [1.4, 15.6, 0.2, 126.7, -3.4, 0.4, 0.6, 0.0, 0.0];
        let rule = ChannelCopyRule::from_parameters(&values).unwrap();
        assert_eq!(rule.to_channel, 15);
        assert_eq!(rule.key_range_max, 127);
        assert_eq!(rule.transpose, -3);
        assert!(!rule.pass_damper);
        assert!(rule.pass_other_cc);
    }

    #[test]
    fn test_channel_copy_errors() {
        let values = [0.0, 2.0, 1.0, 127.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(
            ChannelCopyRule::from_parameters(&values),
            Err(ConfigError::ChannelOutOfRange(0))
        );
        let values = [1.0, 2.0, 1.0, 127.0, 200.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(
            ChannelCopyRule::from_parameters(&values),
            Err(ConfigError::TransposeOutOfRange(200))
        );
    }

    #[test]
    fn test_non_finite_and_huge_values_rejected() {
        let mut values = [f32::NEG_INFINITY, 2.0, 1.0, 127.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(
            ChannelCopyRule::from_parameters(&values),
            Err(ConfigError::NonFiniteParameter(0))
        );

        values[0] = -1e30;
        assert_eq!(
            ChannelCopyRule::from_parameters(&values),
            Err(ConfigError::ChannelOutOfRange(i64::MIN))
        );

        values[0] = 1.0;
        values[6] = f32::NAN;
        assert_eq!(
            ChannelCopyRule::from_parameters(&values),
            Err(ConfigError::NonFiniteParameter(6))
        );

        let mut values = default_chord_parameters(CHORD_INPUTS, CHORD_OUTPUTS);
        values[0] = -1e30;
        assert_eq!(
            ChordExpandRule::from_reference_parameters(&values),
            Err(ConfigError::ChannelOutOfRange(i64::MIN))
        );

        values[0] = 1.0;
        values[3] = f32::INFINITY;
        assert_eq!(
            ChordExpandRule::from_reference_parameters(&values),
            Err(ConfigError::NonFiniteParameter(3))
        );

        let mut values = [0.0; CHANNEL_MUTE_PARAMETER_COUNT];
        values[15] = f32::NAN;
        assert_eq!(
            ChannelMuteRule::from_parameters(&values),
            Err(ConfigError::NonFiniteParameter(15))
        );
    }

    #[test]
    fn test_channel_mute_parameters() {
        let mut values = [0.0; CHANNEL_MUTE_PARAMETER_COUNT];
        values[9] = 1.0;
        let rule = ChannelMuteRule::from_parameters(&values).unwrap();
        assert!(rule.is_muted(9));
        assert!(!rule.is_muted(0));
        assert_eq!(rule.to_parameters(), values);
        assert!(ChannelMuteRule::from_parameters(&values[..8]).is_err());
    }
}
