//! MIDI event types for the relay engine.
//!
//! Events are kept in their MIDI 1.0 wire shape (status, channel, two data
//! bytes) plus the sample offset at which they occur in the current render
//! cycle. All types are `Copy`, so rules derive new events by value and an
//! enqueued event is never mutated in place.

// =============================================================================
// Basic MIDI Types
// =============================================================================

/// MIDI channel (0-15).
pub type MidiChannel = u8;

/// MIDI note number (0-127, where 60 = middle C).
pub type MidiNote = u8;

/// Highest valid MIDI channel index.
pub const MAX_CHANNEL: MidiChannel = 15;

/// Highest valid 7-bit data value.
pub const MAX_DATA: u8 = 127;

/// Number of MIDI channels.
pub const CHANNEL_COUNT: usize = 16;

/// Common MIDI Control Change (CC) numbers.
pub mod cc {
    /// Modulation wheel (CC 1).
    pub const MOD_WHEEL: u8 = 1;
    /// Channel volume (CC 7).
    pub const VOLUME: u8 = 7;
    /// Expression (CC 11).
    pub const EXPRESSION: u8 = 11;
    /// Damper / sustain pedal (CC 64).
    pub const DAMPER_PEDAL: u8 = 64;
}

// =============================================================================
// Status
// =============================================================================

/// MIDI 1.0 message kind (the high nibble of the status byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MidiStatus {
    /// Note off (0x80).
    NoteOff,
    /// Note on (0x90).
    NoteOn,
    /// Control change (0xB0).
    ControlChange,
    /// Pitch bend (0xE0).
    PitchBend,
    /// Any other status, holding its high nibble (0xA0, 0xC0, 0xD0, 0xF0).
    Other(u8),
}

impl MidiStatus {
    /// Decode a status from a status byte. The channel nibble is ignored.
    pub const fn from_byte(byte: u8) -> Self {
        match byte & 0xF0 {
            0x80 => Self::NoteOff,
            0x90 => Self::NoteOn,
            0xB0 => Self::ControlChange,
            0xE0 => Self::PitchBend,
            other => Self::Other(other),
        }
    }

    /// The status nibble as it appears on the wire (e.g. `0x90`).
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::NoteOff => 0x80,
            Self::NoteOn => 0x90,
            Self::ControlChange => 0xB0,
            Self::PitchBend => 0xE0,
            Self::Other(byte) => byte & 0xF0,
        }
    }

    /// Canonical form: `Other` never holds a nibble that has its own variant.
    ///
    /// `Other(0x93)` becomes `NoteOn`, `Other(0xC5)` becomes `Other(0xC0)`.
    #[inline]
    pub const fn normalized(self) -> Self {
        Self::from_byte(self.to_byte())
    }

    /// Returns true for NoteOn and NoteOff.
    #[inline]
    pub const fn is_note(self) -> bool {
        matches!(self.normalized(), Self::NoteOn | Self::NoteOff)
    }

    /// Encoded message length in bytes.
    ///
    /// Program change (0xC_) and channel pressure (0xD_) carry a single data
    /// byte; every other status is framed as three bytes.
    #[inline]
    pub const fn message_len(self) -> usize {
        match self.to_byte() {
            0xC0 | 0xD0 => 2,
            _ => 3,
        }
    }
}

// =============================================================================
// MidiEvent
// =============================================================================

/// Maximum encoded size of a single [`MidiEvent`].
pub const MAX_MESSAGE_LEN: usize = 3;

/// One MIDI message with its sample-accurate position in the render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiEvent {
    /// Message kind.
    pub status: MidiStatus,
    /// MIDI channel (0-15).
    pub channel: MidiChannel,
    /// Note number, controller number or pitch-bend LSB.
    pub data1: u8,
    /// Velocity, controller value or pitch-bend MSB.
    pub data2: u8,
    /// Sample offset within the current render cycle.
    pub start_frame: u32,
}

impl MidiEvent {
    /// Create an event from its parts. `status` is stored normalized.
    pub const fn new(
        status: MidiStatus,
        channel: MidiChannel,
        data1: u8,
        data2: u8,
        start_frame: u32,
    ) -> Self {
        Self {
            status: status.normalized(),
            channel,
            data1,
            data2,
            start_frame,
        }
    }

    /// Create an event from the raw tuple a host hands to its MIDI handler.
    ///
    /// `status` may carry the channel in its low nibble; only the high nibble
    /// is used. The channel is masked to 0-15 and data bytes to 7 bits.
    pub const fn from_raw(status: u8, channel: u8, data1: u8, data2: u8, start_frame: u32) -> Self {
        Self {
            status: MidiStatus::from_byte(status),
            channel: channel & 0x0F,
            data1: data1 & 0x7F,
            data2: data2 & 0x7F,
            start_frame,
        }
    }

    /// Create a note-on event.
    pub const fn note_on(channel: MidiChannel, note: MidiNote, velocity: u8, start_frame: u32) -> Self {
        Self::new(MidiStatus::NoteOn, channel, note, velocity, start_frame)
    }

    /// Create a note-off event.
    pub const fn note_off(channel: MidiChannel, note: MidiNote, velocity: u8, start_frame: u32) -> Self {
        Self::new(MidiStatus::NoteOff, channel, note, velocity, start_frame)
    }

    /// Create a control change event.
    pub const fn control_change(channel: MidiChannel, controller: u8, value: u8, start_frame: u32) -> Self {
        Self::new(MidiStatus::ControlChange, channel, controller, value, start_frame)
    }

    /// Create a pitch bend event from its 7-bit LSB and MSB.
    pub const fn pitch_bend(channel: MidiChannel, lsb: u8, msb: u8, start_frame: u32) -> Self {
        Self::new(MidiStatus::PitchBend, channel, lsb, msb, start_frame)
    }

    /// Copy of this event on another channel.
    #[inline]
    pub const fn with_channel(self, channel: MidiChannel) -> Self {
        Self { channel, ..self }
    }

    /// Copy of this event with a different first data byte.
    #[inline]
    pub const fn with_data1(self, data1: u8) -> Self {
        Self { data1, ..self }
    }

    /// Returns true for a control change on the damper pedal (CC 64).
    #[inline]
    pub const fn is_damper(&self) -> bool {
        matches!(self.status.normalized(), MidiStatus::ControlChange) && self.data1 == cc::DAMPER_PEDAL
    }

    /// Status byte on the wire: status nibble combined with the channel.
    #[inline]
    pub const fn status_byte(&self) -> u8 {
        self.status.to_byte() | (self.channel & 0x0F)
    }

    /// Encoded message length (2 or 3 bytes).
    #[inline]
    pub const fn message_len(&self) -> usize {
        self.status.message_len()
    }

    /// Encode into wire bytes.
    ///
    /// Returns the byte array and the number of valid bytes in it.
    pub const fn encode(&self) -> ([u8; MAX_MESSAGE_LEN], usize) {
        (
            [self.status_byte(), self.data1, self.data2],
            self.message_len(),
        )
    }
}
