//! Fixed-capacity MIDI packet list.
//!
//! Mirrors the in-memory layout of CoreMIDI's `MIDIPacketList`, packed and
//! native-endian:
//!
//! ```text
//! num_packets: u32
//! repeated num_packets times:
//!     time_stamp: u64   (start frame within the render cycle)
//!     length:     u16
//!     data:       [u8; length]
//! ```
//!
//! Each packet holds exactly one MIDI message. The byte buffer is allocated
//! once; [`PacketList::clear`] only resets the write position, so a list
//! can be refilled on the render thread without touching the heap.

use midirelay_core::{MidiEvent, MidiStatus, MAX_MESSAGE_LEN};

/// Pre-allocated packet list with a hard byte capacity.
pub struct PacketList {
    /// Backing storage, sized to the capacity at construction
    buffer: Vec<u8>,
    /// Bytes written so far, including the list header
    used: usize,
    /// Number of packets written
    count: u32,
}

impl PacketList {
    /// Size of the `num_packets` header.
    pub const HEADER_SIZE: usize = 4;
    /// Size of a packet's `time_stamp` + `length` fields.
    pub const PACKET_HEADER_SIZE: usize = 10;
    /// Smallest capacity that still fits one three-byte message.
    pub const MIN_CAPACITY: usize = Self::HEADER_SIZE + Self::PACKET_HEADER_SIZE + MAX_MESSAGE_LEN;

    /// Create an empty list holding at most `capacity` bytes.
    ///
    /// Capacities below the header size are raised to it.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(Self::HEADER_SIZE);
        let mut list = Self {
            buffer: vec![0u8; capacity],
            used: Self::HEADER_SIZE,
            count: 0,
        };
        list.write_header();
        list
    }

    /// Bytes one event occupies in the list.
    #[inline]
    pub const fn encoded_size(event: &MidiEvent) -> usize {
        Self::PACKET_HEADER_SIZE + event.message_len()
    }

    /// Drop all packets. O(1), keeps the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.used = Self::HEADER_SIZE;
        self.count = 0;
        self.write_header();
    }

    /// Append one packet.
    ///
    /// Returns `false` without writing anything if the packet does not fit
    /// in the remaining capacity.
    pub fn try_add(&mut self, time_stamp: u64, data: &[u8]) -> bool {
        let Ok(length) = u16::try_from(data.len()) else {
            return false;
        };
        let needed = Self::PACKET_HEADER_SIZE + data.len();
        if needed > self.remaining() {
            return false;
        }

        let start = self.used;
        self.buffer[start..start + 8].copy_from_slice(&time_stamp.to_ne_bytes());
        self.buffer[start + 8..start + 10].copy_from_slice(&length.to_ne_bytes());
        self.buffer[start + 10..start + needed].copy_from_slice(data);

        self.used += needed;
        self.count += 1;
        self.write_header();
        true
    }

    /// Encode and append an event, stamped with its start frame.
    #[inline]
    pub fn try_add_event(&mut self, event: &MidiEvent) -> bool {
        let (bytes, len) = event.encode();
        self.try_add(event.start_frame as u64, &bytes[..len])
    }

    /// Number of packets.
    #[inline]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Returns true if no packet has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bytes in use, including the header.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.used
    }

    /// Total byte capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes still free.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.used
    }

    /// The encoded list as handed to the host.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.used]
    }

    /// Iterate over the packets in order.
    pub fn packets(&self) -> Packets<'_> {
        Packets {
            bytes: self.as_bytes(),
            offset: Self::HEADER_SIZE,
            remaining: self.count,
        }
    }

    fn write_header(&mut self) {
        self.buffer[..Self::HEADER_SIZE].copy_from_slice(&self.count.to_ne_bytes());
    }
}

impl std::fmt::Debug for PacketList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketList")
            .field("packets", &self.count)
            .field("bytes", &self.used)
            .field("capacity", &self.buffer.len())
            .finish()
    }
}

/// One packet borrowed from a [`PacketList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    /// Start frame within the render cycle.
    pub time_stamp: u64,
    /// Raw MIDI bytes.
    pub data: &'a [u8],
}

impl Packet<'_> {
    /// Decode the packet back into an event.
    ///
    /// Returns `None` for an empty packet.
    pub fn to_event(&self) -> Option<MidiEvent> {
        let (&status, rest) = self.data.split_first()?;
        Some(MidiEvent::new(
            MidiStatus::from_byte(status),
            status & 0x0F,
            rest.first().copied().unwrap_or(0),
            rest.get(1).copied().unwrap_or(0),
            self.time_stamp as u32,
        ))
    }
}

/// Iterator over the packets of a [`PacketList`].
pub struct Packets<'a> {
    bytes: &'a [u8],
    offset: usize,
    remaining: u32,
}

impl<'a> Iterator for Packets<'a> {
    type Item = Packet<'a>;

    fn next(&mut self) -> Option<Packet<'a>> {
        if self.remaining == 0 {
            return None;
        }
        let start = self.offset;
        let header = self.bytes.get(start..start + PacketList::PACKET_HEADER_SIZE)?;

        let mut time_stamp = [0u8; 8];
        time_stamp.copy_from_slice(&header[..8]);
        let mut length = [0u8; 2];
        length.copy_from_slice(&header[8..10]);
        let length = u16::from_ne_bytes(length) as usize;

        let data_start = start + PacketList::PACKET_HEADER_SIZE;
        let data = self.bytes.get(data_start..data_start + length)?;

        self.offset = data_start + length;
        self.remaining -= 1;
        Some(Packet {
            time_stamp: u64::from_ne_bytes(time_stamp),
            data,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}
