//! Output engine configuration.
//!
//! # Example
//!
//! ```
//! use midirelay_au::EngineConfig;
//!
//! static CONFIG: EngineConfig = EngineConfig::new()
//!     .with_packet_list_capacity(1024)
//!     .with_queue_reserve(128);
//!
//! assert!(CONFIG.validate().is_ok());
//! ```

use midirelay_core::{ConfigError, ConfigResult};

use crate::packet::PacketList;

// =============================================================================
// Buffer Size Configuration
// =============================================================================

/// Default packet list size in bytes.
///
/// Configurable via Cargo features: `packet-list-256`, `packet-list-1024`,
/// `packet-list-2048`. Default is 512 bytes.
#[cfg(feature = "packet-list-2048")]
pub const DEFAULT_PACKET_LIST_SIZE: usize = 2048;

/// Default packet list size in bytes.
#[cfg(all(feature = "packet-list-1024", not(feature = "packet-list-2048")))]
pub const DEFAULT_PACKET_LIST_SIZE: usize = 1024;

/// Default packet list size in bytes.
#[cfg(all(
    feature = "packet-list-256",
    not(feature = "packet-list-1024"),
    not(feature = "packet-list-2048")
))]
pub const DEFAULT_PACKET_LIST_SIZE: usize = 256;

/// Default packet list size in bytes.
#[cfg(not(any(
    feature = "packet-list-256",
    feature = "packet-list-1024",
    feature = "packet-list-2048"
)))]
pub const DEFAULT_PACKET_LIST_SIZE: usize = 512;

/// Initial pending-queue capacity.
pub const DEFAULT_QUEUE_RESERVE: usize = 64;

/// Sizing for the batching and flush engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Byte capacity of one packet list delivery.
    pub packet_list_capacity: usize,

    /// Events reserved in the pending queue up front.
    ///
    /// The queue grows past this if a cycle produces more events.
    pub queue_reserve: usize,
}

impl EngineConfig {
    /// Configuration with the default sizes.
    pub const fn new() -> Self {
        Self {
            packet_list_capacity: DEFAULT_PACKET_LIST_SIZE,
            queue_reserve: DEFAULT_QUEUE_RESERVE,
        }
    }

    /// Set the packet list capacity in bytes.
    pub const fn with_packet_list_capacity(mut self, bytes: usize) -> Self {
        self.packet_list_capacity = bytes;
        self
    }

    /// Set the initial pending-queue capacity.
    pub const fn with_queue_reserve(mut self, events: usize) -> Self {
        self.queue_reserve = events;
        self
    }

    /// Check that a packet list can hold at least one message.
    pub fn validate(&self) -> ConfigResult<()> {
        let minimum = PacketList::MIN_CAPACITY;
        if self.packet_list_capacity < minimum {
            return Err(ConfigError::PacketListTooSmall {
                capacity: self.packet_list_capacity,
                minimum,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
