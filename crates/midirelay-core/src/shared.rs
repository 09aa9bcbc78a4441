//! Lock-free handle for swapping the active rule.
//!
//! The parameter side (UI or host thread) replaces the whole rule with
//! [`SharedRule::store`]; the render thread takes a snapshot with
//! [`SharedRule::snapshot`] once per cycle. A snapshot is an `Arc`, so an
//! update never produces a torn read and a cycle keeps the rule it started
//! with.
//!
//! Replaced rules are parked on the writer side until no snapshot refers to
//! them, so the render thread only ever decrements a count and never frees
//! a rule. They are released by the next [`SharedRule::store`] or by
//! [`SharedRule::release_retired`].

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::error::ConfigResult;
use crate::rules::TransformRule;

/// Shared, atomically replaceable [`TransformRule`].
///
/// Cloning the handle shares the same slot.
#[derive(Clone)]
pub struct SharedRule {
    slot: Arc<ArcSwap<TransformRule>>,
    /// Replaced rules kept alive until the last snapshot is gone. Only the
    /// writer side locks this.
    retired: Arc<Mutex<Vec<Arc<TransformRule>>>>,
}

impl SharedRule {
    /// Create a handle holding `rule`.
    pub fn new(rule: TransformRule) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(rule)),
            retired: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the active rule after validating it.
    ///
    /// Not intended for the render thread: it allocates the new `Arc` and
    /// frees rules retired by earlier calls.
    pub fn store(&self, rule: TransformRule) -> ConfigResult<()> {
        rule.validate()?;
        log::debug!("Swapping active rule to {}", rule.name());
        let previous = self.slot.swap(Arc::new(rule));

        let mut retired = self.retired.lock().unwrap_or_else(PoisonError::into_inner);
        retired.retain(|rule| Arc::strong_count(rule) > 1);
        retired.push(previous);
        Ok(())
    }

    /// Free replaced rules that no snapshot refers to any more.
    ///
    /// Returns how many are still held by a reader.
    pub fn release_retired(&self) -> usize {
        let mut retired = self.retired.lock().unwrap_or_else(PoisonError::into_inner);
        retired.retain(|rule| Arc::strong_count(rule) > 1);
        retired.len()
    }

    /// Current rule. Lock-free and allocation-free.
    #[inline]
    pub fn snapshot(&self) -> Arc<TransformRule> {
        self.slot.load_full()
    }
}

impl Default for SharedRule {
    fn default() -> Self {
        Self::new(TransformRule::default())
    }
}

impl std::fmt::Debug for SharedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRule")
            .field("rule", &self.slot.load().name())
            .finish()
    }
}
