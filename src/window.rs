//! ==============================================================================
//! window.rs - retained window of recent readings
//! ==============================================================================
//!
//! purpose:
//!     bounded fifo of the most recent readings, kept in arrival order.
//!     pushing past capacity evicts from the front, so the window always holds
//!     exactly the newest `min(len, capacity)` readings.
//!
//! relationships:
//!     - owned by: service.rs (behind the service lock)
//!     - read by: stats.rs (aggregation), api.rs via service (latest)
//!
//! ==============================================================================

use std::collections::VecDeque;

use crate::domain::Reading;

/// default number of readings kept in memory
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct RetainedWindow {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl RetainedWindow {
    /// capacity is clamped to at least one reading
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// append a reading, returning the evicted oldest one if the window was full
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        let evicted = if self.readings.len() >= self.capacity {
            self.readings.pop_front()
        } else {
            None
        };
        self.readings.push_back(reading);
        evicted
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }
}

impl Default for RetainedWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
