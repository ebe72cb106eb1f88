//! Identifier generation for events, budget items and staff assignments.
//!
//! The planning service asks an [`IdGenerator`] for one fresh id per created
//! record. [`RandomIdGenerator`] is used in production;
//! [`SequentialIdGenerator`] yields a predictable sequence for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of unique identifiers.
///
/// Implementations must never hand out the same value twice within a
/// process lifetime.
pub trait IdGenerator: Send + Sync {
    fn create(&self) -> Uuid;
}

/// Random version-4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn create(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids: first any queued values, then `base + 1`, `base + 2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    queued: Mutex<VecDeque<Uuid>>,
    base: u128,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Counter starting at `00000000-0000-0000-0000-000000000001`.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Counter whose first value is `base + 1`.
    pub fn starting_at(base: u128) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            base,
            next: AtomicU64::new(1),
        }
    }

    /// Hand out `values` in order, then fall back to the counter.
    pub fn from_values(values: impl IntoIterator<Item = Uuid>) -> Self {
        let generator = Self::new();
        generator
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(values);
        generator
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn create(&self) -> Uuid {
        if let Some(id) = self
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return id;
        }
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(self.base + u128::from(n))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn sequential_counts_up_from_one() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.create(), Uuid::from_u128(1));
        assert_eq!(ids.create(), Uuid::from_u128(2));
        assert_eq!(ids.create(), Uuid::from_u128(3));
    }

    #[test]
    fn sequential_respects_base() {
        let ids = SequentialIdGenerator::starting_at(0xaa00);
        assert_eq!(ids.create(), Uuid::from_u128(0xaa01));
    }

    #[test]
    fn queued_values_come_first() {
        let first = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let ids = SequentialIdGenerator::from_values([first]);
        assert_eq!(ids.create(), first);
        assert_eq!(ids.create(), Uuid::from_u128(1));
    }

    #[test]
    fn random_ids_do_not_collide() {
        let ids = RandomIdGenerator;
        let seen: HashSet<Uuid> = (0..1000).map(|_| ids.create()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn generators_are_object_safe() {
        let boxed: Vec<Box<dyn IdGenerator>> =
            vec![Box::new(RandomIdGenerator), Box::new(SequentialIdGenerator::new())];
        assert_ne!(boxed[0].create(), boxed[1].create());
    }
}
