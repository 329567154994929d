#![cfg(feature = "async")]
//! Named queue set: a fixed-cardinality collection of FIFO queues keyed
//! by participant name, each holding the one-shot slots of parked
//! callers.
//!
//! The container is associative and its iteration order across queues
//! is an implementation detail; callers must not rely on it. The merge
//! commutativity requirement on transferred values exists precisely to
//! tolerate this.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::errors::{fatal, PlexusError};
use crate::slot::Slot;

/// A named set of FIFO slot queues with a fixed capacity.
///
/// All misuse is fatal: the queue set is engine-internal, so a
/// violation indicates an engine or construction bug rather than a
/// recoverable condition.
#[derive(Debug)]
pub(crate) struct Queues<T> {
    cap: usize,
    qm: BTreeMap<String, VecDeque<Arc<Slot<T>>>>,
}

impl<T> Queues<T> {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            cap,
            qm: BTreeMap::new(),
        }
    }

    /// The declared capacity, i.e. the participant cardinality.
    pub(crate) fn cap(&self) -> usize {
        self.cap
    }

    /// Register a queue under `name`.
    ///
    /// Fatal if the name is taken or the capacity is exhausted.
    pub(crate) fn add(&mut self, name: &str) {
        if self.qm.contains_key(name) {
            fatal(PlexusError::QueueAlreadyExists(name.to_owned()));
        }
        if self.qm.len() >= self.cap {
            fatal(PlexusError::QueuesFull);
        }
        self.qm.insert(name.to_owned(), VecDeque::new());
    }

    /// Append a slot to the named FIFO. Fatal on unknown names.
    pub(crate) fn enqueue(&mut self, name: &str, slot: Arc<Slot<T>>) {
        match self.qm.get_mut(name) {
            Some(q) => q.push_back(slot),
            None => fatal(PlexusError::QueueDoesNotExist(name.to_owned())),
        }
    }

    /// Remove and return the head slot of **every** queue.
    ///
    /// Precondition: `cap` queues registered, each non-empty. Violation
    /// is fatal.
    pub(crate) fn dequeue(&mut self) -> Vec<Arc<Slot<T>>> {
        if self.qm.len() != self.cap {
            fatal(PlexusError::QueuesNotDefined);
        }
        self.qm
            .values_mut()
            .map(|q| {
                q.pop_front()
                    .unwrap_or_else(|| fatal(PlexusError::QueuesNotDefined))
            })
            .collect()
    }

    /// As [`Queues::dequeue`], omitting the queue under `name`.
    pub(crate) fn dequeue_except(&mut self, name: &str) -> Vec<Arc<Slot<T>>> {
        if self.qm.len() != self.cap {
            fatal(PlexusError::QueuesNotDefined);
        }
        self.qm
            .iter_mut()
            .filter(|(k, _)| k.as_str() != name)
            .map(|(_, q)| {
                q.pop_front()
                    .unwrap_or_else(|| fatal(PlexusError::QueuesNotDefined))
            })
            .collect()
    }

    /// Number of queues holding at least one slot.
    ///
    /// Counts *names*, not slots; this is what guarantees at most one
    /// participation per name per rendezvous.
    pub(crate) fn occupancy(&self) -> usize {
        self.qm.values().filter(|q| !q.is_empty()).count()
    }

    /// As [`Queues::occupancy`], ignoring the queue under `name`.
    pub(crate) fn occupancy_except(&self, name: &str) -> usize {
        self.qm
            .iter()
            .filter(|(k, q)| k.as_str() != name && !q.is_empty())
            .count()
    }

    /// Drain every queue, closing every contained slot. Each parked
    /// caller observes the "closed" signal.
    pub(crate) fn close(&mut self) {
        for q in self.qm.values_mut() {
            for slot in q.drain(..) {
                slot.close();
            }
        }
    }

    /// The registered names.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.qm.keys().map(String::as_str)
    }
}
