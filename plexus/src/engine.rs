#![cfg(feature = "async")]
//! The rendezvous engine.
//!
//! A [`Plexus`] coordinates a fixed set of named senders and named
//! receivers: a single logical transfer fires when one pending entry
//! exists for **every** participant name, at which point each receiver
//! observes a value derived from all participating senders. With a
//! single sender that is the sender's value itself; with several it is
//! the commutative [`Merge`](crate::Merge)-reduction.
//!
//! The engine does not spawn tasks; it coordinates its caller tasks. A
//! single readers-writer lock protects the mutable core. Every
//! operation either completes fully under the lock, or releases it
//! exactly once before awaiting a one-shot slot; the slots synchronize
//! outside the lock, which is what keeps a blocking handoff from ever
//! happening under it.
//!
//! Dropping a `send`/`recv` future that has already parked abandons its
//! slot and leaves the counterpart waiting; participant-level
//! cancellation is not part of the contract. Tear the whole plexus down
//! with [`Plexus::close`] instead.

use std::sync::Arc;

use log::debug;
use log::trace;
use tokio::sync::RwLock;

use crate::done::DoneSet;
use crate::errors::{fatal, PlexusError};
use crate::merge::{Merge, MergeOf};
use crate::queues::Queues;
use crate::slot::Slot;

/// Structural mode of a plexus, computed from the sender and receiver
/// cardinalities `(S, R)` fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Multiple simultaneous senders and multiple simultaneous
    /// receivers. Every receiver takes the identical merged value.
    MsMr,
    /// Multiple simultaneous senders and a single receiver. The
    /// receiver takes a merged value.
    MsSr,
    /// A single sender and multiple simultaneous receivers. All
    /// receivers take the sender's value.
    SsMr,
    /// A single sender and a single receiver. Behaves like the classic
    /// unbuffered channel.
    SsSr,
}

/// An N-sender × M-receiver rendezvous.
///
/// Cheap to clone; clones share the same engine, so tasks participate
/// by cloning the handle they were given.
///
/// Values must implement [`Merge`](crate::Merge): the multi-sender
/// modes reduce one value from each sender in unspecified order, which
/// is exactly what the contract's commutativity law licenses. `Clone`
/// covers the fan-out modes, which deliver the same value to several
/// receivers.
pub struct Plexus<T>
where
    T: Merge + Clone + Send + 'static,
{
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    name: String,
    recvn: usize,
    sendn: usize,
    selectable_senders: bool,
    sendr: DoneSet,
    core: RwLock<Core<T>>,
}

struct Core<T> {
    active: bool,
    closed: bool,
    recvq: Queues<T>,
    sendq: Queues<T>,
}

impl<T> Clone for Plexus<T>
where
    T: Merge + Clone + Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Plexus<T>
where
    T: Merge + Clone + Send + 'static,
{
    pub(crate) fn new(
        name: String,
        recvn: usize,
        recvq: Queues<T>,
        sendn: usize,
        sendq: Queues<T>,
        selectable_senders: bool,
        sendr: DoneSet,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                recvn,
                sendn,
                selectable_senders,
                sendr,
                core: RwLock::new(Core {
                    active: false,
                    closed: false,
                    recvq,
                    sendq,
                }),
            }),
        }
    }

    /// The descriptive name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The structural mode. Fatal if the configured cardinalities are
    /// invalid (zero on either side).
    pub fn state(&self) -> State {
        match (self.inner.sendn, self.inner.recvn) {
            (1, 1) => State::SsSr,
            (1, r) if r > 1 => State::SsMr,
            (s, 1) if s > 1 => State::MsSr,
            (s, r) if s > 1 && r > 1 => State::MsMr,
            _ => fatal(PlexusError::UnknownState),
        }
    }

    /// Whether any send or receive has arrived yet. Diagnostic only.
    pub async fn is_active(&self) -> bool {
        self.inner.core.read().await.active
    }

    /// Receive a value for the participant `name`.
    ///
    /// Blocks until a rendezvous involving `name` fires. Returns `None`
    /// iff the plexus was closed without delivering a value; callers
    /// typically treat that as end-of-stream, and repeated calls on a
    /// closed plexus keep returning `None`.
    ///
    /// `name` must be one of the declared receiver names; anything else
    /// is fatal.
    pub async fn recv(&self, name: &str) -> Option<T> {
        {
            let core = self.inner.core.read().await;
            if core.closed {
                return None;
            }
        }
        let mut core = self.inner.core.write().await;
        if core.closed {
            return None;
        }
        if !core.active {
            core.active = true;
        }

        // Park unless this caller completes the quorum.
        if core.recvq.occupancy_except(name) + 1 < self.inner.recvn
            || core.sendq.occupancy() < self.inner.sendn
        {
            let slot = Arc::new(Slot::new());
            core.recvq.enqueue(name, Arc::clone(&slot));

            // Selectable mode: the receiver side just reached full
            // occupancy, so wake the senders' select arms. Delivery
            // happens under the lock; see `ready_send`.
            if self.inner.selectable_senders && core.recvq.occupancy() == self.inner.recvn {
                self.inner.sendr.release(core.sendq.names()).await;
            }

            trace!("plexus '{}': receiver '{}' parked", self.inner.name, name);
            drop(core);
            return slot.take().await;
        }

        if self.inner.selectable_senders {
            self.inner.sendr.release(core.sendq.names()).await;
        }

        let state = self.state();
        trace!(
            "plexus '{}': receiver '{}' fires a {:?} rendezvous",
            self.inner.name,
            name,
            state
        );
        match state {
            State::SsSr => {
                let schs = core.sendq.dequeue();
                drop(core);
                schs[0].take().await
            }
            State::SsMr => {
                let schs = core.sendq.dequeue();
                let rchs = core.recvq.dequeue_except(name);
                drop(core);
                match schs[0].take().await {
                    Some(v) => {
                        for ch in &rchs {
                            let _ = ch.put(v.clone()).await;
                        }
                        Some(v)
                    }
                    None => {
                        for ch in &rchs {
                            ch.close();
                        }
                        None
                    }
                }
            }
            State::MsSr => {
                let schs = core.sendq.dequeue();
                drop(core);
                let values = Self::drain(schs).await;
                MergeOf::from_iter_nonempty(values).map(MergeOf::into_inner)
            }
            State::MsMr => {
                let rchs = core.recvq.dequeue_except(name);
                let schs = core.sendq.dequeue();
                drop(core);
                let values = Self::drain(schs).await;
                match MergeOf::from_iter_nonempty(values).map(MergeOf::into_inner) {
                    Some(res) => {
                        for ch in &rchs {
                            let _ = ch.put(res.clone()).await;
                        }
                        Some(res)
                    }
                    None => {
                        for ch in &rchs {
                            ch.close();
                        }
                        None
                    }
                }
            }
        }
    }

    /// Send `value` on behalf of the participant `name`.
    ///
    /// Blocks until a rendezvous involving `name` fires. Sending on a
    /// closed plexus is fatal with [`PlexusError::SendToClosed`], and
    /// so is a parked send whose plexus is closed underneath it. The
    /// closed check runs both eagerly and again under the exclusive
    /// lock to catch a concurrent close.
    ///
    /// `name` must be one of the declared sender names; anything else
    /// is fatal.
    pub async fn send(&self, name: &str, value: T) {
        {
            let core = self.inner.core.read().await;
            if core.closed {
                fatal(PlexusError::SendToClosed);
            }
        }
        let mut core = self.inner.core.write().await;
        if core.closed {
            fatal(PlexusError::SendToClosed);
        }
        if !core.active {
            core.active = true;
        }

        // Park unless this caller completes the quorum.
        if core.sendq.occupancy_except(name) + 1 < self.inner.sendn
            || core.recvq.occupancy() < self.inner.recvn
        {
            let slot = Arc::new(Slot::new());
            core.sendq.enqueue(name, Arc::clone(&slot));
            trace!("plexus '{}': sender '{}' parked", self.inner.name, name);
            drop(core);
            if slot.put(value).await.is_err() {
                fatal(PlexusError::SendToClosed);
            }
            return;
        }

        let state = self.state();
        trace!(
            "plexus '{}': sender '{}' fires a {:?} rendezvous",
            self.inner.name,
            name,
            state
        );
        match state {
            State::SsSr => {
                let rchs = core.recvq.dequeue();
                drop(core);
                let _ = rchs[0].put(value).await;
            }
            State::SsMr => {
                let rchs = core.recvq.dequeue();
                drop(core);
                for ch in &rchs {
                    let _ = ch.put(value.clone()).await;
                }
            }
            State::MsSr => {
                let rchs = core.recvq.dequeue();
                let schs = core.sendq.dequeue_except(name);
                drop(core);
                let mut res = value;
                for v in Self::drain(schs).await {
                    res = res.merge(&v);
                }
                let _ = rchs[0].put(res).await;
            }
            State::MsMr => {
                let schs = core.sendq.dequeue_except(name);
                let rchs = core.recvq.dequeue();
                drop(core);
                let mut res = value;
                for v in Self::drain(schs).await {
                    res = res.merge(&v);
                }
                for ch in &rchs {
                    let _ = ch.put(res.clone()).await;
                }
            }
        }
    }

    /// Wait for receiver-side readiness on behalf of the sender `name`.
    ///
    /// Resolves `true` once the engine signals that all receivers are
    /// parked and a send would complete a rendezvous promptly; resolves
    /// `false` once the plexus is closed. Intended for integrating a
    /// plexus send into a `select!` over several primitives:
    ///
    /// ```ignore
    /// tokio::select! {
    ///     ready = plx.ready_send("alpha") => {
    ///         if ready {
    ///             plx.send("alpha", value).await;
    ///         }
    ///     }
    ///     _ = other_branch => { /* … */ }
    /// }
    /// ```
    ///
    /// Signals are delivered while the engine lock is held, so
    /// selectable senders must keep draining readiness; a selectable
    /// plexus with no one waiting on `ready_send` stalls its receivers.
    ///
    /// Fatal with [`PlexusError::NotSelectable`] when the plexus was
    /// not configured with selectable senders, and with
    /// [`PlexusError::QueueDoesNotExist`] for unknown sender names.
    pub async fn ready_send(&self, name: &str) -> bool {
        if !self.inner.selectable_senders {
            fatal(PlexusError::NotSelectable);
        }
        match self.inner.sendr.get(name) {
            Some(sig) => sig.wait().await,
            None => fatal(PlexusError::QueueDoesNotExist(name.to_owned())),
        }
    }

    /// Close the plexus. Terminal and one-shot.
    ///
    /// Every parked receive observes `None`; every parked send fails
    /// with [`PlexusError::SendToClosed`]; readiness waiters observe
    /// `false`. Closing an already closed plexus is fatal with
    /// [`PlexusError::CloseClosed`].
    pub async fn close(&self) {
        {
            let core = self.inner.core.read().await;
            if core.closed {
                fatal(PlexusError::CloseClosed);
            }
        }
        let mut core = self.inner.core.write().await;
        if core.closed {
            fatal(PlexusError::CloseClosed);
        }

        core.recvq.close();
        core.sendq.close();
        self.inner.sendr.close();
        core.closed = true;
        debug!("plexus '{}' closed", self.inner.name);
    }

    /// Take the value out of each slot and collect the results,
    /// skipping slots that delivered the closed signal.
    async fn drain(slots: Vec<Arc<Slot<T>>>) -> Vec<T> {
        let mut values = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(v) = slot.take().await {
                values.push(v);
            }
        }
        values
    }
}
