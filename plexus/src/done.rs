#![cfg(feature = "async")]
//! Done-set: named signaling cells used to wake select-style senders.
//!
//! A [`Signal`] is a reusable unit rendezvous: `post` delivers one
//! signal and returns only once a waiter has consumed it, mirroring an
//! unbuffered handoff. The engine posts while holding its lock, so
//! consumers must drain readiness signals promptly; a selectable plexus
//! whose senders never wait on readiness will stall its receivers.

use std::sync::Mutex;

use tokio::sync::Notify;

use crate::errors::{fatal, PlexusError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SigState {
    Idle,
    Pending,
    Closed,
}

/// A reusable unit rendezvous with a terminal closed state.
#[derive(Debug)]
pub(crate) struct Signal {
    state: Mutex<SigState>,
    on_post: Notify,
    on_consume: Notify,
}

impl Signal {
    fn new() -> Self {
        Self {
            state: Mutex::new(SigState::Idle),
            on_post: Notify::new(),
            on_consume: Notify::new(),
        }
    }

    /// Deliver one signal and wait until a waiter consumes it.
    ///
    /// Returns immediately once the signal is closed.
    pub(crate) async fn post(&self) {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                SigState::Idle => *state = SigState::Pending,
                SigState::Pending => {}
                SigState::Closed => return,
            }
        }
        self.on_post.notify_one();

        loop {
            let notified = self.on_consume.notified();
            {
                let state = self.state.lock().unwrap();
                match *state {
                    SigState::Idle | SigState::Closed => return,
                    SigState::Pending => {}
                }
            }
            notified.await;
        }
    }

    /// Wait for one signal. Returns `false` once the signal is closed.
    pub(crate) async fn wait(&self) -> bool {
        loop {
            let notified = self.on_post.notified();
            {
                let mut state = self.state.lock().unwrap();
                match *state {
                    SigState::Pending => {
                        *state = SigState::Idle;
                        drop(state);
                        self.on_consume.notify_one();
                        return true;
                    }
                    SigState::Closed => return false,
                    SigState::Idle => {}
                }
            }
            notified.await;
        }
    }

    fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            *state = SigState::Closed;
        }
        self.on_post.notify_one();
        self.on_consume.notify_one();
    }
}

/// A fixed mapping from sender names to their readiness [`Signal`]s.
///
/// Populated at construction when selectable-sender mode is enabled and
/// immutable afterwards; the signals themselves carry their own
/// synchronization.
#[derive(Debug, Default)]
pub(crate) struct DoneSet {
    dm: std::collections::BTreeMap<String, Signal>,
}

impl DoneSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a signal under `name`.
    pub(crate) fn add(&mut self, name: &str) {
        self.dm.insert(name.to_owned(), Signal::new());
    }

    pub(crate) fn len(&self) -> usize {
        self.dm.len()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Signal> {
        self.dm.get(name)
    }

    /// Deliver one signal to each named slot, waiting for each to be
    /// consumed. Fatal on names that were never registered.
    pub(crate) async fn release<'a>(&self, names: impl Iterator<Item = &'a str>) {
        for name in names {
            match self.dm.get(name) {
                Some(sig) => sig.post().await,
                None => fatal(PlexusError::QueueDoesNotExist(name.to_owned())),
            }
        }
    }

    /// Close every signal; waiters observe `false`.
    pub(crate) fn close(&self) {
        for sig in self.dm.values() {
            sig.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn post_waits_for_a_consumer() {
        let sig = Arc::new(Signal::new());

        let poster = {
            let sig = Arc::clone(&sig);
            tokio::spawn(async move { sig.post().await })
        };
        sleep(Duration::from_millis(10)).await;
        assert!(!poster.is_finished());

        assert!(sig.wait().await);
        poster.await.unwrap();
    }

    #[tokio::test]
    async fn wait_blocks_until_posted() {
        let sig = Signal::new();
        assert!(timeout(Duration::from_millis(10), sig.wait()).await.is_err());
    }

    #[tokio::test]
    async fn signal_is_reusable_across_rounds() {
        let sig = Arc::new(Signal::new());
        for _ in 0..3 {
            let waiter = {
                let sig = Arc::clone(&sig);
                tokio::spawn(async move { sig.wait().await })
            };
            sig.post().await;
            assert!(waiter.await.unwrap());
        }
    }

    #[tokio::test]
    async fn close_releases_waiters_with_false() {
        let sig = Arc::new(Signal::new());

        let waiter = {
            let sig = Arc::clone(&sig);
            tokio::spawn(async move { sig.wait().await })
        };
        sleep(Duration::from_millis(10)).await;
        sig.close();

        assert!(!waiter.await.unwrap());
        assert!(!sig.wait().await);
    }

    #[tokio::test]
    async fn release_reaches_every_name() {
        let mut ds = DoneSet::new();
        ds.add("a");
        ds.add("b");
        let ds = Arc::new(ds);

        let waiters: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|name| {
                let ds = Arc::clone(&ds);
                tokio::spawn(async move { ds.get(name).unwrap().wait().await })
            })
            .collect();

        ds.release(["a", "b"].into_iter()).await;
        for w in waiters {
            assert!(w.await.unwrap());
        }
    }

    #[tokio::test]
    async fn release_on_unknown_name_is_fatal() {
        let ds = Arc::new(DoneSet::new());
        let handle = {
            let ds = Arc::clone(&ds);
            tokio::spawn(async move { ds.release(["ghost"].into_iter()).await })
        };
        let err = handle.await.unwrap_err().into_panic();
        assert_eq!(
            err.downcast_ref::<PlexusError>(),
            Some(&PlexusError::QueueDoesNotExist("ghost".to_owned()))
        );
    }
}
