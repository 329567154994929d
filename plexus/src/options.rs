#![cfg(feature = "async")]
//! Builder-style construction surface for [`Plexus`](crate::Plexus).
//!
//! Configuration steps apply in the order they are chained, which
//! matters in one place: [`PlexusOptions::selectable_senders`] snapshots
//! the senders declared so far, so it must come after the sender
//! declaration. [`PlexusOptions::build`] validates the result and is
//! fatal on malformed configurations.

use crate::done::DoneSet;
use crate::engine::Plexus;
use crate::errors::{fatal, PlexusError};
use crate::merge::Merge;
use crate::queues::Queues;

/// Accumulates the configuration of a plexus.
///
/// ```rust
/// use plexus::{Counter, PlexusOptions};
///
/// let plx: plexus::Plexus<Counter> = PlexusOptions::new()
///     .name("totals")
///     .senders(["alpha", "beta"])
///     .receivers_count(1)
///     .build();
/// assert_eq!(plx.state(), plexus::State::MsSr);
/// ```
pub struct PlexusOptions<T> {
    name: String,
    recvn: usize,
    recvq: Option<Queues<T>>,
    sendn: usize,
    sendq: Option<Queues<T>>,
    selectable_senders: bool,
    sendr: DoneSet,
}

impl<T> Default for PlexusOptions<T>
where
    T: Merge + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PlexusOptions<T>
where
    T: Merge + Clone + Send + 'static,
{
    /// Start an empty configuration.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            recvn: 0,
            recvq: None,
            sendn: 0,
            sendq: None,
            selectable_senders: false,
            sendr: DoneSet::new(),
        }
    }

    /// Set the descriptive name. Purely diagnostic.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare the receiver names, fixing the receiver cardinality.
    pub fn receivers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.recvn = names.len();
        let mut q = Queues::new(self.recvn);
        for name in &names {
            q.add(name);
        }
        self.recvq = Some(q);
        self
    }

    /// Declare `n` receivers named `receiver_0` … `receiver_{n-1}`.
    pub fn receivers_count(self, n: usize) -> Self {
        self.receivers((0..n).map(|i| format!("receiver_{i}")))
    }

    /// Declare the sender names, fixing the sender cardinality.
    pub fn senders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.sendn = names.len();
        let mut q = Queues::new(self.sendn);
        for name in &names {
            q.add(name);
        }
        self.sendq = Some(q);
        self
    }

    /// Declare `n` senders named `sender_0` … `sender_{n-1}`.
    pub fn senders_count(self, n: usize) -> Self {
        self.senders((0..n).map(|i| format!("sender_{i}")))
    }

    /// Enable the readiness-signaling surface for select-style senders.
    ///
    /// Requires the senders to have been declared already; `build` is
    /// fatal otherwise.
    pub fn selectable_senders(mut self) -> Self {
        self.selectable_senders = true;
        self.sendr = DoneSet::new();
        if let Some(sendq) = &self.sendq {
            for name in sendq.names() {
                self.sendr.add(name);
            }
        }
        self
    }

    /// Assemble the engine.
    ///
    /// Fatal with [`PlexusError::UnknownState`] when either participant
    /// side is missing or empty, when a queue set's capacity drifted
    /// from its declared cardinality, or when selectable mode is on but
    /// the ready-set does not cover every sender.
    pub fn build(self) -> Plexus<T> {
        let Some(recvq) = self.recvq else {
            fatal(PlexusError::UnknownState);
        };
        let Some(sendq) = self.sendq else {
            fatal(PlexusError::UnknownState);
        };
        if recvq.cap() != self.recvn || sendq.cap() != self.sendn {
            fatal(PlexusError::UnknownState);
        }
        if self.selectable_senders && self.sendr.len() != self.sendn {
            fatal(PlexusError::UnknownState);
        }

        let plx = Plexus::new(
            self.name,
            self.recvn,
            recvq,
            self.sendn,
            sendq,
            self.selectable_senders,
            self.sendr,
        );
        // Forces the cardinality check, so zero-count configurations
        // fail here rather than at the first operation.
        plx.state();
        plx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Counter;
    use crate::State;
    use std::panic::AssertUnwindSafe;

    fn expect_fatal(f: impl FnOnce(), want: PlexusError) {
        let err = std::panic::catch_unwind(AssertUnwindSafe(f)).unwrap_err();
        let got = err
            .downcast_ref::<PlexusError>()
            .expect("fatal conditions carry a PlexusError");
        assert_eq!(*got, want);
    }

    #[test]
    fn count_declarations_generate_sequential_names() {
        // Participation under the generated names is exercised in the
        // engine tests; here it is enough that construction succeeds
        // across all four modes.
        let plx: crate::Plexus<Counter> = PlexusOptions::new()
            .senders_count(2)
            .receivers_count(3)
            .build();
        assert_eq!(plx.state(), State::MsMr);
    }

    #[test]
    fn name_defaults_to_empty() {
        let plx: crate::Plexus<Counter> =
            PlexusOptions::new().senders_count(1).receivers_count(1).build();
        assert_eq!(plx.name(), "");
    }

    #[test]
    fn build_without_senders_is_fatal() {
        expect_fatal(
            || {
                PlexusOptions::<Counter>::new().receivers_count(1).build();
            },
            PlexusError::UnknownState,
        );
    }

    #[test]
    fn build_without_receivers_is_fatal() {
        expect_fatal(
            || {
                PlexusOptions::<Counter>::new().senders_count(1).build();
            },
            PlexusError::UnknownState,
        );
    }

    #[test]
    fn zero_cardinality_is_fatal() {
        expect_fatal(
            || {
                PlexusOptions::<Counter>::new()
                    .senders_count(0)
                    .receivers_count(1)
                    .build();
            },
            PlexusError::UnknownState,
        );
    }

    #[test]
    fn selectable_before_senders_is_fatal() {
        expect_fatal(
            || {
                PlexusOptions::<Counter>::new()
                    .selectable_senders()
                    .senders_count(2)
                    .receivers_count(1)
                    .build();
            },
            PlexusError::UnknownState,
        );
    }

    #[test]
    fn duplicate_participant_names_are_fatal() {
        expect_fatal(
            || {
                PlexusOptions::<Counter>::new().senders(["a", "a"]);
            },
            PlexusError::QueueAlreadyExists("a".to_owned()),
        );
    }
}
