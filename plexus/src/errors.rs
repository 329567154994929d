#![cfg(feature = "async")]
//! The failure vocabulary of the engine.
//!
//! Every condition here is a **programming error**: the engine's
//! contract is that a caller who follows the documented preconditions
//! never triggers one. Fatal conditions are raised with
//! [`std::panic::panic_any`] carrying the [`PlexusError`] value, so a
//! supervising task can downcast the payload of a faulted task and
//! recover the typed error.
//!
//! The one *recoverable* condition (receiving on a closed plexus) is
//! not an error at all; it surfaces as `None` from
//! [`Plexus::recv`](crate::Plexus::recv).

use thiserror::Error;

/// Fatal misuse conditions of a [`Plexus`](crate::Plexus).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlexusError {
    /// `close` was called on an already closed plexus.
    #[error("close of an already closed plexus")]
    CloseClosed,
    /// A readiness operation was used on a plexus that was not
    /// configured with selectable senders.
    #[error("plexus is not selectable")]
    NotSelectable,
    /// `send` was invoked on a closed plexus, or a parked send was
    /// released by `close`.
    #[error("send to a closed plexus")]
    SendToClosed,
    /// A queue was registered twice under the same name.
    #[error("queue '{0}' already exists")]
    QueueAlreadyExists(String),
    /// An operation referenced a participant name that was never
    /// declared.
    #[error("queue '{0}' does not exist")]
    QueueDoesNotExist(String),
    /// More queues were registered than the declared cardinality.
    #[error("no capacity left in the queue set")]
    QueuesFull,
    /// A collective dequeue ran against a queue set that is not fully
    /// registered or not fully occupied.
    #[error("queue set is not fully defined")]
    QueuesNotDefined,
    /// The configured sender/receiver cardinalities do not form a valid
    /// structural mode.
    #[error("plexus is in an unknown state")]
    UnknownState,
}

/// Raise a fatal condition, terminating the faulting call's task.
pub(crate) fn fatal(err: PlexusError) -> ! {
    std::panic::panic_any(err)
}
