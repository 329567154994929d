#![cfg(feature = "async")]
//! One-shot rendezvous slot.
//!
//! A [`Slot`] is the parking point for a single blocked send or
//! receive: a unidirectional synchronous handoff that carries exactly
//! one value (or one "closed" signal) and is then spent. The engine
//! enqueues one slot per parked caller and the counterpart that
//! completes a quorum drives the handoff from the other side.
//!
//! Design notes
//! - State is a four-arm machine (`Empty → Value → Taken`, with a
//!   terminal `Closed` arm) inside a `std::sync::Mutex`; critical
//!   sections never span an await.
//! - Two `Notify`s model the transitions "a value was deposited" and
//!   "the value was consumed". We always create the `Notified` future
//!   before re-checking state so a wakeup between check and await is
//!   never lost.
//! - `put` returns only once the value has been consumed (or the slot
//!   closed). This is what makes the handoff a rendezvous rather than a
//!   mailbox: a send never completes before the paired receive has read
//!   the value.

use std::sync::Mutex;

use tokio::sync::Notify;

/// The slot was closed before (or while) the handoff completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotClosed;

#[derive(Debug)]
enum State<T> {
    Empty,
    Value(T),
    Taken,
    Closed,
}

/// A single-use synchronous handoff cell.
///
/// Exactly one `put` and one `take` happen per slot; the engine
/// guarantees this by construction (each slot is enqueued into exactly
/// one named queue and dequeued by exactly one counterpart).
#[derive(Debug)]
pub(crate) struct Slot<T> {
    state: Mutex<State<T>>,
    on_deposit: Notify, // signalled on Empty -> Value and on close
    on_consume: Notify, // signalled on Value -> Taken and on close
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::Empty),
            on_deposit: Notify::new(),
            on_consume: Notify::new(),
        }
    }

    /// Deposit `value` and wait until the counterpart consumes it.
    ///
    /// Returns `Err(SlotClosed)` if the slot is closed before the
    /// deposit, or closed while the value is still waiting to be
    /// consumed (a parked sender released by `Plexus::close`).
    pub(crate) async fn put(&self, value: T) -> Result<(), SlotClosed> {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                State::Empty => *state = State::Value(value),
                State::Closed => return Err(SlotClosed),
                State::Value(_) | State::Taken => unreachable!("slot accepts a single value"),
            }
        }
        self.on_deposit.notify_one();

        loop {
            let notified = self.on_consume.notified();
            {
                let state = self.state.lock().unwrap();
                match *state {
                    State::Taken => return Ok(()),
                    State::Closed => return Err(SlotClosed),
                    State::Empty | State::Value(_) => {}
                }
            }
            notified.await;
        }
    }

    /// Wait for the value; `None` iff the slot was closed without one.
    pub(crate) async fn take(&self) -> Option<T> {
        loop {
            let notified = self.on_deposit.notified();
            {
                let mut state = self.state.lock().unwrap();
                match std::mem::replace(&mut *state, State::Taken) {
                    State::Value(v) => {
                        drop(state);
                        self.on_consume.notify_one();
                        return Some(v);
                    }
                    State::Closed => {
                        *state = State::Closed;
                        return None;
                    }
                    State::Empty => *state = State::Empty,
                    State::Taken => unreachable!("slot yields a single value"),
                }
            }
            notified.await;
        }
    }

    /// Close the slot, waking both sides.
    ///
    /// A completed handoff (`Taken`) stays completed; closing is
    /// otherwise terminal and drops any value still waiting.
    pub(crate) fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                State::Taken | State::Closed => {}
                State::Empty | State::Value(_) => *state = State::Closed,
            }
        }
        self.on_deposit.notify_one();
        self.on_consume.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn put_take_roundtrip() {
        let slot = Arc::new(Slot::new());

        let putter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.put(42).await })
        };

        assert_eq!(slot.take().await, Some(42));
        assert_eq!(putter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn put_blocks_until_taken() {
        let slot = Arc::new(Slot::new());

        let putter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.put(1).await })
        };
        sleep(Duration::from_millis(10)).await;
        assert!(!putter.is_finished());

        assert_eq!(slot.take().await, Some(1));
        assert_eq!(putter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn take_blocks_until_put() {
        let slot: Arc<Slot<i32>> = Arc::new(Slot::new());
        assert!(timeout(Duration::from_millis(10), slot.take())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn close_unblocks_taker() {
        let slot: Arc<Slot<i32>> = Arc::new(Slot::new());

        let taker = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.take().await })
        };
        sleep(Duration::from_millis(10)).await;
        slot.close();

        assert_eq!(taker.await.unwrap(), None);
    }

    #[tokio::test]
    async fn close_fails_parked_putter() {
        let slot = Arc::new(Slot::new());

        let putter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.put(7).await })
        };
        sleep(Duration::from_millis(10)).await;
        slot.close();

        assert_eq!(putter.await.unwrap(), Err(SlotClosed));
    }

    #[tokio::test]
    async fn put_after_close_fails_immediately() {
        let slot = Slot::new();
        slot.close();
        assert_eq!(slot.put(7).await, Err(SlotClosed));
    }

    #[tokio::test]
    async fn close_after_handoff_keeps_the_result() {
        let slot = Arc::new(Slot::new());

        let putter = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.put(3).await })
        };
        assert_eq!(slot.take().await, Some(3));
        slot.close();

        assert_eq!(putter.await.unwrap(), Ok(()));
    }
}
