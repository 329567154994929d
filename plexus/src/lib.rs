#![deny(missing_docs)]
//! # plexus: N×M rendezvous with commutative merge
//!
//! A [`Plexus`] generalizes the classic unbuffered rendezvous channel
//! to a fixed set of **named senders** and **named receivers**: one
//! logical transfer fires when a pending entry exists for every
//! participant name, and each receiver observes a value derived from
//! all participating senders. With a single sender that is the sender's
//! value itself; with several senders it is the commutative
//! [`Merge`]-reduction over one value from each of them.
//!
//! Core pieces:
//!
//! - [`Merge`]: the contract for transferred values (a commutative
//!   binary combine), with a toolkit of ready-made implementations
//!   ([`Counter`], [`Max`], [`Min`], set union, lifted [`Option`],
//!   tuples) and a fieldwise `#[derive(Merge)]`
//! - [`Plexus`] *(feature = "async")*: the rendezvous engine, driven by
//!   `recv`/`send`/`close` and an optional select-style
//!   [`ready_send`](Plexus::ready_send) surface
//! - [`PlexusOptions`] *(feature = "async")*: builder for the fixed
//!   participant sets and the selectable-sender mode
//! - [`PlexusError`] *(feature = "async")*: the fatality vocabulary;
//!   misuse panics with a typed payload, closure on `recv` is a plain
//!   `None`
//!
//! ## Structural modes
//!
//! The sender/receiver cardinalities `(S, R)` select one of four modes
//! (see [`State`]): `1×1` behaves like an unbuffered channel, `1×M`
//! fans one value out to all receivers, `N×1` delivers a merged value
//! to the receiver, and `N×M` fans the merged value out to everyone.
//! Within one `(sender, receiver)` name pair rendezvous are FIFO;
//! across different sender names no order is defined, which is why
//! `merge` must be commutative.
//!
//! ## Quick start
//!
//! ```rust
//! use plexus::{Counter, PlexusOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let plx = PlexusOptions::new()
//!     .name("totals")
//!     .senders(["alpha", "beta"])
//!     .receivers_count(1)
//!     .build();
//!
//! for (name, value) in [("alpha", 1), ("beta", 2)] {
//!     let plx = plx.clone();
//!     tokio::spawn(async move { plx.send(name, Counter(value)).await });
//! }
//!
//! // Both senders contribute to one rendezvous; the receiver observes
//! // the merged value.
//! assert_eq!(plx.recv("receiver_0").await, Some(Counter(3)));
//! # }
//! ```
//!
//! ## Features
//!
//! - **`async`** *(enabled by default)*: the engine itself. Requires
//!   `tokio`.
//! - **`derive`** *(enabled by default)*: `#[derive(Merge)]` for
//!   fieldwise merges of named and tuple structs.
//!
//! To use only the merge algebra without the engine:
//! ```toml
//! plexus = { version = "…", default-features = false }
//! ```

// The derive macro emits absolute `::plexus::Merge` paths; aliasing the
// crate to itself lets those resolve in our own tests too.
extern crate self as plexus;

pub mod merge;

#[cfg(feature = "async")]
mod done;
#[cfg(feature = "async")]
pub mod engine;
#[cfg(feature = "async")]
pub mod errors;
#[cfg(feature = "async")]
pub mod options;
#[cfg(feature = "async")]
mod queues;
#[cfg(feature = "async")]
mod slot;

pub use merge::Counter;
pub use merge::Max;
pub use merge::Merge;
pub use merge::MergeOf;
pub use merge::Min;

#[cfg(feature = "derive")]
pub use plexus_derive::Merge;

#[cfg(feature = "async")]
pub use engine::Plexus;
#[cfg(feature = "async")]
pub use engine::State;
#[cfg(feature = "async")]
pub use errors::PlexusError;
#[cfg(feature = "async")]
pub use options::PlexusOptions;
