//! local-slice: reference-counted "local" state slices in a shared,
//! synchronous key-value store.
//!
//! Independent UI consumers share one global store, but each consumer
//! (or group of consumers keyed identically) owns an isolated slice of
//! it. The crate keys every consumer instance into the store, counts how
//! many live instances reference each key, and clears a key's slice at
//! the exact moment its last reference detaches, unless persistence was
//! requested.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the lifecycle invariants (count correctness, immutable
//!   folds, detach-time cleanup ordering) in small layers that can be
//!   reasoned about independently.
//! - Layers, leaves first:
//!   - reduce / SliceMap: pure fold of tagged actions into an immutable
//!     mapping; generations share untouched entries and no-op folds are
//!     reference-identical.
//!   - RefCounter: key -> positive count; zero-crossing return drives
//!     eviction. One table per binder configuration.
//!   - KeySpec / KeyAllocator: how an instance resolves its key (minted
//!     unique, fixed, or derived from its own properties).
//!   - Binder / Binding: the lifecycle state machine. Attach takes a
//!     reference, a re-key shifts it (new key first, then cleanup of the
//!     old), drop releases it and clears the slice at zero unless the
//!     binder persists.
//!   - Connected: decorator composition wiring a framework-driven
//!     mount/update/unmount contract to the binding, re-rendering the
//!     wrapped consumer through a user transform.
//!   - Store: reference synchronous store with named partitions and
//!     subscriber notification, for embeddings that do not bring their
//!     own.
//!
//! Constraints
//! - Single-threaded: `Rc`/`Cell`/`RefCell` throughout, `!Send`/`!Sync`
//!   by construction (no atomics). Calls interleave only at consumer
//!   lifecycle boundaries.
//! - The store mapping is mutated only through dispatched actions;
//!   nothing writes entries in place.
//! - The reference table is mutated only from lifecycle transitions,
//!   never from render.
//! - Misuse (double-detach, dispatch during a fold, foreign-typed reads)
//!   fails fast in debug builds and is absorbed in release builds; none
//!   of it is a user-facing error.
//!
//! Why this split?
//! - The reducer stays pure and trivially testable; every cleanup
//!   decision lives in one place (the binder's release path).
//! - The counter knows nothing about stores, so its invariant (present
//!   iff positive) is checkable in isolation.
//! - Key resolution is pure; only the binder turns a key change into a
//!   reference transition, so the increment-before-cleanup ordering has
//!   a single owner.
//!
//! Notes and non-goals
//! - Not a general state-management library: one mapping shape, one
//!   mutation (wholesale replacement), no middleware.
//! - No persistence engine and no serialization; a persisted slice just
//!   stays in the store indefinitely.
//! - Consumers never mutate the store directly; the only write path is
//!   the `SetLocal` handle captured per render.

mod action;
mod binder;
pub mod config;
mod consumer;
mod key;
mod reducer;
mod ref_counter;
mod store;

// Public surface
pub use action::{slice_value, Action, SliceMutation, SliceValue};
pub use binder::{BindOptions, Binder, Binding, SetLocal};
pub use consumer::{Connected, Consumer, Lifecycle};
pub use key::{KeyAllocator, KeySpec, SliceKey};
pub use reducer::{reduce, SliceMap};
pub use ref_counter::RefCounter;
pub use store::{Store, SubscriberId};
