// Path: crates/api/src/state/mod.rs
//! Core traits for state management.
//!
//! This module defines the interfaces the oracle service uses to interact with the
//! chain's key-value store:
//! - `StateAccess`: For basic key-value store operations.
//! - `StateAccessExt`: Typed, canonically-encoded reads and writes on top of it.
//! - `StateOverlay`: A copy-on-write layer giving a service call all-or-nothing semantics.

use oracle_types::error::StateError;
use std::sync::Arc;

// --- Type Aliases for common state patterns ---
/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state, using cheap-to-clone Arcs.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs from the state, in ascending key order.
/// `Sync` is omitted as iterators are stateful.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;

// --- Module Structure ---

mod accessor;
mod overlay;

// --- Public Exports ---

pub use accessor::*;
pub use overlay::*;
