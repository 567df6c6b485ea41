/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Persistent (fully immutable) collections with structural sharing.
//!
//! Every collection in this crate is immutable: every mutating method
//! returns a *new* handle, leaving the receiver and every other handle
//! that shares its structure completely unaffected. Two versions of a
//! collection that differ by one insertion share every subtree they did
//! not need to change — updating a million-entry map costs roughly
//! `O(log n)` allocations, not `O(n)`.
//!
//! # Collections
//!
//! - [`HashTrieMap`] — an unordered map backed by a hash array mapped
//!   trie (HAMT).
//! - [`ArrayMap`] — a linear-scan map capped at 8 entries, for small
//!   keyed records where hashing doesn't pay for itself.
//! - [`RedBlackTreeMap`] — an ordered map backed by a left-leaning
//!   red-black tree.
//! - [`HashTrieSet`] — an unordered set, built over [`HashTrieMap`].
//! - [`Vector`] — an indexed sequence backed by a 32-way trie with a
//!   writable tail buffer for O(1) amortized append.
//!
//! # Shared pointers
//!
//! Every collection is generic over the [`archery::SharedPointerKind`]
//! used to refcount its nodes: the default (bare type alias, e.g.
//! [`HashTrieMap`]) uses [`archery::RcK`] and is `!Sync`; the `*Sync`
//! alias (e.g. [`HashTrieMapSync`]) uses [`archery::ArcK`] and is
//! `Send + Sync` whenever its contents are. Pick `RcK` unless a
//! collection must cross a thread boundary — it avoids the cost of
//! atomic refcounting.
//!
//! # Features
//!
//! - `std` (default): enables `std::error::Error` impls for this
//!   crate's error enums and seeds the default hasher from
//!   `std::collections::hash_map::RandomState`. Without it the crate
//!   builds on `alloc` alone.
//! - `serde`: `Serialize`/`Deserialize` for every collection, through
//!   the host-neutral sequence form (a map's entry sequence, or a
//!   vector's/set's element sequence).
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "fatal-warnings", deny(warnings))]
#![allow(clippy::type_complexity)]

extern crate alloc;

pub mod list;
pub mod entry;
pub mod error;
pub mod map;
pub mod set;
pub mod utils;
pub mod vector;

pub use map::{ArrayMap, ArrayMapSync, HashTrieMap, HashTrieMapSync, RedBlackTreeMap, RedBlackTreeMapSync};
pub use set::{HashTrieSet, HashTrieSetSync};
pub use vector::{Vector, VectorSync};
