/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The set façade (C7): an unordered set, built directly over
//! [`HashTrieMap`](crate::map::HashTrieMap) by mapping every element to a
//! zero-sized sentinel value.

pub mod hash_trie_set;

pub use hash_trie_set::{HashTrieSet, HashTrieSetSync};
