/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Map engines: an unordered hash trie map (C3), a small fixed-capacity
//! array map (C4), and an ordered red-black tree map (C5).

pub mod array_map;
pub mod hash_trie_map;
pub mod red_black_tree_map;

pub use array_map::{ArrayMap, ArrayMapSync};
pub use hash_trie_map::{HashTrieMap, HashTrieMapSync};
pub use red_black_tree_map::{RedBlackTreeMap, RedBlackTreeMapSync};
