/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The value cell (C1): an opaque holder for a key/value pair.
//!
//! Every map engine stores entries behind a `SharedPointer<Entry<K, V>, P>`
//! rather than inline, so that moving an entry between nodes during path
//! copying (HAMT) or rotation (red-black tree) is a refcount bump, not a
//! clone of `K`/`V`.

#[derive(Debug, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub fn new(key: K, value: V) -> Entry<K, V> {
        Entry { key, value }
    }
}

impl<K: Clone, V: Clone> Clone for Entry<K, V> {
    fn clone(&self) -> Entry<K, V> {
        Entry { key: self.key.clone(), value: self.value.clone() }
    }
}
