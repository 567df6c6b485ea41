/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! `ArrayMap`: a fixed-capacity (8 entries) linear-scan map.
//!
//! For small keyed records — configuration options, record fields — a
//! linear scan over a handful of entries beats hashing: no hash
//! computation, and the whole entry list typically fits in a cache line
//! or two. Capacity is a hard ceiling, not a soft hint: an `assoc` that
//! would grow past 8 entries fails with [`SmallMapError::CapacityExceeded`]
//! rather than silently promoting to [`super::HashTrieMap`]. A caller that
//! chose `ArrayMap` is asserting a size bound; [`ArrayMap::promote`] is
//! offered for callers that want to lift that assertion explicitly.

use crate::entry::Entry;
use crate::error::{DeserializeError, MapError, SmallMapError};
use crate::map::hash_trie_map::HashTrieMap;
use alloc::vec::Vec;
use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};
use core::borrow::Borrow;
use core::fmt::Display;
use core::hash::Hash;
use core::iter::FromIterator;

/// The hard capacity of an [`ArrayMap`] (`spec.md` §3.1/§4.3).
pub const CAPACITY: usize = 8;

/// A persistent map specialized for at most [`CAPACITY`] entries.
#[derive(Debug)]
pub struct ArrayMap<K, V, P = RcK>
where
    P: SharedPointerKind,
{
    entries: SharedPointer<Vec<Entry<K, V>>, P>,
}

/// An [`ArrayMap`] that implements `Send + Sync`.
pub type ArrayMapSync<K, V> = ArrayMap<K, V, ArcK>;

impl<K, V> ArrayMap<K, V> {
    #[must_use]
    pub fn new() -> ArrayMap<K, V> {
        ArrayMap { entries: SharedPointer::new(Vec::new()) }
    }
}

impl<K, V> Default for ArrayMap<K, V> {
    fn default() -> ArrayMap<K, V> {
        ArrayMap::new()
    }
}

impl<K, V> ArrayMapSync<K, V> {
    #[must_use]
    pub fn new_sync() -> ArrayMapSync<K, V> {
        ArrayMap { entries: SharedPointer::new(Vec::new()) }
    }
}

impl<K, V, P> ArrayMap<K, V, P>
where
    K: Eq,
    P: SharedPointerKind,
{
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq,
    {
        self.entries.iter().find(|e| e.key.borrow() == key).map(|e| &e.value)
    }

    #[must_use]
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq,
    {
        self.get(key).is_some()
    }

    /// Like [`Self::get`], but reports a missing key as
    /// [`MapError::KeyNotFound`] instead of `None`.
    pub fn try_get<Q: ?Sized>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: Eq,
    {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    pub fn insert_mut(&mut self, key: K, value: V) -> Result<(), SmallMapError>
    where
        K: Clone,
        V: Clone,
    {
        let entries = SharedPointer::make_mut(&mut self.entries);

        if let Some(existing) = entries.iter_mut().find(|e| e.key == key) {
            existing.value = value;
            return Ok(());
        }

        if entries.len() >= CAPACITY {
            return Err(SmallMapError::CapacityExceeded);
        }

        entries.push(Entry::new(key, value));

        Ok(())
    }

    /// Returns a new map with `key` associated to `value`.
    ///
    /// If the map already maps `key` to a value equal to `value`, the
    /// exact same handle is returned (no new allocation).
    pub fn insert(&self, key: K, value: V) -> Result<ArrayMap<K, V, P>, SmallMapError>
    where
        K: Clone,
        V: Clone + PartialEq,
    {
        if self.get(&key).map_or(false, |existing| *existing == value) {
            return Ok(self.clone());
        }

        let mut new_map = self.clone();

        new_map.insert_mut(key, value)?;

        Ok(new_map)
    }

    pub fn remove_mut<Q: ?Sized>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q> + Clone,
        V: Clone,
        Q: Eq,
    {
        let entries = SharedPointer::make_mut(&mut self.entries);

        if let Some(idx) = entries.iter().position(|e| e.key.borrow() == key) {
            entries.remove(idx);
            true
        } else {
            false
        }
    }

    /// Returns a new map with `key` removed.
    ///
    /// If `key` is absent, the exact same handle is returned.
    #[must_use]
    pub fn remove<Q: ?Sized>(&self, key: &Q) -> ArrayMap<K, V, P>
    where
        K: Borrow<Q> + Clone,
        V: Clone,
        Q: Eq,
    {
        let mut new_map = self.clone();

        if new_map.remove_mut(key) {
            new_map
        } else {
            self.clone()
        }
    }

    /// Returns a new map containing every entry of `self` and `other`; on
    /// key overlap, `other`'s value wins. Fails if the union would exceed
    /// [`CAPACITY`].
    pub fn merge(&self, other: &ArrayMap<K, V, P>) -> Result<ArrayMap<K, V, P>, SmallMapError>
    where
        K: Clone,
        V: Clone,
    {
        let mut merged: Vec<Entry<K, V>> = self.entries.iter().cloned().collect();

        for other_entry in other.entries.iter() {
            match merged.iter_mut().find(|e| e.key == other_entry.key) {
                Some(existing) => existing.value = other_entry.value.clone(),
                None => {
                    if merged.len() >= CAPACITY {
                        return Err(SmallMapError::CapacityExceeded);
                    }
                    merged.push(other_entry.clone());
                }
            }
        }

        Ok(ArrayMap { entries: SharedPointer::new(merged) })
    }

    /// Builds an `ArrayMap` from a sequence of `(key, value)` pairs;
    /// fails if the sequence's distinct-key count exceeds [`CAPACITY`].
    pub fn from_sequence<I: IntoIterator<Item = (K, V)>>(seq: I) -> Result<ArrayMap<K, V, P>, SmallMapError>
    where
        K: Clone,
        V: Clone,
    {
        let mut map = ArrayMap::<K, V, P> { entries: SharedPointer::new(Vec::new()) };

        for (k, v) in seq {
            map.insert_mut(k, v)?;
        }

        Ok(map)
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { inner: self.entries.iter() }
    }

    #[must_use]
    pub fn items_list(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.entries.iter().map(|e| (e.key.clone(), e.value.clone())).collect()
    }

    /// Lifts this map into a [`HashTrieMap`], the natural destination once
    /// a caller no longer wants the 8-entry ceiling (`spec.md` §9,
    /// "SmallMap promotion").
    #[must_use]
    pub fn promote(&self) -> HashTrieMap<K, V>
    where
        K: Clone + Hash,
        V: Clone,
    {
        let mut map = HashTrieMap::new();

        for entry in self.entries.iter() {
            map.insert_mut(entry.key.clone(), entry.value.clone());
        }

        map
    }
}

impl<K, Q: ?Sized, V, P> core::ops::Index<&Q> for ArrayMap<K, V, P>
where
    K: Eq + Borrow<Q>,
    Q: Eq,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, P> Clone for ArrayMap<K, V, P>
where
    P: SharedPointerKind,
{
    fn clone(&self) -> ArrayMap<K, V, P> {
        ArrayMap { entries: SharedPointer::clone(&self.entries) }
    }
}

impl<K: Eq, V: PartialEq, P, PO> PartialEq<ArrayMap<K, V, PO>> for ArrayMap<K, V, P>
where
    P: SharedPointerKind,
    PO: SharedPointerKind,
{
    fn eq(&self, other: &ArrayMap<K, V, PO>) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|e| {
                other.entries.iter().any(|oe| oe.key == e.key && oe.value == e.value)
            })
    }
}

impl<K: Eq, V: Eq, P> Eq for ArrayMap<K, V, P> where P: SharedPointerKind {}

impl<K, V, P> Display for ArrayMap<K, V, P>
where
    K: Eq + Display,
    V: Display,
    P: SharedPointerKind,
{
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.write_str("{")?;

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                fmt.write_str(", ")?;
            }
            entry.key.fmt(fmt)?;
            fmt.write_str(": ")?;
            entry.value.fmt(fmt)?;
        }

        fmt.write_str("}")
    }
}

impl<'a, K, V, P> IntoIterator for &'a ArrayMap<K, V, P>
where
    P: SharedPointerKind,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[derive(Debug)]
pub struct Iter<'a, K, V> {
    inner: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> FromIterator<(K, V)> for ArrayMap<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    /// Builds an `ArrayMap` from a sequence of `(key, value)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if the sequence's distinct-key count exceeds [`CAPACITY`];
    /// use [`ArrayMap::from_sequence`] for a fallible equivalent.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(into_iter: I) -> ArrayMap<K, V> {
        ArrayMap::from_sequence(into_iter).expect("ArrayMap capacity (8 entries) exceeded")
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use ::serde::ser::{Serialize, Serializer};
    use core::fmt;
    use core::marker::PhantomData;

    impl<K, V, P> Serialize for ArrayMap<K, V, P>
    where
        K: Eq + Serialize,
        V: Serialize,
        P: SharedPointerKind,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }

    impl<'de, K, V, P> Deserialize<'de> for ArrayMap<K, V, P>
    where
        K: Eq + Clone + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
        P: SharedPointerKind,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ArrayMap<K, V, P>, D::Error> {
            deserializer.deserialize_map(ArrayMapVisitor { _marker: PhantomData })
        }
    }

    struct ArrayMapVisitor<K, V, P> {
        _marker: PhantomData<(K, V, P)>,
    }

    impl<'de, K, V, P> Visitor<'de> for ArrayMapVisitor<K, V, P>
    where
        K: Eq + Clone + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
        P: SharedPointerKind,
    {
        type Value = ArrayMap<K, V, P>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map of at most 8 entries")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ArrayMap<K, V, P>, A::Error> {
            let mut entries = Vec::new();

            while let Some((k, v)) = map.next_entry::<K, V>()? {
                entries.push((k, v));
            }

            ArrayMap::from_sequence(entries)
                .map_err(|_| ::serde::de::Error::custom(DeserializeError::MalformedInput))
        }
    }
}
