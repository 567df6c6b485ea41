/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! `HashTrieSet`: an unordered persistent set.
//!
//! A thin wrapper over [`HashTrieMap`], mapping every element to the
//! zero-sized `()` sentinel (`spec.md` §3.1: "a single interned 'present'
//! sentinel" — a unit struct costs nothing to store, where the source's
//! dynamically-typed host needed an actual interned object). Every
//! operation delegates to the underlying map; set algebra is expressed in
//! terms of the map's `merge`/traversal (`spec.md` §4.6).

use crate::map::hash_trie_map::{self, HashTrieMap};
use crate::utils::DefaultBuildHasher;
use alloc::vec::Vec;
use archery::{ArcK, RcK, SharedPointerKind};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FromIterator;

/// An unordered persistent set, backed by a hash array mapped trie.
///
/// # Complexity
///
/// | Operation | Average | Worst case |
/// |---|---:|---:|
/// | `new()` | Θ(1) | Θ(1) |
/// | `contains()` | Θ(1) | Θ(log n) |
/// | `insert()` | Θ(1) | Θ(log n) |
/// | `remove()` | Θ(1) | Θ(log n) |
/// | `size()` | Θ(1) | Θ(1) |
/// | `union()`/`intersection()`/`difference()` | Θ(n) | Θ(n) |
#[derive(Debug)]
pub struct HashTrieSet<T, P = RcK, H: BuildHasher = DefaultBuildHasher>
where
    P: SharedPointerKind,
{
    map: HashTrieMap<T, (), P, H>,
}

/// A [`HashTrieSet`] that implements `Send + Sync`.
pub type HashTrieSetSync<T, H = DefaultBuildHasher> = HashTrieSet<T, ArcK, H>;

impl<T> HashTrieSet<T, RcK>
where
    T: Eq + Hash,
{
    #[must_use]
    pub fn new() -> HashTrieSet<T> {
        HashTrieSet { map: HashTrieMap::new() }
    }
}

impl<T> Default for HashTrieSet<T>
where
    T: Eq + Hash,
{
    fn default() -> HashTrieSet<T> {
        HashTrieSet::new()
    }
}

impl<T> HashTrieSetSync<T>
where
    T: Eq + Hash,
{
    #[must_use]
    pub fn new_sync() -> HashTrieSetSync<T> {
        HashTrieSet { map: HashTrieMap::new_with_hasher(DefaultBuildHasher::default()) }
    }
}

impl<T, P, H: BuildHasher> HashTrieSet<T, P, H>
where
    T: Eq + Hash,
    H: Clone,
    P: SharedPointerKind,
{
    #[must_use]
    pub fn new_with_hasher(hasher_builder: H) -> HashTrieSet<T, P, H> {
        HashTrieSet { map: HashTrieMap::new_with_hasher(hasher_builder) }
    }

    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.map.size()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.map.size()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn contains<Q: ?Sized>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.map.contains_key(value)
    }

    pub fn insert_mut(&mut self, value: T) {
        self.map.insert_mut(value, ());
    }

    /// Returns a new set with `value` added.
    ///
    /// If `value` is already a member, the exact same handle is returned.
    #[must_use]
    pub fn insert(&self, value: T) -> HashTrieSet<T, P, H> {
        if self.map.contains_key(&value) {
            return self.clone();
        }

        let mut new_set = self.clone();

        new_set.insert_mut(value);

        new_set
    }

    pub fn remove_mut<Q: ?Sized>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.map.remove_mut(value)
    }

    /// Returns a new set with `value` removed.
    ///
    /// If `value` is absent, the exact same handle is returned.
    #[must_use]
    pub fn remove<Q: ?Sized>(&self, value: &Q) -> HashTrieSet<T, P, H>
    where
        T: Borrow<Q>,
        Q: Hash + Eq,
    {
        let mut new_set = self.clone();

        if new_set.remove_mut(value) {
            new_set
        } else {
            self.clone()
        }
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, P> {
        Iter { inner: self.map.iter() }
    }

    #[must_use]
    pub fn items_list(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.map.keys().cloned().collect()
    }

    fn collect_other<I: IntoIterator<Item = T>>(&self, other: I) -> HashTrieSet<T, P, H> {
        let mut set = HashTrieSet::<T, P, H>::new_with_hasher(self.map_hasher());

        for value in other {
            set.insert_mut(value);
        }

        set
    }

    fn map_hasher(&self) -> H {
        self.map.hasher_builder().clone()
    }

    /// Returns a new set containing every element of `self` and `other`.
    #[must_use]
    pub fn union<I: IntoIterator<Item = T>>(&self, other: I) -> HashTrieSet<T, P, H>
    where
        T: Clone,
    {
        let other_set = self.collect_other(other);

        HashTrieSet { map: self.map.merge(&other_set.map) }
    }

    /// Returns a new set containing only elements present in both `self`
    /// and `other`.
    #[must_use]
    pub fn intersection<I: IntoIterator<Item = T>>(&self, other: I) -> HashTrieSet<T, P, H>
    where
        T: Clone,
    {
        let other_set = self.collect_other(other);
        let mut result = HashTrieSet::<T, P, H>::new_with_hasher(self.map_hasher());

        for value in self.iter() {
            if other_set.contains(value) {
                result.insert_mut(value.clone());
            }
        }

        result
    }

    /// Returns a new set containing elements of `self` that are not in
    /// `other`.
    #[must_use]
    pub fn difference<I: IntoIterator<Item = T>>(&self, other: I) -> HashTrieSet<T, P, H>
    where
        T: Clone,
    {
        let other_set = self.collect_other(other);
        let mut result = HashTrieSet::<T, P, H>::new_with_hasher(self.map_hasher());

        for value in self.iter() {
            if !other_set.contains(value) {
                result.insert_mut(value.clone());
            }
        }

        result
    }

    /// Returns a new set containing elements in exactly one of `self` and
    /// `other`.
    #[must_use]
    pub fn symmetric_difference<I: IntoIterator<Item = T>>(&self, other: I) -> HashTrieSet<T, P, H>
    where
        T: Clone,
    {
        let other_set = self.collect_other(other);
        let mut result = HashTrieSet::<T, P, H>::new_with_hasher(self.map_hasher());

        for value in self.iter() {
            if !other_set.contains(value) {
                result.insert_mut(value.clone());
            }
        }

        for value in other_set.iter() {
            if !self.contains(value) {
                result.insert_mut(value.clone());
            }
        }

        result
    }

    #[must_use]
    pub fn is_subset(&self, other: &HashTrieSet<T, P, H>) -> bool {
        self.size() <= other.size() && self.iter().all(|v| other.contains(v))
    }

    #[must_use]
    pub fn is_superset(&self, other: &HashTrieSet<T, P, H>) -> bool {
        other.is_subset(self)
    }

    #[must_use]
    pub fn is_disjoint(&self, other: &HashTrieSet<T, P, H>) -> bool {
        self.iter().all(|v| !other.contains(v))
    }

    /// Builds a set from a sequence of elements; duplicates collapse.
    #[must_use]
    pub fn from_sequence<I: IntoIterator<Item = T>>(seq: I) -> HashTrieSet<T, P, H>
    where
        H: Default,
    {
        let mut set = HashTrieSet::<T, P, H>::new_with_hasher(H::default());

        for value in seq {
            set.insert_mut(value);
        }

        set
    }
}

impl<T, P, H: BuildHasher> Clone for HashTrieSet<T, P, H>
where
    T: Eq + Hash,
    H: Clone,
    P: SharedPointerKind,
{
    fn clone(&self) -> HashTrieSet<T, P, H> {
        HashTrieSet { map: self.map.clone() }
    }
}

impl<T: Eq, P, PO, H: BuildHasher> PartialEq<HashTrieSet<T, PO, H>> for HashTrieSet<T, P, H>
where
    T: Hash,
    H: Clone,
    P: SharedPointerKind,
    PO: SharedPointerKind,
{
    fn eq(&self, other: &HashTrieSet<T, PO, H>) -> bool {
        self.size() == other.size() && self.iter().all(|v| other.contains(v))
    }
}

impl<T: Eq, P, H: BuildHasher> Eq for HashTrieSet<T, P, H>
where
    T: Hash,
    H: Clone,
    P: SharedPointerKind,
{
}

/// Subset/superset comparison (`spec.md` §6: `<`, `≤`, `≥`, `>` on sets).
/// Two sets that are neither equal nor one a strict subset of the other
/// compare as [`None`], matching the partial order subset-inclusion
/// actually forms.
impl<T: Eq, P, H: BuildHasher> PartialOrd for HashTrieSet<T, P, H>
where
    T: Hash,
    H: Clone,
    P: SharedPointerKind,
{
    fn partial_cmp(&self, other: &HashTrieSet<T, P, H>) -> Option<Ordering> {
        if self.size() == other.size() {
            if self.iter().all(|v| other.contains(v)) {
                Some(Ordering::Equal)
            } else {
                None
            }
        } else if self.size() < other.size() {
            if self.iter().all(|v| other.contains(v)) {
                Some(Ordering::Less)
            } else {
                None
            }
        } else if other.iter().all(|v| self.contains(v)) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl<T, P, H: BuildHasher> Display for HashTrieSet<T, P, H>
where
    T: Eq + Hash + Display,
    H: Clone,
    P: SharedPointerKind,
{
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.write_str("{")?;

        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                fmt.write_str(", ")?;
            }
            v.fmt(fmt)?;
        }

        fmt.write_str("}")
    }
}

impl<'a, T, P, H: BuildHasher> IntoIterator for &'a HashTrieSet<T, P, H>
where
    T: Eq + Hash,
    H: Clone,
    P: SharedPointerKind,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P>;

    fn into_iter(self) -> Iter<'a, T, P> {
        self.iter()
    }
}

impl<T, P, H> FromIterator<T> for HashTrieSet<T, P, H>
where
    T: Eq + Hash,
    H: BuildHasher + Clone + Default,
    P: SharedPointerKind,
{
    fn from_iter<I: IntoIterator<Item = T>>(into_iter: I) -> HashTrieSet<T, P, H> {
        HashTrieSet::from_sequence(into_iter)
    }
}

impl<T, P, H: BuildHasher> core::ops::BitOr<&HashTrieSet<T, P, H>> for &HashTrieSet<T, P, H>
where
    T: Eq + Hash + Clone,
    H: Clone,
    P: SharedPointerKind,
{
    type Output = HashTrieSet<T, P, H>;

    fn bitor(self, rhs: &HashTrieSet<T, P, H>) -> HashTrieSet<T, P, H> {
        self.union(rhs.iter().cloned())
    }
}

impl<T, P, H: BuildHasher> core::ops::BitAnd<&HashTrieSet<T, P, H>> for &HashTrieSet<T, P, H>
where
    T: Eq + Hash + Clone,
    H: Clone,
    P: SharedPointerKind,
{
    type Output = HashTrieSet<T, P, H>;

    fn bitand(self, rhs: &HashTrieSet<T, P, H>) -> HashTrieSet<T, P, H> {
        self.intersection(rhs.iter().cloned())
    }
}

impl<T, P, H: BuildHasher> core::ops::Sub<&HashTrieSet<T, P, H>> for &HashTrieSet<T, P, H>
where
    T: Eq + Hash + Clone,
    H: Clone,
    P: SharedPointerKind,
{
    type Output = HashTrieSet<T, P, H>;

    fn sub(self, rhs: &HashTrieSet<T, P, H>) -> HashTrieSet<T, P, H> {
        self.difference(rhs.iter().cloned())
    }
}

impl<T, P, H: BuildHasher> core::ops::BitXor<&HashTrieSet<T, P, H>> for &HashTrieSet<T, P, H>
where
    T: Eq + Hash + Clone,
    H: Clone,
    P: SharedPointerKind,
{
    type Output = HashTrieSet<T, P, H>;

    fn bitxor(self, rhs: &HashTrieSet<T, P, H>) -> HashTrieSet<T, P, H> {
        self.symmetric_difference(rhs.iter().cloned())
    }
}

/// A lazy, root-retaining iterator over set elements (`spec.md` §4.7),
/// delegating straight to [`hash_trie_map::Iter`].
#[derive(Debug)]
pub struct Iter<'a, T, P: SharedPointerKind> {
    inner: hash_trie_map::Iter<'a, T, (), P>,
}

impl<'a, T, P: SharedPointerKind> Iterator for Iter<'a, T, P> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use ::serde::ser::{Serialize, Serializer};
    use core::fmt;
    use core::marker::PhantomData;

    impl<T, P, H> Serialize for HashTrieSet<T, P, H>
    where
        T: Eq + Hash + Serialize,
        H: BuildHasher + Clone,
        P: SharedPointerKind,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.iter())
        }
    }

    impl<'de, T, P, H> Deserialize<'de> for HashTrieSet<T, P, H>
    where
        T: Eq + Hash + Deserialize<'de>,
        H: BuildHasher + Clone + Default,
        P: SharedPointerKind,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<HashTrieSet<T, P, H>, D::Error> {
            deserializer.deserialize_seq(HashTrieSetVisitor { _marker: PhantomData })
        }
    }

    struct HashTrieSetVisitor<T, P, H> {
        _marker: PhantomData<(T, P, H)>,
    }

    impl<'de, T, P, H> Visitor<'de> for HashTrieSetVisitor<T, P, H>
    where
        T: Eq + Hash + Deserialize<'de>,
        H: BuildHasher + Clone + Default,
        P: SharedPointerKind,
    {
        type Value = HashTrieSet<T, P, H>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a sequence of elements")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<HashTrieSet<T, P, H>, A::Error> {
            let mut result = HashTrieSet::<T, P, H>::new_with_hasher(H::default());

            while let Some(value) = seq.next_element()? {
                result.insert_mut(value);
            }

            Ok(result)
        }
    }
}

#[cfg(test)]
mod test;
