/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! `HashTrieMap`: an unordered persistent map built on a hash array mapped
//! trie (HAMT), bitmap-compressed at every branch.
//!
//! # Implementation details
//!
//! The trie is fixed at a 32-way fanout: every branch consumes 5 bits of a
//! 32-bit folded hash, so a lookup or insertion touches at most 7 branch
//! levels before the hash is exhausted and any further collision is
//! resolved by a linear-scan collision bucket (see [`HamtNode::Collision`]).
//!
//! A branch's occupied children are tracked with a 32-bit bitmap and
//! packed into a dense `Vec`; the packed index for hash-fragment `f` is
//! `popcount(bitmap & ((1 << f) - 1))`, so neither the bitmap nor the
//! array ever carries a hole for an absent child.
//!
//! # Invariants
//!
//!   1. The root is absent iff the map is empty; no empty branch node is
//!      ever allocated.
//!   2. A branch's slot holds either a single entry or a child branch —
//!      tagged, never inferred from a sentinel key.
//!   3. A collision bucket exists only once a key's hash is fully
//!      consumed (depth 7, i.e. `shift >= 32`), or earlier if two keys
//!      share a 32-bit folded hash.
//!   4. After a removal, a branch that would be left with a single entry
//!      child is collapsed: the entry is hoisted directly into the
//!      parent's slot, and hoisting propagates upward for as long as the
//!      parent itself ends up with a single entry.

use crate::entry::Entry;
use crate::error::MapError;
use crate::list::List;
use crate::utils::{fold_to_u32, replace, DefaultBuildHasher};
use alloc::vec::Vec;
use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};
use core::borrow::Borrow;
use core::fmt::Display;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;
use core::iter::FromIterator;

type HashValue = u32;

const HASH_BITS: u32 = 5;
const HASH_MASK: HashValue = (1 << HASH_BITS) - 1;
const HASH_TOTAL_BITS: u32 = 32;

#[inline]
fn hash_of<T: ?Sized + Hash, H: BuildHasher>(v: &T, hasher_builder: &H) -> HashValue {
    let mut hasher = hasher_builder.build_hasher();

    v.hash(&mut hasher);

    fold_to_u32(hasher.finish())
}

/// Returns the packed-array bit index for `hash` at trie depth `shift`
/// (a multiple of [`HASH_BITS`]), or `None` once the hash is exhausted.
#[inline]
fn fragment(hash: HashValue, shift: u32) -> Option<usize> {
    if shift >= HASH_TOTAL_BITS {
        None
    } else {
        Some(((hash >> shift) & HASH_MASK) as usize)
    }
}

#[derive(Debug)]
struct EntryWithHash<K, V, P: SharedPointerKind> {
    entry: SharedPointer<Entry<K, V>, P>,
    hash: HashValue,
}

impl<K, V, P: SharedPointerKind> EntryWithHash<K, V, P> {
    fn new(key: K, value: V, hash: HashValue) -> EntryWithHash<K, V, P> {
        EntryWithHash { entry: SharedPointer::new(Entry::new(key, value)), hash }
    }

    #[inline]
    fn key(&self) -> &K {
        &self.entry.key
    }

    #[inline]
    fn value(&self) -> &V {
        &self.entry.value
    }

    #[inline]
    fn matches<Q: ?Sized>(&self, key: &Q, hash: HashValue) -> bool
    where
        K: Borrow<Q>,
        Q: Eq,
    {
        self.hash == hash && self.key().borrow() == key
    }
}

impl<K, V, P: SharedPointerKind> Clone for EntryWithHash<K, V, P> {
    fn clone(&self) -> EntryWithHash<K, V, P> {
        EntryWithHash { entry: SharedPointer::clone(&self.entry), hash: self.hash }
    }
}

/// A tagged trie slot: either a live entry, or a pointer to a deeper
/// branch. Never a sentinel value in the key position (`spec.md` §9).
#[derive(Debug)]
enum Slot<K, V, P: SharedPointerKind> {
    Entry(EntryWithHash<K, V, P>),
    Child(SharedPointer<HamtNode<K, V, P>, P>),
}

impl<K, V, P: SharedPointerKind> Clone for Slot<K, V, P> {
    fn clone(&self) -> Slot<K, V, P> {
        match self {
            Slot::Entry(e) => Slot::Entry(e.clone()),
            Slot::Child(c) => Slot::Child(SharedPointer::clone(c)),
        }
    }
}

#[derive(Debug)]
enum HamtNode<K, V, P: SharedPointerKind> {
    Bitmap { bitmap: u32, slots: Vec<Slot<K, V, P>> },
    Collision { hash: HashValue, entries: List<EntryWithHash<K, V, P>, P> },
}

/// The outcome of removing a key from a subtree, used to implement the
/// hoisting invariant: a branch collapsing to one entry is reported to
/// its parent instead of being kept as a redundant one-child branch.
enum Removed<K, V, P: SharedPointerKind> {
    Absent,
    Changed,
    /// The subtree is now completely empty; the parent should drop the
    /// slot that pointed to it.
    Emptied,
    /// The subtree collapsed to a single entry, which the parent should
    /// splice directly into its own slot.
    Collapsed(EntryWithHash<K, V, P>),
}

impl<K, V, P> HamtNode<K, V, P>
where
    K: Eq + Hash,
    P: SharedPointerKind,
{
    fn singleton(entry: EntryWithHash<K, V, P>, shift: u32) -> HamtNode<K, V, P> {
        match fragment(entry.hash, shift) {
            Some(frag) => HamtNode::Bitmap { bitmap: 1 << frag, slots: alloc::vec![Slot::Entry(entry)] },
            None => {
                let hash = entry.hash;
                let mut entries = List::default();

                entries.push_front_mut(entry);

                HamtNode::Collision { hash, entries }
            }
        }
    }

    /// Builds the smallest subtree containing exactly `e1` and `e2`,
    /// descending levels until their hash fragments diverge (or the hash
    /// is exhausted, in which case a collision bucket is built).
    fn branch_of_two(
        shift: u32,
        e1: EntryWithHash<K, V, P>,
        e2: EntryWithHash<K, V, P>,
    ) -> HamtNode<K, V, P> {
        match (fragment(e1.hash, shift), fragment(e2.hash, shift)) {
            (None, None) => {
                let hash = e1.hash;
                let mut entries = List::default();

                entries.push_front_mut(e2);
                entries.push_front_mut(e1);

                HamtNode::Collision { hash, entries }
            }
            (Some(f1), Some(f2)) if f1 == f2 => {
                let child = HamtNode::branch_of_two(shift + HASH_BITS, e1, e2);

                HamtNode::Bitmap { bitmap: 1 << f1, slots: alloc::vec![Slot::Child(SharedPointer::new(child))] }
            }
            (Some(f1), Some(f2)) => {
                let (lo_frag, lo_entry, hi_frag, hi_entry) =
                    if f1 < f2 { (f1, e1, f2, e2) } else { (f2, e2, f1, e1) };

                HamtNode::Bitmap {
                    bitmap: (1 << lo_frag) | (1 << hi_frag),
                    slots: alloc::vec![Slot::Entry(lo_entry), Slot::Entry(hi_entry)],
                }
            }
            _ => unreachable!("a hash fragment cannot be exhausted on one side only"),
        }
    }

    #[must_use]
    fn get<Q: ?Sized>(&self, key: &Q, hash: HashValue, shift: u32) -> Option<&EntryWithHash<K, V, P>>
    where
        K: Borrow<Q>,
        Q: Eq,
    {
        match self {
            HamtNode::Bitmap { bitmap, slots } => {
                let frag = fragment(hash, shift).expect("branch node cannot exist past max depth");
                let bit = 1u32 << frag;

                if bitmap & bit == 0 {
                    return None;
                }

                let idx = (bitmap & (bit - 1)).count_ones() as usize;

                match &slots[idx] {
                    Slot::Entry(e) if e.matches(key, hash) => Some(e),
                    Slot::Entry(_) => None,
                    Slot::Child(child) => child.get(key, hash, shift + HASH_BITS),
                }
            }
            HamtNode::Collision { hash: node_hash, entries } => {
                if *node_hash != hash {
                    None
                } else {
                    entries.iter().find(|e| e.matches(key, hash))
                }
            }
        }
    }

    /// Returns `true` if `key` was new.
    fn insert(&mut self, entry: EntryWithHash<K, V, P>, shift: u32) -> bool {
        match self {
            HamtNode::Bitmap { bitmap, slots } => {
                let frag =
                    fragment(entry.hash, shift).expect("branch node cannot exist past max depth");
                let bit = 1u32 << frag;
                let idx = (*bitmap & (bit - 1)).count_ones() as usize;

                if *bitmap & bit == 0 {
                    slots.insert(idx, Slot::Entry(entry));
                    *bitmap |= bit;

                    true
                } else {
                    match &mut slots[idx] {
                        Slot::Child(child) => SharedPointer::make_mut(child).insert(entry, shift + HASH_BITS),
                        Slot::Entry(existing) if existing.matches(entry.key(), entry.hash) => {
                            replace(existing, entry);

                            false
                        }
                        Slot::Entry(existing) => {
                            let old = existing.clone();
                            let child = HamtNode::branch_of_two(shift + HASH_BITS, old, entry);

                            slots[idx] = Slot::Child(SharedPointer::new(child));

                            true
                        }
                    }
                }
            }
            HamtNode::Collision { hash: node_hash, entries } => {
                debug_assert_eq!(
                    *node_hash, entry.hash,
                    "a collision bucket only ever holds entries of its own hash"
                );

                list_replace_or_push(entries, entry)
            }
        }
    }

    /// Removes `key`, returning how the subtree changed (see [`Removed`]).
    fn remove<Q: ?Sized>(&mut self, key: &Q, hash: HashValue, shift: u32) -> Removed<K, V, P>
    where
        K: Borrow<Q>,
        Q: Eq,
    {
        match self {
            HamtNode::Bitmap { bitmap, slots } => {
                let frag = fragment(hash, shift).expect("branch node cannot exist past max depth");
                let bit = 1u32 << frag;

                if *bitmap & bit == 0 {
                    return Removed::Absent;
                }

                let idx = (*bitmap & (bit - 1)).count_ones() as usize;

                match &mut slots[idx] {
                    Slot::Entry(e) if e.matches(key, hash) => {
                        if slots.len() == 1 {
                            Removed::Emptied
                        } else {
                            slots.remove(idx);
                            *bitmap &= !bit;

                            collapse_if_single_entry(slots)
                        }
                    }
                    Slot::Entry(_) => Removed::Absent,
                    Slot::Child(child) => {
                        match SharedPointer::make_mut(child).remove(key, hash, shift + HASH_BITS) {
                            Removed::Absent => Removed::Absent,
                            Removed::Changed => Removed::Changed,
                            Removed::Emptied => {
                                if slots.len() == 1 {
                                    Removed::Emptied
                                } else {
                                    slots.remove(idx);
                                    *bitmap &= !bit;

                                    collapse_if_single_entry(slots)
                                }
                            }
                            Removed::Collapsed(hoisted) => {
                                slots[idx] = Slot::Entry(hoisted);

                                collapse_if_single_entry(slots)
                            }
                        }
                    }
                }
            }
            HamtNode::Collision { hash: node_hash, entries } => {
                if *node_hash != hash {
                    return Removed::Absent;
                }

                let removed = list_remove_first(entries, |e| e.key().borrow() == key);

                if !removed {
                    Removed::Absent
                } else {
                    match entries.len() {
                        0 => unreachable!("a collision bucket never holds fewer than two entries"),
                        1 => Removed::Collapsed(entries.first().unwrap().clone()),
                        _ => Removed::Changed,
                    }
                }
            }
        }
    }

    fn count(&self) -> usize {
        match self {
            HamtNode::Bitmap { slots, .. } => slots
                .iter()
                .map(|s| match s {
                    Slot::Entry(_) => 1,
                    Slot::Child(c) => c.count(),
                })
                .sum(),
            HamtNode::Collision { entries, .. } => entries.len(),
        }
    }

    /// Structural merge: values from `b` win on key overlap.
    fn merge(a: &HamtNode<K, V, P>, b: &HamtNode<K, V, P>, shift: u32) -> HamtNode<K, V, P>
    where
        V: Clone,
    {
        match (a, b) {
            (HamtNode::Bitmap { bitmap: ba, slots: sa }, HamtNode::Bitmap { bitmap: bb, slots: sb }) => {
                let union_bitmap = ba | bb;
                let mut slots = Vec::with_capacity(union_bitmap.count_ones() as usize);

                for frag in 0..32u32 {
                    let bit = 1u32 << frag;

                    if union_bitmap & bit == 0 {
                        continue;
                    }

                    let in_a = ba & bit != 0;
                    let in_b = bb & bit != 0;

                    let slot = match (in_a, in_b) {
                        (true, false) => sa[popcount_below(*ba, bit)].clone(),
                        (false, true) => sb[popcount_below(*bb, bit)].clone(),
                        (true, true) => merge_slot(
                            &sa[popcount_below(*ba, bit)],
                            &sb[popcount_below(*bb, bit)],
                            shift + HASH_BITS,
                        ),
                        (false, false) => unreachable!(),
                    };

                    slots.push(slot);
                }

                HamtNode::Bitmap { bitmap: union_bitmap, slots }
            }
            (HamtNode::Collision { hash, entries: ea }, HamtNode::Collision { entries: eb, .. }) => {
                let mut merged: Vec<EntryWithHash<K, V, P>> = ea.iter().cloned().collect();

                for be in eb.iter() {
                    merged.retain(|ae| ae.key() != be.key());
                    merged.push(be.clone());
                }

                let mut entries = List::default();

                for e in merged.into_iter().rev() {
                    entries.push_front_mut(e);
                }

                HamtNode::Collision { hash: *hash, entries }
            }
            _ => unreachable!("merge between mismatched node kinds at the same depth"),
        }
    }
}

#[inline]
fn popcount_below(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

fn merge_slot<K, V, P>(a: &Slot<K, V, P>, b: &Slot<K, V, P>, shift: u32) -> Slot<K, V, P>
where
    K: Eq + Hash,
    V: Clone,
    P: SharedPointerKind,
{
    match (a, b) {
        (Slot::Entry(ea), Slot::Entry(eb)) => {
            if ea.key() == eb.key() {
                Slot::Entry(eb.clone())
            } else {
                Slot::Child(SharedPointer::new(HamtNode::branch_of_two(shift, ea.clone(), eb.clone())))
            }
        }
        (Slot::Entry(ea), Slot::Child(cb)) => {
            let singleton = HamtNode::singleton(ea.clone(), shift);

            Slot::Child(SharedPointer::new(HamtNode::merge(&singleton, cb, shift)))
        }
        (Slot::Child(ca), Slot::Entry(eb)) => {
            let singleton = HamtNode::singleton(eb.clone(), shift);

            Slot::Child(SharedPointer::new(HamtNode::merge(ca, &singleton, shift)))
        }
        (Slot::Child(ca), Slot::Child(cb)) => Slot::Child(SharedPointer::new(HamtNode::merge(ca, cb, shift))),
    }
}

/// Collapses a branch that was just left with a single entry slot, so
/// hoisting propagates upward (`spec.md` §4.2/§9).
fn collapse_if_single_entry<K, V, P: SharedPointerKind>(slots: &mut Vec<Slot<K, V, P>>) -> Removed<K, V, P> {
    if slots.len() == 1 {
        if let Slot::Entry(_) = &slots[0] {
            let entry = match slots.pop().unwrap() {
                Slot::Entry(e) => e,
                Slot::Child(_) => unreachable!(),
            };

            return Removed::Collapsed(entry);
        }
    }

    Removed::Changed
}

fn list_replace_or_push<K, V, P>(list: &mut List<EntryWithHash<K, V, P>, P>, entry: EntryWithHash<K, V, P>) -> bool
where
    K: Eq,
    P: SharedPointerKind,
{
    let key_existed = list_remove_first(list, |e| e.key() == entry.key());

    list.push_front_mut(entry);

    !key_existed
}

/// Returns `true` if an element matching `predicate` was removed.
fn list_remove_first<T: Clone, P: SharedPointerKind, F: Fn(&T) -> bool>(
    list: &mut List<T, P>,
    predicate: F,
) -> bool {
    let mut before_needle: Vec<T> = Vec::with_capacity(list.len());
    let mut removed = false;

    while !list.is_empty() {
        let e: T = list.first().unwrap().clone();

        list.drop_first_mut();

        if predicate(&e) {
            removed = true;
            break;
        }

        before_needle.push(e);
    }

    while let Some(e) = before_needle.pop() {
        list.push_front_mut(e);
    }

    removed
}

/// An unordered persistent map, backed by a hash array mapped trie.
///
/// # Complexity
///
/// | Operation | Average | Worst case |
/// |---|---:|---:|
/// | `new()` | Θ(1) | Θ(1) |
/// | `get()` | Θ(1) | Θ(log n) |
/// | `insert()` | Θ(1) | Θ(log n) |
/// | `remove()` | Θ(1) | Θ(log n) |
/// | `size()` | Θ(1) | Θ(1) |
/// | `merge()` | Θ(n) | Θ(n) |
#[derive(Debug)]
pub struct HashTrieMap<K, V, P = RcK, H: BuildHasher = DefaultBuildHasher>
where
    P: SharedPointerKind,
{
    root: Option<SharedPointer<HamtNode<K, V, P>, P>>,
    size: usize,
    hasher_builder: H,
}

/// A [`HashTrieMap`] that implements `Send + Sync`.
pub type HashTrieMapSync<K, V, H = DefaultBuildHasher> = HashTrieMap<K, V, ArcK, H>;

impl<K, V> HashTrieMap<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn new() -> HashTrieMap<K, V> {
        HashTrieMap::new_with_hasher(DefaultBuildHasher::default())
    }
}

impl<K, V> Default for HashTrieMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> HashTrieMap<K, V> {
        HashTrieMap::new()
    }
}

impl<K, V> HashTrieMapSync<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub fn new_sync() -> HashTrieMapSync<K, V> {
        HashTrieMap::new_with_hasher(DefaultBuildHasher::default())
    }
}

impl<K, V, P, H: BuildHasher> HashTrieMap<K, V, P, H>
where
    K: Eq + Hash,
    H: Clone,
    P: SharedPointerKind,
{
    #[must_use]
    pub fn new_with_hasher(hasher_builder: H) -> HashTrieMap<K, V, P, H> {
        HashTrieMap { root: None, size: 0, hasher_builder }
    }

    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The hash builder backing this map, exposed so [`crate::set`] can
    /// build scratch maps that hash exactly the way this one does.
    #[must_use]
    #[inline]
    pub(crate) fn hasher_builder(&self) -> &H {
        &self.hasher_builder
    }

    #[must_use]
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let hash = hash_of(key, &self.hasher_builder);

        self.root.as_ref().and_then(|root| root.get(key, hash, 0)).map(EntryWithHash::value)
    }

    #[must_use]
    pub fn get_or<'a, Q: ?Sized>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.get(key).unwrap_or(default)
    }

    #[must_use]
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.get(key).is_some()
    }

    /// Like [`Self::get`], but reports a missing key as
    /// [`MapError::KeyNotFound`] instead of `None` — the fallible
    /// counterpart to indexing (`spec.md` §7) for callers that want a
    /// `Result` rather than a panic.
    pub fn try_get<Q: ?Sized>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    pub fn insert_mut(&mut self, key: K, value: V) {
        let hash = hash_of(&key, &self.hasher_builder);
        let entry = EntryWithHash::new(key, value, hash);

        match &mut self.root {
            Some(root) => {
                if SharedPointer::make_mut(root).insert(entry, 0) {
                    self.size += 1;
                }
            }
            None => {
                self.root = Some(SharedPointer::new(HamtNode::singleton(entry, 0)));
                self.size = 1;
            }
        }
    }

    /// Returns a new map with `key` associated to `value`.
    ///
    /// If the map already maps `key` to a value equal to `value`, the
    /// exact same handle is returned (no new allocation).
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> HashTrieMap<K, V, P, H>
    where
        V: PartialEq,
    {
        if self.get(&key).map_or(false, |existing| *existing == value) {
            return self.clone();
        }

        let mut new_map = self.clone();

        new_map.insert_mut(key, value);

        new_map
    }

    pub fn remove_mut<Q: ?Sized>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let hash = hash_of(key, &self.hasher_builder);

        let removed = match &mut self.root {
            Some(root) => match SharedPointer::make_mut(root).remove(key, hash, 0) {
                Removed::Absent => false,
                Removed::Changed => true,
                Removed::Emptied => {
                    self.root = None;
                    true
                }
                Removed::Collapsed(entry) => {
                    self.root = Some(SharedPointer::new(HamtNode::singleton(entry, 0)));
                    true
                }
            },
            None => false,
        };

        if removed {
            self.size -= 1;
        }

        removed
    }

    /// Returns a new map with `key` removed.
    ///
    /// If `key` is absent, the exact same handle is returned.
    #[must_use]
    pub fn remove<Q: ?Sized>(&self, key: &Q) -> HashTrieMap<K, V, P, H>
    where
        K: Borrow<Q>,
        Q: Hash + Eq,
    {
        let mut new_map = self.clone();

        if new_map.remove_mut(key) {
            new_map
        } else {
            self.clone()
        }
    }

    /// Returns a new map containing every entry of `self` and `other`; on
    /// key overlap, `other`'s value wins.
    #[must_use]
    pub fn merge(&self, other: &HashTrieMap<K, V, P, H>) -> HashTrieMap<K, V, P, H>
    where
        V: Clone,
    {
        let merged_root = match (&self.root, &other.root) {
            (None, r) => r.clone(),
            (r, None) => r.clone(),
            (Some(a), Some(b)) => Some(SharedPointer::new(HamtNode::merge(a, b, 0))),
        };

        let size = merged_root.as_ref().map_or(0, |r| r.count());

        HashTrieMap { root: merged_root, size, hasher_builder: self.hasher_builder.clone() }
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter { inner: IterPtr::new(self.root.as_deref()) }
    }

    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    #[must_use]
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Eagerly materializes every `(key, value)` pair into a `Vec`.
    ///
    /// Preferred over [`Self::iter`] for bulk consumers: a single internal
    /// traversal avoids the per-step iterator overhead, and the returned
    /// `Vec`'s length is always the map's true [`Self::size`] — never an
    /// approximation such as `len(a) + len(b)` after a [`Self::merge`].
    #[must_use]
    pub fn items_list(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut out = Vec::with_capacity(self.size);

        if let Some(root) = &self.root {
            for_each_node(root, &mut |k, v| out.push((k.clone(), v.clone())));
        }

        out
    }
}

fn for_each_node<'a, K, V, P: SharedPointerKind, F: FnMut(&'a K, &'a V)>(node: &'a HamtNode<K, V, P>, f: &mut F) {
    match node {
        HamtNode::Bitmap { slots, .. } => {
            for slot in slots {
                match slot {
                    Slot::Entry(e) => f(e.key(), e.value()),
                    Slot::Child(c) => for_each_node(c, f),
                }
            }
        }
        HamtNode::Collision { entries, .. } => {
            for e in entries.iter() {
                f(e.key(), e.value());
            }
        }
    }
}

impl<K, Q: ?Sized, V, P, H: BuildHasher> core::ops::Index<&Q> for HashTrieMap<K, V, P, H>
where
    K: Eq + Hash + Borrow<Q>,
    Q: Hash + Eq,
    H: Clone,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, P, H: BuildHasher> core::ops::BitOr<&HashTrieMap<K, V, P, H>> for &HashTrieMap<K, V, P, H>
where
    K: Eq + Hash,
    V: Clone,
    H: Clone,
    P: SharedPointerKind,
{
    type Output = HashTrieMap<K, V, P, H>;

    fn bitor(self, rhs: &HashTrieMap<K, V, P, H>) -> HashTrieMap<K, V, P, H> {
        self.merge(rhs)
    }
}

impl<K, V, P, H: BuildHasher> Clone for HashTrieMap<K, V, P, H>
where
    K: Eq + Hash,
    H: Clone,
    P: SharedPointerKind,
{
    fn clone(&self) -> HashTrieMap<K, V, P, H> {
        HashTrieMap { root: self.root.clone(), size: self.size, hasher_builder: self.hasher_builder.clone() }
    }
}

impl<K: Eq, V: PartialEq, P, PO, H: BuildHasher> PartialEq<HashTrieMap<K, V, PO, H>> for HashTrieMap<K, V, P, H>
where
    K: Hash,
    H: Clone,
    P: SharedPointerKind,
    PO: SharedPointerKind,
{
    fn eq(&self, other: &HashTrieMap<K, V, PO, H>) -> bool {
        self.size() == other.size()
            && self.iter().all(|(key, value)| other.get(key).map_or(false, |v| *value == *v))
    }
}

impl<K: Eq, V: Eq, P, H: BuildHasher> Eq for HashTrieMap<K, V, P, H>
where
    K: Hash,
    H: Clone,
    P: SharedPointerKind,
{
}

impl<K, V, P, H: BuildHasher> Display for HashTrieMap<K, V, P, H>
where
    K: Eq + Hash + Display,
    V: Display,
    H: Clone,
    P: SharedPointerKind,
{
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.write_str("{")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                fmt.write_str(", ")?;
            }
            k.fmt(fmt)?;
            fmt.write_str(": ")?;
            v.fmt(fmt)?;
        }

        fmt.write_str("}")
    }
}

impl<'a, K, V, P, H: BuildHasher> IntoIterator for &'a HashTrieMap<K, V, P, H>
where
    K: Eq + Hash,
    H: Clone,
    P: SharedPointerKind,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Iter<'a, K, V, P> {
        self.iter()
    }
}

impl<K, V, P, H> FromIterator<(K, V)> for HashTrieMap<K, V, P, H>
where
    K: Eq + Hash,
    H: BuildHasher + Clone + Default,
    P: SharedPointerKind,
{
    /// Builds a map from a sequence of `(key, value)` pairs; when a key
    /// repeats, the later pair wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(into_iter: I) -> HashTrieMap<K, V, P, H> {
        let mut map = HashTrieMap::new_with_hasher(H::default());

        for (k, v) in into_iter {
            map.insert_mut(k, v);
        }

        map
    }
}

/// A lazy, borrow-checked iterator over `(&K, &V)` pairs.
///
/// Because the iterator's lifetime is tied to `&'a HashTrieMap`, the
/// compiler refuses any program that would let the map be dropped while
/// the iterator is still alive — the class of dangling-root bugs a
/// non-borrow-checked host must guard against at runtime is a compile
/// error here instead. For an iterator fully decoupled from the map's
/// lifetime (e.g. to iterate over the un-named result of a `merge`),
/// use [`HashTrieMap::items_list`], which returns an owned `Vec`.
#[derive(Debug)]
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    inner: IterPtr<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|e| (e.key(), e.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[derive(Debug)]
struct IterPtr<'a, K, V, P: SharedPointerKind> {
    stack: Vec<IterFrame<'a, K, V, P>>,
    remaining: usize,
}

#[derive(Debug)]
enum IterFrame<'a, K, V, P: SharedPointerKind> {
    Bitmap(core::slice::Iter<'a, Slot<K, V, P>>),
    Collision(crate::list::Iter<'a, EntryWithHash<K, V, P>, P>),
}

impl<'a, K, V, P: SharedPointerKind> IterPtr<'a, K, V, P> {
    fn new(root: Option<&'a HamtNode<K, V, P>>) -> IterPtr<'a, K, V, P> {
        let mut stack = Vec::new();

        if let Some(node) = root {
            stack.push(IterPtr::frame_for(node));
        }

        IterPtr { stack, remaining: root.map_or(0, HamtNode::count) }
    }

    fn frame_for(node: &'a HamtNode<K, V, P>) -> IterFrame<'a, K, V, P> {
        match node {
            HamtNode::Bitmap { slots, .. } => IterFrame::Bitmap(slots.iter()),
            HamtNode::Collision { entries, .. } => IterFrame::Collision(entries.iter()),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for IterPtr<'a, K, V, P> {
    type Item = &'a EntryWithHash<K, V, P>;

    fn next(&mut self) -> Option<&'a EntryWithHash<K, V, P>> {
        loop {
            match self.stack.last_mut()? {
                IterFrame::Collision(iter) => {
                    if let Some(e) = iter.next() {
                        self.remaining -= 1;
                        return Some(e);
                    }
                    self.stack.pop();
                }
                IterFrame::Bitmap(iter) => match iter.next() {
                    Some(Slot::Entry(e)) => {
                        self.remaining -= 1;
                        return Some(e);
                    }
                    Some(Slot::Child(child)) => {
                        let frame = IterPtr::frame_for(child);
                        self.stack.push(frame);
                    }
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use ::serde::ser::{Serialize, Serializer};
    use core::fmt;
    use core::marker::PhantomData;

    impl<K, V, P, H> Serialize for HashTrieMap<K, V, P, H>
    where
        K: Eq + Hash + Serialize,
        V: Serialize,
        H: BuildHasher + Clone,
        P: SharedPointerKind,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }

    impl<'de, K, V, P, H> Deserialize<'de> for HashTrieMap<K, V, P, H>
    where
        K: Eq + Hash + Deserialize<'de>,
        V: Deserialize<'de>,
        H: BuildHasher + Clone + Default,
        P: SharedPointerKind,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<HashTrieMap<K, V, P, H>, D::Error> {
            deserializer.deserialize_map(HashTrieMapVisitor { _marker: PhantomData })
        }
    }

    struct HashTrieMapVisitor<K, V, P, H> {
        _marker: PhantomData<(K, V, P, H)>,
    }

    impl<'de, K, V, P, H> Visitor<'de> for HashTrieMapVisitor<K, V, P, H>
    where
        K: Eq + Hash + Deserialize<'de>,
        V: Deserialize<'de>,
        H: BuildHasher + Clone + Default,
        P: SharedPointerKind,
    {
        type Value = HashTrieMap<K, V, P, H>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<HashTrieMap<K, V, P, H>, A::Error> {
            let mut result = HashTrieMap::new_with_hasher(H::default());

            while let Some((k, v)) = map.next_entry()? {
                result.insert_mut(k, v);
            }

            Ok(result)
        }
    }
}

#[cfg(test)]
mod test;
