/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! `RedBlackTreeMap`: an ordered persistent map built on a left-leaning
//! red-black tree.
//!
//! # Implementation details
//!
//! The tree follows Sedgewick's left-leaning red-black (LLRB) discipline:
//! every red link leans left, which lets both insertion and deletion be
//! expressed as a small, uniform set of local transformations
//! (`rotate_left`, `rotate_right`, `flip_colors`) applied bottom-up as the
//! recursive call unwinds. Every call that descends into a subtree
//! rebuilds its own node on the way back out — new allocations only along
//! the search path, every untouched sibling subtree shared by a cheap
//! [`SharedPointer`] clone. This is path copying (`spec.md` §4.4) in its
//! purely-functional form: there is no explicit "clone if shared" check
//! because the recursive reconstruction never touches a node without
//! rebuilding it.
//!
//! # Invariants
//!
//! An LLRB tree is a red-black tree with the added constraint that every
//! red link is a left link, which keeps it a strict subset of the
//! red-black trees `spec.md` §3.2/invariant 9 describes:
//!
//!   1. The root is black.
//!   2. No red node has a red child (stronger here: no red *right* link
//!      exists at all).
//!   3. Every root-to-nil path carries the same number of black nodes.
//!   4. In-order traversal yields strictly increasing keys.

use crate::entry::Entry;
use crate::error::MapError;
use alloc::vec::Vec;
use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::Display;
use core::iter::FromIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    fn flip(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

type Link<K, V, P> = Option<SharedPointer<RbNode<K, V, P>, P>>;

#[derive(Debug)]
struct RbNode<K, V, P: SharedPointerKind> {
    color: Color,
    entry: SharedPointer<Entry<K, V>, P>,
    left: Link<K, V, P>,
    right: Link<K, V, P>,
}

impl<K, V, P: SharedPointerKind> Clone for RbNode<K, V, P> {
    fn clone(&self) -> RbNode<K, V, P> {
        RbNode {
            color: self.color,
            entry: self.entry.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

#[inline]
fn node<K, V, P: SharedPointerKind>(
    color: Color,
    entry: SharedPointer<Entry<K, V>, P>,
    left: Link<K, V, P>,
    right: Link<K, V, P>,
) -> SharedPointer<RbNode<K, V, P>, P> {
    SharedPointer::new(RbNode { color, entry, left, right })
}

#[inline]
fn is_red<K, V, P: SharedPointerKind>(link: &Link<K, V, P>) -> bool {
    matches!(link, Some(n) if n.color == Color::Red)
}

#[inline]
fn is_red_left_child<K, V, P: SharedPointerKind>(link: &Link<K, V, P>) -> bool {
    link.as_ref().map_or(false, |n| is_red(&n.left))
}

fn rotate_left<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    let x = h.right.as_ref().expect("rotate_left requires a red right child").clone();
    let new_h = node(Color::Red, h.entry.clone(), h.left.clone(), x.left.clone());

    node(x.color, x.entry.clone(), Some(new_h), x.right.clone())
}

fn rotate_right<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    let x = h.left.as_ref().expect("rotate_right requires a red left child").clone();
    let new_h = node(Color::Red, h.entry.clone(), x.right.clone(), h.right.clone());

    node(x.color, x.entry.clone(), x.left.clone(), Some(new_h))
}

fn flip_colors<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    let left = h.left.as_ref().expect("flip_colors requires two children");
    let right = h.right.as_ref().expect("flip_colors requires two children");
    let new_left = node(left.color.flip(), left.entry.clone(), left.left.clone(), left.right.clone());
    let new_right = node(right.color.flip(), right.entry.clone(), right.left.clone(), right.right.clone());

    node(h.color.flip(), h.entry.clone(), Some(new_left), Some(new_right))
}

/// The three local fix-up rules applied bottom-up after every structural
/// change: a lone right-leaning red is rotated left, a red-red pair
/// leaning left is rotated right, and a node with two red children has
/// its 4-node split by flipping colors.
fn fix_up<K, V, P: SharedPointerKind>(h: SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    let h = if is_red(&h.right) && !is_red(&h.left) { rotate_left(&h) } else { h };
    let h = if is_red(&h.left) && is_red_left_child(&h.left) { rotate_right(&h) } else { h };

    if is_red(&h.left) && is_red(&h.right) {
        flip_colors(&h)
    } else {
        h
    }
}

fn move_red_left<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    let h = flip_colors(h);
    let right = h.right.as_ref().expect("move_red_left requires a right child");

    if is_red_left_child(&right.left) {
        let new_right = rotate_right(right);
        let h2 = node(h.color, h.entry.clone(), h.left.clone(), Some(new_right));
        let h3 = rotate_left(&h2);

        flip_colors(&h3)
    } else {
        h
    }
}

fn move_red_right<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    let h = flip_colors(h);

    if is_red_left_child(&h.left) {
        flip_colors(&rotate_right(&h))
    } else {
        h
    }
}

fn min_entry<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<Entry<K, V>, P> {
    let mut cur = h;

    loop {
        match &cur.left {
            Some(l) => cur = l,
            None => return cur.entry.clone(),
        }
    }
}

fn delete_min<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> Link<K, V, P> {
    if h.left.is_none() {
        return None;
    }

    let h = if !is_red(&h.left) && !is_red_left_child(&h.left) { move_red_left(h) } else { h.clone() };

    let new_left = delete_min(h.left.as_ref().expect("move_red_left preserves a left child"));

    Some(fix_up(node(h.color, h.entry.clone(), new_left, h.right.clone())))
}

/// Inserts (or overwrites) `entry`, returning the new subtree and whether
/// the key was previously absent.
fn insert<K: Ord, V, P: SharedPointerKind>(
    h: &Link<K, V, P>,
    entry: SharedPointer<Entry<K, V>, P>,
) -> (SharedPointer<RbNode<K, V, P>, P>, bool) {
    match h {
        None => (node(Color::Red, entry, None, None), true),
        Some(n) => match entry.key.cmp(&n.entry.key) {
            Ordering::Less => {
                let (new_left, is_new) = insert(&n.left, entry);

                (fix_up(node(n.color, n.entry.clone(), Some(new_left), n.right.clone())), is_new)
            }
            Ordering::Greater => {
                let (new_right, is_new) = insert(&n.right, entry);

                (fix_up(node(n.color, n.entry.clone(), n.left.clone(), Some(new_right))), is_new)
            }
            Ordering::Equal => (node(n.color, entry, n.left.clone(), n.right.clone()), false),
        },
    }
}

/// Removes the key carried by `entry_key`, assuming it is present
/// (callers check `contains_key` first, mirroring Sedgewick's delete
/// which also assumes the key exists along the search path).
fn delete<K, Q: ?Sized, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>, key: &Q) -> Link<K, V, P>
where
    K: Borrow<Q>,
    Q: Ord,
{
    if key < h.entry.key.borrow() {
        let h = if !is_red(&h.left) && !is_red_left_child(&h.left) { move_red_left(h) } else { h.clone() };
        let new_left = delete(h.left.as_ref().expect("key known present on the left spine"), key);

        Some(fix_up(node(h.color, h.entry.clone(), new_left, h.right.clone())))
    } else {
        let h = if is_red(&h.left) { rotate_right(h) } else { h.clone() };

        if key == h.entry.key.borrow() && h.right.is_none() {
            return None;
        }

        let h = if !is_red(&h.right) && !is_red_left_child(&h.right) { move_red_right(&h) } else { h };

        if key == h.entry.key.borrow() {
            let successor = min_entry(h.right.as_ref().expect("two-child case has a right subtree"));
            let new_right = delete_min(h.right.as_ref().expect("two-child case has a right subtree"));

            Some(fix_up(node(h.color, successor, h.left.clone(), new_right)))
        } else {
            let new_right = delete(h.right.as_ref().expect("key known present on the right spine"), key);

            Some(fix_up(node(h.color, h.entry.clone(), h.left.clone(), new_right)))
        }
    }
}

fn blacken<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    if h.color == Color::Black {
        h.clone()
    } else {
        node(Color::Black, h.entry.clone(), h.left.clone(), h.right.clone())
    }
}

fn redden<K, V, P: SharedPointerKind>(h: &SharedPointer<RbNode<K, V, P>, P>) -> SharedPointer<RbNode<K, V, P>, P> {
    node(Color::Red, h.entry.clone(), h.left.clone(), h.right.clone())
}

fn count<K, V, P: SharedPointerKind>(h: &Link<K, V, P>) -> usize {
    match h {
        None => 0,
        Some(n) => 1 + count(&n.left) + count(&n.right),
    }
}

fn get<'a, K, Q: ?Sized, V, P: SharedPointerKind>(mut h: &'a Link<K, V, P>, key: &Q) -> Option<&'a SharedPointer<Entry<K, V>, P>>
where
    K: Borrow<Q>,
    Q: Ord,
{
    while let Some(n) = h {
        match key.cmp(n.entry.key.borrow()) {
            Ordering::Less => h = &n.left,
            Ordering::Greater => h = &n.right,
            Ordering::Equal => return Some(&n.entry),
        }
    }

    None
}

/// An ordered persistent map, backed by a left-leaning red-black tree.
///
/// # Complexity
///
/// | Operation | Complexity |
/// |---|---:|
/// | `new()` | Θ(1) |
/// | `get()` | Θ(log n) |
/// | `insert()` | Θ(log n) |
/// | `remove()` | Θ(log n) |
/// | `first()` / `last()` | Θ(log n) |
/// | `subseq()` | Θ(n) |
#[derive(Debug)]
pub struct RedBlackTreeMap<K, V, P = RcK>
where
    P: SharedPointerKind,
{
    root: Link<K, V, P>,
    size: usize,
}

/// A [`RedBlackTreeMap`] that implements `Send + Sync`.
pub type RedBlackTreeMapSync<K, V> = RedBlackTreeMap<K, V, ArcK>;

impl<K, V> RedBlackTreeMap<K, V> {
    #[must_use]
    pub fn new() -> RedBlackTreeMap<K, V> {
        RedBlackTreeMap { root: None, size: 0 }
    }
}

impl<K, V> Default for RedBlackTreeMap<K, V> {
    fn default() -> RedBlackTreeMap<K, V> {
        RedBlackTreeMap::new()
    }
}

impl<K, V> RedBlackTreeMapSync<K, V> {
    #[must_use]
    pub fn new_sync() -> RedBlackTreeMapSync<K, V> {
        RedBlackTreeMap { root: None, size: 0 }
    }
}

impl<K, V, P> RedBlackTreeMap<K, V, P>
where
    K: Ord,
    P: SharedPointerKind,
{
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

    #[must_use]
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        get(&self.root, key).map(|e| &e.value)
    }

    #[must_use]
    pub fn get_or<'a, Q: ?Sized>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.get(key).unwrap_or(default)
    }

    #[must_use]
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.get(key).is_some()
    }

    /// Like [`Self::get`], but reports a missing key as
    /// [`MapError::KeyNotFound`] instead of `None`.
    pub fn try_get<Q: ?Sized>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    pub fn insert_mut(&mut self, key: K, value: V) {
        let entry = SharedPointer::new(Entry::new(key, value));
        let (new_root, is_new) = insert(&self.root, entry);

        self.root = Some(blacken(&new_root));

        if is_new {
            self.size += 1;
        }
    }

    /// Returns a new map with `key` associated to `value`.
    ///
    /// If the map already maps `key` to a value equal to `value`, the
    /// exact same handle is returned (no new allocation).
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> RedBlackTreeMap<K, V, P>
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
        Q: Ord,
    {
        if !self.contains_key(key) {
            return false;
        }

        let root = self.root.as_ref().expect("contains_key implies a non-empty tree");
        let root = if !is_red(&root.left) && !is_red(&root.right) { redden(root) } else { root.clone() };

        self.root = delete(&root, key).map(|r| blacken(&r));
        self.size -= 1;

        true
    }

    /// Returns a new map with `key` removed.
    ///
    /// If `key` is absent, the exact same handle is returned.
    #[must_use]
    pub fn remove<Q: ?Sized>(&self, key: &Q) -> RedBlackTreeMap<K, V, P>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        let mut new_map = self.clone();

        if new_map.remove_mut(key) {
            new_map
        } else {
            self.clone()
        }
    }

    #[must_use]
    pub fn first(&self) -> Result<(&K, &V), MapError> {
        let mut cur = self.root.as_ref().ok_or(MapError::EmptyCollection)?;

        while let Some(l) = &cur.left {
            cur = l;
        }

        Ok((&cur.entry.key, &cur.entry.value))
    }

    #[must_use]
    pub fn last(&self) -> Result<(&K, &V), MapError> {
        let mut cur = self.root.as_ref().ok_or(MapError::EmptyCollection)?;

        while let Some(r) = &cur.right {
            cur = r;
        }

        Ok((&cur.entry.key, &cur.entry.value))
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(self.root.as_ref(), self.size)
    }

    #[must_use]
    pub fn iter_rev(&self) -> RevIter<'_, K, V, P> {
        RevIter::new(self.root.as_ref(), self.size)
    }

    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    #[must_use]
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    #[must_use]
    pub fn items_list(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Returns a new map containing exactly the entries with
    /// `lo <= key < hi` (half-open), built by filtered traversal
    /// (`spec.md` §4.4).
    #[must_use]
    pub fn subseq(&self, lo: &K, hi: &K) -> RedBlackTreeMap<K, V, P>
    where
        K: Clone,
        V: Clone,
    {
        let mut out = RedBlackTreeMap::<K, V, P> { root: None, size: 0 };

        for (k, v) in self.iter() {
            if lo <= k && k < hi {
                out.insert_mut(k.clone(), v.clone());
            }
        }

        out
    }

    /// Returns the same half-open `[lo, hi)` entries as [`Self::subseq`];
    /// per the resolved open question in `spec.md` §9 the returned
    /// collection itself remains forward-ordered — pair this with
    /// [`Self::iter_rev`] to consume it back to front.
    #[must_use]
    pub fn rsubseq(&self, lo: &K, hi: &K) -> RedBlackTreeMap<K, V, P>
    where
        K: Clone,
        V: Clone,
    {
        self.subseq(lo, hi)
    }

    /// Builds a map from a sequence of `(key, value)` pairs; when a key
    /// repeats, the later pair wins.
    #[must_use]
    pub fn from_sequence<I: IntoIterator<Item = (K, V)>>(seq: I) -> RedBlackTreeMap<K, V, P> {
        let mut map = RedBlackTreeMap::<K, V, P> { root: None, size: 0 };

        for (k, v) in seq {
            map.insert_mut(k, v);
        }

        map
    }
}

impl<K, Q: ?Sized, V, P> core::ops::Index<&Q> for RedBlackTreeMap<K, V, P>
where
    K: Ord + Borrow<Q>,
    Q: Ord,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, P> Clone for RedBlackTreeMap<K, V, P>
where
    P: SharedPointerKind,
{
    fn clone(&self) -> RedBlackTreeMap<K, V, P> {
        RedBlackTreeMap { root: self.root.clone(), size: self.size }
    }
}

impl<K: Ord, V: PartialEq, P, PO> PartialEq<RedBlackTreeMap<K, V, PO>> for RedBlackTreeMap<K, V, P>
where
    P: SharedPointerKind,
    PO: SharedPointerKind,
{
    fn eq(&self, other: &RedBlackTreeMap<K, V, PO>) -> bool {
        self.size() == other.size() && self.iter().eq(other.iter())
    }
}

impl<K: Ord, V: Eq, P> Eq for RedBlackTreeMap<K, V, P> where P: SharedPointerKind {}

impl<K: Ord, V: PartialOrd, P> PartialOrd for RedBlackTreeMap<K, V, P>
where
    P: SharedPointerKind,
{
    fn partial_cmp(&self, other: &RedBlackTreeMap<K, V, P>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, P> Ord for RedBlackTreeMap<K, V, P>
where
    P: SharedPointerKind,
{
    fn cmp(&self, other: &RedBlackTreeMap<K, V, P>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K, V, P> Display for RedBlackTreeMap<K, V, P>
where
    K: Ord + Display,
    V: Display,
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

impl<'a, K, V, P> IntoIterator for &'a RedBlackTreeMap<K, V, P>
where
    K: Ord,
    P: SharedPointerKind,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Iter<'a, K, V, P> {
        self.iter()
    }
}

impl<K, V, P> FromIterator<(K, V)> for RedBlackTreeMap<K, V, P>
where
    K: Ord,
    P: SharedPointerKind,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(into_iter: I) -> RedBlackTreeMap<K, V, P> {
        let mut map = RedBlackTreeMap::<K, V, P> { root: None, size: 0 };

        for (k, v) in into_iter {
            map.insert_mut(k, v);
        }

        map
    }
}

/// An in-order (ascending) iterator, implemented as an explicit stack of
/// the left spine — the standard constant-extra-space traversal for a
/// binary tree, and, like [`super::hash_trie_map::Iter`], borrowed from
/// `&'a RedBlackTreeMap` so a program that drops the map while the
/// iterator is still live is rejected at compile time.
#[derive(Debug)]
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    stack: Vec<&'a RbNode<K, V, P>>,
    remaining: usize,
}

impl<'a, K, V, P: SharedPointerKind> Iter<'a, K, V, P> {
    fn new(root: Option<&'a SharedPointer<RbNode<K, V, P>, P>>, size: usize) -> Iter<'a, K, V, P> {
        let mut stack = Vec::new();
        let mut cur = root.map(|r| &**r);

        while let Some(n) = cur {
            stack.push(n);
            cur = n.left.as_deref();
        }

        Iter { stack, remaining: size }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let n = self.stack.pop()?;
        let mut cur = n.right.as_deref();

        while let Some(child) = cur {
            self.stack.push(child);
            cur = child.left.as_deref();
        }

        self.remaining -= 1;

        Some((&n.entry.key, &n.entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// A descending iterator, mirroring [`Iter`] with left/right swapped —
/// the "reverse cursor" the resolved open question in `spec.md` §9
/// calls for (`rsubseq`/`iter_rev`).
#[derive(Debug)]
pub struct RevIter<'a, K, V, P: SharedPointerKind> {
    stack: Vec<&'a RbNode<K, V, P>>,
    remaining: usize,
}

impl<'a, K, V, P: SharedPointerKind> RevIter<'a, K, V, P> {
    fn new(root: Option<&'a SharedPointer<RbNode<K, V, P>, P>>, size: usize) -> RevIter<'a, K, V, P> {
        let mut stack = Vec::new();
        let mut cur = root.map(|r| &**r);

        while let Some(n) = cur {
            stack.push(n);
            cur = n.right.as_deref();
        }

        RevIter { stack, remaining: size }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for RevIter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let n = self.stack.pop()?;
        let mut cur = n.left.as_deref();

        while let Some(child) = cur {
            self.stack.push(child);
            cur = child.right.as_deref();
        }

        self.remaining -= 1;

        Some((&n.entry.key, &n.entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
pub(crate) fn black_height_if_valid<K, V, P: SharedPointerKind>(map: &RedBlackTreeMap<K, V, P>) -> Option<usize>
where
    K: Ord,
{
    fn check<K: Ord, V, P: SharedPointerKind>(link: &Link<K, V, P>) -> Option<usize> {
        match link {
            None => Some(0),
            Some(n) => {
                if n.color == Color::Red && (is_red(&n.left) || is_red(&n.right)) {
                    return None;
                }

                let left_height = check(&n.left)?;
                let right_height = check(&n.right)?;

                if left_height != right_height {
                    return None;
                }

                if let Some(l) = &n.left {
                    if l.entry.key >= n.entry.key {
                        return None;
                    }
                }
                if let Some(r) = &n.right {
                    if r.entry.key <= n.entry.key {
                        return None;
                    }
                }

                Some(left_height + if n.color == Color::Black { 1 } else { 0 })
            }
        }
    }

    if is_red(&map.root) {
        return None;
    }

    check(&map.root)
}

#[cfg(test)]
pub(crate) fn count_entries<K, V, P: SharedPointerKind>(map: &RedBlackTreeMap<K, V, P>) -> usize
where
    K: Ord,
{
    count(&map.root)
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::*;
    use ::serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use ::serde::ser::{Serialize, Serializer};
    use core::fmt;
    use core::marker::PhantomData;

    impl<K, V, P> Serialize for RedBlackTreeMap<K, V, P>
    where
        K: Ord + Serialize,
        V: Serialize,
        P: SharedPointerKind,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }

    impl<'de, K, V, P> Deserialize<'de> for RedBlackTreeMap<K, V, P>
    where
        K: Ord + Deserialize<'de>,
        V: Deserialize<'de>,
        P: SharedPointerKind,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<RedBlackTreeMap<K, V, P>, D::Error> {
            deserializer.deserialize_map(RedBlackTreeMapVisitor { _marker: PhantomData })
        }
    }

    struct RedBlackTreeMapVisitor<K, V, P> {
        _marker: PhantomData<(K, V, P)>,
    }

    impl<'de, K, V, P> Visitor<'de> for RedBlackTreeMapVisitor<K, V, P>
    where
        K: Ord + Deserialize<'de>,
        V: Deserialize<'de>,
        P: SharedPointerKind,
    {
        type Value = RedBlackTreeMap<K, V, P>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RedBlackTreeMap<K, V, P>, A::Error> {
            let mut result = RedBlackTreeMap::<K, V, P> { root: None, size: 0 };

            while let Some((k, v)) = map.next_entry()? {
                result.insert_mut(k, v);
            }

            Ok(result)
        }
    }
}

#[cfg(test)]
mod test;
