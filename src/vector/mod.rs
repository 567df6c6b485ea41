/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! `Vector`: an indexed, persistent sequence built on a radix-balanced
//! 32-way trie with a writable tail buffer.
//!
//! # Implementation details
//!
//! All values at index `< size - tail.len()` live in the trie; the last
//! `tail.len()` values (at most 32) live in `tail`, a plain `Vec` behind
//! a single `SharedPointer` so appends to a non-full tail are one COW
//! clone of a small vector rather than a trie descent (`spec.md` §4.5).
//!
//! The trie itself is a `VectorNode<T, P>` tree of `Branch`/`Leaf` nodes,
//! each child slot (and each leaf element) wrapped in its own
//! `SharedPointer<_, P>` so path copying during `set`/`push_back`/
//! `drop_last` never requires `T: Clone` — only the spine being
//! rewritten is cloned, exactly the discipline `hash_trie_map` and
//! `red_black_tree_map` already follow for their own node types.
//!
//! `shift` is the bit offset of the root: `0` when the root is itself a
//! leaf (or absent), and a multiple of 5 for every branch level above
//! that. Descending from the root, index `i` selects child `(i >> s) &
//! 31` at a node with shift `s`, down to `s == 0` where the leaf is
//! indexed by `i & 31`.
//!
//! # Invariants
//!
//! - `size - tail.len()` elements are reachable through `root`; `root`
//!   is `None` iff that count is zero.
//! - Every `Branch` below the root is fully path-copied on write; nodes
//!   outside the write path are shared with the previous version.
//! - `tail.len()` is always in `1..=32` for a non-empty vector (it is
//!   only empty for the canonical empty vector), matching the "last
//!   block is writable, everything else is immutable" design of the
//!   Clojure-style persistent vector this engine is modeled on.

use crate::error::VectorError;
use alloc::vec;
use alloc::vec::Vec;
use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};
use core::cmp::Ordering;
use core::fmt::Display;
use core::iter::FromIterator;

const BITS: u32 = 5;
const WIDTH: usize = 1 << BITS;
const MASK: usize = WIDTH - 1;

#[derive(Debug)]
enum VectorNode<T, P: SharedPointerKind> {
    Branch(Vec<Option<SharedPointer<VectorNode<T, P>, P>>>),
    Leaf(Vec<SharedPointer<T, P>>),
}

type Link<T, P> = SharedPointer<VectorNode<T, P>, P>;

fn new_path<T, P: SharedPointerKind>(level: u32, leaf: Link<T, P>) -> Link<T, P> {
    if level == 0 {
        leaf
    } else {
        let mut children = Vec::with_capacity(1);
        children.push(Some(new_path(level - BITS, leaf)));
        SharedPointer::new(VectorNode::Branch(children))
    }
}

fn push_tail<T, P: SharedPointerKind>(level: u32, node: &Link<T, P>, idx: usize, leaf: Link<T, P>) -> Link<T, P> {
    let sub_idx = (idx >> level) & MASK;

    match &**node {
        VectorNode::Leaf(_) => unreachable!("push_tail only descends through branch nodes"),
        VectorNode::Branch(children) => {
            let mut new_children = children.clone();

            while new_children.len() <= sub_idx {
                new_children.push(None);
            }

            new_children[sub_idx] = Some(if level == BITS {
                leaf
            } else {
                match &children.get(sub_idx).and_then(|c| c.clone()) {
                    Some(existing) => push_tail(level - BITS, existing, idx, leaf),
                    None => new_path(level - BITS, leaf),
                }
            });

            SharedPointer::new(VectorNode::Branch(new_children))
        }
    }
}

fn trie_get<T, P: SharedPointerKind>(level: u32, node: &Link<T, P>, idx: usize) -> &T {
    match &**node {
        VectorNode::Leaf(values) => &values[idx & MASK],
        VectorNode::Branch(children) => {
            let sub_idx = (idx >> level) & MASK;
            let child = children[sub_idx].as_ref().expect("index within bounds implies a populated child");

            trie_get(level - BITS, child, idx)
        }
    }
}

fn trie_get_shared<T, P: SharedPointerKind>(level: u32, node: &Link<T, P>, idx: usize) -> &SharedPointer<T, P> {
    match &**node {
        VectorNode::Leaf(values) => &values[idx & MASK],
        VectorNode::Branch(children) => {
            let sub_idx = (idx >> level) & MASK;
            let child = children[sub_idx].as_ref().expect("index within bounds implies a populated child");

            trie_get_shared(level - BITS, child, idx)
        }
    }
}

fn trie_set<T, P: SharedPointerKind>(level: u32, node: &Link<T, P>, idx: usize, value: SharedPointer<T, P>) -> Link<T, P> {
    match &**node {
        VectorNode::Leaf(values) => {
            let mut new_values = values.clone();

            new_values[idx & MASK] = value;

            SharedPointer::new(VectorNode::Leaf(new_values))
        }
        VectorNode::Branch(children) => {
            let sub_idx = (idx >> level) & MASK;
            let mut new_children = children.clone();
            let child = children[sub_idx].as_ref().expect("index within bounds implies a populated child");

            new_children[sub_idx] = Some(trie_set(level - BITS, child, idx, value));

            SharedPointer::new(VectorNode::Branch(new_children))
        }
    }
}

/// Removes the rightmost leaf from the subtree rooted at `node` (which
/// represents trie level `level`) and returns the surviving node (`None`
/// if the subtree is now empty) along with the removed leaf's values.
fn pop_tail<T, P: SharedPointerKind>(level: u32, node: &Link<T, P>, idx: usize) -> (Option<Link<T, P>>, Vec<SharedPointer<T, P>>) {
    match &**node {
        VectorNode::Leaf(_) => unreachable!("pop_tail only descends through branch nodes"),
        VectorNode::Branch(children) => {
            let sub_idx = (idx >> level) & MASK;

            if level == BITS {
                let popped = match children[sub_idx].as_ref().map(|c| &**c) {
                    Some(VectorNode::Leaf(values)) => values.clone(),
                    _ => unreachable!("leaf expected at the bottom branch level"),
                };

                if sub_idx == 0 {
                    (None, popped)
                } else {
                    let new_children = children[..sub_idx].to_vec();

                    (Some(SharedPointer::new(VectorNode::Branch(new_children))), popped)
                }
            } else {
                let child = children[sub_idx].as_ref().expect("index within bounds implies a populated child");
                let (new_child, popped) = pop_tail(level - BITS, child, idx);

                match new_child {
                    None if sub_idx == 0 => (None, popped),
                    None => {
                        let new_children = children[..sub_idx].to_vec();

                        (Some(SharedPointer::new(VectorNode::Branch(new_children))), popped)
                    }
                    Some(new_child) => {
                        let mut new_children = children.clone();

                        new_children[sub_idx] = Some(new_child);

                        (Some(SharedPointer::new(VectorNode::Branch(new_children))), popped)
                    }
                }
            }
        }
    }
}

fn collect_node<T: Clone, P: SharedPointerKind>(level: u32, node: &Link<T, P>, out: &mut Vec<T>) {
    match &**node {
        VectorNode::Leaf(values) => out.extend(values.iter().map(|v| (**v).clone())),
        VectorNode::Branch(children) => {
            for child in children.iter().flatten() {
                collect_node(level - BITS, child, out);
            }
        }
    }
}

/// A persistent, indexed sequence (`spec.md` §4.5, component C6).
#[derive(Debug)]
pub struct Vector<T, P = RcK>
where
    P: SharedPointerKind,
{
    root: Option<Link<T, P>>,
    tail: SharedPointer<Vec<SharedPointer<T, P>>, P>,
    size: usize,
    shift: u32,
}

/// A [`Vector`] whose refcounted nodes are `Send + Sync`.
pub type VectorSync<T> = Vector<T, ArcK>;

impl<T> Vector<T> {
    pub fn new() -> Self {
        Vector { root: None, tail: SharedPointer::new(Vec::new()), size: 0, shift: 0 }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Vector::new()
    }
}

impl<T> VectorSync<T> {
    pub fn new_sync() -> Self {
        Vector { root: None, tail: SharedPointer::new(Vec::new()), size: 0, shift: 0 }
    }
}

impl<T, P: SharedPointerKind> Vector<T, P> {
    fn trie_size(&self) -> usize {
        self.size - self.tail.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }

        let trie_size = self.trie_size();

        if index >= trie_size {
            Some(&*self.tail[index - trie_size])
        } else {
            Some(trie_get(self.shift, self.root.as_ref().expect("non-empty trie implies a root"), index))
        }
    }

    fn get_shared(&self, index: usize) -> Option<&SharedPointer<T, P>> {
        if index >= self.size {
            return None;
        }

        let trie_size = self.trie_size();

        if index >= trie_size {
            Some(&self.tail[index - trie_size])
        } else {
            Some(trie_get_shared(self.shift, self.root.as_ref().expect("non-empty trie implies a root"), index))
        }
    }

    pub fn first(&self) -> Result<&T, VectorError> {
        self.get(0).ok_or(VectorError::EmptyCollection)
    }

    pub fn last(&self) -> Result<&T, VectorError> {
        if self.size == 0 {
            Err(VectorError::EmptyCollection)
        } else {
            Ok(self.get(self.size - 1).expect("size - 1 is in range for a non-empty vector"))
        }
    }

    /// Negative-index-aware accessor (`spec.md` §4.5, "Indexing
    /// conventions"): `i` is normalized as `i + size` when negative, and
    /// a normalized index below zero or at/past `size` is out of range.
    pub fn nth(&self, i: i64) -> Result<&T, VectorError> {
        let normalized = if i < 0 { i + self.size as i64 } else { i };

        if normalized < 0 {
            return Err(VectorError::IndexOutOfRange);
        }

        self.get(normalized as usize).ok_or(VectorError::IndexOutOfRange)
    }

    /// Pushes a full tail into the trie as a new leaf, growing the root
    /// if necessary, and leaves `self.tail`/`self.size` untouched — the
    /// caller installs the new tail and bumps the size.
    fn push_full_tail_into_trie(&mut self) {
        let trie_size = self.trie_size();
        let leaf = SharedPointer::new(VectorNode::Leaf((**self.tail).clone()));
        let old_root = self.root.clone();

        self.root = Some(match old_root {
            None => leaf,
            Some(root) => {
                let capacity = 1usize << (self.shift + BITS);

                if trie_size >= capacity {
                    let mut children = Vec::with_capacity(2);

                    children.push(Some(root));
                    children.push(Some(new_path(self.shift, leaf)));
                    self.shift += BITS;

                    SharedPointer::new(VectorNode::Branch(children))
                } else {
                    push_tail(self.shift, &root, trie_size, leaf)
                }
            }
        });
    }

    pub fn push_back_mut(&mut self, value: T) {
        let value = SharedPointer::new(value);

        if self.tail.len() < WIDTH {
            SharedPointer::make_mut(&mut self.tail).push(value);
            self.size += 1;
            return;
        }

        self.push_full_tail_into_trie();
        self.tail = SharedPointer::new(vec![value]);
        self.size += 1;
    }

    pub fn push_back(&self, value: T) -> Vector<T, P>
    where
        T: Clone,
    {
        let mut new_vector = self.clone();

        new_vector.push_back_mut(value);
        new_vector
    }

    pub fn drop_last_mut(&mut self) -> Result<(), VectorError> {
        if self.size == 0 {
            return Err(VectorError::EmptyCollection);
        }

        if self.tail.len() > 1 {
            let mut new_tail = (**self.tail).clone();

            new_tail.pop();
            self.tail = SharedPointer::new(new_tail);
            self.size -= 1;
            return Ok(());
        }

        if self.size == 1 {
            self.root = None;
            self.tail = SharedPointer::new(Vec::new());
            self.size = 0;
            self.shift = 0;
            return Ok(());
        }

        if self.shift == 0 {
            let popped = match self.root.as_deref().expect("a size > 1 vector with a 1-element tail has a trie") {
                VectorNode::Leaf(values) => values.clone(),
                VectorNode::Branch(_) => unreachable!("shift == 0 implies the root is a leaf"),
            };

            self.root = None;
            self.tail = SharedPointer::new(popped);
            self.size -= 1;
            return Ok(());
        }

        let last_idx = self.trie_size() - 1;
        let root = self.root.as_ref().expect("shift > 0 implies a root");
        let (mut new_root, popped) = pop_tail(self.shift, root, last_idx);
        let mut new_shift = self.shift;

        loop {
            match new_root.as_ref().map(|n| &**n) {
                Some(VectorNode::Branch(children)) if new_shift >= BITS && children.len() == 1 => {
                    new_root = children[0].clone();
                    new_shift -= BITS;
                }
                _ => break,
            }
        }

        self.root = new_root;
        self.shift = if self.root.is_some() { new_shift } else { 0 };
        self.tail = SharedPointer::new(popped);
        self.size -= 1;

        Ok(())
    }

    pub fn drop_last(&self) -> Result<Vector<T, P>, VectorError>
    where
        T: Clone,
    {
        let mut new_vector = self.clone();

        new_vector.drop_last_mut()?;
        Ok(new_vector)
    }

    pub fn set_mut(&mut self, index: usize, value: T) -> Result<(), VectorError> {
        if index == self.size {
            self.push_back_mut(value);
            return Ok(());
        }

        if index > self.size {
            return Err(VectorError::IndexOutOfRange);
        }

        let value = SharedPointer::new(value);
        let trie_size = self.trie_size();

        if index >= trie_size {
            let mut new_tail = (**self.tail).clone();

            new_tail[index - trie_size] = value;
            self.tail = SharedPointer::new(new_tail);
        } else {
            let root = self.root.as_ref().expect("index within the trie implies a root");

            self.root = Some(trie_set(self.shift, root, index, value));
        }

        Ok(())
    }

    pub fn set(&self, index: usize, value: T) -> Result<Vector<T, P>, VectorError>
    where
        T: Clone,
    {
        let mut new_vector = self.clone();

        new_vector.set_mut(index, value)?;
        Ok(new_vector)
    }

    /// Returns a new vector holding the values at `[lo, hi)`
    /// (`spec.md` §4.5, "Slicing"). Copies element by element; no
    /// structural sharing across the slice boundary is attempted.
    pub fn slice(&self, lo: usize, hi: usize) -> Result<Vector<T, P>, VectorError> {
        if lo > hi || hi > self.size {
            return Err(VectorError::IndexOutOfRange);
        }

        let mut result = Vector::<T, P> { root: None, tail: SharedPointer::new(Vec::new()), size: 0, shift: 0 };

        for i in lo..hi {
            let shared = self.get_shared(i).expect("lo..hi is within bounds").clone();

            if result.tail.len() < WIDTH {
                SharedPointer::make_mut(&mut result.tail).push(shared);
                result.size += 1;
            } else {
                result.push_back_mut_shared(shared);
            }
        }

        Ok(result)
    }

    fn push_back_mut_shared(&mut self, value: SharedPointer<T, P>) {
        if self.tail.len() < WIDTH {
            SharedPointer::make_mut(&mut self.tail).push(value);
            self.size += 1;
            return;
        }

        self.push_full_tail_into_trie();
        self.tail = SharedPointer::new(vec![value]);
        self.size += 1;
    }

    pub fn iter(&self) -> Iter<'_, T, P> {
        Iter { vector: self, front: 0, back: self.size }
    }

    pub fn items_list(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.size);

        if let Some(root) = &self.root {
            collect_node(self.shift, root, &mut out);
        }

        out.extend(self.tail.iter().map(|v| (**v).clone()));
        out
    }

    pub fn from_sequence<I: IntoIterator<Item = T>>(seq: I) -> Vector<T, P> {
        let mut result = Vector::<T, P> { root: None, tail: SharedPointer::new(Vec::new()), size: 0, shift: 0 };

        for value in seq {
            result.push_back_mut(value);
        }

        result
    }
}

impl<T, P: SharedPointerKind> core::ops::Index<usize> for Vector<T, P> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("index out of range")
    }
}

impl<T, P: SharedPointerKind> Clone for Vector<T, P> {
    fn clone(&self) -> Vector<T, P> {
        Vector { root: self.root.clone(), tail: self.tail.clone(), size: self.size, shift: self.shift }
    }
}

impl<T: PartialEq, P: SharedPointerKind, PO: SharedPointerKind> PartialEq<Vector<T, PO>> for Vector<T, P> {
    fn eq(&self, other: &Vector<T, PO>) -> bool {
        self.size() == other.size() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, P: SharedPointerKind> Eq for Vector<T, P> {}

impl<T: PartialOrd, P: SharedPointerKind> PartialOrd for Vector<T, P> {
    fn partial_cmp(&self, other: &Vector<T, P>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, P: SharedPointerKind> Ord for Vector<T, P> {
    fn cmp(&self, other: &Vector<T, P>) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Display, P: SharedPointerKind> Display for Vector<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("[")?;

        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(value, f)?;
        }

        f.write_str("]")
    }
}

impl<'a, T, P: SharedPointerKind> IntoIterator for &'a Vector<T, P> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P>;

    fn into_iter(self) -> Iter<'a, T, P> {
        self.iter()
    }
}

impl<T, P: SharedPointerKind> FromIterator<T> for Vector<T, P> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Vector<T, P> {
        Vector::from_sequence(iter)
    }
}

/// A lazy, index-ascending iterator over a [`Vector`] (`spec.md` §4.7).
/// Borrows the vector for its own lifetime, which is what keeps an
/// unretained transient such as `lhs.push_back(x).iter()` alive for the
/// duration of the traversal.
pub struct Iter<'a, T, P: SharedPointerKind> {
    vector: &'a Vector<T, P>,
    front: usize,
    back: usize,
}

impl<'a, T, P: SharedPointerKind> Iterator for Iter<'a, T, P> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }

        let value = self.vector.get(self.front);
        self.front += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T, P: SharedPointerKind> DoubleEndedIterator for Iter<'a, T, P> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }

        self.back -= 1;
        self.vector.get(self.back)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    use super::Vector;
    use archery::SharedPointerKind;
    use core::marker::PhantomData;
    use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use serde::ser::{Serialize, Serializer};

    impl<T: Serialize, P: SharedPointerKind> Serialize for Vector<T, P> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.iter())
        }
    }

    struct VectorVisitor<T, P> {
        _phantom: PhantomData<(T, P)>,
    }

    impl<'de, T: Deserialize<'de>, P: SharedPointerKind> Visitor<'de> for VectorVisitor<T, P> {
        type Value = Vector<T, P>;

        fn expecting(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            formatter.write_str("a sequence of values")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut result = Vector::<T, P> { root: None, tail: SharedPointer::new(Vec::new()), size: 0, shift: 0 };

            while let Some(value) = seq.next_element()? {
                result.push_back_mut(value);
            }

            Ok(result)
        }
    }

    impl<'de, T: Deserialize<'de>, P: SharedPointerKind> Deserialize<'de> for Vector<T, P> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_seq(VectorVisitor { _phantom: PhantomData })
        }
    }
}

#[cfg(test)]
mod test;
