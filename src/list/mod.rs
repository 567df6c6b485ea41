/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! A minimal persistent singly linked list.
//!
//! This is not part of the public collection surface; it exists purely as
//! the storage for HAMT collision buckets (`spec.md` §3.1's
//! `CollisionNode`), where entries sharing a hash are rare enough that a
//! list beats allocating another trie level.

use alloc::vec::Vec;
use archery::{SharedPointer, SharedPointerKind};
use core::fmt::Debug;

/// Creates a [`List`] containing the given arguments, sharing the tail of
/// the list that follows the first differing element with any other list
/// built the same way.
#[macro_export]
macro_rules! list {
    () => { $crate::list::List::new() };
    ($($e:expr),+ $(,)?) => {
        {
            let mut l = $crate::list::List::new();
            $(
                l = l.push_front($e);
            )*
            l
        }
    };
}

/// Like [`list!`] but builds a [`ListSync`].
#[macro_export]
macro_rules! list_sync {
    () => { $crate::list::List::new_sync() };
    ($($e:expr),+ $(,)?) => {
        {
            let mut l = $crate::list::List::new_sync();
            $(
                l = l.push_front($e);
            )*
            l
        }
    };
}

#[derive(Debug)]
pub struct List<T, P = archery::RcK>
where
    P: SharedPointerKind,
{
    head: Link<T, P>,
    len: usize,
}

pub type ListSync<T> = List<T, archery::ArcK>;

type Link<T, P> = Option<SharedPointer<Node<T, P>, P>>;

#[derive(Debug)]
struct Node<T, P: SharedPointerKind> {
    value: SharedPointer<T, P>,
    next: Link<T, P>,
}

impl<T> List<T, archery::RcK> {
    #[must_use]
    pub fn new() -> List<T, archery::RcK> {
        List { head: None, len: 0 }
    }
}

impl<T> ListSync<T> {
    #[must_use]
    pub fn new_sync() -> ListSync<T> {
        List { head: None, len: 0 }
    }
}

impl<T, P> List<T, P>
where
    P: SharedPointerKind,
{
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.head.as_ref().map(|node| node.value.as_ref())
    }

    #[must_use]
    pub fn push_front(&self, value: T) -> List<T, P> {
        let new_node = Node { value: SharedPointer::new(value), next: self.head.clone() };

        List { head: Some(SharedPointer::new(new_node)), len: self.len + 1 }
    }

    pub fn push_front_mut(&mut self, value: T) {
        let new_node = Node { value: SharedPointer::new(value), next: self.head.take() };

        self.head = Some(SharedPointer::new(new_node));
        self.len += 1;
    }

    /// Drops the first element, returning the tail. Panics if the list is
    /// empty.
    #[must_use]
    pub fn drop_first(&self) -> List<T, P> {
        let next = self.head.as_ref().expect("cannot drop first of an empty list").next.clone();

        List { head: next, len: self.len - 1 }
    }

    pub fn drop_first_mut(&mut self) {
        let node = self.head.take().expect("cannot drop first of an empty list");

        self.head = node.next.clone();
        self.len -= 1;
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, P> {
        Iter { next: self.head.as_deref() }
    }
}

impl<T, P> Default for List<T, P>
where
    P: SharedPointerKind,
{
    fn default() -> List<T, P> {
        List { head: None, len: 0 }
    }
}

impl<T, P> Clone for List<T, P>
where
    P: SharedPointerKind,
{
    fn clone(&self) -> List<T, P> {
        List { head: self.head.clone(), len: self.len }
    }
}

impl<T: PartialEq, P> PartialEq for List<T, P>
where
    P: SharedPointerKind,
{
    fn eq(&self, other: &List<T, P>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, P> Eq for List<T, P> where P: SharedPointerKind {}

impl<T, P> FromIterator<T> for List<T, P>
where
    P: SharedPointerKind,
{
    fn from_iter<I: IntoIterator<Item = T>>(into_iter: I) -> List<T, P> {
        let items: Vec<T> = into_iter.into_iter().collect();
        let mut list = List::default();

        for item in items.into_iter().rev() {
            list.push_front_mut(item);
        }

        list
    }
}

#[derive(Debug)]
pub struct Iter<'a, T, P: SharedPointerKind> {
    next: Option<&'a Node<T, P>>,
}

impl<'a, T, P: SharedPointerKind> Iterator for Iter<'a, T, P> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            node.value.as_ref()
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_front_and_iterate() {
        let l: List<i32> = list![3, 2, 1];
        let collected: Vec<&i32> = l.iter().collect();

        assert_eq!(collected, vec![&1, &2, &3]);
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn drop_first_shares_tail() {
        let l: List<i32> = list![2, 1];
        let tail = l.drop_first();

        assert_eq!(tail.first(), Some(&2));
        assert_eq!(tail.len(), 1);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn push_front_mut_and_drop_first_mut() {
        let mut l: List<i32> = List::new();

        l.push_front_mut(1);
        l.push_front_mut(2);
        assert_eq!(l.first(), Some(&2));

        l.drop_first_mut();
        assert_eq!(l.first(), Some(&1));
        assert_eq!(l.len(), 1);
    }
}
