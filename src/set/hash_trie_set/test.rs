use super::*;
use alloc::vec;

#[test]
fn new_set_is_empty() {
    let set: HashTrieSet<i32> = HashTrieSet::new();

    assert_eq!(set.size(), 0);
    assert!(set.is_empty());
    assert!(!set.contains(&0));
}

#[test]
fn insert_then_contains() {
    let set = HashTrieSet::new().insert(1).insert(2).insert(3);

    assert_eq!(set.size(), 3);
    assert!(set.contains(&1));
    assert!(set.contains(&2));
    assert!(set.contains(&3));
    assert!(!set.contains(&4));
}

#[test]
fn insert_is_a_no_op_for_an_existing_member() {
    let set = HashTrieSet::new().insert(1);
    let set2 = set.insert(1);

    assert_eq!(set.size(), set2.size());
}

#[test]
fn remove_shrinks_the_set_and_is_idempotent() {
    let set = HashTrieSet::new().insert(1).insert(2);
    let removed = set.remove(&1);

    assert_eq!(removed.size(), 1);
    assert!(!removed.contains(&1));
    assert!(removed.contains(&2));

    let removed_again = removed.remove(&1);
    assert_eq!(removed_again.size(), 1);
}

#[test]
fn union_combines_both_sides_without_duplicating_overlap() {
    let a: HashTrieSet<i32> = (0..10).collect();
    let b: HashTrieSet<i32> = (5..15).collect();

    let u = a.union(b.iter().cloned());

    assert_eq!(u.size(), 15);
    for i in 0..15 {
        assert!(u.contains(&i));
    }
}

#[test]
fn intersection_keeps_only_shared_elements() {
    let a: HashTrieSet<i32> = (0..10).collect();
    let b: HashTrieSet<i32> = (5..15).collect();

    let i = a.intersection(b.iter().cloned());

    assert_eq!(i.size(), 5);
    for v in 5..10 {
        assert!(i.contains(&v));
    }
}

#[test]
fn difference_removes_elements_present_on_the_right() {
    let a: HashTrieSet<i32> = (0..10).collect();
    let b: HashTrieSet<i32> = (5..15).collect();

    let d = a.difference(b.iter().cloned());

    assert_eq!(d.size(), 5);
    for v in 0..5 {
        assert!(d.contains(&v));
    }
}

#[test]
fn symmetric_difference_keeps_elements_in_exactly_one_side() {
    let a: HashTrieSet<i32> = (0..10).collect();
    let b: HashTrieSet<i32> = (5..15).collect();

    let sd = a.symmetric_difference(b.iter().cloned());

    assert_eq!(sd.size(), 10);
    for v in 0..5 {
        assert!(sd.contains(&v));
    }
    for v in 10..15 {
        assert!(sd.contains(&v));
    }
    for v in 5..10 {
        assert!(!sd.contains(&v));
    }
}

#[test]
fn subset_and_superset_predicates() {
    let a: HashTrieSet<i32> = vec![1, 2].into_iter().collect();
    let b: HashTrieSet<i32> = vec![1, 2, 3].into_iter().collect();

    assert!(a.is_subset(&b));
    assert!(!b.is_subset(&a));
    assert!(b.is_superset(&a));
    assert!(a <= b);
    assert!(b >= a);
}

#[test]
fn disjoint_predicate() {
    let a: HashTrieSet<i32> = vec![1, 2].into_iter().collect();
    let b: HashTrieSet<i32> = vec![3, 4].into_iter().collect();
    let c: HashTrieSet<i32> = vec![2, 3].into_iter().collect();

    assert!(a.is_disjoint(&b));
    assert!(!a.is_disjoint(&c));
}

#[test]
fn bitor_bitand_sub_bitxor_operators_match_named_methods() {
    let a: HashTrieSet<i32> = (0..10).collect();
    let b: HashTrieSet<i32> = (5..15).collect();

    assert_eq!(&a | &b, a.union(b.iter().cloned()));
    assert_eq!(&a & &b, a.intersection(b.iter().cloned()));
    assert_eq!(&a - &b, a.difference(b.iter().cloned()));
    assert_eq!(&a ^ &b, a.symmetric_difference(b.iter().cloned()));
}

#[test]
fn iter_visits_every_element_exactly_once() {
    let set: HashTrieSet<i32> = (0..50).collect();
    let mut seen: Vec<i32> = set.iter().cloned().collect();

    seen.sort_unstable();
    assert_eq!(seen, (0..50).collect::<Vec<_>>());
}

#[test]
fn iteration_over_an_unretained_union_still_sees_every_entry() {
    // Mirrors the HAMT's own root-retention guarantee (`spec.md` §4.7):
    // the set returned by `union` is never bound to a name here.
    fn make(lo: i32, hi: i32) -> HashTrieSet<i32> {
        (lo..hi).collect()
    }

    let count = make(0, 100).union(make(50, 150).iter().cloned()).iter().count();

    assert_eq!(count, 150);
}

#[test]
fn items_list_length_matches_size() {
    let set: HashTrieSet<i32> = (0..100).collect();

    assert_eq!(set.items_list().len(), set.size());
}

#[test]
fn display_renders_as_a_brace_delimited_list() {
    let set = HashTrieSet::new().insert(1);

    assert_eq!(alloc::format!("{}", set), "{1}");
}

#[test]
fn from_iterator_collapses_duplicates() {
    let set: HashTrieSet<i32> = vec![1, 1, 2, 2, 3].into_iter().collect();

    assert_eq!(set.size(), 3);
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    let set: HashTrieSet<i32> = (0..20).collect();
    let json = serde_json::to_string(&set).unwrap();
    let back: HashTrieSet<i32> = serde_json::from_str(&json).unwrap();

    assert_eq!(set, back);
}
