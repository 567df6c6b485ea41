use super::*;
use alloc::format;
use alloc::vec;
use pretty_assertions::assert_eq;

#[test]
fn new_vector_is_empty() {
    let v: Vector<i32> = Vector::new();

    assert_eq!(v.size(), 0);
    assert!(v.is_empty());
    assert_eq!(v.get(0), None);
}

#[test]
fn push_back_then_get() {
    let v = Vector::new().push_back(1).push_back(2).push_back(3);

    assert_eq!(v.size(), 3);
    assert_eq!(v.get(0), Some(&1));
    assert_eq!(v.get(1), Some(&2));
    assert_eq!(v.get(2), Some(&3));
    assert_eq!(v.get(3), None);
}

#[test]
fn nth_of_pushed_value_returns_it_at_the_old_length() {
    let v = Vector::from_sequence(0..10);
    let len = v.size();
    let pushed = v.push_back(999);

    assert_eq!(pushed.nth(len as i64), Ok(&999));
}

#[test]
fn pop_undoes_push_back() {
    let v = Vector::from_sequence(0..10);
    let pushed = v.push_back(999);
    let popped = pushed.drop_last().unwrap();

    assert_eq!(popped, v);
}

#[test]
fn set_leaves_every_other_index_untouched() {
    let v = Vector::from_sequence(0..100);
    let updated = v.set(42, -1).unwrap();

    for i in 0..100 {
        if i == 42 {
            assert_eq!(updated.get(i), Some(&-1));
        } else {
            assert_eq!(updated.get(i), v.get(i));
        }
    }
}

#[test]
fn set_at_length_behaves_like_push_back() {
    let v = Vector::from_sequence(0..5);
    let extended = v.set(5, 99).unwrap();

    assert_eq!(extended.size(), 6);
    assert_eq!(extended.get(5), Some(&99));
}

#[test]
fn set_past_length_is_out_of_range() {
    let v = Vector::from_sequence(0..5);

    assert_eq!(v.set(6, 0), Err(VectorError::IndexOutOfRange));
}

#[test]
fn large_vector_every_index_reads_back_correctly() {
    const N: usize = 10_000;
    let v: Vector<usize> = Vector::from_sequence(0..N);

    assert_eq!(v.size(), N);

    for i in 0..N {
        assert_eq!(v.get(i), Some(&i));
    }
}

#[test]
fn thirty_two_elements_keep_the_root_absent() {
    let v: Vector<i32> = Vector::from_sequence(0..32);

    assert!(v.root.is_none());
    assert_eq!(v.size(), 32);
}

#[test]
fn the_33rd_push_grows_a_root_and_is_reachable() {
    let v: Vector<i32> = Vector::from_sequence(0..32);
    let grown = v.push_back(32);

    assert!(grown.root.is_some());
    assert_eq!(grown.size(), 33);
    assert_eq!(grown.get(32), Some(&32));
}

#[test]
fn popping_back_to_32_drops_the_root_again() {
    let v: Vector<i32> = Vector::from_sequence(0..33);
    let shrunk = v.drop_last().unwrap();

    assert!(shrunk.root.is_none());
    assert_eq!(shrunk.size(), 32);
}

#[test]
fn pop_on_empty_is_an_error() {
    let v: Vector<i32> = Vector::new();

    assert_eq!(v.drop_last(), Err(VectorError::EmptyCollection));
}

#[test]
fn first_and_last_on_empty_are_errors() {
    let v: Vector<i32> = Vector::new();

    assert_eq!(v.first(), Err(VectorError::EmptyCollection));
    assert_eq!(v.last(), Err(VectorError::EmptyCollection));
}

#[test]
fn negative_index_normalizes_from_the_end() {
    let v = Vector::from_sequence(0..10);

    assert_eq!(v.nth(-1), Ok(&9));
    assert_eq!(v.nth(-10), Ok(&0));
    assert_eq!(v.nth(-11), Err(VectorError::IndexOutOfRange));
}

#[test]
fn slice_copies_the_requested_half_open_range() {
    let v: Vector<i32> = Vector::from_sequence(0..100);
    let s = v.slice(10, 20).unwrap();

    assert_eq!(s.size(), 10);
    for i in 0..10usize {
        assert_eq!(s.get(i), Some(&(i as i32 + 10)));
    }
}

#[test]
fn slice_spanning_trie_and_tail_is_contiguous() {
    let v = Vector::from_sequence(0..100);
    let s = v.slice(90, 100).unwrap();

    assert_eq!(s.items_list(), (90..100).collect::<Vec<_>>());
}

#[test]
fn slice_with_inverted_bounds_is_out_of_range() {
    let v = Vector::from_sequence(0..10);

    assert_eq!(v.slice(5, 2), Err(VectorError::IndexOutOfRange));
}

#[test]
fn building_up_with_push_back_mut_matches_from_sequence() {
    let mut v = Vector::new();

    for i in 0..500 {
        v.push_back_mut(i);
    }

    assert_eq!(v, Vector::from_sequence(0..500));
}

#[test]
fn popping_every_element_returns_to_empty() {
    let mut v = Vector::from_sequence(0..200);

    for _ in 0..200 {
        v.drop_last_mut().unwrap();
    }

    assert!(v.is_empty());
    assert_eq!(v.drop_last_mut(), Err(VectorError::EmptyCollection));
}

#[test]
fn iter_is_index_ascending_and_double_ended() {
    let v = Vector::from_sequence(0..10);

    assert_eq!(v.iter().copied().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
    assert_eq!(v.iter().rev().copied().collect::<Vec<_>>(), (0..10).rev().collect::<Vec<_>>());
}

#[test]
fn iteration_over_an_unretained_slice_still_sees_every_entry() {
    fn make() -> Vector<i32> {
        Vector::from_sequence(0..100)
    }

    let count = make().slice(0, 100).unwrap().iter().count();

    assert_eq!(count, 100);
}

#[test]
fn items_list_length_matches_size() {
    let v = Vector::from_sequence(0..1000);

    assert_eq!(v.items_list().len(), v.size());
}

#[test]
fn index_returns_the_value_at_a_present_index() {
    let v = Vector::from_sequence(vec!["a", "b", "c"]);

    assert_eq!(v[1], "b");
}

#[test]
#[should_panic(expected = "index out of range")]
fn index_panics_out_of_range() {
    let v = Vector::from_sequence(vec![1, 2, 3]);
    let _ = v[5];
}

#[test]
fn display_renders_as_a_bracketed_list() {
    let v = Vector::from_sequence(vec![1, 2, 3]);

    assert_eq!(format!("{}", v), "[1, 2, 3]");
}

#[test]
fn from_iterator_preserves_order() {
    let v: Vector<i32> = (0..20).collect();

    assert_eq!(v.items_list(), (0..20).collect::<Vec<_>>());
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    let v = Vector::from_sequence(0..200);
    let json = serde_json::to_string(&v).unwrap();
    let back: Vector<i32> = serde_json::from_str(&json).unwrap();

    assert_eq!(v, back);
}
