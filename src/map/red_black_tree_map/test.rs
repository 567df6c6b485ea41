use super::*;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use pretty_assertions::assert_eq;

#[test]
fn new_map_is_empty() {
    let map: RedBlackTreeMap<i32, i32> = RedBlackTreeMap::new();

    assert_eq!(map.size(), 0);
    assert!(map.is_empty());
    assert_eq!(map.get(&0), None);
    assert_eq!(map.first(), Err(MapError::EmptyCollection));
    assert_eq!(map.last(), Err(MapError::EmptyCollection));
}

#[test]
fn insert_then_get() {
    let map = RedBlackTreeMap::new().insert(3, "three").insert(1, "one").insert(2, "two");

    assert_eq!(map.size(), 3);
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.get(&2), Some(&"two"));
    assert_eq!(map.get(&3), Some(&"three"));
    assert_eq!(map.get(&4), None);
}

#[test]
fn try_get_reports_key_not_found() {
    let map = RedBlackTreeMap::new().insert(1, "one");

    assert_eq!(map.try_get(&1), Ok(&"one"));
    assert_eq!(map.try_get(&2), Err(MapError::KeyNotFound));
}

#[test]
fn insert_overwrites_existing_key() {
    let map = RedBlackTreeMap::new().insert(1, "one").insert(1, "uno");

    assert_eq!(map.size(), 1);
    assert_eq!(map.get(&1), Some(&"uno"));
}

#[test]
fn insert_is_a_no_op_when_value_is_identical() {
    let map = RedBlackTreeMap::new().insert(1, "one");
    let map2 = map.insert(1, "one");

    assert_eq!(map.size(), map2.size());
}

#[test]
fn remove_of_absent_key_returns_same_handle() {
    let map = RedBlackTreeMap::new().insert(1, "one");
    let same = map.remove(&42);

    assert_eq!(same.size(), map.size());
}

#[test]
fn first_and_last() {
    let map = RedBlackTreeMap::new().insert(5, "e").insert(1, "a").insert(3, "c");

    assert_eq!(map.first(), Ok((&1, &"a")));
    assert_eq!(map.last(), Ok((&5, &"e")));
}

#[test]
fn iteration_is_strictly_increasing() {
    let mut map = RedBlackTreeMap::new();

    let mut state: u64 = 0x9e37_79b9;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 1000) as i32
    };

    for _ in 0..500 {
        map.insert_mut(next(), ());
    }

    let keys: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
    let mut sorted = keys.clone();

    sorted.sort_unstable();

    assert_eq!(keys, sorted);
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn red_black_invariants_hold_after_many_insertions_and_removals() {
    let mut map = RedBlackTreeMap::new();
    let mut present = vec![false; 1000];

    let mut state: u64 = 0xabcd_1234;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 1000) as usize
    };

    for step in 0..8000 {
        let key = next();

        if present[key] {
            assert!(map.remove_mut(&key));
            present[key] = false;
        } else {
            map.insert_mut(key, key * 2);
            present[key] = true;
        }

        if step % 200 == 0 {
            assert!(black_height_if_valid(&map).is_some(), "red-black invariants violated at step {step}");
        }
    }

    assert!(black_height_if_valid(&map).is_some());
    assert_eq!(count_entries(&map), map.size());

    for (key, &is_present) in present.iter().enumerate() {
        assert_eq!(map.contains_key(&key), is_present);
    }
}

#[test]
fn insert_1000_random_keys_then_traverse_sorted() {
    let mut keys: Vec<i32> = (0..1000).collect();
    let mut state: u64 = 0x1357_2468;

    // Fisher-Yates shuffle with a fixed seed for a deterministic "random order".
    for i in (1..keys.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state as usize) % (i + 1);
        keys.swap(i, j);
    }

    let mut map = RedBlackTreeMap::new();

    for &k in &keys {
        map.insert_mut(k, k);
    }

    let traversed: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
    let expected: Vec<i32> = (0..1000).collect();

    assert_eq!(traversed, expected);

    let sub = map.subseq(&250, &750);

    assert_eq!(sub.size(), 500);

    let sub_traversed: Vec<i32> = sub.iter().map(|(k, _)| *k).collect();
    let sub_expected: Vec<i32> = (250..750).collect();

    assert_eq!(sub_traversed, sub_expected);
}

#[test]
fn subseq_contains_exactly_the_half_open_range() {
    let map: RedBlackTreeMap<i32, i32> = (0..20).map(|i| (i, i)).collect();
    let sub = map.subseq(&5, &10);

    assert_eq!(sub.items_list(), vec![(5, 5), (6, 6), (7, 7), (8, 8), (9, 9)]);
}

#[test]
fn rsubseq_iterates_in_descending_order() {
    let map: RedBlackTreeMap<i32, i32> = (0..20).map(|i| (i, i)).collect();
    let rsub = map.rsubseq(&5, &10);

    // the collection itself is still forward-ordered...
    assert_eq!(rsub.items_list(), vec![(5, 5), (6, 6), (7, 7), (8, 8), (9, 9)]);
    // ...only a reverse cursor over it walks back to front.
    let descending: Vec<i32> = rsub.iter_rev().map(|(k, _)| *k).collect();

    assert_eq!(descending, vec![9, 8, 7, 6, 5]);
}

#[test]
fn iteration_over_an_unretained_subseq_still_sees_every_entry() {
    let base: RedBlackTreeMap<i32, i32> = (0..100).map(|i| (i, i)).collect();
    let mut items = base.subseq(&40, &60).items_list();

    items.sort();

    let expected: Vec<(i32, i32)> = (40..60).map(|i| (i, i)).collect();

    assert_eq!(items, expected);
}

#[test]
fn index_returns_the_value_for_a_present_key() {
    let map = RedBlackTreeMap::new().insert("k", 42);

    assert_eq!(map["k"], 42);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_panics_for_an_absent_key() {
    let map: RedBlackTreeMap<&str, i32> = RedBlackTreeMap::new();

    let _ = map["missing"];
}

#[test]
fn display_renders_as_a_brace_delimited_list_in_key_order() {
    let map = RedBlackTreeMap::new().insert(2, "two").insert(1, "one");

    let rendered: String = format!("{}", map);

    assert_eq!(rendered, "{1: one, 2: two}");
}

#[test]
fn from_iterator_keeps_the_later_pair_on_duplicate_keys() {
    let map: RedBlackTreeMap<i32, i32> = vec![(1, 1), (2, 2), (1, 100)].into_iter().collect();

    assert_eq!(map.size(), 2);
    assert_eq!(map.get(&1), Some(&100));
}

mod proptests {
    //! Property-style coverage (`spec.md` §8 property 11) over arbitrary
    //! insert/remove sequences, complementing the seeded-sequence test
    //! above with shrinking on failure.
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![(0i32..64).prop_map(Op::Insert), (0i32..64).prop_map(Op::Remove),]
    }

    proptest! {
        #[test]
        fn stays_balanced_and_sorted_under_arbitrary_ops(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut map = RedBlackTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k) => { map.insert_mut(k, k); }
                    Op::Remove(k) => { map.remove_mut(&k); }
                }

                prop_assert!(black_height_if_valid(&map).is_some());
            }

            prop_assert_eq!(count_entries(&map), map.size());

            let mut prev: Option<i32> = None;
            for (k, _) in map.iter() {
                if let Some(p) = prev {
                    prop_assert!(p < *k);
                }
                prev = Some(*k);
            }
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    use alloc::string::ToString;

    let map = RedBlackTreeMap::new().insert(1, "one".to_string()).insert(2, "two".to_string());

    let json = serde_json::to_string(&map).unwrap();
    let decoded: RedBlackTreeMap<i32, String> = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, map);
}
