use super::*;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use pretty_assertions::assert_eq;

#[test]
fn new_map_is_empty() {
    let map: HashTrieMap<i32, i32> = HashTrieMap::new();

    assert_eq!(map.size(), 0);
    assert!(map.is_empty());
    assert_eq!(map.get(&0), None);
}

#[test]
fn insert_then_get() {
    let map = HashTrieMap::new().insert(1, "one").insert(2, "two").insert(3, "three");

    assert_eq!(map.size(), 3);
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(map.get(&2), Some(&"two"));
    assert_eq!(map.get(&3), Some(&"three"));
    assert_eq!(map.get(&4), None);
}

#[test]
fn try_get_reports_key_not_found() {
    let map = HashTrieMap::new().insert(1, "one");

    assert_eq!(map.try_get(&1), Ok(&"one"));
    assert_eq!(map.try_get(&2), Err(crate::error::MapError::KeyNotFound));
}

#[test]
fn insert_overwrites_existing_key() {
    let map = HashTrieMap::new().insert(1, "one").insert(1, "uno");

    assert_eq!(map.size(), 1);
    assert_eq!(map.get(&1), Some(&"uno"));
}

#[test]
fn insert_is_a_no_op_when_value_is_identical() {
    let map = HashTrieMap::new().insert(1, "one");
    let map2 = map.insert(1, "one");

    assert_eq!(map.size(), map2.size());
    assert_eq!(map.get(&1), map2.get(&1));
}

#[test]
fn insert_mut_builds_up_a_map() {
    let mut map = HashTrieMap::new();

    for i in 0..200 {
        map.insert_mut(i, i * i);
    }

    assert_eq!(map.size(), 200);

    for i in 0..200 {
        assert_eq!(map.get(&i), Some(&(i * i)));
    }
}

#[test]
fn remove_shrinks_the_map_and_is_idempotent() {
    let map = HashTrieMap::new().insert(1, "one").insert(2, "two");
    let removed = map.remove(&1);

    assert_eq!(removed.size(), 1);
    assert_eq!(removed.get(&1), None);
    assert_eq!(removed.get(&2), Some(&"two"));

    let removed_again = removed.remove(&1);

    assert_eq!(removed_again.size(), 1);
}

#[test]
fn remove_of_absent_key_returns_same_handle() {
    let map = HashTrieMap::new().insert(1, "one");
    let same = map.remove(&42);

    assert_eq!(same.size(), map.size());
}

#[test]
fn remove_down_to_empty() {
    let mut map = HashTrieMap::new();

    for i in 0..64 {
        map.insert_mut(i, i);
    }

    for i in 0..64 {
        assert!(map.remove_mut(&i));
    }

    assert!(map.is_empty());
    assert_eq!(map.size(), 0);
}

#[test]
fn insert_and_remove_preserve_size_through_many_operations() {
    let mut map = HashTrieMap::new();
    let mut present = vec![false; 500];

    let mut state: u64 = 0x1234_5678;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 500) as usize
    };

    for _ in 0..5000 {
        let key = next();

        if present[key] {
            assert!(map.remove_mut(&key));
            present[key] = false;
        } else {
            map.insert_mut(key, key * 2);
            present[key] = true;
        }

        let expected_size = present.iter().filter(|&&p| p).count();
        assert_eq!(map.size(), expected_size);
    }

    for (key, &is_present) in present.iter().enumerate() {
        assert_eq!(map.contains_key(&key), is_present);
    }
}

#[test]
fn hoisting_collapses_single_child_branches_after_removal() {
    // Two keys sharing every 5-bit fragment until the hash is exhausted
    // force a long chain of single-child branches; after removing one,
    // the other must be reachable in O(1) from the root, not still
    // buried behind the old chain. We can't observe depth directly, but
    // we can check that repeatedly inserting and removing the colliding
    // member leaves the survivor's value intact and the map's size
    // correct.
    struct SameHash(u32, &'static str);

    impl core::hash::Hash for SameHash {
        fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
            0u32.hash(state);
        }
    }
    impl PartialEq for SameHash {
        fn eq(&self, other: &SameHash) -> bool {
            self.0 == other.0
        }
    }
    impl Eq for SameHash {}

    let map = HashTrieMap::new()
        .insert(SameHash(1, "a"), "a")
        .insert(SameHash(2, "b"), "b")
        .insert(SameHash(3, "c"), "c");

    assert_eq!(map.size(), 3);

    let map = map.remove(&SameHash(2, ""));

    assert_eq!(map.size(), 2);
    assert_eq!(map.get(&SameHash(1, "")), Some(&"a"));
    assert_eq!(map.get(&SameHash(3, "")), Some(&"c"));
    assert_eq!(map.get(&SameHash(2, "")), None);
}

#[test]
fn merge_prefers_the_right_hand_side_on_key_overlap() {
    let a = HashTrieMap::new().insert("x", 1).insert("y", 2);
    let b = HashTrieMap::new().insert("y", 20).insert("z", 3);

    let merged = a.merge(&b);

    assert_eq!(merged.size(), 3);
    assert_eq!(merged.get("x"), Some(&1));
    assert_eq!(merged.get("y"), Some(&20));
    assert_eq!(merged.get("z"), Some(&3));
}

#[test]
fn merge_recounts_from_structure_rather_than_summing_lengths() {
    let mut a = HashTrieMap::new();
    let mut b = HashTrieMap::new();

    for i in 0..100 {
        a.insert_mut(i, i);
    }
    for i in 50..150 {
        b.insert_mut(i, i * 10);
    }

    let merged = a.merge(&b);

    // a has 100 keys, b has 100 keys, 50 overlap: merged must have 150,
    // not 200 (a naive len(a) + len(b) would under/over-count here).
    assert_eq!(merged.size(), 150);

    for i in 0..50 {
        assert_eq!(merged.get(&i), Some(&i));
    }
    for i in 50..150 {
        assert_eq!(merged.get(&i), Some(&(i * 10)));
    }
}

#[test]
fn merge_with_an_empty_map_shares_the_other_sides_root() {
    let a = HashTrieMap::new().insert(1, "one");
    let empty: HashTrieMap<i32, &str> = HashTrieMap::new();

    let merged = a.merge(&empty);

    assert_eq!(merged.size(), 1);
    assert_eq!(merged.get(&1), Some(&"one"));
}

#[test]
fn iteration_over_an_unretained_merge_result_still_sees_every_entry() {
    let a = HashTrieMap::new().insert(1, 1).insert(2, 2);
    let b = HashTrieMap::new().insert(3, 3).insert(4, 4);

    let mut items = a.merge(&b).items_list();

    items.sort();

    assert_eq!(items, vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
}

#[test]
fn iter_visits_every_key_exactly_once() {
    let mut map = HashTrieMap::new();

    for i in 0..300 {
        map.insert_mut(i, i);
    }

    let mut seen: Vec<i32> = map.iter().map(|(k, _)| *k).collect();

    seen.sort();

    let expected: Vec<i32> = (0..300).collect();

    assert_eq!(seen, expected);
}

#[test]
fn items_list_length_matches_size() {
    let mut map = HashTrieMap::new();

    for i in 0..128 {
        map.insert_mut(i, i);
    }

    assert_eq!(map.items_list().len(), map.size());
}

#[test]
fn equality_is_independent_of_insertion_order() {
    let a = HashTrieMap::new().insert(1, "a").insert(2, "b").insert(3, "c");
    let b = HashTrieMap::new().insert(3, "c").insert(1, "a").insert(2, "b");

    assert_eq!(a, b);
}

#[test]
fn maps_of_different_size_are_never_equal() {
    let a = HashTrieMap::new().insert(1, "a");
    let b = HashTrieMap::new().insert(1, "a").insert(2, "b");

    assert_ne!(a, b);
}

#[test]
fn index_returns_the_value_for_a_present_key() {
    let map = HashTrieMap::new().insert("k", 42);

    assert_eq!(map["k"], 42);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_panics_for_an_absent_key() {
    let map: HashTrieMap<&str, i32> = HashTrieMap::new();

    let _ = map["missing"];
}

#[test]
fn display_renders_as_a_brace_delimited_list() {
    let map = HashTrieMap::new().insert(1, "one");

    let rendered: String = format!("{}", map);

    assert_eq!(rendered, "{1: one}");
}

#[test]
fn from_iterator_keeps_the_later_pair_on_duplicate_keys() {
    let map: HashTrieMap<i32, i32> = vec![(1, 1), (2, 2), (1, 100)].into_iter().collect();

    assert_eq!(map.size(), 2);
    assert_eq!(map.get(&1), Some(&100));
}

#[test]
fn a_hundred_entry_collision_bucket_resolves_every_key_correctly() {
    // All 100 keys share one 32-bit hash, forcing every one of them into
    // the same `HamtNode::Collision` bucket (`spec.md` §8, property 9 /
    // scenario S3).
    #[derive(Clone)]
    struct FixedHashKey(u32);

    impl core::hash::Hash for FixedHashKey {
        fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
            12345u32.hash(state);
        }
    }
    impl PartialEq for FixedHashKey {
        fn eq(&self, other: &FixedHashKey) -> bool {
            self.0 == other.0
        }
    }
    impl Eq for FixedHashKey {}

    let mut map = HashTrieMap::new();

    for i in 0..100u32 {
        map.insert_mut(FixedHashKey(i), i);
    }

    assert_eq!(map.size(), 100);

    for i in 0..100u32 {
        assert_eq!(map.get(&FixedHashKey(i)), Some(&i));
    }

    let map = map.remove(&FixedHashKey(50));

    assert_eq!(map.size(), 99);
    assert_eq!(map.get(&FixedHashKey(50)), None);

    for i in 0..100u32 {
        if i != 50 {
            assert_eq!(map.get(&FixedHashKey(i)), Some(&i));
        }
    }
}

#[test]
fn a_thousand_entry_base_shares_structure_with_a_hundred_one_off_variants() {
    let mut base = HashTrieMap::new();

    for i in 0..1000 {
        base.insert_mut(i, i * 2);
    }

    assert_eq!(base.size(), 1000);

    for i in 0..100 {
        let key = i + 10_000;
        let variant = base.insert(key, i);

        assert_eq!(variant.size(), 1001);
        assert_eq!(variant.get(&key), Some(&i));

        for j in 0..100 {
            if j != i {
                assert_eq!(variant.get(&(j + 10_000)), None);
            }
        }
    }

    // base itself is untouched by any of the variants built above.
    assert_eq!(base.size(), 1000);
}

#[test]
fn merging_two_overlapping_ten_thousand_entry_maps_yields_the_exact_union() {
    let mut a = HashTrieMap::new();
    let mut b = HashTrieMap::new();

    for i in 0..10_000 {
        a.insert_mut(i, i);
    }
    for i in 5_000..15_000 {
        b.insert_mut(i, i);
    }

    let c = a.merge(&b);

    assert_eq!(c.size(), 15_000);

    let mut items = c.items_list();
    items.sort();

    assert_eq!(items[0], (0, 0));
    assert_eq!(items[14_999], (14_999, 14_999));
}

#[test]
fn iterating_an_unbound_merge_of_two_overlapping_maps_matches_the_bound_case() {
    let pm1: HashTrieMap<i32, i32> = (0..10_000).map(|i| (i, i)).collect();
    let pm2: HashTrieMap<i32, i32> = (5_000..15_000).map(|i| (i, i)).collect();

    let mut items = pm1.merge(&pm2).items_list();
    items.sort();

    assert_eq!(items.len(), 15_000);
    assert_eq!(items[0], (0, 0));
    assert_eq!(items[14_999], (14_999, 14_999));
}

mod proptests {
    //! Property-style tests where shrinking materially helps over a fixed
    //! seeded sequence (`spec.md` §8 property 5, "merge count
    //! correctness"): any two finite sets of `(key, value)` pairs merge to
    //! a map whose size is exactly the number of distinct keys, never the
    //! sum of the two inputs' sizes.
    use super::*;
    use alloc::collections::BTreeMap;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn merge_size_is_distinct_key_count(
            a in prop::collection::vec((0i32..200, 0i32..1_000), 0..200),
            b in prop::collection::vec((0i32..200, 0i32..1_000), 0..200),
        ) {
            let map_a: HashTrieMap<i32, i32> = a.iter().cloned().collect();
            let map_b: HashTrieMap<i32, i32> = b.iter().cloned().collect();
            let merged = map_a.merge(&map_b);

            let mut expected: BTreeMap<i32, i32> = BTreeMap::new();
            for (k, v) in a.into_iter().chain(b) {
                expected.insert(k, v);
            }

            prop_assert_eq!(merged.size(), expected.len());
            for (k, v) in &expected {
                prop_assert_eq!(merged.get(k), Some(v));
            }
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    let map = HashTrieMap::new().insert(1, "one".to_string()).insert(2, "two".to_string());

    let json = serde_json::to_string(&map).unwrap();
    let decoded: HashTrieMap<i32, String> = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.size(), map.size());
    assert_eq!(decoded.get(&1), Some(&"one".to_string()));
    assert_eq!(decoded.get(&2), Some(&"two".to_string()));
}
