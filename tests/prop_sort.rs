use bson::{bson, doc};
use oplogcheck::query::Sorter;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_multi_key_sort_non_decreasing(v in proptest::collection::vec((any::<i64>(), any::<i64>()), 0..50)) {
        let sorter = Sorter::compile(&bson!({ "a": 1, "b": 1 })).unwrap();
        let mut docs: Vec<_> = v.iter().map(|(a, b)| doc! { "a": *a, "b": *b }).collect();
        sorter.sort(&mut docs);
        prop_assert_eq!(docs.len(), v.len());
        for w in docs.windows(2) {
            let (a0, b0) = (w[0].get_i64("a").unwrap(), w[0].get_i64("b").unwrap());
            let (a1, b1) = (w[1].get_i64("a").unwrap(), w[1].get_i64("b").unwrap());
            prop_assert!(a0 < a1 || (a0 == a1 && b0 <= b1));
        }
    }

    #[test]
    fn prop_descending_reverses_ascending(v in proptest::collection::btree_set(any::<i32>(), 0..40)) {
        let asc = Sorter::compile(&bson!({ "n": 1 })).unwrap();
        let desc = Sorter::compile(&bson!([["n", "desc"]])).unwrap();
        let mut up: Vec<_> = v.iter().map(|n| doc! { "n": *n }).collect();
        let mut down = up.clone();
        asc.sort(&mut up);
        desc.sort(&mut down);
        down.reverse();
        prop_assert_eq!(up, down);
    }

    #[test]
    fn prop_missing_field_sorts_first(v in proptest::collection::vec(any::<i32>(), 1..20)) {
        let sorter = Sorter::compile(&bson!({ "n": 1 })).unwrap();
        let mut docs: Vec<_> = v.iter().map(|n| doc! { "n": *n }).collect();
        docs.push(doc! { "other": 1 });
        sorter.sort(&mut docs);
        prop_assert!(!docs[0].contains_key("n"));
    }
}
