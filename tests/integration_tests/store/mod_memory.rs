use bson::{Bson, doc};
use nexuslite_paginate::store::{compare_bson, eval_filter, parse_filter, parse_sort};
use nexuslite_paginate::{AggregateOptions, AggregateStore, MemoryStore};

use crate::integration_tests::_support::ns;

fn store() -> MemoryStore {
    MemoryStore::with_docs(vec![
        doc! { "n": 1_i64, "tags": ["a", "b"], "meta": { "score": 9 } },
        doc! { "n": 2_i64, "tags": ["b"], "meta": { "score": 3 } },
        doc! { "n": 3_i64, "meta": { "score": 5.5 } },
        doc! { "n": 4_i64, "tags": [], "meta": { "score": null } },
    ])
}

#[test]
fn match_operators() {
    let s = store();
    let opts = AggregateOptions::new();
    let run = |m: bson::Document| ns(&s.run(&[doc! { "$match": m }], &opts).unwrap());
    assert_eq!(run(doc! { "meta.score": { "$gt": 4 } }), vec![1, 3]);
    assert_eq!(run(doc! { "n": { "$in": [1_i64, 4_i64] } }), vec![1, 4]);
    assert_eq!(run(doc! { "n": { "$nin": [1_i64, 4_i64] } }), vec![2, 3]);
    assert_eq!(run(doc! { "tags": { "$exists": false } }), vec![3]);
    assert_eq!(run(doc! { "$or": [ { "n": 1_i64 }, { "n": { "$gte": 4 } } ] }), vec![1, 4]);
    assert_eq!(run(doc! { "$nor": [ { "n": 1_i64 }, { "n": 2_i64 } ] }), vec![3, 4]);
    assert_eq!(run(doc! { "n": { "$ne": 2 } }), vec![1, 3, 4]);
    assert_eq!(run(doc! { "$and": [ { "n": { "$gt": 1 } }, { "n": { "$lt": 4 } } ] }), vec![2, 3]);
}

#[test]
fn bad_filters_are_invalid_stages() {
    assert!(parse_filter(&doc! { "$or": 1 }).is_err());
    assert!(parse_filter(&doc! { "n": { "$unknown": 1 } }).is_err());
    assert!(parse_sort(&doc! {}).is_err());
    assert!(parse_sort(&doc! { "n": 2 }).is_err());
}

#[test]
fn sort_handles_missing_and_mixed_numbers() {
    let s = store();
    let out = s.run(&[doc! { "$sort": { "meta.score": -1 } }], &AggregateOptions::new()).unwrap();
    assert_eq!(ns(&out), vec![1, 3, 2, 4]);
    assert_eq!(compare_bson(&Bson::Int32(3), &Bson::Double(3.5)), std::cmp::Ordering::Less);
}

#[test]
fn filter_evaluates_dotted_paths() {
    let f = parse_filter(&doc! { "meta.score": 9 }).unwrap();
    assert!(eval_filter(&doc! { "meta": { "score": 9_i64 } }, &f));
    assert!(!eval_filter(&doc! { "meta": 9 }, &f));
}

#[cfg(feature = "regex")]
#[test]
fn regex_match() {
    let s = MemoryStore::with_docs(vec![doc! { "n": 1_i64, "name": "Alpha" }, doc! { "n": 2_i64, "name": "beta" }]);
    let out = s
        .run(&[doc! { "$match": { "name": { "$regex": "^a", "$options": "i" } } }], &AggregateOptions::new())
        .unwrap();
    assert_eq!(ns(&out), vec![1]);
}

#[tokio::test]
async fn default_facet_splits_branches() {
    let s = store();
    let out = s
        .faceted_aggregate(
            vec![
                ("first".to_string(), vec![doc! { "$sort": { "n": 1 } }, doc! { "$limit": 1 }]),
                ("total".to_string(), vec![doc! { "$count": "c" }]),
                ("none".to_string(), vec![doc! { "$match": { "n": 99 } }]),
            ],
            &AggregateOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(ns(&out["first"]), vec![1]);
    assert_eq!(out["total"], vec![doc! { "c": 4 }]);
    assert!(out["none"].is_empty());
    assert_eq!(s.aggregate_calls(), 1);
}

#[tokio::test]
async fn parallel_calls_see_inserted_documents() {
    let s = MemoryStore::new();
    s.insert_many((0..5).map(|i| doc! { "n": i64::from(i) }));
    assert_eq!(s.len(), 5);
    let opts_a = AggregateOptions::new();
    let opts_b = AggregateOptions::new();
    let (a, b) = tokio::join!(
        s.aggregate(vec![doc! { "$count": "c" }], &opts_a),
        s.aggregate(vec![doc! { "$skip": 3 }], &opts_b)
    );
    assert_eq!(a.unwrap(), vec![doc! { "c": 5 }]);
    assert_eq!(b.unwrap().len(), 2);
}
