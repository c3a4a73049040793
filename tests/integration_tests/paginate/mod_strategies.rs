use bson::doc;
use nexuslite_paginate::{
    AggregateOptions, MemoryStore, PaginateDefaults, PaginateError, PaginateOptions, Paginator, Strategy,
};

use crate::integration_tests::_support::{FlakyStore, StoreDown, numbered};

#[tokio::test]
async fn facet_and_parallel_agree() {
    let p = Paginator::new(numbered(57));
    let cases = [
        PaginateOptions::new().page(2).limit(7),
        PaginateOptions::new().offset(13).limit(5),
        PaginateOptions::new().pagination(false),
        PaginateOptions::new().page(99),
    ];
    for opts in cases {
        let cond = doc! { "$match": { "n": { "$gte": 3 } } };
        let sort = doc! { "$sort": { "even": 1, "n": -1 } };
        let a = p.paginate(cond.clone(), sort.clone(), None::<bson::Document>, &opts.clone().use_facet(true)).await.unwrap();
        let b = p.paginate(cond, sort, None::<bson::Document>, &opts.use_facet(false)).await.unwrap();
        assert_eq!(a, b);
    }
}

#[tokio::test]
async fn strategy_call_counts() {
    let store = numbered(10);
    let p = Paginator::new(store.clone());
    let plan = p.plan(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new());
    assert_eq!(plan.strategy, Strategy::Facet);
    p.paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new()).await.unwrap();
    assert_eq!(store.aggregate_calls(), 1);
    p.paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new().use_facet(false))
        .await
        .unwrap();
    assert_eq!(store.aggregate_calls(), 3);
}

#[tokio::test]
async fn store_without_facet_needs_parallel() {
    let store = numbered(8).without_facet();
    let p = Paginator::new(store.clone());
    let err = p
        .paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PaginateError::FacetUnsupported));

    let defaults = PaginateDefaults { use_facet: Some(false), ..PaginateDefaults::default() };
    let p = Paginator::with_defaults(store, defaults);
    let env = p
        .paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new().limit(3))
        .await
        .unwrap();
    assert_eq!(env.meta.total_docs, 8);
    assert_eq!(env.meta.total_pages, 3);
}

#[tokio::test]
async fn aggregate_options_reach_the_store() {
    let store = numbered(20).with_stage_limit(10);
    let sort = doc! { "$sort": { "n": -1 } };
    let p = Paginator::new(store);
    for facet in [true, false] {
        let err = p
            .paginate(None::<bson::Document>, sort.clone(), None::<bson::Document>, &PaginateOptions::new().use_facet(facet))
            .await
            .unwrap_err();
        assert!(matches!(err, PaginateError::MemoryLimit { limit: 10, .. }), "{err}");

        let env = p
            .paginate(
                None::<bson::Document>,
                sort.clone(),
                None::<bson::Document>,
                &PaginateOptions::new()
                    .use_facet(facet)
                    .aggregate_options(AggregateOptions::new().allow_disk_use(true)),
            )
            .await
            .unwrap();
        assert_eq!(env.docs.first().and_then(|d| d.get_i64("n").ok()), Some(20));
    }
}

#[tokio::test]
async fn library_aggregate_options_are_replaced_per_call() {
    let store = numbered(20).with_stage_limit(10);
    let defaults = PaginateDefaults {
        aggregate_options: Some(AggregateOptions::new().allow_disk_use(true)),
        ..PaginateDefaults::default()
    };
    let p = Paginator::with_defaults(store, defaults);
    let sort = doc! { "$sort": { "n": 1 } };
    assert!(p.paginate(None::<bson::Document>, sort.clone(), None::<bson::Document>, &PaginateOptions::new()).await.is_ok());
    let replaced = PaginateOptions::new().aggregate_options(AggregateOptions::new().max_time_ms(100));
    assert!(p.paginate(None::<bson::Document>, sort, None::<bson::Document>, &replaced).await.is_err());
}

#[tokio::test]
async fn store_errors_propagate_verbatim() {
    // Parallel: the count query fails while the documents query succeeds.
    let store = FlakyStore::new(numbered(5), "$count");
    let p = Paginator::new(store.clone());
    let err = p
        .paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new().use_facet(false))
        .await
        .unwrap_err();
    assert_eq!(err, StoreDown("$count rejected".into()));
    assert_eq!(store.calls(), 2);

    // Facet: the single combined call fails.
    let err = p
        .paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &PaginateOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "store unavailable: $count rejected");
}

#[tokio::test]
async fn invalid_stage_fails_whole_call() {
    let p = Paginator::new(MemoryStore::new());
    for facet in [true, false] {
        let err = p
            .paginate(
                None::<bson::Document>,
                None::<bson::Document>,
                doc! { "$lookup": { "from": "x" } },
                &PaginateOptions::new().use_facet(facet),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PaginateError::InvalidStage(_)));
    }
}
