use bson::doc;
use nexuslite_paginate::{MemoryStore, PaginateOptions, Paginator};
use proptest::prelude::*;

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_facet_equals_parallel(
        rows in proptest::collection::vec((0i64..20, any::<bool>()), 0..60),
        threshold in 0i64..20,
        limit in 1i64..15,
        page in 1i64..8,
        by_offset in any::<bool>(),
    ) {
        let store = MemoryStore::with_docs(
            rows.iter().enumerate().map(|(i, (v, f))| doc! { "_id": i as i64, "v": *v, "f": *f }).collect(),
        );
        let p = Paginator::new(store);
        let base = if by_offset {
            PaginateOptions::new().offset((page - 1) * limit + 1).limit(limit)
        } else {
            PaginateOptions::new().page(page).limit(limit)
        };
        let cond = doc! { "$match": { "v": { "$gte": threshold } } };
        let sort = doc! { "$sort": { "v": -1, "_id": 1 } };
        let (a, b) = rt().block_on(async {
            let a = p.paginate(cond.clone(), sort.clone(), None::<bson::Document>, &base.clone().use_facet(true)).await.unwrap();
            let b = p.paginate(cond.clone(), sort.clone(), None::<bson::Document>, &base.clone().use_facet(false)).await.unwrap();
            (a, b)
        });
        let expected = rows.iter().filter(|(v, _)| *v >= threshold).count() as u64;
        prop_assert_eq!(a.meta.total_docs, expected);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_page_windows_cover_all_matches(n in 0i64..80, limit in 1i64..12) {
        let store = MemoryStore::with_docs((0..n).map(|i| doc! { "i": i }).collect());
        let p = Paginator::new(store);
        let seen = rt().block_on(async {
            let mut seen = Vec::new();
            let mut page = 1i64;
            loop {
                let env = p
                    .paginate(None::<bson::Document>, doc! { "$sort": { "i": 1 } }, None::<bson::Document>, &PaginateOptions::new().page(page).limit(limit))
                    .await
                    .unwrap();
                seen.extend(env.docs.iter().map(|d| d.get_i64("i").unwrap()));
                match env.meta.next_page {
                    Some(next) => page = next as i64,
                    None => break,
                }
            }
            seen
        });
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }
}
