use nexuslite_paginate::{CustomLabels, LabelOverrides, PaginateDefaults, PaginateOptions, Paginator};

use crate::integration_tests::_support::numbered;

fn keys(d: &bson::Document) -> Vec<String> {
    d.keys().cloned().collect()
}

#[tokio::test]
async fn every_metadata_field_can_be_renamed() {
    let labels = LabelOverrides {
        total_docs: Some("total".into()),
        docs: Some("rows".into()),
        limit: Some("size".into()),
        page: Some("current".into()),
        total_pages: Some("pages".into()),
        next_page: Some("next".into()),
        prev_page: Some("prev".into()),
        paging_counter: Some("counter".into()),
        has_prev_page: Some("hasPrev".into()),
        has_next_page: Some("hasNext".into()),
        meta: None,
    };
    let p = Paginator::new(numbered(30));
    let d = p
        .paginate(
            None::<bson::Document>,
            None::<bson::Document>,
            None::<bson::Document>,
            &PaginateOptions::new().page(2).custom_labels(labels),
        )
        .await
        .unwrap()
        .into_document();
    assert_eq!(
        keys(&d),
        vec!["total", "size", "current", "pages", "counter", "hasPrev", "hasNext", "prev", "next", "rows"]
    );
}

#[tokio::test]
async fn call_labels_merge_with_library_labels_per_field() {
    let defaults = PaginateDefaults {
        custom_labels: LabelOverrides::default().docs("items").total_docs("count"),
        ..PaginateDefaults::default()
    };
    let p = Paginator::with_defaults(numbered(3), defaults);
    let opts = PaginateOptions::new().custom_labels(LabelOverrides::default().total_docs("n"));
    let plan = p.plan(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &opts);
    assert_eq!(
        plan.options.labels,
        CustomLabels { docs: "items".into(), total_docs: "n".into(), ..CustomLabels::default() }
    );
}

#[tokio::test]
async fn empty_label_keeps_lower_layer() {
    let p = Paginator::new(numbered(3));
    let opts = PaginateOptions::new().custom_labels(LabelOverrides::default().docs(""));
    let d = p
        .paginate(None::<bson::Document>, None::<bson::Document>, None::<bson::Document>, &opts)
        .await
        .unwrap()
        .into_document();
    assert_eq!(d.get_array("docs").unwrap().len(), 3);
}
