#[path = "prop_sort.rs"]
mod sort_props;
