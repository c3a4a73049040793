#[path = "prop_meta.rs"]
mod meta_props;
#[path = "prop_strategy.rs"]
mod strategy_props;
