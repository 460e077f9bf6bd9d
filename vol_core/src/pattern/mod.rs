pub mod pattern;
pub mod pattern_aggregator;
