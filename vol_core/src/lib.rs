pub mod analyzer;
pub mod bipower;
pub mod common;
pub mod config;
pub mod pattern;
pub mod price;
pub mod truncation;
pub mod volatility;

pub use analyzer::analyzer::{DiurnalAnalyzer, DiurnalReport};
pub use common::vol_exception::{ErrCode, VolException, VolResult};
pub use config::vol_config::VolConfig;
pub use pattern::{pattern::Pattern, pattern_aggregator::PatternAggregator};
pub use price::price_series::PriceSeries;
pub use truncation::truncation_policy::{TruncationPolicy, TruncationThreshold};
pub use volatility::{
    volatility::{Estimate, Volatility},
    volatility_estimator::VolatilityEstimator,
};
