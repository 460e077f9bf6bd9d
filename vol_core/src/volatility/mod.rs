pub mod volatility;
pub mod volatility_estimator;
