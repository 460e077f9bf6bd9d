use tracing::debug;

use super::volatility::{Estimate, Volatility};
use crate::common::vol_exception::{VolException, VolResult};
use crate::config::vol_config::VolConfig;
use crate::price::price_series::{check_prices, log_increments, PriceSeries};
use crate::truncation::truncation_policy::{TruncationPolicy, TruncationThreshold};

/// Which increments of a day the estimator throws away
#[derive(Debug, Clone, PartialEq)]
pub struct TruncationReport {
    pub threshold: TruncationThreshold,
    /// One flag per increment, the mask the estimator applies
    pub excluded: Vec<bool>,
}

impl TruncationReport {
    pub fn excluded_count(&self) -> usize {
        self.excluded.iter().filter(|&&e| e).count()
    }

    /// Indices of the prices that close an excluded increment
    pub fn excluded_price_indices(&self) -> Vec<usize> {
        self.excluded
            .iter()
            .enumerate()
            .filter(|(_, &e)| e)
            .map(|(j, _)| j + 1)
            .collect()
    }
}

/// Truncated realized variance over a rolling window of increments
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    delta: f64,
    window: usize,
    policy: TruncationPolicy,
}

impl VolatilityEstimator {
    pub fn new(delta: f64, window: usize, policy: TruncationPolicy) -> VolResult<Self> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(VolException::config(format!("delta must be positive, got {}", delta)));
        }
        if window < 1 {
            return Err(VolException::config("window must be >= 1"));
        }
        if matches!(policy, TruncationPolicy::AdaptiveBipower { .. }) && window < 2 {
            return Err(VolException::config(format!(
                "bipower truncation needs window >= 2, got {}",
                window
            )));
        }
        Ok(Self {
            delta,
            window,
            policy,
        })
    }

    pub fn from_config(config: &VolConfig) -> VolResult<Self> {
        Self::new(config.delta, config.window, config.truncation_method.into())
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn policy(&self) -> TruncationPolicy {
        self.policy
    }

    /// Scale turning a window's sum of squares into variance per unit time
    pub fn normalizer(&self) -> f64 {
        self.window as f64 * self.delta
    }

    /// Estimates for `price.len() - window` positions, each stamped with the
    /// time of the last observation of its window.
    pub fn compute(&self, price: &PriceSeries) -> VolResult<Volatility> {
        let values = self.estimate(&price.log_increments())?;
        let dt = price.dt()[self.window..].to_vec();
        let vol = Volatility::new(values, dt)?;
        debug!(
            start = ?price.dt().first(),
            positions = vol.len(),
            undefined = vol.undefined_count(),
            "computed rolling volatility"
        );
        Ok(vol)
    }

    /// Same as `compute` for a bare price array
    pub fn compute_values(&self, prices: &[f64]) -> VolResult<Vec<Estimate>> {
        check_prices(prices)?;
        self.estimate(&log_increments(prices))
    }

    pub fn truncation_report(&self, price: &PriceSeries) -> VolResult<TruncationReport> {
        let increments = price.log_increments();
        self.positions(increments.len() + 1)?;
        let threshold = self.policy.threshold(&increments, self.window, self.delta)?;
        let excluded = threshold.mask(&increments);
        Ok(TruncationReport {
            threshold,
            excluded,
        })
    }

    fn positions(&self, n_prices: usize) -> VolResult<usize> {
        if n_prices <= self.window {
            return Err(VolException::insufficient_data(format!(
                "{} prices cannot fill a window of {}",
                n_prices, self.window
            )));
        }
        Ok(n_prices - self.window)
    }

    fn estimate(&self, increments: &[f64]) -> VolResult<Vec<Estimate>> {
        let positions = self.positions(increments.len() + 1)?;
        let excluded = self
            .policy
            .threshold(increments, self.window, self.delta)?
            .mask(increments);
        let normalizer = self.normalizer();

        Ok((0..positions)
            .map(|i| {
                let mut retained = 0usize;
                let mut sum_sq = 0.0;
                for j in i..i + self.window {
                    if !excluded[j] {
                        let r = increments[j];
                        retained += 1;
                        sum_sq += r * r;
                    }
                }
                if retained == 0 {
                    Estimate::Undefined
                } else {
                    Estimate::Value(sum_sq / normalizer)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::vol_exception::ErrCode;
    use crate::price::price_series::tests::series;

    const DELTA: f64 = 1.0 / 23400.0;

    fn naive_window(increments: &[f64], start: usize, window: usize) -> f64 {
        increments[start..start + window].iter().map(|r| r * r).sum::<f64>()
            / (window as f64 * DELTA)
    }

    #[test]
    fn test_output_length_and_alignment() {
        let price = series(&[100.0, 101.0, 99.0, 150.0, 101.0]);
        let ve = VolatilityEstimator::new(DELTA, 2, TruncationPolicy::NoTruncation).unwrap();
        let vol = ve.compute(&price).unwrap();
        assert_eq!(vol.len(), 3);
        assert_eq!(vol.dt(), &price.dt()[2..]);
    }

    #[test]
    fn test_naive_estimate() {
        let price = series(&[100.0, 101.0, 99.0, 150.0, 101.0]);
        let increments = price.log_increments();
        let ve = VolatilityEstimator::new(DELTA, 2, TruncationPolicy::NoTruncation).unwrap();
        let vol = ve.compute(&price).unwrap();
        for i in 0..3 {
            let expected = naive_window(&increments, i, 2);
            assert!((vol.value_at(i).unwrap() - expected).abs() <= 1e-12 * expected);
        }
    }

    #[test]
    fn test_spike_increments_are_excluded() {
        // five prices only allow a z-score of sqrt(3), so a unit multiplier
        // is what flags the two moves around 150
        let price = series(&[100.0, 101.0, 99.0, 150.0, 101.0]);
        let increments = price.log_increments();
        let ve = VolatilityEstimator::new(DELTA, 2, TruncationPolicy::FixedStd { k: 1.0 }).unwrap();
        let vol = ve.compute(&price).unwrap();

        let report = ve.truncation_report(&price).unwrap();
        assert_eq!(report.excluded, vec![false, false, true, true]);
        assert_eq!(report.excluded_price_indices(), vec![3, 4]);

        assert!((vol.value_at(0).unwrap() - naive_window(&increments, 0, 2)).abs() < 1e-9);
        let partial = vol.value_at(1).unwrap();
        assert!(partial < naive_window(&increments, 1, 2));
        assert!((partial - increments[1].powi(2) / (2.0 * DELTA)).abs() < 1e-9);
        assert_eq!(vol.values()[2], Estimate::Undefined);
    }

    #[test]
    fn test_std3_on_five_prices_keeps_everything() {
        let price = series(&[100.0, 101.0, 99.0, 150.0, 101.0]);
        let ve = VolatilityEstimator::new(DELTA, 2, TruncationPolicy::FixedStd { k: 3.0 }).unwrap();
        let report = ve.truncation_report(&price).unwrap();
        assert!((report.threshold.at(0) - 0.8611).abs() < 1e-4);
        assert_eq!(report.excluded_count(), 0);
    }

    #[test]
    fn test_excluded_not_clipped() {
        // 10 small moves and one large one in the last window
        let mut prices = vec![100.0];
        for i in 0..10 {
            let step = if i % 2 == 0 { 1.001 } else { 0.999 };
            prices.push(prices[prices.len() - 1] * step);
        }
        prices.push(prices[prices.len() - 1] * 1.2);
        let price = series(&prices);
        let increments = price.log_increments();
        let ve = VolatilityEstimator::new(DELTA, 11, TruncationPolicy::FixedStd { k: 3.0 }).unwrap();
        let vol = ve.compute(&price).unwrap();
        assert_eq!(vol.len(), 1);
        let kept: f64 = increments[..10].iter().map(|r| r * r).sum();
        assert!((vol.value_at(0).unwrap() - kept / (11.0 * DELTA)).abs() < 1e-9);
    }

    #[test]
    fn test_bipower_report_agrees_with_estimates() {
        let increments = [0.001, 0.001, 0.001, 0.01, 0.05, 0.05, 0.05];
        let mut prices = vec![100.0];
        for r in increments {
            prices.push(prices[prices.len() - 1] * f64::exp(r));
        }
        let price = series(&prices);
        let increments = price.log_increments();
        let ve = VolatilityEstimator::new(DELTA, 3, TruncationPolicy::AdaptiveBipower { k: 3.0 })
            .unwrap();
        let vol = ve.compute(&price).unwrap();
        let report = ve.truncation_report(&price).unwrap();
        assert_eq!(report.excluded, vec![false, false, false, true, false, false, false]);

        // every window covering increment 3 leaves it out
        for i in 0..vol.len() {
            let kept: Vec<f64> = (i..i + 3)
                .filter(|j| !report.excluded[*j])
                .map(|j| increments[j])
                .collect();
            let expected = kept.iter().map(|r| r * r).sum::<f64>() / ve.normalizer();
            assert!((vol.value_at(i).unwrap() - expected).abs() <= 1e-12 * expected);
        }
        assert!(vol.value_at(2).unwrap() < naive_window(&increments, 2, 3));
    }

    #[test]
    fn test_compute_values_matches_compute() {
        let prices = [100.0, 100.5, 100.2, 100.9, 100.4, 100.6, 100.1];
        let ve = VolatilityEstimator::new(DELTA, 3, TruncationPolicy::AdaptiveBipower { k: 3.0 })
            .unwrap();
        let vol = ve.compute(&series(&prices)).unwrap();
        assert_eq!(ve.compute_values(&prices).unwrap(), vol.values());
    }

    #[test]
    fn test_insufficient_data() {
        let ve = VolatilityEstimator::new(DELTA, 5, TruncationPolicy::NoTruncation).unwrap();
        let err = ve.compute(&series(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap_err();
        assert_eq!(err.errcode, ErrCode::InsufficientData);
        let err = ve.compute_values(&[1.0, -2.0]).unwrap_err();
        assert_eq!(err.errcode, ErrCode::PriceBelowZero);
    }

    #[test]
    fn test_invalid_config() {
        assert!(VolatilityEstimator::new(0.0, 5, TruncationPolicy::NoTruncation).is_err());
        assert!(VolatilityEstimator::new(DELTA, 0, TruncationPolicy::NoTruncation).is_err());
        let err = VolatilityEstimator::new(DELTA, 1, TruncationPolicy::AdaptiveBipower { k: 3.0 })
            .unwrap_err();
        assert_eq!(err.errcode, ErrCode::ConfigError);
    }
}
