use rayon::prelude::*;
use tracing::{info, warn};

use crate::common::vol_exception::{VolException, VolResult};
use crate::config::vol_config::VolConfig;
use crate::pattern::{pattern::Pattern, pattern_aggregator::PatternAggregator};
use crate::price::price_series::PriceSeries;
use crate::volatility::{volatility::Volatility, volatility_estimator::VolatilityEstimator};

/// A day that could not produce a volatility series
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDay {
    /// Position of the day in the input slice
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct DiurnalReport {
    /// Per-day volatility, in input order, skipped days left out
    pub volatilities: Vec<Volatility>,
    pub full: Pattern,
    /// Patterns of consecutive `window_pattern`-day blocks
    pub rolling: Vec<Pattern>,
    pub skipped: Vec<SkippedDay>,
}

/// Runs the estimator over many days and aggregates the results
#[derive(Debug, Clone)]
pub struct DiurnalAnalyzer {
    config: VolConfig,
    estimator: VolatilityEstimator,
    aggregator: PatternAggregator,
}

impl DiurnalAnalyzer {
    pub fn new(config: VolConfig) -> VolResult<Self> {
        config.validate()?;
        Ok(Self {
            estimator: VolatilityEstimator::from_config(&config)?,
            aggregator: PatternAggregator::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &VolConfig {
        &self.config
    }

    pub fn estimator(&self) -> &VolatilityEstimator {
        &self.estimator
    }

    /// Subsample and estimate every day independently, in parallel.
    /// Results keep the input order.
    pub fn compute_days(&self, days: &[PriceSeries]) -> Vec<VolResult<Volatility>> {
        days.par_iter()
            .map(|day| {
                let day = day.subsample(self.config.subsampling)?;
                self.estimator.compute(&day)
            })
            .collect()
    }

    pub fn run(&self, days: &[PriceSeries]) -> VolResult<DiurnalReport> {
        let mut volatilities = Vec::with_capacity(days.len());
        let mut skipped = Vec::new();
        for (index, result) in self.compute_days(days).into_iter().enumerate() {
            match result {
                Ok(vol) => volatilities.push(vol),
                Err(e) if e.is_data_err() => {
                    warn!(day = index, error = %e, "skipping day");
                    skipped.push(SkippedDay {
                        index,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let required = self.config.min_days.max(1);
        if volatilities.len() < required {
            return Err(VolException::insufficient_data(format!(
                "{} usable days, {} required",
                volatilities.len(),
                required
            )));
        }

        let full = self.aggregator.pattern(&volatilities)?;
        let rolling = self
            .aggregator
            .rolling_patterns(&volatilities, self.config.window_pattern)?;
        info!(
            days = volatilities.len(),
            skipped = skipped.len(),
            positions = full.len(),
            blocks = rolling.len(),
            "diurnal pattern ready"
        );

        Ok(DiurnalReport {
            volatilities,
            full,
            rolling,
            skipped,
        })
    }
}
