use std::str::FromStr;

use crate::bipower::bipower_averager::BipowerVarianceAverager;
use crate::common::{
    enums::TruncationMethod,
    utils::std_dev,
    vol_exception::{VolException, VolResult},
};

/// Magnitude above which an increment counts as a jump.
///
/// `Local` holds one threshold per increment, so an increment is either
/// dropped from every window covering it or from none.
#[derive(Debug, Clone, PartialEq)]
pub enum TruncationThreshold {
    Global(f64),
    Local(Vec<f64>),
}

impl TruncationThreshold {
    /// Threshold applied to increment `j`
    pub fn at(&self, j: usize) -> f64 {
        match self {
            TruncationThreshold::Global(value) => *value,
            TruncationThreshold::Local(values) => values[j],
        }
    }

    /// The one truncation rule: strictly larger than the threshold is dropped
    #[inline]
    pub fn excludes(&self, j: usize, increment: f64) -> bool {
        increment.abs() > self.at(j)
    }

    /// Exclusion flag of every increment of the day
    pub fn mask(&self, increments: &[f64]) -> Vec<bool> {
        increments
            .iter()
            .enumerate()
            .map(|(j, r)| self.excludes(j, *r))
            .collect()
    }

    pub fn is_global(&self) -> bool {
        matches!(self, TruncationThreshold::Global(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TruncationPolicy {
    NoTruncation,
    /// k times the standard deviation of the whole day's increments
    FixedStd { k: f64 },
    /// k times the bipower volatility of the window ending at each increment
    AdaptiveBipower { k: f64 },
}

impl From<TruncationMethod> for TruncationPolicy {
    fn from(method: TruncationMethod) -> Self {
        match method {
            TruncationMethod::Std3 => TruncationPolicy::FixedStd { k: 3.0 },
            TruncationMethod::Std5 => TruncationPolicy::FixedStd { k: 5.0 },
            TruncationMethod::Bivar3 => TruncationPolicy::AdaptiveBipower { k: 3.0 },
            TruncationMethod::Bivar5 => TruncationPolicy::AdaptiveBipower { k: 5.0 },
            TruncationMethod::NoTruncation => TruncationPolicy::NoTruncation,
        }
    }
}

impl FromStr for TruncationPolicy {
    type Err = VolException;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        TruncationMethod::from_str(name)
            .map(Self::from)
            .map_err(|_| VolException::config(format!("unknown truncation_method={}", name)))
    }
}

impl TruncationPolicy {
    pub fn threshold(
        &self,
        increments: &[f64],
        window: usize,
        delta: f64,
    ) -> VolResult<TruncationThreshold> {
        match *self {
            TruncationPolicy::NoTruncation => Ok(TruncationThreshold::Global(f64::INFINITY)),
            TruncationPolicy::FixedStd { k } => {
                check_multiplier(k)?;
                let sd = std_dev(increments).ok_or_else(|| {
                    VolException::insufficient_data("no increments to measure dispersion on")
                })?;
                Ok(TruncationThreshold::Global(k * sd))
            }
            TruncationPolicy::AdaptiveBipower { k } => {
                check_multiplier(k)?;
                let local = BipowerVarianceAverager::new(window, delta)?.local(increments)?;
                // increments before the first full window borrow its level
                let per_increment = (0..increments.len())
                    .map(|j| k * (local[(j + 1).saturating_sub(window)] * delta).sqrt())
                    .collect();
                Ok(TruncationThreshold::Local(per_increment))
            }
        }
    }

    /// Increments kept across all window positions, counted once per position
    pub fn retained_count(&self, increments: &[f64], window: usize, delta: f64) -> VolResult<usize> {
        let excluded = self.threshold(increments, window, delta)?.mask(increments);
        let positions = (increments.len() + 1).saturating_sub(window);
        Ok((0..positions)
            .map(|i| excluded[i..i + window].iter().filter(|e| !**e).count())
            .sum())
    }
}

fn check_multiplier(k: f64) -> VolResult<()> {
    if k.is_finite() && k >= 0.0 {
        Ok(())
    } else {
        Err(VolException::config(format!("truncation multiplier must be >= 0, got {}", k)))
    }
}
