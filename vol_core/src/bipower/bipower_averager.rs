use std::f64::consts::FRAC_PI_2;

use crate::common::{
    enums::BipowerScope,
    utils::{diff, mean},
    vol_exception::{VolException, VolResult},
};

/// Bipower variance per unit time, either per window position or for the whole day
#[derive(Debug, Clone, PartialEq)]
pub enum BipowerVariance {
    Local(Vec<f64>),
    Global(f64),
}

/// Jump-robust local variance: (π/2) · mean(|r_i|·|r_{i+1}|) / delta.
///
/// A single jump enters at most two neighbouring products, so its weight in
/// the average vanishes as the window grows.
#[derive(Debug, Clone, Copy)]
pub struct BipowerVarianceAverager {
    window: usize,
    delta: f64,
}

impl BipowerVarianceAverager {
    pub fn new(window: usize, delta: f64) -> VolResult<Self> {
        if window < 2 {
            return Err(VolException::config(format!(
                "bipower variation needs a window of at least 2 increments, got {}",
                window
            )));
        }
        if !(delta.is_finite() && delta > 0.0) {
            return Err(VolException::config(format!("delta must be positive, got {}", delta)));
        }
        Ok(Self { window, delta })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn average(&self, increments: &[f64], scope: BipowerScope) -> VolResult<BipowerVariance> {
        match scope {
            BipowerScope::Local => self.local(increments).map(BipowerVariance::Local),
            BipowerScope::Global => self.global(increments).map(BipowerVariance::Global),
        }
    }

    /// One value per window of `window` consecutive increments,
    /// `increments.len() - window + 1` values in total.
    pub fn local(&self, increments: &[f64]) -> VolResult<Vec<f64>> {
        if increments.len() < self.window {
            return Err(VolException::insufficient_data(format!(
                "{} increments cannot fill a bipower window of {}",
                increments.len(),
                self.window
            )));
        }
        let products = abs_products(increments);
        let pairs = (self.window - 1) as f64;
        Ok(products
            .windows(self.window - 1)
            .map(|w| self.scale(w.iter().sum::<f64>() / pairs))
            .collect())
    }

    /// Single value over every consecutive pair of the day
    pub fn global(&self, increments: &[f64]) -> VolResult<f64> {
        let products = abs_products(increments);
        mean(&products).map(|m| self.scale(m)).ok_or_else(|| {
            VolException::insufficient_data(format!(
                "{} increments do not form a consecutive pair",
                increments.len()
            ))
        })
    }

    fn scale(&self, mean_product: f64) -> f64 {
        FRAC_PI_2 * mean_product / self.delta
    }
}

fn abs_products(increments: &[f64]) -> Vec<f64> {
    increments.windows(2).map(|w| w[0].abs() * w[1].abs()).collect()
}

/// Bipower average computed straight from log prices
pub fn bipower_average_v(
    log_price: &[f64],
    window: usize,
    delta: f64,
    scope: BipowerScope,
) -> VolResult<BipowerVariance> {
    BipowerVarianceAverager::new(window, delta)?.average(&diff(log_price), scope)
}
