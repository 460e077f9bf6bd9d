use chrono::NaiveDateTime;

use crate::common::{
    utils::diff,
    vol_exception::{ErrCode, VolException, VolResult},
};

/// One trading day of prices with aligned timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dt: Vec<NaiveDateTime>,
    prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new(dt: Vec<NaiveDateTime>, prices: Vec<f64>) -> VolResult<Self> {
        if dt.len() != prices.len() {
            return Err(VolException::new(
                format!("{} timestamps for {} prices", dt.len(), prices.len()),
                ErrCode::DataNotAlign,
            ));
        }
        check_prices(&prices)?;
        if let Some(pair) = dt.windows(2).find(|w| w[1] <= w[0]) {
            return Err(VolException::new(
                format!("time {} does not follow {}", pair[1], pair[0]),
                ErrCode::TimeNotMonotonous,
            ));
        }
        Ok(Self { dt, prices })
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn dt(&self) -> &[NaiveDateTime] {
        &self.dt
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Keep every `factor`-th observation starting at index 0.
    ///
    /// The result has `len / factor` observations: a trailing block shorter
    /// than `factor` contributes nothing.
    pub fn subsample(&self, factor: usize) -> VolResult<Self> {
        if factor < 1 {
            return Err(VolException::config(format!(
                "subsampling factor must be >= 1, got {}",
                factor
            )));
        }
        let kept = self.len() / factor;
        Ok(Self {
            dt: self.dt.iter().step_by(factor).take(kept).copied().collect(),
            prices: self.prices.iter().step_by(factor).take(kept).copied().collect(),
        })
    }

    pub fn log_prices(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.ln()).collect()
    }

    /// `increment[i] = ln(p[i + 1]) - ln(p[i])`
    pub fn log_increments(&self) -> Vec<f64> {
        log_increments(&self.prices)
    }
}

/// Every price must be a finite positive number
pub(crate) fn check_prices(prices: &[f64]) -> VolResult<()> {
    match prices.iter().position(|p| !p.is_finite() || *p <= 0.0) {
        Some(idx) => Err(VolException::new(
            format!("price={} at index {} is not a positive number", prices[idx], idx),
            ErrCode::PriceBelowZero,
        )),
        None => Ok(()),
    }
}

pub(crate) fn log_increments(prices: &[f64]) -> Vec<f64> {
    let log_price: Vec<f64> = prices.iter().map(|p| p.ln()).collect();
    diff(&log_price)
}
