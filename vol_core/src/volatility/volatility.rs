use chrono::NaiveDateTime;

use crate::common::vol_exception::{ErrCode, VolException, VolResult};

/// Variance per unit time at one intraday position.
///
/// `Undefined` means every increment of the window was truncated, which is
/// not the same thing as zero volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    Value(f64),
    Undefined,
}

impl Estimate {
    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Value(v) => Some(*v),
            Estimate::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Estimate::Value(_))
    }
}

impl From<Option<f64>> for Estimate {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Estimate::Undefined, Estimate::Value)
    }
}

/// Rolling-window estimates of one day, each paired with its timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Volatility {
    values: Vec<Estimate>,
    dt: Vec<NaiveDateTime>,
}

impl Volatility {
    pub fn new(values: Vec<Estimate>, dt: Vec<NaiveDateTime>) -> VolResult<Self> {
        if values.len() != dt.len() {
            return Err(VolException::new(
                format!("{} estimates for {} timestamps", values.len(), dt.len()),
                ErrCode::DataNotAlign,
            ));
        }
        Ok(Self { values, dt })
    }

    pub fn values(&self) -> &[Estimate] {
        &self.values
    }

    pub fn dt(&self) -> &[NaiveDateTime] {
        &self.dt
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<(NaiveDateTime, Estimate)> {
        Some((*self.dt.get(idx)?, *self.values.get(idx)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, Estimate)> + '_ {
        self.dt.iter().copied().zip(self.values.iter().copied())
    }

    /// Numeric estimate at `idx`; a truncated-out position is an error here
    pub fn value_at(&self, idx: usize) -> VolResult<f64> {
        match self.values.get(idx) {
            Some(Estimate::Value(v)) => Ok(*v),
            Some(Estimate::Undefined) => Err(VolException::new(
                format!("every increment of the window ending {} was truncated", self.dt[idx]),
                ErrCode::UndefinedEstimate,
            )),
            None => Err(VolException::insufficient_data(format!(
                "position {} out of {} estimates",
                idx,
                self.len()
            ))),
        }
    }

    pub fn undefined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_defined()).count()
    }

    pub fn defined_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Estimate::value).collect()
    }

    /// First `len` positions, used to align days of different length
    pub(crate) fn head(&self, len: usize) -> (&[Estimate], &[NaiveDateTime]) {
        let len = len.min(self.len());
        (&self.values[..len], &self.dt[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::price_series::tests::seconds_from_open;

    fn sample() -> Volatility {
        Volatility::new(
            vec![Estimate::Value(0.2), Estimate::Undefined, Estimate::Value(0.0)],
            seconds_from_open(3),
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let vol = sample();
        assert_eq!(vol.len(), 3);
        assert_eq!(vol.undefined_count(), 1);
        assert_eq!(vol.defined_values(), vec![0.2, 0.0]);
        assert_eq!(vol.get(1).unwrap().1, Estimate::Undefined);
        assert!(vol.get(3).is_none());
        assert_eq!(vol.iter().count(), 3);
    }

    #[test]
    fn test_value_at_distinguishes_zero_from_undefined() {
        let vol = sample();
        assert_eq!(vol.value_at(2).unwrap(), 0.0);
        assert_eq!(vol.value_at(1).unwrap_err().errcode, ErrCode::UndefinedEstimate);
        assert_eq!(vol.value_at(7).unwrap_err().errcode, ErrCode::InsufficientData);
    }

    #[test]
    fn test_rejects_misaligned() {
        let err = Volatility::new(vec![Estimate::Value(1.0)], seconds_from_open(2)).unwrap_err();
        assert_eq!(err.errcode, ErrCode::DataNotAlign);
    }

    #[test]
    fn test_head() {
        let vol = sample();
        let (values, dt) = vol.head(2);
        assert_eq!(values.len(), 2);
        assert_eq!(dt.len(), 2);
        assert_eq!(vol.head(10).0.len(), 3);
    }
}
