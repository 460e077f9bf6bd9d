use chrono::NaiveTime;

use crate::common::{
    enums::PatternMode,
    utils::mean,
    vol_exception::{ErrCode, VolException, VolResult},
};
use crate::volatility::volatility::Estimate;

/// Lengths of the day series that went into a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub min_len: usize,
    pub max_len: usize,
}

impl Alignment {
    /// Positions cut from the longest day to match the shortest one
    pub fn dropped_positions(&self) -> usize {
        self.max_len - self.min_len
    }
}

/// Diurnal volatility pattern: one aggregate per intraday position
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    values: Vec<Estimate>,
    time_of_day: Vec<NaiveTime>,
    days: usize,
    mode: PatternMode,
    normalized: bool,
    alignment: Alignment,
}

impl Pattern {
    pub(crate) fn new(
        values: Vec<Estimate>,
        time_of_day: Vec<NaiveTime>,
        days: usize,
        mode: PatternMode,
        alignment: Alignment,
    ) -> Self {
        debug_assert_eq!(values.len(), time_of_day.len());
        Self {
            values,
            time_of_day,
            days,
            mode,
            normalized: false,
            alignment,
        }
    }

    pub fn values(&self) -> &[Estimate] {
        &self.values
    }

    pub fn time_of_day(&self) -> &[NaiveTime] {
        &self.time_of_day
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of days that contributed
    pub fn days(&self) -> usize {
        self.days
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn defined_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Estimate::value).collect()
    }

    /// Pattern divided by the mean of its defined values, hence dimensionless
    pub fn normalized(&self) -> VolResult<Self> {
        let level = mean(&self.defined_values())
            .filter(|m| *m > 0.0 && m.is_finite())
            .ok_or_else(|| {
                VolException::new(
                    "pattern has no positive level to normalize by",
                    ErrCode::UndefinedEstimate,
                )
            })?;
        Ok(Self {
            values: self
                .values
                .iter()
                .map(|v| Estimate::from(v.value().map(|x| x / level)))
                .collect(),
            normalized: true,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(values: Vec<Estimate>) -> Pattern {
        let time_of_day = (0..values.len() as u32)
            .map(|s| NaiveTime::from_hms_opt(10, 0, s).unwrap())
            .collect();
        let len = values.len();
        Pattern::new(
            values,
            time_of_day,
            3,
            PatternMode::Mean,
            Alignment {
                min_len: len,
                max_len: len + 2,
            },
        )
    }

    #[test]
    fn test_normalized() {
        let p = pattern(vec![Estimate::Value(1.0), Estimate::Undefined, Estimate::Value(3.0)]);
        let n = p.normalized().unwrap();
        assert!(n.is_normalized());
        assert_eq!(
            n.values(),
            &[Estimate::Value(0.5), Estimate::Undefined, Estimate::Value(1.5)]
        );
        assert_eq!(n.days(), 3);
        assert_eq!(n.alignment().dropped_positions(), 2);
    }

    #[test]
    fn test_normalized_without_level() {
        let p = pattern(vec![Estimate::Undefined, Estimate::Undefined]);
        assert_eq!(p.normalized().unwrap_err().errcode, ErrCode::UndefinedEstimate);
        let p = pattern(vec![Estimate::Value(0.0)]);
        assert!(p.normalized().is_err());
    }
}
