use rayon::prelude::*;
use tracing::{debug, warn};

use super::pattern::{Alignment, Pattern};
use crate::common::{
    enums::PatternMode,
    utils::{mean, median},
    vol_exception::{VolException, VolResult},
};
use crate::config::vol_config::VolConfig;
use crate::volatility::volatility::{Estimate, Volatility};

/// Reduces many days of rolling volatility to a diurnal pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternAggregator {
    mode: PatternMode,
    normalize: bool,
}

impl PatternAggregator {
    pub fn new(mode: PatternMode) -> Self {
        Self {
            mode,
            normalize: false,
        }
    }

    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn from_config(config: &VolConfig) -> Self {
        Self::new(config.pattern_mode).with_normalization(config.normalize_pattern)
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// Aggregate all days position by position.
    ///
    /// Days are cut to the shortest one. Undefined estimates are left out of
    /// their position; a position with no defined estimate stays undefined.
    pub fn pattern(&self, volatilities: &[Volatility]) -> VolResult<Pattern> {
        let first = volatilities
            .first()
            .ok_or_else(|| VolException::insufficient_data("no volatility series to aggregate"))?;
        let alignment = alignment_of(volatilities);
        if alignment.dropped_positions() > 0 {
            warn!(
                days = volatilities.len(),
                min_len = alignment.min_len,
                max_len = alignment.max_len,
                "volatility series differ in length, truncating to the shortest"
            );
        }

        let days = self.scaled_days(volatilities, alignment.min_len)?;
        let values = (0..alignment.min_len)
            .map(|pos| {
                let column: Vec<f64> = days.iter().filter_map(|day| day[pos].value()).collect();
                Estimate::from(match self.mode {
                    PatternMode::Median => median(&column),
                    PatternMode::Mean | PatternMode::DayNormalizedMean => mean(&column),
                })
            })
            .collect();
        let time_of_day = first.head(alignment.min_len).1.iter().map(|dt| dt.time()).collect();

        let pattern = Pattern::new(values, time_of_day, days.len(), self.mode, alignment);
        if self.normalize {
            pattern.normalized()
        } else {
            Ok(pattern)
        }
    }

    /// One pattern per consecutive block of `window_pattern` days.
    ///
    /// A trailing block shorter than `window_pattern` is dropped, so asking
    /// for more days than available yields no pattern at all. A block whose
    /// days carry no usable level comes back as an all-undefined pattern
    /// with zero contributing days.
    pub fn rolling_patterns(
        &self,
        volatilities: &[Volatility],
        window_pattern: usize,
    ) -> VolResult<Vec<Pattern>> {
        if window_pattern < 1 {
            return Err(VolException::config("window_pattern must be >= 1"));
        }
        let leftover = volatilities.len() % window_pattern;
        if leftover > 0 {
            debug!(
                days = volatilities.len(),
                window_pattern,
                leftover,
                "dropping incomplete trailing block"
            );
        }
        volatilities
            .par_chunks_exact(window_pattern)
            .enumerate()
            .map(|(idx, block)| match self.pattern(block) {
                Err(e) if e.is_data_err() => {
                    warn!(block = idx, error = %e, "sub-period pattern undefined");
                    Ok(undefined_pattern(block, self.mode))
                }
                other => other,
            })
            .collect()
    }

    /// Aligned estimates of each day, rescaled by the day's own level when
    /// the mode asks for it
    fn scaled_days(&self, volatilities: &[Volatility], len: usize) -> VolResult<Vec<Vec<Estimate>>> {
        let aligned = volatilities.iter().map(|vol| vol.head(len).0);
        if self.mode != PatternMode::DayNormalizedMean {
            return Ok(aligned.map(<[Estimate]>::to_vec).collect());
        }

        let mut days = Vec::with_capacity(volatilities.len());
        for (idx, values) in aligned.enumerate() {
            let defined: Vec<f64> = values.iter().filter_map(Estimate::value).collect();
            match mean(&defined).filter(|m| *m > 0.0) {
                Some(level) => days.push(
                    values
                        .iter()
                        .map(|v| Estimate::from(v.value().map(|x| x / level)))
                        .collect(),
                ),
                None => warn!(day = idx, "day has no positive volatility level, skipped"),
            }
        }
        if days.is_empty() {
            return Err(VolException::insufficient_data(
                "no day has a usable volatility level",
            ));
        }
        Ok(days)
    }
}

fn alignment_of(volatilities: &[Volatility]) -> Alignment {
    Alignment {
        min_len: volatilities.iter().map(Volatility::len).min().unwrap_or(0),
        max_len: volatilities.iter().map(Volatility::len).max().unwrap_or(0),
    }
}

fn undefined_pattern(block: &[Volatility], mode: PatternMode) -> Pattern {
    let alignment = alignment_of(block);
    let time_of_day = block
        .first()
        .map(|day| day.head(alignment.min_len).1.iter().map(|dt| dt.time()).collect())
        .unwrap_or_default();
    Pattern::new(
        vec![Estimate::Undefined; alignment.min_len],
        time_of_day,
        0,
        mode,
        alignment,
    )
}
