use std::collections::HashMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::{
    enums::{PatternMode, TruncationMethod},
    vol_exception::{ErrCode, VolException, VolResult},
};

/// Trading days per year used by the default `delta`
pub const TRADING_DAYS: f64 = 252.0;
/// Seconds in a regular US equity session (6.5 hours)
pub const SECONDS_PER_SESSION: f64 = 23400.0;

/// Volatility analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VolConfig {
    /// Time between two observations as a fraction of a trading year
    pub delta: f64,
    pub window: usize,
    pub truncation_method: TruncationMethod,
    pub window_pattern: usize,
    pub subsampling: usize,
    pub pattern_mode: PatternMode,
    pub normalize_pattern: bool,
    pub min_days: usize,
}

impl Default for VolConfig {
    fn default() -> Self {
        Self {
            delta: default_delta(1),
            window: 300,
            truncation_method: TruncationMethod::Std3,
            window_pattern: 20,
            subsampling: 1,
            pattern_mode: PatternMode::Mean,
            normalize_pattern: false,
            min_days: 1,
        }
    }
}

/// One-second sampling scaled by the subsampling factor
pub fn default_delta(subsampling: usize) -> f64 {
    1.0 / (TRADING_DAYS * SECONDS_PER_SESSION) * subsampling as f64
}

impl VolConfig {
    pub fn new(conf: Option<HashMap<String, Value>>) -> VolResult<Self> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());
        let defaults = Self::default();

        let subsampling: usize = conf.get("subsampling")?.unwrap_or(defaults.subsampling);
        let truncation_method = match conf.get::<String>("truncation_method")? {
            Some(name) => TruncationMethod::from_str(&name).map_err(|_| {
                VolException::config(format!("unknown truncation_method={}", name))
            })?,
            None => defaults.truncation_method,
        };
        let pattern_mode = match conf.get::<String>("pattern_mode")? {
            Some(name) => PatternMode::from_str(&name)
                .map_err(|_| VolException::config(format!("unknown pattern_mode={}", name)))?,
            None => defaults.pattern_mode,
        };

        let config = Self {
            delta: conf.get("delta")?.unwrap_or_else(|| default_delta(subsampling)),
            window: conf.get("window")?.unwrap_or(defaults.window),
            truncation_method,
            window_pattern: conf.get("window_pattern")?.unwrap_or(defaults.window_pattern),
            subsampling,
            pattern_mode,
            normalize_pattern: conf.get("normalize_pattern")?.unwrap_or(defaults.normalize_pattern),
            min_days: conf.get("min_days")?.unwrap_or(defaults.min_days),
        };

        conf.check()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VolResult<()> {
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(VolException::config(format!("delta must be positive, got {}", self.delta)));
        }
        if self.window < 1 {
            return Err(VolException::config("window must be >= 1"));
        }
        if self.truncation_method.is_adaptive() && self.window < 2 {
            return Err(VolException::config(format!(
                "{} needs window >= 2",
                self.truncation_method
            )));
        }
        if self.window_pattern < 1 {
            return Err(VolException::config("window_pattern must be >= 1"));
        }
        if self.subsampling < 1 {
            return Err(VolException::config("subsampling must be >= 1"));
        }
        Ok(())
    }
}

/// Key/value configuration that remembers which keys were read, so that
/// unknown keys can be reported once parsing is done.
struct ConfigWithCheck {
    conf: HashMap<String, Value>,
}

impl ConfigWithCheck {
    fn new(conf: HashMap<String, Value>) -> Self {
        Self { conf }
    }

    fn get<T: DeserializeOwned>(&mut self, key: &str) -> VolResult<Option<T>> {
        match self.conf.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                VolException::new(format!("invalid {}={}: {}", key, value, e), ErrCode::ParaError)
            }),
        }
    }

    fn check(&self) -> VolResult<()> {
        if self.conf.is_empty() {
            return Ok(());
        }
        let mut keys: Vec<&str> = self.conf.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Err(VolException::config(format!("unknown para = {}", keys.join(", "))))
    }
}
