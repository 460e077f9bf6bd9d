use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum TruncationMethod {
    #[strum(serialize = "STD3")]
    Std3,
    #[strum(serialize = "STD5")]
    Std5,
    #[strum(serialize = "BIVAR3")]
    Bivar3,
    #[strum(serialize = "BIVAR5")]
    Bivar5,
    #[strum(serialize = "NONE")]
    NoTruncation,
}

impl TruncationMethod {
    /// Threshold multiplier carried by the method name
    pub fn multiplier(&self) -> Option<f64> {
        match self {
            TruncationMethod::Std3 | TruncationMethod::Bivar3 => Some(3.0),
            TruncationMethod::Std5 | TruncationMethod::Bivar5 => Some(5.0),
            TruncationMethod::NoTruncation => None,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, TruncationMethod::Bivar3 | TruncationMethod::Bivar5)
    }
}

/// How days are combined at each intraday position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum PatternMode {
    #[default]
    #[strum(serialize = "MEAN")]
    Mean,
    #[strum(serialize = "MEDIAN")]
    Median,
    /// Each day is divided by its own average level first
    #[strum(serialize = "DAY_NORMALIZED_MEAN")]
    DayNormalizedMean,
}

/// Whether a bipower average is wanted per window or over the whole day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BipowerScope {
    Local,
    Global,
}
