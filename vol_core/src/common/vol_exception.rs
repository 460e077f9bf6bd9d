use strum_macros::{Display, EnumString};

/// Error codes for the volatility system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Config errors (0-99)
    #[strum(serialize = "_CONFIG_ERR_BEGIN")]
    ConfigErrBegin = 0,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 1,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 2,
    #[strum(serialize = "_CONFIG_ERR_END")]
    ConfigErrEnd = 99,

    // Price data errors (200-299)
    #[strum(serialize = "_DATA_ERR_BEGIN")]
    DataErrBegin = 200,
    #[strum(serialize = "PRICE_BELOW_ZERO")]
    PriceBelowZero = 201,
    #[strum(serialize = "DATA_NOT_ALIGN")]
    DataNotAlign = 202,
    #[strum(serialize = "TIME_NOT_MONOTONOUS")]
    TimeNotMonotonous = 203,
    #[strum(serialize = "INSUFFICIENT_DATA")]
    InsufficientData = 204,
    #[strum(serialize = "UNDEFINED_ESTIMATE")]
    UndefinedEstimate = 205,
    #[strum(serialize = "_DATA_ERR_END")]
    DataErrEnd = 299,
}

impl ErrCode {
    pub fn is_data_err(&self) -> bool {
        let code = *self as i32;
        code > Self::DataErrBegin as i32 && code < Self::DataErrEnd as i32
    }

    pub fn is_config_err(&self) -> bool {
        let code = *self as i32;
        code > Self::ConfigErrBegin as i32 && code < Self::ConfigErrEnd as i32
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{errcode}: {msg}")]
pub struct VolException {
    pub errcode: ErrCode,
    pub msg: String,
}

impl VolException {
    pub fn new(message: impl Into<String>, code: ErrCode) -> Self {
        Self {
            errcode: code,
            msg: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::ConfigError)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::InsufficientData)
    }

    pub fn is_data_err(&self) -> bool {
        self.errcode.is_data_err()
    }

    pub fn is_config_err(&self) -> bool {
        self.errcode.is_config_err()
    }
}

pub type VolResult<T> = Result<T, VolException>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_err_code_ranges() {
        assert!(ErrCode::ConfigError.is_config_err());
        assert!(!ErrCode::ConfigError.is_data_err());
        assert!(ErrCode::InsufficientData.is_data_err());
        assert!(ErrCode::UndefinedEstimate.is_data_err());
        assert!(!ErrCode::DataErrEnd.is_data_err());
    }

    #[test]
    fn test_display() {
        let err = VolException::insufficient_data("need 3 prices, got 2");
        assert_eq!(err.to_string(), "INSUFFICIENT_DATA: need 3 prices, got 2");
        assert_eq!(
            ErrCode::from_str("PRICE_BELOW_ZERO").unwrap(),
            ErrCode::PriceBelowZero
        );
    }
}
