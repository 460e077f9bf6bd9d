pub mod enums;
pub mod utils;
pub mod vol_exception;
