pub mod vol_config;
