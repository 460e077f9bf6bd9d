pub mod truncation_policy;
