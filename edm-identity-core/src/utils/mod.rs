//! Utility modules

pub mod datetime;
pub mod validation;
