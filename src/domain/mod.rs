//! Core domain types and logic.

pub mod panel;
pub mod returns;
pub mod signal;
pub mod weights;
pub mod backtest;
pub mod metrics;
pub mod universe;
pub mod config_validation;
pub mod error;
