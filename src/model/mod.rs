//! ARIMA estimation.
//!
//! - differencing/integration helpers (`diff`)
//! - the conditional-least-squares estimator (`arima`)

pub mod arima;
pub mod diff;

pub use arima::*;
pub use diff::*;
