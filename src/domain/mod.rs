//! Domain types shared across ingest, preparation, modeling, and display.

pub mod types;

pub use types::*;
