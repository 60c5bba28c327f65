#![forbid(unsafe_code)]
//! satrank-core: shared data model for the satrank analytics engine.
//!
//! # Conventions
//!
//! - **Errors**: library errors are [`error::AnalysisError`] (thiserror);
//!   binaries wrap with `anyhow::Result`.
//! - **Units**: all amounts, fees, and weights are millisatoshi unless a
//!   field name says otherwise (`capacity_sat`).

pub mod config;
pub mod error;
pub mod report;
pub mod snapshot;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use report::AnalysisReport;
pub use snapshot::{ChannelRecord, NodeRecord, Snapshot};
