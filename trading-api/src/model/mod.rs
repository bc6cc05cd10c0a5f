//! Data shapes shared between the record source, the committer and the
//! report.
//!
//! # Submodules
//! - [`trade`]: Trade records, directions and the trade-list document.
//! - [`batch`]: Index-tagged groups of records committed together.
//! - [`aggregate`]: Per-instrument aggregates and the best-trades report.

pub mod aggregate;
pub mod batch;
pub mod trade;
