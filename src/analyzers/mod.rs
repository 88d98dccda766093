//! KPI engines over the stored point log.
//!
//! Rows are first collapsed to one canonical rally each, then reduced per
//! team in a single pass. [`set_kpis`] reports one set with its insights,
//! [`rollup`] spans several matches and keys players by cross-match identity.

pub mod consolidate;
pub mod distribution;
pub mod insights;
pub mod rollup;
pub mod set_kpis;
pub mod tally;
pub mod types;
pub mod utility;

pub use consolidate::consolidate;
pub use rollup::{RollupFilter, compute_rollup};
pub use set_kpis::compute_set_kpis;
