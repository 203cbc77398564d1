//! Utility modules for the Red List Index pipeline
//!
//! Contains shared functionality used across multiple stages:
//! - Stats: mean, linear percentiles, least-squares lines, gap interpolation
//! - Frame helpers: required-column selection with validation

pub mod frame_helpers;
pub mod stats;

// Re-export commonly used helpers
pub use frame_helpers::{missing_columns, rename_legacy_column, select_required};
pub use stats::{forward_fill, interpolate_gaps, mean, percentile, LinearFit};
