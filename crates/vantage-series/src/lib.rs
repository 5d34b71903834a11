//! Series transformations for the vantage toolkit.
//!
//! This crate turns raw provider batches into analysis-ready series:
//! - [`normalize`]: raw batch to canonical, strictly increasing series
//! - [`percentile`]: time-weighted historical percentile of a metric
//! - [`align`]: outer join of several metrics on their timestamps
//! - [`catalog`]: the declared metric sets for each entity kind
//!
//! # Example
//!
//! ```ignore
//! use vantage_series::{catalog, normalize::normalize, percentile::compute_historical_percentile};
//!
//! let metrics = catalog::valuation_metrics(entity.kind);
//! let series = normalize(&batch, entity.kind, &metrics)?;
//! let ranked = compute_historical_percentile(&series, "pe_ttm")?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod align;
pub mod catalog;
pub mod normalize;
pub mod percentile;

// Re-export key types
pub use align::{AlignConfig, GapPolicy, align_metrics};
pub use normalize::{DuplicatePolicy, Normalizer, NormalizerConfig, check_schema, normalize};
pub use percentile::{PERCENTILE_COLUMN, PercentileConfig, compute_historical_percentile};
