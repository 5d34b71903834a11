#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for the vantage valuation toolkit.
//!
//! This crate holds the vocabulary shared by every other vantage crate: the
//! entity and window a request is made for, the raw batch a provider hands
//! back, the normalized series the engines produce, the error taxonomy, and
//! the [`MarketDataProvider`] boundary itself.

/// The version of the vantage-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod batch;
pub mod error;
pub mod metric;
pub mod provider;
pub mod series;
pub mod stats;
pub mod types;

// Re-exports
pub use batch::{RawBatch, RawRow, RawValue};
pub use error::{Result, VantageError};
pub use metric::MetricSpec;
pub use provider::{DataRequest, MarketDataProvider};
pub use series::{MetricColumn, NormalizedSeries};
pub use types::{Date, EntityKind, EntityRef, QueryWindow};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
