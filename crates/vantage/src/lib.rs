#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vantage/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # vantage
//!
//! Valuation percentile and fundamentals toolkit for indices and equities.
//!
//! vantage is an umbrella crate that re-exports the vantage sub-crates and
//! wires them into two pipelines:
//!
//! - [`valuation`]: trailing P/E and its time-weighted historical percentile
//! - [`fundamentals`]: profitability and growth metrics aligned by reporting date
//!
//! ## Quick Start
//!
//! ```ignore
//! use vantage::{AnalysisRequest, EntityKind, valuation};
//! use vantage::ifind::{DEFAULT_TIMEOUT, IfindClient};
//!
//! # async fn example() -> vantage::Result<()> {
//! let provider = IfindClient::from_env(DEFAULT_TIMEOUT).await?;
//! let request = AnalysisRequest::parse(
//!     "000596.SZ", "2016-01-01", "2021-03-09", "Gujing Gongjiu", EntityKind::Equity,
//! )?;
//! let report = valuation(&provider, &request).await?;
//! if let Some(latest) = report.latest() {
//!     println!("{}: PE {:.1} at {:.0}% ({})", latest.date, latest.pe_ttm, latest.percentile, latest.zone);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types, errors and the provider boundary
//! - [`series`] - Normalizer, percentile engine, alignment engine, metric catalog
//! - [`ifind`] - iFinD quant API provider
//! - [`report`] - SVG chart rendering

/// Version information for the vantage crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod pipeline;

pub use pipeline::{
    AnalysisRequest, FundamentalReport, HIGH_ZONE_THRESHOLD, LOW_ZONE_THRESHOLD, LatestValuation,
    ValuationReport, ValuationZone, fundamentals, valuation,
};

/// Core types, errors and the provider boundary.
pub mod traits {
    pub use vantage_traits::*;
}

// Re-export common types at top level for convenience
pub use vantage_traits::{
    Date, EntityKind, EntityRef, MarketDataProvider, NormalizedSeries, QueryWindow, Result,
    VantageError,
};

/// Series transformations.
///
/// ## Normalizer
///
/// Turns a raw provider batch into a strictly increasing, duplicate-free
/// series whose columns are the declared metric fields.
///
/// ## Historical percentile
///
/// ```text
/// percentile_i = 100 × (rank_i − 1) / (n − 1)
/// ```
///
/// with fractional ranks for ties and 50 for a single observation.
///
/// ## Alignment
///
/// Outer join of per-metric series on the union of their timestamps, gaps
/// left missing or forward filled.
pub mod series {
    pub use vantage_series::*;
}

/// iFinD quant API provider.
///
/// ## Setup
///
/// Set `IFIND_REFRESH_TOKEN` in the environment or a `.env` file.
pub mod ifind {
    pub use vantage_ifind::*;
}

/// SVG chart rendering.
pub mod report {
    pub use vantage_report::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use vantage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::series::{GapPolicy, catalog::PE_TTM};
    pub use crate::{
        AnalysisRequest, EntityKind, MarketDataProvider, Result, ValuationZone, VantageError,
        fundamentals, valuation,
    };
}
