//! Market data provider boundary.
//!
//! The provider is an external collaborator: vantage only describes what it
//! asks for ([`DataRequest`]) and what it expects back ([`RawBatch`]). Sessions,
//! credentials and transport live in the implementation, which is passed to
//! the pipeline explicitly.

use crate::{MetricSpec, QueryWindow, RawBatch, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single provider request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequest {
    /// Entity code.
    pub code: String,
    /// Requested metrics, in the order their columns are expected back.
    pub metrics: Vec<MetricSpec>,
    /// Cadence/fill directives in provider syntax, e.g. `Interval:Q,Fill:Blank`.
    pub directives: String,
    /// Inclusive date window.
    pub window: QueryWindow,
}

impl DataRequest {
    /// Provider indicator ids, in request order.
    pub fn indicator_ids(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.id.as_str()).collect()
    }

    /// Provider parameters, aligned 1:1 with [`DataRequest::indicator_ids`].
    pub fn indicator_params(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.param.as_str()).collect()
    }
}

/// Source of raw metric batches.
///
/// Implementations perform one blocking round trip per call, with no retry:
/// a failure is returned to the caller as is.
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use vantage_traits::{DataRequest, MarketDataProvider, RawBatch, Result};
///
/// struct Empty;
///
/// #[async_trait]
/// impl MarketDataProvider for Empty {
///     fn name(&self) -> &str {
///         "empty"
///     }
///
///     async fn fetch(&self, request: &DataRequest) -> Result<RawBatch> {
///         let columns = request.metrics.iter().map(|m| m.id.clone()).collect();
///         Ok(RawBatch::new(request.code.clone(), columns))
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fetches the raw batch for `request`.
    ///
    /// # Errors
    ///
    /// Transport failures surface as [`crate::VantageError::DataFetch`],
    /// undecodable payloads as [`crate::VantageError::MalformedData`].
    async fn fetch(&self, request: &DataRequest) -> Result<RawBatch>;
}
