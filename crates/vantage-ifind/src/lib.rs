//! iFinD quant API client for vantage.
//!
//! Implements [`vantage_traits::MarketDataProvider`] over the iFinD HTTP
//! `date_sequence` endpoint. A session is created once, from a refresh
//! token, and then passed to the pipeline explicitly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vantage_ifind::{DEFAULT_TIMEOUT, IfindClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IfindClient::from_env(DEFAULT_TIMEOUT).await?;
//!     let request = vantage_series::catalog::request(analysis, &entity, window);
//!     let batch = client.fetch(&request).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `IFIND_REFRESH_TOKEN` in your environment or `.env` file:
//!
//! ```bash
//! IFIND_REFRESH_TOKEN=your_refresh_token_here
//! ```

mod client;
mod error;
mod types;

pub use client::{DEFAULT_TIMEOUT, IfindClient, REFRESH_TOKEN_VAR};
pub use error::IfindError;
pub use types::*;

/// Result type for iFinD operations.
pub type Result<T> = std::result::Result<T, IfindError>;
