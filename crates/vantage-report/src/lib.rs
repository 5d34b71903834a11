#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![forbid(unsafe_code)]

//! SVG charts for vantage series.
//!
//! Charts are plain SVG documents built as strings: no drawing backend, no
//! fonts to install. The renderer only reads [`vantage_traits::NormalizedSeries`]
//! and is configured per call through [`RendererConfig`].
//!
//! - [`render_valuation`] - percentile panel over a level panel
//! - [`render_fundamentals`] - two-column grid with one panel per metric

mod chart;
mod config;
mod svg;

pub use chart::{render_fundamentals, render_valuation};
pub use config::RendererConfig;
