//! Common types used throughout the vantage toolkit.
//!
//! This module defines the identity of the entity being analyzed and the
//! calendar window a request covers.

use crate::{Result, VantageError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Kind of market entity a code refers to.
///
/// The kind selects which provider indicators are requested; an index and a
/// stock expose the same statistic under different indicator ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A market or sector index, e.g. `000300.SH`.
    #[default]
    Index,
    /// A single listed equity, e.g. `000596.SZ`.
    Equity,
}

impl EntityKind {
    /// Lowercase name used on the command line and in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Equity => "equity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = VantageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" => Ok(Self::Index),
            // "stock" is the name the provider uses for equities
            "equity" | "stock" => Ok(Self::Equity),
            other => Err(VantageError::InvalidArgument(format!(
                "unknown entity kind '{other}' (expected index or equity)"
            ))),
        }
    }
}

/// Immutable identity used for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Opaque provider identifier.
    pub code: String,
    /// Index or equity.
    pub kind: EntityKind,
    /// Human-readable name, used for chart titles only.
    pub display_name: String,
}

impl EntityRef {
    /// Creates a new entity reference.
    pub fn new(code: impl Into<String>, kind: EntityKind, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind,
            display_name: display_name.into(),
        }
    }
}

/// Inclusive calendar window `[start, end]`.
///
/// The window can only be built through [`QueryWindow::new`], which rejects
/// a start after the end, so every value of this type is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    start: Date,
    end: Date,
}

#[derive(Deserialize)]
struct RawWindow {
    start: Date,
    end: Date,
}

impl<'de> Deserialize<'de> for QueryWindow {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawWindow::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

impl QueryWindow {
    /// Creates a window, failing with [`VantageError::InvalidRange`] if
    /// `start > end`.
    pub fn new(start: Date, end: Date) -> Result<Self> {
        if start > end {
            return Err(VantageError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds as `YYYY-MM-DD` and validates the range.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// First day of the window.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last day of the window.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse a date string in YYYY-MM-DD format.
pub fn parse_date(date_str: &str) -> Result<Date> {
    Date::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| VantageError::InvalidDate(format!("'{date_str}': {e}")))
}
