//! Geographic resolution definitions.
//!
//! This module defines [`Resolution`] for specifying the granularity of
//! interest-by-region tables.

use serde::{Deserialize, Serialize};

/// Granularity of an interest-by-region table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// One row per country.
    Country,
    /// One row per first-level subdivision (state, province).
    #[default]
    Region,
    /// One row per designated market area (US only).
    Dma,
    /// One row per city.
    City,
}

impl Resolution {
    /// Returns the provider wire name for this resolution.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "COUNTRY",
            Self::Region => "REGION",
            Self::Dma => "DMA",
            Self::City => "CITY",
        }
    }
}
