//! Distance spaces supported by group indexes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SeekError;

/// Distance metric an index is built with.
///
/// Fixed per group once the group's index exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSpace {
    /// Squared Euclidean (L2) distance
    #[default]
    Euclidean,
    /// Cosine distance
    Cosine,
    /// Inner product distance
    InnerProduct,
}

impl DistanceSpace {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceSpace::Euclidean => "euclidean",
            DistanceSpace::Cosine => "cosine",
            DistanceSpace::InnerProduct => "inner_product",
        }
    }
}

impl fmt::Display for DistanceSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceSpace {
    type Err = SeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceSpace::Euclidean),
            "cosine" | "cos" => Ok(DistanceSpace::Cosine),
            "inner_product" | "innerproduct" | "ip" => Ok(DistanceSpace::InnerProduct),
            other => Err(SeekError::UnknownSpace(other.to_string())),
        }
    }
}
