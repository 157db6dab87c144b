//! Billing price types offered for membership tiers.

use serde::{Deserialize, Serialize};

/// Error returned when a price type string is not one of the allowed literals.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("price_type must be one of: yearly, lifetime")]
pub struct PriceTypeError;

/// How a tier is purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Recurring yearly subscription.
    Yearly,
    /// One-time payment for lifetime access.
    Lifetime,
}

impl PriceType {
    /// Every accepted price type, in display order.
    pub const ALL: [Self; 2] = [Self::Yearly, Self::Lifetime];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Lifetime => "lifetime",
        }
    }

    /// Whether this purchase renews automatically.
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        matches!(self, Self::Yearly)
    }
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PriceType {
    type Err = PriceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == s)
            .ok_or(PriceTypeError)
    }
}
