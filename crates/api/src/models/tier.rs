//! Membership tier domain type.

use serde::Serialize;

use design_library_core::{PriceType, TierId};

/// A purchasable membership tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub id: TierId,
    pub slug: String,
    pub name: String,
    /// Stripe price for the yearly subscription.
    pub stripe_price_yearly: Option<String>,
    /// Stripe price for the one-time lifetime purchase.
    pub stripe_price_lifetime: Option<String>,
    pub active: bool,
}

impl Tier {
    /// The Stripe price ID to charge for `price_type`, if the tier offers it.
    #[must_use]
    pub fn price_id(&self, price_type: PriceType) -> Option<&str> {
        match price_type {
            PriceType::Yearly => self.stripe_price_yearly.as_deref(),
            PriceType::Lifetime => self.stripe_price_lifetime.as_deref(),
        }
        .filter(|price| !price.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_id_per_type() {
        let tier = Tier {
            id: TierId::random(),
            slug: "pro".to_string(),
            name: "Pro".to_string(),
            stripe_price_yearly: Some("price_yearly_pro".to_string()),
            stripe_price_lifetime: Some(String::new()),
            active: true,
        };
        assert_eq!(tier.price_id(PriceType::Yearly), Some("price_yearly_pro"));
        assert_eq!(tier.price_id(PriceType::Lifetime), None);
    }
}
