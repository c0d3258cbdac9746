use serde::Serialize;
use utoipa::ToSchema;

/// Shipping details required before an order can be placed.
#[derive(Debug, Clone)]
pub struct ShippingInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl ShippingInfo {
    pub fn is_complete(&self) -> bool {
        !(self.name.trim().is_empty()
            || self.address.trim().is_empty()
            || self.phone.trim().is_empty())
    }
}

/// A cart row joined with the catalog price at checkout time. The price is
/// always read fresh, never taken from client input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedCartLine {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f32,
}

pub fn subtotal(lines: &[PricedCartLine]) -> f32 {
    lines
        .iter()
        .map(|line| line.quantity as f32 * line.unit_price)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CheckoutTotals {
    pub subtotal: f32,
    pub discount: f32,
    pub total: f32,
}

impl CheckoutTotals {
    /// `discount` must already be clamped to `[0, subtotal]`.
    pub fn new(subtotal: f32, discount: f32) -> CheckoutTotals {
        CheckoutTotals {
            subtotal,
            discount,
            total: subtotal - discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::promo::{self, PromoKind};

    fn reference_cart() -> Vec<PricedCartLine> {
        vec![
            PricedCartLine {
                product_id: 1,
                quantity: 2,
                unit_price: 100.0,
            },
            PricedCartLine {
                product_id: 2,
                quantity: 1,
                unit_price: 50.0,
            },
        ]
    }

    #[test]
    fn subtotal_sums_quantity_times_price() {
        assert_eq!(subtotal(&reference_cart()), 250.0);
        assert_eq!(subtotal(&[]), 0.0);
    }

    #[test]
    fn totals_without_promo() {
        let totals = CheckoutTotals::new(subtotal(&reference_cart()), 0.0);
        assert_eq!(totals.subtotal, 250.0);
        assert_eq!(totals.discount, 0.0);
        assert_eq!(totals.total, 250.0);
    }

    #[test]
    fn totals_with_fixed_promo() {
        let sub = subtotal(&reference_cart());
        let discount = promo::discount_amount(PromoKind::Fixed, 50.0, sub);
        let totals = CheckoutTotals::new(sub, discount);
        assert_eq!(totals.discount, 50.0);
        assert_eq!(totals.total, 200.0);
    }

    #[test]
    fn oversized_fixed_promo_zeroes_the_total() {
        let discount = promo::discount_amount(PromoKind::Fixed, 50.0, 30.0);
        let totals = CheckoutTotals::new(30.0, discount);
        assert_eq!(totals.discount, 30.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn shipping_info_requires_every_field() {
        let complete = ShippingInfo {
            name: "Ana".into(),
            address: "12 Cacao St".into(),
            phone: "0917".into(),
        };
        assert!(complete.is_complete());

        let blank_phone = ShippingInfo {
            phone: "   ".into(),
            ..complete.clone()
        };
        assert!(!blank_phone.is_complete());

        let empty_name = ShippingInfo {
            name: String::new(),
            ..complete
        };
        assert!(!empty_name.is_complete());
    }
}
