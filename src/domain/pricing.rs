//! Pricing engine
//!
//! The authoritative price of a booking is always derived from the tour
//! record fetched by the server at admission time.

use rust_decimal::Decimal;

use crate::domain::tour::Tour;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Price computed for one admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Per-guest price actually charged
    pub unit_price: Decimal,
    pub guests_count: u32,
    pub total_price: Decimal,
    /// Whether the discount price was applied
    pub discounted: bool,
}

/// The discount wins only when present and strictly below the list price.
pub fn effective_price(tour: &Tour) -> Decimal {
    match tour.discount_price {
        Some(discount) if discount < tour.price_per_person => discount,
        _ => tour.price_per_person,
    }
}

pub fn quote(tour: &Tour, guests_count: u32) -> DomainResult<PriceQuote> {
    let unit_price = effective_price(tour);
    let total_price = unit_price
        .checked_mul(Decimal::from(guests_count))
        .ok_or_else(|| {
            DomainError::Validation(format!(
                "total price overflow for tour {} x {} guests",
                tour.id, guests_count
            ))
        })?;

    Ok(PriceQuote {
        unit_price,
        guests_count,
        total_price,
        discounted: unit_price != tour.price_per_person,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tour::TourStatus;
    use std::str::FromStr;

    fn tour(price: &str, discount: Option<&str>) -> Tour {
        Tour {
            id: "tour-a".into(),
            title: "Rift Valley Trek".into(),
            price_per_person: Decimal::from_str(price).unwrap(),
            discount_price: discount.map(|d| Decimal::from_str(d).unwrap()),
            max_group_size: 6,
            max_total_slots: 0,
            status: TourStatus::Published,
        }
    }

    #[test]
    fn discount_below_list_price_applies() {
        let q = quote(&tour("1000", Some("800")), 3).unwrap();
        assert_eq!(q.unit_price, Decimal::from(800));
        assert_eq!(q.total_price, Decimal::from(2400));
        assert!(q.discounted);
    }

    #[test]
    fn discount_equal_or_above_list_price_is_ignored() {
        let q = quote(&tour("1000", Some("1000")), 2).unwrap();
        assert_eq!(q.total_price, Decimal::from(2000));
        assert!(!q.discounted);

        let q = quote(&tour("1000", Some("1200")), 2).unwrap();
        assert_eq!(q.total_price, Decimal::from(2000));
    }

    #[test]
    fn no_discount_uses_list_price() {
        let q = quote(&tour("149.99", None), 4).unwrap();
        assert_eq!(q.total_price, Decimal::from_str("599.96").unwrap());
    }

    #[test]
    fn zero_discount_is_a_valid_discount() {
        let q = quote(&tour("50", Some("0")), 5).unwrap();
        assert_eq!(q.total_price, Decimal::ZERO);
        assert!(q.discounted);
    }

    #[test]
    fn overflow_is_an_error_not_a_panic() {
        let mut t = tour("1", None);
        t.price_per_person = Decimal::MAX;
        assert!(quote(&t, 2).is_err());
    }
}
