//! Tour domain entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Publication state of a tour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    /// Visible and bookable
    Published,
    /// Being edited; never bookable
    Draft,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "published" => Some(Self::Published),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }
}

impl std::fmt::Display for TourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tour as seen by the booking core
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    /// Opaque catalog identifier
    pub id: String,
    pub title: String,
    /// List price per guest
    pub price_per_person: Decimal,
    /// Promotional price per guest; only honoured when below the list price
    pub discount_price: Option<Decimal>,
    /// Largest group a single booking may carry
    pub max_group_size: u32,
    /// Guests allowed per date across all bookings (0 = unlimited)
    pub max_total_slots: u32,
    pub status: TourStatus,
}

impl Tour {
    pub fn is_published(&self) -> bool {
        self.status == TourStatus::Published
    }

    /// Whether a per-date capacity cap is configured
    pub fn has_capacity_limit(&self) -> bool {
        self.max_total_slots > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_roundtrip() {
        for status in [TourStatus::Published, TourStatus::Draft] {
            assert_eq!(TourStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TourStatus::parse("archived"), None);
    }

    #[test]
    fn zero_slots_means_unlimited() {
        let tour = Tour {
            id: "t1".into(),
            title: "Coastal Walk".into(),
            price_per_person: Decimal::new(100, 0),
            discount_price: None,
            max_group_size: 4,
            max_total_slots: 0,
            status: TourStatus::Draft,
        };
        assert!(!tour.has_capacity_limit());
        assert!(!tour.is_published());
    }
}
