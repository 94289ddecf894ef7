//! Delivery status shown on the order tracking page.

use serde::{Deserialize, Serialize};

/// Orders whose ETA is further out than this many days are still being packed.
pub const PACKING_ETA_THRESHOLD_DAYS: u32 = 2;

/// Where an order is in its journey, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    New,
    Packing,
    Transit,
    Delivered,
}

impl DeliveryStatus {
    /// All statuses, in the order the progress bar renders them.
    pub const ALL: [Self; 4] = [Self::New, Self::Packing, Self::Transit, Self::Delivered];

    /// Derive the status of an order.
    ///
    /// A delivered order is always `Delivered`. Otherwise an order viewed
    /// through the "new order" confirmation route is `New`. Remaining orders
    /// are `Packing` while their ETA exceeds
    /// [`PACKING_ETA_THRESHOLD_DAYS`] and `Transit` after that, or when no
    /// ETA is known.
    #[must_use]
    pub const fn derive(delivered: bool, new_order_route: bool, eta_days: Option<u32>) -> Self {
        if delivered {
            return Self::Delivered;
        }
        if new_order_route {
            return Self::New;
        }
        match eta_days {
            Some(days) if days > PACKING_ETA_THRESHOLD_DAYS => Self::Packing,
            _ => Self::Transit,
        }
    }

    /// Position in [`Self::ALL`], starting at zero.
    #[must_use]
    pub const fn step(self) -> u8 {
        self as u8
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Order placed",
            Self::Packing => "Packing",
            Self::Transit => "In transit",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
