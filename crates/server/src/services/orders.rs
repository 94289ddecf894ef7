//! Order tracking.

use tracing::debug;

use pulp_core::{DeliveryStatus, Price};

use crate::db::{RepositoryError, Store};
use crate::models::{OrderLine, TrackedOrder};

/// Shown in place of an unknown ETA.
pub const UNKNOWN_ETA: &str = "?";

/// Keep only `[A-Za-z0-9_-]` from a client-supplied order number.
#[must_use]
pub fn sanitize_order_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect()
}

/// Look up an order by its public number.
///
/// The email of a found order is returned with its vowels masked. Unknown
/// numbers come back as [`TrackedOrder::Unknown`] carrying the sanitized id.
///
/// # Errors
///
/// Returns `RepositoryError` if the store fails.
pub async fn track(store: &dyn Store, raw_id: &str) -> Result<TrackedOrder, RepositoryError> {
    let order_id = sanitize_order_id(raw_id);
    let tracked = match store.find_order(&order_id).await? {
        Some(order) => TrackedOrder::Found(order.obfuscated()),
        None => TrackedOrder::Unknown { order_id },
    };
    debug!(
        order_id = tracked.order_id(),
        found = matches!(tracked, TrackedOrder::Found(_)),
        "Tracked order"
    );
    Ok(tracked)
}

/// What the tracking page displays for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingView {
    pub order_no: String,
    pub email: Option<String>,
    pub total_price: Option<Price>,
    pub products: Vec<OrderLine>,
    /// ETA in days, or [`UNKNOWN_ETA`].
    pub eta: String,
    pub bonus: Option<i32>,
    pub status: DeliveryStatus,
}

impl TrackingView {
    /// Build the view of a lookup result.
    ///
    /// `new_order_route` is set when the page is reached right after checkout.
    #[must_use]
    pub fn new(tracked: TrackedOrder, new_order_route: bool) -> Self {
        match tracked {
            TrackedOrder::Found(order) => Self {
                status: DeliveryStatus::derive(order.delivered, new_order_route, order.eta),
                eta: order
                    .eta
                    .map_or_else(|| UNKNOWN_ETA.to_owned(), |days| days.to_string()),
                order_no: order.order_id,
                email: Some(order.email),
                total_price: Some(order.total_price),
                products: order.products,
                bonus: Some(order.bonus),
            },
            TrackedOrder::Unknown { order_id } => Self {
                status: DeliveryStatus::derive(false, new_order_route, None),
                eta: UNKNOWN_ETA.to_owned(),
                order_no: order_id,
                email: None,
                total_price: None,
                products: Vec::new(),
                bonus: None,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pulp_core::ProductId;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Order;

    fn order(eta: Option<u32>, delivered: bool) -> Order {
        Order {
            order_id: "5267-f9cd5882f54c75a3".to_owned(),
            email: "jim@pulp-sh.op".to_owned(),
            total_price: Price::from_cents(199),
            products: vec![OrderLine {
                quantity: 1,
                id: ProductId::new(1),
                name: "Apple Juice (1000ml)".to_owned(),
                price: Price::from_cents(199),
                total: Price::from_cents(199),
                bonus: 0,
            }],
            bonus: 20,
            eta,
            delivered,
        }
    }

    #[test]
    fn test_sanitize_order_id() {
        assert_eq!(sanitize_order_id("5267-f9cd5882f54c75a3"), "5267-f9cd5882f54c75a3");
        assert_eq!(
            sanitize_order_id("<iframe src=\"javascript:alert(`xss`)\">"),
            "iframesrcjavascriptalertxss"
        );
        assert_eq!(sanitize_order_id("a_b c;d"), "a_bcd");
        assert_eq!(sanitize_order_id("äöü"), "");
    }

    #[tokio::test]
    async fn test_track_found_masks_email() {
        let store = MemoryStore::new();
        store.create_order(&order(Some(3), false)).await.unwrap();

        let tracked = track(&store, "5267-f9cd5882f54c75a3'").await.unwrap();
        let TrackedOrder::Found(found) = tracked else {
            panic!("expected order");
        };
        assert_eq!(found.email, "j*m@p*lp-sh.*p");
    }

    #[tokio::test]
    async fn test_track_unknown_echoes_sanitized_id() {
        let store = MemoryStore::new();
        let tracked = track(&store, "<b>nope</b>").await.unwrap();
        assert_eq!(
            tracked,
            TrackedOrder::Unknown {
                order_id: "bnopeb".to_owned()
            }
        );
    }

    #[test]
    fn test_view_status_and_eta() {
        let packing = TrackingView::new(TrackedOrder::Found(order(Some(3), false)), false);
        assert_eq!(packing.status, DeliveryStatus::Packing);
        assert_eq!(packing.eta, "3");

        let transit = TrackingView::new(TrackedOrder::Found(order(Some(2), false)), false);
        assert_eq!(transit.status, DeliveryStatus::Transit);

        let unknown_eta = TrackingView::new(TrackedOrder::Found(order(None, false)), false);
        assert_eq!(unknown_eta.status, DeliveryStatus::Transit);
        assert_eq!(unknown_eta.eta, UNKNOWN_ETA);

        let fresh = TrackingView::new(TrackedOrder::Found(order(Some(3), false)), true);
        assert_eq!(fresh.status, DeliveryStatus::New);

        let delivered = TrackingView::new(TrackedOrder::Found(order(Some(3), true)), true);
        assert_eq!(delivered.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn test_view_of_unknown_order() {
        let view = TrackingView::new(
            TrackedOrder::Unknown {
                order_id: "nope".to_owned(),
            },
            false,
        );
        assert_eq!(view.order_no, "nope");
        assert_eq!(view.eta, UNKNOWN_ETA);
        assert!(view.products.is_empty());
        assert_eq!(view.status, DeliveryStatus::Transit);
    }
}
