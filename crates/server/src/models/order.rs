//! Order types used by order tracking.

use serde::{Deserialize, Serialize};

use pulp_core::{Price, ProductId, obfuscate_vowels};

/// A placed order, as tracked by customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Public order number, e.g. `5267-f9cd5882f54c75a3`.
    pub order_id: String,
    /// Email of the customer who placed the order.
    pub email: String,
    pub total_price: Price,
    pub products: Vec<OrderLine>,
    /// Loyalty points earned by the order.
    #[serde(default)]
    pub bonus: i32,
    /// Estimated days until arrival, if the carrier gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<u32>,
    #[serde(default)]
    pub delivered: bool,
}

impl Order {
    /// The order as shown publicly: customer email vowels masked.
    #[must_use]
    pub fn obfuscated(mut self) -> Self {
        self.email = obfuscate_vowels(&self.email);
        self
    }
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub quantity: u32,
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub total: Price,
    #[serde(default)]
    pub bonus: i32,
}

/// Result of an order lookup.
///
/// Unknown order numbers are echoed back so the client can still show what
/// was searched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrackedOrder {
    Found(Order),
    Unknown {
        #[serde(rename = "orderId")]
        order_id: String,
    },
}

impl TrackedOrder {
    /// The order number that was looked up.
    #[must_use]
    pub fn order_id(&self) -> &str {
        match self {
            Self::Found(order) => &order.order_id,
            Self::Unknown { order_id } => order_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order {
            order_id: "5267-f9cd5882f54c75a3".to_owned(),
            email: "admin@pulp-sh.op".to_owned(),
            total_price: Price::from_cents(898),
            products: vec![OrderLine {
                quantity: 2,
                id: ProductId::new(1),
                name: "Apple Juice (1000ml)".to_owned(),
                price: Price::from_cents(199),
                total: Price::from_cents(398),
                bonus: 0,
            }],
            bonus: 90,
            eta: Some(3),
            delivered: false,
        }
    }

    #[test]
    fn test_obfuscated_masks_email() {
        assert_eq!(order().obfuscated().email, "*dm*n@p*lp-sh.*p");
    }

    #[test]
    fn test_found_serializes_in_camel_case() {
        let json = serde_json::to_value(TrackedOrder::Found(order())).unwrap();
        assert_eq!(json["orderId"], "5267-f9cd5882f54c75a3");
        assert!((json["totalPrice"].as_f64().unwrap() - 8.98).abs() < 1e-9);
        assert!((json["products"][0]["total"].as_f64().unwrap() - 3.98).abs() < 1e-9);
        assert_eq!(json["eta"], 3);
    }

    #[test]
    fn test_unknown_echoes_order_id_only() {
        let json = serde_json::to_value(TrackedOrder::Unknown {
            order_id: "nope".to_owned(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "orderId": "nope" }));
    }
}
