use crate::domain::trade::{Trade, TradeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl From<OrderSide> for TradeType {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => TradeType::Buy,
            OrderSide::Sell => TradeType::Sell,
        }
    }
}

/// An order as returned by the brokerage API. Quantities come back as strings
/// on the wire, so they stay strings here; conversion to numeric happens when
/// an order becomes a `Trade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerOrder {
    pub id: String,
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub side: OrderSide,
    pub qty: Option<String>,
    pub filled_qty: Option<String>,
    pub filled_avg_price: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub filled_at: Option<DateTime<Utc>>,
}

impl BrokerOrder {
    pub fn is_filled(&self) -> bool {
        self.status == "filled" && self.filled_at.is_some()
    }

    /// Converts a filled order into a trade record for `user_id`. Unfilled
    /// or partially specified orders yield `None`; they carry no settled
    /// quantity to aggregate.
    pub fn to_trade(&self, user_id: &str) -> Option<Trade> {
        if !self.is_filled() {
            return None;
        }
        let filled_at = self.filled_at?;
        let quantity: f64 = self.filled_qty.as_deref()?.parse().ok()?;
        let price: f64 = self.filled_avg_price.as_deref()?.parse().ok()?;

        Some(Trade {
            user_id: user_id.to_string(),
            symbol: self.symbol.clone(),
            trade_date: filled_at.date_naive(),
            price,
            quantity,
            trade_type: self.side.into(),
        })
    }
}

/// Converts the filled subset of a fetched order page into trade records for
/// `user_id`. Unfilled and malformed orders are skipped; they carry no
/// settled quantity to aggregate.
pub fn trades_from_orders(orders: &[BrokerOrder], user_id: &str) -> Vec<Trade> {
    orders
        .iter()
        .filter_map(|order| order.to_trade(user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_json() -> serde_json::Value {
        json!({
            "id": "904837e3-3b76-47ec-b432-046db621571b",
            "client_order_id": "my-order",
            "symbol": "XOM",
            "side": "buy",
            "qty": "10",
            "filled_qty": "10",
            "filled_avg_price": "105.30",
            "status": "filled",
            "created_at": "2025-02-01T14:30:00Z",
            "submitted_at": "2025-02-01T14:30:00Z",
            "filled_at": "2025-02-01T14:30:05Z"
        })
    }

    #[test]
    fn parses_expected_wire_shape() {
        let order: BrokerOrder = serde_json::from_value(order_json()).unwrap();
        assert_eq!(order.symbol, "XOM");
        assert_eq!(order.side, OrderSide::Buy);
        assert!(order.is_filled());
    }

    #[test]
    fn filled_order_becomes_a_trade() {
        let order: BrokerOrder = serde_json::from_value(order_json()).unwrap();
        let trade = order.to_trade("user_1").unwrap();
        assert_eq!(trade.user_id, "user_1");
        assert_eq!(trade.quantity, 10.0);
        assert_eq!(trade.price, 105.30);
        assert!(trade.validate().is_ok());
    }

    #[test]
    fn order_history_feeds_the_model() {
        let filled: BrokerOrder = serde_json::from_value(order_json()).unwrap();
        let mut unfilled = filled.clone();
        unfilled.status = "canceled".to_string();
        unfilled.filled_at = None;

        let trades = trades_from_orders(&[filled, unfilled], "user_1");
        assert_eq!(trades.len(), 1);

        let state = crate::model::ModelState::build(trades).unwrap();
        assert!(state.matrix.contains_user("user_1"));
        assert_eq!(state.matrix.quantity("user_1", "XOM"), 10.0);
    }

    #[test]
    fn unfilled_order_yields_no_trade() {
        let mut v = order_json();
        v["status"] = json!("new");
        v["filled_at"] = json!(null);
        let order: BrokerOrder = serde_json::from_value(v).unwrap();
        assert!(order.to_trade("user_1").is_none());
    }
}
