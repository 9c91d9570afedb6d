use crate::model::error::ModelError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a transaction. Aggregation into the trade matrix sums gross
/// quantity regardless of direction; the enum exists so callers can still
/// reason about net positions if they need to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

/// One historical transaction, immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub user_id: String,
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub price: f64,
    pub quantity: f64,
    pub trade_type: TradeType,
}

/// A trade as submitted by a caller for a single user; the `user_id` is
/// stamped on when the trade enters the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub price: f64,
    pub quantity: f64,
    pub trade_type: TradeType,
}

impl TradeInput {
    pub fn into_trade(self, user_id: &str) -> Trade {
        Trade {
            user_id: user_id.to_string(),
            symbol: self.symbol,
            trade_date: self.trade_date,
            price: self.price,
            quantity: self.quantity,
            trade_type: self.trade_type,
        }
    }
}

impl Trade {
    /// Rejects records the matrix builder must never see. Quantity is stored
    /// unsigned; direction lives in `trade_type`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.user_id.trim().is_empty() {
            return Err(ModelError::invalid_trade("user_id must be non-empty"));
        }
        if self.symbol.trim().is_empty() {
            return Err(ModelError::invalid_trade("symbol must be non-empty"));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(ModelError::invalid_trade(format!(
                "quantity must be finite and >= 0 (got {})",
                self.quantity
            )));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ModelError::invalid_trade(format!(
                "price must be finite and > 0 (got {})",
                self.price
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(user_id: &str, symbol: &str, quantity: f64) -> Trade {
        Trade {
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            trade_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            price: 105.30,
            quantity,
            trade_type: TradeType::Buy,
        }
    }

    #[test]
    fn accepts_well_formed_trade() {
        assert!(trade("user_1", "XOM", 10.0).validate().is_ok());
    }

    #[test]
    fn rejects_empty_identifiers() {
        assert!(trade("", "XOM", 10.0).validate().is_err());
        assert!(trade("user_1", "  ", 10.0).validate().is_err());
    }

    #[test]
    fn rejects_bad_quantity() {
        assert!(trade("user_1", "XOM", -1.0).validate().is_err());
        assert!(trade("user_1", "XOM", f64::NAN).validate().is_err());
    }

    #[test]
    fn trade_type_uses_lowercase_wire_names() {
        let v = serde_json::json!({
            "symbol": "CVX",
            "trade_date": "2025-02-05",
            "price": 165.70,
            "quantity": 15.0,
            "trade_type": "buy"
        });
        let input: TradeInput = serde_json::from_value(v).unwrap();
        assert_eq!(input.trade_type, TradeType::Buy);

        let t = input.into_trade("user_1");
        assert_eq!(t.user_id, "user_1");
        assert_eq!(t.symbol, "CVX");
    }
}
