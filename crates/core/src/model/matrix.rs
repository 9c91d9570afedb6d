use crate::domain::trade::Trade;
use crate::model::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dense user x symbol matrix of aggregated trade quantities.
///
/// Rows and columns are kept in first-appearance order of the trade list that
/// built them; cell values are order-independent because summation commutes.
/// Quantities are summed gross, ignoring trade direction (activity-based
/// similarity, matching the observed product behavior).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMatrix {
    users: Vec<String>,
    symbols: Vec<String>,
    user_index: HashMap<String, usize>,
    symbol_index: HashMap<String, usize>,
    rows: Vec<Vec<f64>>,
}

impl TradeMatrix {
    /// Fully rebuilds the matrix from a trade list. Empty input yields an
    /// empty matrix; a malformed trade fails the whole build rather than
    /// being silently dropped or miscounted.
    pub fn build(trades: &[Trade]) -> Result<Self, ModelError> {
        let mut users: Vec<String> = Vec::new();
        let mut symbols: Vec<String> = Vec::new();
        let mut user_index: HashMap<String, usize> = HashMap::new();
        let mut symbol_index: HashMap<String, usize> = HashMap::new();

        for trade in trades {
            trade.validate()?;
            if !user_index.contains_key(&trade.user_id) {
                user_index.insert(trade.user_id.clone(), users.len());
                users.push(trade.user_id.clone());
            }
            if !symbol_index.contains_key(&trade.symbol) {
                symbol_index.insert(trade.symbol.clone(), symbols.len());
                symbols.push(trade.symbol.clone());
            }
        }

        let mut rows = vec![vec![0.0; symbols.len()]; users.len()];
        for trade in trades {
            let r = user_index[&trade.user_id];
            let c = symbol_index[&trade.symbol];
            rows[r][c] += trade.quantity;
        }

        Ok(Self {
            users,
            symbols,
            user_index,
            symbol_index,
            rows,
        })
    }

    /// Users in first-appearance order. This order doubles as the stable
    /// tie-break key for neighbor selection.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_index.contains_key(user_id)
    }

    /// Aggregated quantity for a (user, symbol) pair; absent pairs are 0.
    pub fn quantity(&self, user_id: &str, symbol: &str) -> f64 {
        match (self.user_index.get(user_id), self.symbol_index.get(symbol)) {
            (Some(&r), Some(&c)) => self.rows[r][c],
            _ => 0.0,
        }
    }

    pub fn row(&self, user_id: &str) -> Option<&[f64]> {
        self.user_index
            .get(user_id)
            .map(|&r| self.rows[r].as_slice())
    }

    pub(crate) fn row_at(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeType;
    use chrono::NaiveDate;

    fn trade(user_id: &str, symbol: &str, quantity: f64) -> Trade {
        Trade {
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            trade_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            price: 100.0,
            quantity,
            trade_type: TradeType::Buy,
        }
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        let m = TradeMatrix::build(&[]).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.user_count(), 0);
        assert_eq!(m.symbol_count(), 0);
    }

    #[test]
    fn aggregates_quantity_per_user_symbol_pair() {
        let trades = vec![
            trade("u1", "AAPL", 10.0),
            trade("u1", "AAPL", 5.0),
            trade("u1", "MSFT", 3.0),
            trade("u2", "GOOG", 7.0),
        ];
        let m = TradeMatrix::build(&trades).unwrap();
        assert_eq!(m.quantity("u1", "AAPL"), 15.0);
        assert_eq!(m.quantity("u1", "MSFT"), 3.0);
        assert_eq!(m.quantity("u1", "GOOG"), 0.0);
        assert_eq!(m.quantity("u2", "GOOG"), 7.0);
    }

    #[test]
    fn cell_values_are_order_independent() {
        let trades = vec![
            trade("u1", "AAPL", 10.0),
            trade("u2", "MSFT", 4.0),
            trade("u1", "MSFT", 3.0),
            trade("u1", "AAPL", 5.0),
        ];
        let mut reversed = trades.clone();
        reversed.reverse();

        let a = TradeMatrix::build(&trades).unwrap();
        let b = TradeMatrix::build(&reversed).unwrap();

        for user in a.users() {
            for symbol in a.symbols() {
                assert_eq!(a.quantity(user, symbol), b.quantity(user, symbol));
            }
        }
    }

    #[test]
    fn malformed_trade_fails_the_build() {
        let trades = vec![trade("u1", "AAPL", 10.0), trade("", "MSFT", 3.0)];
        let err = TradeMatrix::build(&trades).unwrap_err();
        assert_eq!(err.kind(), "invalid_trade_record");
    }

    #[test]
    fn missing_pairs_default_to_zero_in_dense_rows() {
        let trades = vec![trade("u1", "AAPL", 10.0), trade("u2", "MSFT", 3.0)];
        let m = TradeMatrix::build(&trades).unwrap();
        assert_eq!(m.row("u1").unwrap(), &[10.0, 0.0]);
        assert_eq!(m.row("u2").unwrap(), &[0.0, 3.0]);
    }
}
