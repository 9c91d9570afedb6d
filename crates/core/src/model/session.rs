use crate::domain::trade::{Trade, TradeInput};
use crate::model::error::ModelError;
use crate::model::matrix::TradeMatrix;
use crate::model::recommend::{recommend, RecommendOptions};
use crate::model::similarity::SimilarityTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable model snapshot: the trade store plus the matrix and
/// similarity table derived from it, under a monotonically increasing
/// version. Updates return a fresh snapshot; callers swap their "current"
/// reference atomically instead of mutating shared state, so a reader can
/// never observe a half-rebuilt matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    pub version: u64,
    pub generated_at: DateTime<Utc>,
    pub trades: Vec<Trade>,
    pub matrix: TradeMatrix,
    pub similarity: SimilarityTable,
}

impl ModelState {
    /// Builds version 1 from a trade list. An empty list is legal and yields
    /// an empty (but queryable) model.
    pub fn build(trades: Vec<Trade>) -> Result<Self, ModelError> {
        Self::build_versioned(trades, 1)
    }

    pub fn build_versioned(trades: Vec<Trade>, version: u64) -> Result<Self, ModelError> {
        let matrix = TradeMatrix::build(&trades)?;
        let similarity = SimilarityTable::compute(&matrix);
        Ok(Self {
            version,
            generated_at: Utc::now(),
            trades,
            matrix,
            similarity,
        })
    }

    /// Appends `inputs` stamped with `user_id` and rebuilds matrix and
    /// similarity in full. A new user's symbols may add columns for every
    /// existing row, so an incremental patch cannot preserve consistency;
    /// at this scale the full rebuild is the correct trade-off.
    ///
    /// No deduplication is performed: calling this twice with the same trades
    /// accumulates both sets. Callers wanting replace-semantics must track
    /// which user ids were already added.
    pub fn add_user_trades(
        &self,
        user_id: &str,
        inputs: Vec<TradeInput>,
    ) -> Result<Self, ModelError> {
        let mut trades = self.trades.clone();
        trades.extend(inputs.into_iter().map(|t| t.into_trade(user_id)));

        let next = Self::build_versioned(trades, self.version + 1)?;
        tracing::debug!(
            version = next.version,
            users = next.matrix.user_count(),
            symbols = next.matrix.symbol_count(),
            trades = next.trades.len(),
            "model rebuilt"
        );
        Ok(next)
    }

    pub fn recommend_for(
        &self,
        user_id: &str,
        top_n: usize,
        options: &RecommendOptions,
    ) -> Result<Vec<String>, ModelError> {
        recommend(
            user_id,
            &self.similarity,
            &self.matrix,
            &self.trades,
            top_n,
            options,
        )
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

    fn input(symbol: &str, quantity: f64) -> TradeInput {
        TradeInput {
            symbol: symbol.to_string(),
            trade_date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            price: 100.0,
            quantity,
            trade_type: TradeType::Buy,
        }
    }

    #[test]
    fn empty_model_is_legal() {
        let state = ModelState::build(Vec::new()).unwrap();
        assert_eq!(state.version, 1);
        assert!(state.matrix.is_empty());
    }

    #[test]
    fn update_adds_row_and_preserves_existing_totals() {
        let state = ModelState::build(vec![
            trade("a", "XOM", 10.0),
            trade("b", "KO", 20.0),
        ])
        .unwrap();

        let next = state
            .add_user_trades("c", vec![input("CVX", 15.0), input("CVX", 5.0), input("SLB", 30.0)])
            .unwrap();

        assert_eq!(next.version, 2);
        assert_eq!(next.matrix.quantity("c", "CVX"), 20.0);
        assert_eq!(next.matrix.quantity("c", "SLB"), 30.0);

        // Existing rows keep their totals; new symbols only add zero columns.
        assert_eq!(next.matrix.quantity("a", "XOM"), 10.0);
        assert_eq!(next.matrix.quantity("a", "CVX"), 0.0);
        assert_eq!(next.matrix.quantity("b", "KO"), 20.0);

        // The original snapshot is untouched.
        assert_eq!(state.version, 1);
        assert!(!state.matrix.contains_user("c"));
    }

    #[test]
    fn repeated_updates_accumulate() {
        let state = ModelState::build(vec![trade("a", "XOM", 10.0)]).unwrap();
        let once = state.add_user_trades("b", vec![input("CVX", 5.0)]).unwrap();
        let twice = once.add_user_trades("b", vec![input("CVX", 5.0)]).unwrap();
        assert_eq!(twice.matrix.quantity("b", "CVX"), 10.0);
        assert_eq!(twice.version, 3);
    }

    #[test]
    fn updated_model_serves_recommendations() {
        let state = ModelState::build(vec![
            trade("a", "XOM", 10.0),
            trade("b", "XOM", 8.0),
            trade("b", "CVX", 5.0),
        ])
        .unwrap();

        let next = state
            .add_user_trades("d", vec![input("XOM", 9.0)])
            .unwrap();

        let out = next.recommend_for("d", 5, &Default::default()).unwrap();
        assert!(out.contains(&"CVX".to_string()));
    }

    #[test]
    fn malformed_input_rejects_the_whole_update() {
        let state = ModelState::build(vec![trade("a", "XOM", 10.0)]).unwrap();
        let err = state
            .add_user_trades("b", vec![input("", 5.0)])
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_trade_record");
    }
}
