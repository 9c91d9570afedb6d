use crate::domain::trade::Trade;
use crate::model::error::ModelError;
use crate::model::matrix::TradeMatrix;
use crate::model::similarity::SimilarityTable;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_NEIGHBORHOOD_SIZE: usize = 10;

/// Tuning knobs for neighbor selection, kept separate from `top_n` so callers
/// can cap the result length independently of the neighborhood size.
#[derive(Debug, Clone, Copy)]
pub struct RecommendOptions {
    /// Number of most-similar users whose trades feed the ranking.
    pub neighborhood: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            neighborhood: DEFAULT_NEIGHBORHOOD_SIZE,
        }
    }
}

/// Ranks symbols for `user_id` by the aggregated trading activity of their
/// nearest neighbors.
///
/// Neighbors are the other users sorted by similarity descending; ties keep
/// first-appearance order from the trade records, so output is reproducible
/// across runs even when float scores collide. Users with zero similarity
/// carry no signal and are never selected, which keeps a disjoint trader from
/// leaking their book into the result.
pub fn recommend(
    user_id: &str,
    similarity: &SimilarityTable,
    matrix: &TradeMatrix,
    trades: &[Trade],
    top_n: usize,
    options: &RecommendOptions,
) -> Result<Vec<String>, ModelError> {
    if !similarity.contains_user(user_id) {
        return Err(ModelError::unknown_user(user_id));
    }
    if top_n == 0 || options.neighborhood == 0 {
        return Ok(Vec::new());
    }

    // Candidate neighbors in matrix row order (= first appearance in the
    // trade records), excluding the target user.
    let mut candidates: Vec<(&str, f64)> = matrix
        .users()
        .iter()
        .filter(|u| u.as_str() != user_id)
        .filter_map(|u| {
            let s = similarity.score(user_id, u)?;
            (s > 0.0).then_some((u.as_str(), s))
        })
        .collect();

    // Stable sort: equal scores keep first-appearance order.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(options.neighborhood);

    let neighbors: HashSet<&str> = candidates.iter().map(|(u, _)| *u).collect();

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for trade in trades {
        if neighbors.contains(trade.user_id.as_str()) {
            *totals.entry(trade.symbol.as_str()).or_insert(0.0) += trade.quantity;
        }
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(top_n);

    Ok(ranked.into_iter().map(|(s, _)| s.to_string()).collect())
}
