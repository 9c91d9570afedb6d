use crate::model::matrix::TradeMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fully materialized, symmetric table of pairwise cosine similarities over
/// the trade matrix rows. Materializing everything up front keeps the
/// recommender's neighbor sort a plain slice scan.
///
/// The dot/norm arithmetic is written out by hand; pulling in a numerical
/// library for a handful of multiplications is not worth the dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityTable {
    users: Vec<String>,
    user_index: HashMap<String, usize>,
    scores: Vec<Vec<f64>>,
}

impl SimilarityTable {
    pub fn compute(matrix: &TradeMatrix) -> Self {
        let users: Vec<String> = matrix.users().to_vec();
        let n = users.len();

        let norms: Vec<f64> = (0..n)
            .map(|i| {
                matrix
                    .row_at(i)
                    .iter()
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();

        let mut scores = vec![vec![0.0; n]; n];
        for a in 0..n {
            // A user with an all-zero row is 0-similar to everyone,
            // including themselves (cosine is undefined there).
            if norms[a] == 0.0 {
                continue;
            }
            scores[a][a] = 1.0;
            for b in (a + 1)..n {
                if norms[b] == 0.0 {
                    continue;
                }
                let dot: f64 = matrix
                    .row_at(a)
                    .iter()
                    .zip(matrix.row_at(b))
                    .map(|(x, y)| x * y)
                    .sum();
                let s = dot / (norms[a] * norms[b]);
                scores[a][b] = s;
                scores[b][a] = s;
            }
        }

        let user_index = users
            .iter()
            .enumerate()
            .map(|(i, u)| (u.clone(), i))
            .collect();

        Self {
            users,
            user_index,
            scores,
        }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_index.contains_key(user_id)
    }

    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let &i = self.user_index.get(a)?;
        let &j = self.user_index.get(b)?;
        Some(self.scores[i][j])
    }
}
