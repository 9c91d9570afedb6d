use anyhow::Context;
use chrono::NaiveDate;
use tradepeer_core::domain::trade::{Trade, TradeType};

/// Reads a JSON array of trade records from disk.
pub fn load_trades_file(path: &str) -> anyhow::Result<Vec<Trade>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trades file {path}"))?;
    let trades: Vec<Trade> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse trades file {path}"))?;
    for trade in &trades {
        trade
            .validate()
            .with_context(|| format!("invalid trade in {path}"))?;
    }
    Ok(trades)
}

/// Deterministic sample book for local runs and demos: a handful of users
/// clustered by sector so the similarity structure is easy to eyeball.
pub fn sample_trades() -> Vec<Trade> {
    let rows: &[(&str, &str, u32, f64, f64, TradeType)] = &[
        // Energy-heavy traders.
        ("sample_user_1", "XOM", 1, 105.30, 10.0, TradeType::Buy),
        ("sample_user_1", "CVX", 5, 165.70, 15.0, TradeType::Buy),
        ("sample_user_1", "COP", 10, 80.90, 20.0, TradeType::Buy),
        ("sample_user_2", "XOM", 2, 104.80, 8.0, TradeType::Buy),
        ("sample_user_2", "OXY", 12, 60.45, 25.0, TradeType::Sell),
        ("sample_user_2", "EOG", 18, 122.60, 12.0, TradeType::Buy),
        ("sample_user_2", "SLB", 26, 48.25, 30.0, TradeType::Sell),
        // Tech-heavy traders.
        ("sample_user_3", "AAPL", 3, 232.50, 12.0, TradeType::Buy),
        ("sample_user_3", "MSFT", 7, 415.20, 6.0, TradeType::Buy),
        ("sample_user_3", "GOOG", 14, 192.10, 9.0, TradeType::Buy),
        ("sample_user_4", "AAPL", 4, 230.00, 20.0, TradeType::Buy),
        ("sample_user_4", "NVDA", 9, 131.40, 18.0, TradeType::Buy),
        // Consumer staples.
        ("sample_user_5", "KO", 6, 63.10, 40.0, TradeType::Buy),
        ("sample_user_5", "PG", 11, 171.80, 14.0, TradeType::Buy),
    ];

    rows.iter()
        .map(|&(user_id, symbol, day, price, quantity, trade_type)| Trade {
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            trade_date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            price,
            quantity,
            trade_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepeer_core::model::ModelState;

    #[test]
    fn sample_book_is_valid_and_builds() {
        let trades = sample_trades();
        for trade in &trades {
            assert!(trade.validate().is_ok());
        }

        let state = ModelState::build(trades).unwrap();
        assert_eq!(state.matrix.user_count(), 5);

        // The two energy traders are each other's best signal.
        let out = state
            .recommend_for("sample_user_1", 5, &Default::default())
            .unwrap();
        assert!(!out.is_empty());
        assert!(out.iter().any(|s| ["OXY", "EOG", "SLB"].contains(&s.as_str())));
    }
}
