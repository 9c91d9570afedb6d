use thiserror::Error;

/// Errors surfaced by the recommendation model. These are returned
/// synchronously to the immediate caller; the model never retries.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("invalid trade record: {reason}")]
    InvalidTradeRecord { reason: String },

    #[error("unknown user: {user_id}")]
    UnknownUser { user_id: String },
}

impl ModelError {
    pub fn invalid_trade(reason: impl Into<String>) -> Self {
        Self::InvalidTradeRecord {
            reason: reason.into(),
        }
    }

    pub fn unknown_user(user_id: impl Into<String>) -> Self {
        Self::UnknownUser {
            user_id: user_id.into(),
        }
    }

    /// Stable short name for API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTradeRecord { .. } => "invalid_trade_record",
            Self::UnknownUser { .. } => "unknown_user",
        }
    }
}
