//! Error types for GoalEdge

use thiserror::Error;

/// Malformed input that aborts processing of a single fixture
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid odds for {selection}: {odds}")]
    InvalidOdds { selection: String, odds: f64 },

    #[error("Selection {selection} does not belong to market {market}")]
    MarketMismatch { market: String, selection: String },

    #[error("Unknown outcome label: {0}")]
    UnknownOutcome(String),

    #[error("Unknown market: {0}")]
    UnknownMarket(String),
}

pub type DataResult<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = DataError::InvalidOdds {
            selection: "home_win".into(),
            odds: 0.9,
        };
        assert_eq!(err.to_string(), "Invalid odds for home_win: 0.9");
        assert_eq!(
            DataError::MissingField("home_team").to_string(),
            "Missing required field: home_team"
        );
    }
}
