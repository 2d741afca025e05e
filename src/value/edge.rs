/// Model-vs-market comparison for one priced selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeQuote {
    pub p_model: f64,
    pub p_implied: f64,
    pub edge: f64,
    /// Net decimal payout per unit staked (odds - 1)
    pub b: f64,
    /// Full Kelly fraction; negative when the bet has no value
    pub kelly_full: f64,
}

/// `1 / odds` for odds above 1.0, otherwise 0
pub fn implied_probability(odds: f64) -> f64 {
    if odds.is_finite() && odds > 1.0 {
        1.0 / odds
    } else {
        0.0
    }
}

/// Confidence derived from the edge, capped at 0.95
pub fn edge_confidence(edge: f64) -> f64 {
    (0.5 + 2.0 * edge).min(0.95)
}

pub fn estimate_edge(p_model: f64, odds: f64) -> EdgeQuote {
    let p_implied = implied_probability(odds);
    let edge = p_model - p_implied;

    let b = odds - 1.0;
    let kelly_full = if b > 0.0 && b.is_finite() {
        (b * p_model - (1.0 - p_model)) / b
    } else {
        0.0
    };

    EdgeQuote {
        p_model,
        p_implied,
        edge,
        b,
        kelly_full,
    }
}
