use serde::{Deserialize, Serialize};

use super::RiskConfig;
use crate::value::{estimate_edge, ValueCandidate};

/// Kelly sizing for one bet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KellyQuote {
    pub b: f64,
    pub f_raw: f64,
    pub f_adjusted: f64,
    pub f_fractional: f64,
    pub stake: f64,
}

impl KellyQuote {
    const ZERO: KellyQuote = KellyQuote {
        b: 0.0,
        f_raw: 0.0,
        f_adjusted: 0.0,
        f_fractional: 0.0,
        stake: 0.0,
    };
}

/// Confidence-weighted fractional Kelly. All zero when there is no edge.
pub fn compute_fractional_kelly(
    p_model: f64,
    odds: f64,
    confidence: f64,
    multiplier: f64,
    bankroll: f64,
) -> KellyQuote {
    let quote = estimate_edge(p_model, odds);
    if quote.b <= 0.0 || quote.edge.is_nan() || quote.edge <= 0.0 {
        return KellyQuote::ZERO;
    }

    let f_raw = quote.kelly_full;
    let f_adjusted = f_raw * confidence;
    let f_fractional = f_adjusted * multiplier.max(0.0);

    KellyQuote {
        b: quote.b,
        f_raw,
        f_adjusted,
        f_fractional,
        stake: f_fractional * bankroll.max(0.0),
    }
}

/// The stake estimates behind one recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeBreakdown {
    /// Fractional Kelly (confidence and multiplier applied)
    pub kelly_fraction: f64,
    pub kelly_stake: f64,
    pub fixed_stake: f64,
    pub edge_multiplier: f64,
    pub edge_stake: f64,
    pub confidence_stake: f64,
    pub daily_stake: f64,
    pub bets_remaining: usize,
    pub final_stake: f64,
}

/// Size a candidate against the bankroll and the remaining daily quota.
///
/// The final stake is the smallest estimate, floored at `min_stake` and then
/// capped at `max_stake_pct` of the bankroll. A non-positive estimate stays 0.
pub fn compute_stake_breakdown(
    candidate: &ValueCandidate,
    config: &RiskConfig,
    bankroll: f64,
    bets_remaining: usize,
) -> StakeBreakdown {
    let kelly = compute_fractional_kelly(
        candidate.model_probability,
        candidate.odds,
        candidate.confidence,
        config.kelly_multiplier,
        bankroll,
    );

    let fixed_stake = bankroll * config.fixed_stake_pct;
    let edge_multiplier = if config.edge_unit > 0.0 {
        (candidate.edge / config.edge_unit).min(config.edge_multiplier_cap)
    } else {
        0.0
    };
    let edge_stake = fixed_stake * edge_multiplier;
    let confidence_stake = edge_stake * candidate.confidence;
    let daily_stake = if bets_remaining == 0 {
        0.0
    } else {
        confidence_stake / bets_remaining as f64
    };

    let raw = kelly.stake.min(confidence_stake).min(daily_stake);
    let final_stake = if raw.is_nan() || raw <= 0.0 {
        0.0
    } else {
        raw.max(config.min_stake).min(bankroll * config.max_stake_pct)
    };

    StakeBreakdown {
        kelly_fraction: kelly.f_fractional,
        kelly_stake: kelly.stake,
        fixed_stake,
        edge_multiplier,
        edge_stake,
        confidence_stake,
        daily_stake,
        bets_remaining,
        final_stake,
    }
}
