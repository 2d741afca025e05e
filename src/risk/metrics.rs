//! Performance metrics and risk alerts over a ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ledger::{BetRecord, Ledger};
use super::RiskConfig;
use crate::types::{BetResult, Market};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketBreakdown {
    pub bets: usize,
    pub wins: usize,
    pub staked: f64,
    pub profit: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_bets: usize,
    pub winning_bets: usize,
    pub losing_bets: usize,
    pub push_bets: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub total_staked: f64,
    pub overall_roi: f64,
    pub avg_edge: f64,
    pub avg_confidence: f64,
    /// Change against the initial bankroll, in percent
    pub bankroll_growth_pct: f64,
    pub current_bankroll: f64,
    pub current_streak: i64,
    pub kelly_efficiency: f64,
    pub by_market: BTreeMap<Market, MarketBreakdown>,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

pub fn compute_metrics(ledger: &Ledger, config: &RiskConfig) -> PerformanceMetrics {
    let history = &ledger.history;
    if history.is_empty() {
        return PerformanceMetrics::default();
    }

    let n = history.len() as f64;
    let count = |r: BetResult| history.iter().filter(|b| b.result == r).count();
    let winning_bets = count(BetResult::Win);

    let total_profit: f64 = history.iter().map(|b| b.profit).sum();
    let total_staked: f64 = history.iter().map(|b| b.stake).sum();
    let mean_kelly = history.iter().map(|b| b.kelly_fraction).sum::<f64>() / n;

    let mut by_market: BTreeMap<Market, MarketBreakdown> = BTreeMap::new();
    for bet in history {
        let entry = by_market.entry(bet.market).or_default();
        entry.bets += 1;
        if bet.result == BetResult::Win {
            entry.wins += 1;
        }
        entry.staked += bet.stake;
        entry.profit += bet.profit;
    }
    for entry in by_market.values_mut() {
        entry.roi = ratio(entry.profit, entry.staked);
    }

    let state = &ledger.state;
    PerformanceMetrics {
        total_bets: history.len(),
        winning_bets,
        losing_bets: count(BetResult::Loss),
        push_bets: count(BetResult::Push),
        win_rate: winning_bets as f64 / n,
        total_profit,
        total_staked,
        overall_roi: ratio(total_profit, total_staked),
        avg_edge: history.iter().map(|b| b.edge).sum::<f64>() / n,
        avg_confidence: history.iter().map(|b| b.confidence).sum::<f64>() / n,
        bankroll_growth_pct: ratio(
            state.current_bankroll - state.initial_bankroll,
            state.initial_bankroll,
        ) * 100.0,
        current_bankroll: state.current_bankroll,
        current_streak: state.current_streak,
        kelly_efficiency: ratio(mean_kelly, config.kelly_multiplier).clamp(0.0, 1.0),
        by_market,
    }
}

fn recent_win_rate(history: &[BetRecord], window: usize) -> (usize, f64) {
    let recent = &history[history.len().saturating_sub(window)..];
    let wins = recent.iter().filter(|b| b.result == BetResult::Win).count();
    (recent.len(), ratio(wins as f64, recent.len() as f64))
}

pub fn risk_alerts(ledger: &Ledger, config: &RiskConfig, now: DateTime<Utc>) -> Vec<String> {
    let mut alerts = Vec::new();
    let state = &ledger.state;

    let daily = ledger.daily_count_at(now);
    if config.max_bets_per_day > 0
        && daily as f64 >= config.max_bets_per_day as f64 * config.alert_daily_ratio
    {
        alerts.push(format!(
            "Approaching daily bet limit: {}/{}",
            daily, config.max_bets_per_day
        ));
    }

    let decline = ratio(
        state.initial_bankroll - state.current_bankroll,
        state.initial_bankroll,
    );
    if decline >= config.alert_bankroll_decline {
        alerts.push(format!("Bankroll declined by {:.1}%", decline * 100.0));
    }

    if state.current_streak <= -config.alert_streak {
        alerts.push(format!(
            "Losing streak: {} consecutive losses",
            state.current_streak.unsigned_abs()
        ));
    }

    let (sample, win_rate) = recent_win_rate(&ledger.history, config.win_rate_window);
    if sample >= config.win_rate_min_samples && win_rate < config.alert_win_rate {
        alerts.push(format!("Low win rate: {:.1}%", win_rate * 100.0));
    }

    alerts
}
