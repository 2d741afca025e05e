//! Risk & Staking Manager
//!
//! Implements:
//! - Confidence-weighted fractional Kelly sizing
//! - Fixed, edge-scaled and daily-quota stake estimates
//! - Daily bet limits with UTC rollover
//! - Bankroll, streak and ledger tracking
//! - Performance metrics and risk alerts

pub mod ledger;
pub mod metrics;
pub mod staking;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::types::BetResult;
use crate::value::{ValueCandidate, ValueConfig};

pub use ledger::{BankrollState, BetRecord, Ledger};
pub use metrics::{MarketBreakdown, PerformanceMetrics};
pub use staking::{compute_fractional_kelly, compute_stake_breakdown, KellyQuote, StakeBreakdown};

/// Risk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Share of the confidence-adjusted Kelly fraction actually staked
    pub kelly_multiplier: f64,
    /// Fixed stake as a share of bankroll (e.g., 0.02 = 2%)
    pub fixed_stake_pct: f64,
    /// Edge that maps to a 1x edge multiplier
    pub edge_unit: f64,
    pub edge_multiplier_cap: f64,
    /// Minimum stake (currency units)
    pub min_stake: f64,
    /// Maximum stake as a share of bankroll
    pub max_stake_pct: f64,
    pub max_bets_per_day: usize,
    /// Share of the daily limit that triggers an alert
    pub alert_daily_ratio: f64,
    /// Bankroll decline (fraction of initial) that triggers an alert
    pub alert_bankroll_decline: f64,
    /// Consecutive losses that trigger an alert
    pub alert_streak: i64,
    pub alert_win_rate: f64,
    /// Number of most recent bets the win-rate alert looks at
    pub win_rate_window: usize,
    pub win_rate_min_samples: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            kelly_multiplier: 0.25,
            fixed_stake_pct: 0.02,
            edge_unit: 0.05,
            edge_multiplier_cap: 3.0,
            min_stake: 10.0,
            max_stake_pct: 0.05,
            max_bets_per_day: 10,
            alert_daily_ratio: 0.8,
            alert_bankroll_decline: 0.10,
            alert_streak: 5,
            alert_win_rate: 0.40,
            win_rate_window: 20,
            win_rate_min_samples: 5,
        }
    }
}

/// Why a bet was turned down
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    DailyLimitReached,
    EdgeTooLow { edge: f64 },
    OddsOutOfRange { odds: f64 },
    ConfidenceTooLow { confidence: f64 },
    StakeTooLow { stake: f64 },
    NegativeKelly { kelly: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DailyLimitReached => write!(f, "Daily bet limit reached"),
            Rejection::EdgeTooLow { edge } => write!(f, "Edge too low: {:.3}", edge),
            Rejection::OddsOutOfRange { odds } => write!(f, "Odds outside range: {}", odds),
            Rejection::ConfidenceTooLow { confidence } => {
                write!(f, "Confidence too low: {:.3}", confidence)
            }
            Rejection::StakeTooLow { .. } => write!(f, "Stake too low"),
            Rejection::NegativeKelly { .. } => write!(f, "Kelly Criterion negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BetDecision {
    Accepted(StakeBreakdown),
    Rejected(Rejection),
}

impl BetDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BetDecision::Accepted(_))
    }

    pub fn stake(&self) -> Option<&StakeBreakdown> {
        match self {
            BetDecision::Accepted(breakdown) => Some(breakdown),
            BetDecision::Rejected(_) => None,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            BetDecision::Accepted(_) => "Bet validated".to_string(),
            BetDecision::Rejected(rejection) => rejection.to_string(),
        }
    }
}

/// Accepted candidate with its sizing, ranked by `risk_score`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub candidate: ValueCandidate,
    pub stake: StakeBreakdown,
    pub recommended_stake: f64,
    pub kelly_fraction: f64,
    /// edge x confidence x fractional Kelly
    pub risk_score: f64,
}

/// Risk manager for stake sizing, limits and bankroll tracking
pub struct RiskManager {
    config: RiskConfig,
    /// Odds range, edge thresholds and confidence threshold
    gates: ValueConfig,
    ledger: RwLock<Ledger>,
}

impl RiskManager {
    pub fn new(config: RiskConfig, gates: ValueConfig, initial_bankroll: f64) -> Self {
        Self {
            config,
            gates,
            ledger: RwLock::new(Ledger::new(initial_bankroll, Utc::now())),
        }
    }

    /// Resume from a previously saved ledger
    pub fn with_ledger(config: RiskConfig, gates: ValueConfig, ledger: Ledger) -> Self {
        Self {
            config,
            gates,
            ledger: RwLock::new(ledger),
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    // Every mutation happens in one non-panicking block, so a poisoned guard
    // still holds a consistent ledger.
    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_bankroll(&self) -> f64 {
        self.read().state.current_bankroll
    }

    pub fn daily_bet_count(&self) -> usize {
        self.daily_bet_count_at(Utc::now())
    }

    pub fn daily_bet_count_at(&self, now: DateTime<Utc>) -> usize {
        self.read().daily_count_at(now)
    }

    /// Fractional Kelly fraction and stake at the current bankroll
    pub fn kelly_stake(&self, model_probability: f64, odds: f64, confidence: f64) -> (f64, f64) {
        let q = compute_fractional_kelly(
            model_probability,
            odds,
            confidence,
            self.config.kelly_multiplier,
            self.current_bankroll(),
        );
        (q.f_fractional, q.stake)
    }

    pub fn optimal_stake(&self, candidate: &ValueCandidate) -> StakeBreakdown {
        self.optimal_stake_at(candidate, Utc::now())
    }

    pub fn optimal_stake_at(&self, candidate: &ValueCandidate, now: DateTime<Utc>) -> StakeBreakdown {
        self.size(&self.read(), candidate, now)
    }

    pub fn validate_bet(&self, candidate: &ValueCandidate) -> BetDecision {
        self.validate_bet_at(candidate, Utc::now())
    }

    pub fn validate_bet_at(&self, candidate: &ValueCandidate, now: DateTime<Utc>) -> BetDecision {
        self.decide(&self.read(), candidate, now)
    }

    pub fn record_bet(&self, candidate: &ValueCandidate, stake: f64, result: BetResult) -> BetRecord {
        self.record_bet_at(candidate, stake, result, Utc::now())
    }

    pub fn record_bet_at(
        &self,
        candidate: &ValueCandidate,
        stake: f64,
        result: BetResult,
        now: DateTime<Utc>,
    ) -> BetRecord {
        let mut ledger = self.write();
        let kelly = compute_fractional_kelly(
            candidate.model_probability,
            candidate.odds,
            candidate.confidence,
            self.config.kelly_multiplier,
            ledger.state.current_bankroll,
        );
        let record = ledger.record(candidate, stake, result, kelly.f_fractional, now);
        Self::log_record(&record);
        record
    }

    /// Validate, size and settle under one write lock
    pub fn validate_and_record(
        &self,
        candidate: &ValueCandidate,
        result: BetResult,
    ) -> Result<BetRecord, Rejection> {
        self.validate_and_record_at(candidate, result, Utc::now())
    }

    pub fn validate_and_record_at(
        &self,
        candidate: &ValueCandidate,
        result: BetResult,
        now: DateTime<Utc>,
    ) -> Result<BetRecord, Rejection> {
        let mut ledger = self.write();
        match self.decide(&ledger, candidate, now) {
            BetDecision::Accepted(stake) => {
                let record =
                    ledger.record(candidate, stake.final_stake, result, stake.kelly_fraction, now);
                Self::log_record(&record);
                Ok(record)
            }
            BetDecision::Rejected(rejection) => Err(rejection),
        }
    }

    pub fn reset_daily_counters(&self) {
        self.reset_daily_counters_at(Utc::now());
    }

    pub fn reset_daily_counters_at(&self, now: DateTime<Utc>) {
        self.write().reset_daily(now);
        info!(date = %now.date_naive(), "Daily counters reset");
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        metrics::compute_metrics(&self.read(), &self.config)
    }

    pub fn risk_alerts(&self) -> Vec<String> {
        self.risk_alerts_at(Utc::now())
    }

    pub fn risk_alerts_at(&self, now: DateTime<Utc>) -> Vec<String> {
        metrics::risk_alerts(&self.read(), &self.config, now)
    }

    pub fn recommendations(&self, candidates: &[ValueCandidate]) -> Vec<Recommendation> {
        self.recommendations_at(candidates, Utc::now())
    }

    /// Accepted candidates with stakes, highest risk score first. Nothing is recorded.
    pub fn recommendations_at(
        &self,
        candidates: &[ValueCandidate],
        now: DateTime<Utc>,
    ) -> Vec<Recommendation> {
        let ledger = self.read();
        let mut out: Vec<Recommendation> = candidates
            .iter()
            .filter_map(|c| match self.decide(&ledger, c, now) {
                BetDecision::Accepted(stake) => Some(Recommendation {
                    candidate: c.clone(),
                    recommended_stake: stake.final_stake,
                    kelly_fraction: stake.kelly_fraction,
                    risk_score: c.edge * c.confidence * stake.kelly_fraction,
                    stake,
                }),
                BetDecision::Rejected(_) => None,
            })
            .collect();

        out.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(Ordering::Equal)
        });
        out
    }

    /// Consistent copy of bankroll state and history
    pub fn snapshot(&self) -> Ledger {
        self.read().clone()
    }

    pub fn restore(&self, snapshot: Ledger) {
        *self.write() = snapshot;
    }

    fn size(&self, ledger: &Ledger, candidate: &ValueCandidate, now: DateTime<Utc>) -> StakeBreakdown {
        let remaining = self
            .config
            .max_bets_per_day
            .saturating_sub(ledger.daily_count_at(now));
        compute_stake_breakdown(
            candidate,
            &self.config,
            ledger.state.current_bankroll,
            remaining,
        )
    }

    fn decide(&self, ledger: &Ledger, candidate: &ValueCandidate, now: DateTime<Utc>) -> BetDecision {
        let rejection = if ledger.daily_count_at(now) >= self.config.max_bets_per_day {
            Some(Rejection::DailyLimitReached)
        } else if !candidate.edge.is_finite()
            || candidate.edge < self.gates.threshold(candidate.market)
        {
            Some(Rejection::EdgeTooLow {
                edge: candidate.edge,
            })
        } else if !self.gates.odds_in_range(candidate.odds) {
            Some(Rejection::OddsOutOfRange {
                odds: candidate.odds,
            })
        } else if !candidate.confidence.is_finite()
            || candidate.confidence < self.gates.confidence_threshold
        {
            Some(Rejection::ConfidenceTooLow {
                confidence: candidate.confidence,
            })
        } else {
            None
        };

        if let Some(rejection) = rejection {
            debug!(selection = %candidate.selection, reason = %rejection, "Bet rejected");
            return BetDecision::Rejected(rejection);
        }

        let stake = self.size(ledger, candidate, now);
        if stake.final_stake.is_nan() || stake.final_stake < self.config.min_stake {
            return BetDecision::Rejected(Rejection::StakeTooLow {
                stake: stake.final_stake,
            });
        }
        if stake.kelly_fraction.is_nan() || stake.kelly_fraction <= 0.0 {
            return BetDecision::Rejected(Rejection::NegativeKelly {
                kelly: stake.kelly_fraction,
            });
        }

        BetDecision::Accepted(stake)
    }

    fn log_record(record: &BetRecord) {
        info!(
            fixture_id = record.fixture_id,
            selection = %record.selection,
            stake = %format!("{:.2}", record.stake),
            odds = record.odds,
            result = %record.result,
            bankroll = %format!("{:.2}", record.bankroll_after),
            "Recorded bet"
        );
    }
}

impl Default for RiskManager {
    fn default() -> Self {
        Self::new(RiskConfig::default(), ValueConfig::default(), 10_000.0)
    }
}
