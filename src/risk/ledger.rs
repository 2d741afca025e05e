//! Bankroll state and the append-only bet ledger

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BetResult, Market, Outcome};
use crate::value::ValueCandidate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankrollState {
    pub current_bankroll: f64,
    pub initial_bankroll: f64,
    pub daily_bet_count: usize,
    /// UTC date the daily counter belongs to
    pub daily_date: NaiveDate,
    /// +n for n straight wins, -n for n straight losses
    pub current_streak: i64,
    pub total_wins: usize,
    pub total_losses: usize,
}

impl BankrollState {
    pub fn new(initial_bankroll: f64, now: DateTime<Utc>) -> Self {
        Self {
            current_bankroll: initial_bankroll,
            initial_bankroll,
            daily_bet_count: 0,
            daily_date: now.date_naive(),
            current_streak: 0,
            total_wins: 0,
            total_losses: 0,
        }
    }
}

/// Settled bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub fixture_id: i64,
    pub match_label: String,
    pub market: Market,
    pub selection: Outcome,
    pub stake: f64,
    pub odds: f64,
    pub model_probability: f64,
    pub edge: f64,
    pub confidence: f64,
    /// Fractional Kelly at settlement
    pub kelly_fraction: f64,
    pub result: BetResult,
    pub profit: f64,
    pub roi: f64,
    pub bankroll_before: f64,
    pub bankroll_after: f64,
}

/// Bankroll state plus history, kept together so they change atomically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub state: BankrollState,
    pub history: Vec<BetRecord>,
}

impl Ledger {
    pub fn new(initial_bankroll: f64, now: DateTime<Utc>) -> Self {
        Self {
            state: BankrollState::new(initial_bankroll, now),
            history: Vec::new(),
        }
    }

    /// Bets counted against the day of `now`; a stale date reads as zero
    pub fn daily_count_at(&self, now: DateTime<Utc>) -> usize {
        if self.state.daily_date == now.date_naive() {
            self.state.daily_bet_count
        } else {
            0
        }
    }

    pub fn reset_daily(&mut self, now: DateTime<Utc>) {
        self.state.daily_bet_count = 0;
        self.state.daily_date = now.date_naive();
    }

    /// Settle a bet. The daily counter rolls over before this bet is counted.
    pub fn record(
        &mut self,
        candidate: &ValueCandidate,
        stake: f64,
        result: BetResult,
        kelly_fraction: f64,
        now: DateTime<Utc>,
    ) -> BetRecord {
        if self.state.daily_date != now.date_naive() {
            self.reset_daily(now);
        }

        let state = &mut self.state;
        let bankroll_before = state.current_bankroll;
        let profit = match result {
            BetResult::Win => {
                state.total_wins += 1;
                state.current_streak = if state.current_streak >= 0 {
                    state.current_streak + 1
                } else {
                    1
                };
                stake * (candidate.odds - 1.0)
            }
            BetResult::Loss => {
                state.total_losses += 1;
                state.current_streak = if state.current_streak <= 0 {
                    state.current_streak - 1
                } else {
                    -1
                };
                -stake
            }
            BetResult::Push => 0.0,
        };
        state.current_bankroll += profit;
        state.daily_bet_count += 1;

        let record = BetRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            fixture_id: candidate.fixture_id,
            match_label: candidate.match_label.clone(),
            market: candidate.market,
            selection: candidate.selection,
            stake,
            odds: candidate.odds,
            model_probability: candidate.model_probability,
            edge: candidate.edge,
            confidence: candidate.confidence,
            kelly_fraction,
            result,
            profit,
            roi: if stake > 0.0 { profit / stake } else { 0.0 },
            bankroll_before,
            bankroll_after: state.current_bankroll,
        };
        self.history.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn candidate() -> ValueCandidate {
        ValueCandidate::new(9, "A vs B", Outcome::HomeWin, 2.5, 0.5).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn win_loss_push_move_bankroll_and_streak() {
        let mut ledger = Ledger::new(1_000.0, noon());

        let win = ledger.record(&candidate(), 100.0, BetResult::Win, 0.02, noon());
        assert!((win.profit - 150.0).abs() < 1e-9);
        assert!((win.roi - 1.5).abs() < 1e-9);
        assert_eq!(win.bankroll_before, 1_000.0);
        assert_eq!(win.bankroll_after, 1_150.0);
        assert_eq!(ledger.state.current_streak, 1);

        ledger.record(&candidate(), 50.0, BetResult::Loss, 0.02, noon());
        assert_eq!(ledger.state.current_streak, -1);
        ledger.record(&candidate(), 50.0, BetResult::Loss, 0.02, noon());
        assert_eq!(ledger.state.current_streak, -2);

        let push = ledger.record(&candidate(), 50.0, BetResult::Push, 0.02, noon());
        assert_eq!(push.profit, 0.0);
        assert_eq!(ledger.state.current_streak, -2);
        assert_eq!(ledger.state.current_bankroll, 1_050.0);
        assert_eq!(ledger.state.total_wins, 1);
        assert_eq!(ledger.state.total_losses, 2);
        assert_eq!(ledger.history.len(), 4);
        assert_eq!(ledger.daily_count_at(noon()), 4);
    }

    #[test]
    fn new_day_starts_at_one() {
        let mut ledger = Ledger::new(1_000.0, noon());
        for _ in 0..3 {
            ledger.record(&candidate(), 10.0, BetResult::Push, 0.0, noon());
        }
        let tomorrow = noon() + Duration::days(1);
        assert_eq!(ledger.daily_count_at(tomorrow), 0);

        ledger.record(&candidate(), 10.0, BetResult::Push, 0.0, tomorrow);
        assert_eq!(ledger.daily_count_at(tomorrow), 1);
        assert_eq!(ledger.state.daily_date, tomorrow.date_naive());
    }

    #[test]
    fn zero_stake_roi() {
        let mut ledger = Ledger::new(1_000.0, noon());
        let record = ledger.record(&candidate(), 0.0, BetResult::Loss, 0.0, noon());
        assert_eq!(record.roi, 0.0);
    }
}
