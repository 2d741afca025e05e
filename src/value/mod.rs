//! Value Analyzer
//!
//! Compares model probabilities with market-implied probabilities and keeps
//! the selections that clear four gates:
//! - Odds inside the configured range
//! - Edge at or above the per-market threshold
//! - Confidence at or above the confidence threshold
//! - Positive Kelly fraction

pub mod edge;
pub mod odds;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

use crate::model::MatchPrediction;
use crate::types::{Market, Outcome};

pub use edge::{edge_confidence, estimate_edge, implied_probability, EdgeQuote};
pub use odds::{OddsBook, OddsSummary};

/// Value gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueConfig {
    pub min_odds: f64,
    pub max_odds: f64,
    pub confidence_threshold: f64,
    /// Edge threshold for markets without a dedicated one
    pub default_threshold: f64,
    pub match_result_threshold: f64,
    pub btts_threshold: f64,
    pub over_under_threshold: f64,
    pub corners_threshold: f64,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            min_odds: 1.8,
            max_odds: 8.0,
            confidence_threshold: 0.6,
            default_threshold: 0.08,
            match_result_threshold: 0.08,
            btts_threshold: 0.06,
            over_under_threshold: 0.07,
            corners_threshold: 0.05,
        }
    }
}

impl ValueConfig {
    /// Minimum edge for a market
    pub fn threshold(&self, market: Market) -> f64 {
        match market {
            Market::MatchResult => self.match_result_threshold,
            Market::BothTeamsToScore => self.btts_threshold,
            Market::OverUnderGoals => self.over_under_threshold,
            Market::Corners | Market::TeamCorners => self.corners_threshold,
            Market::CleanSheet => self.default_threshold,
        }
    }

    pub fn odds_in_range(&self, odds: f64) -> bool {
        odds >= self.min_odds && odds <= self.max_odds
    }
}

/// First gate a selection failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateFailure {
    NonFiniteInput,
    OddsOutOfRange { odds: f64 },
    EdgeBelowThreshold { edge: f64, threshold: f64 },
    LowConfidence { confidence: f64, threshold: f64 },
    NonPositiveKelly { kelly: f64 },
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::NonFiniteInput => write!(f, "probability or confidence not finite"),
            GateFailure::OddsOutOfRange { odds } => write!(f, "odds {:.2} out of range", odds),
            GateFailure::EdgeBelowThreshold { edge, threshold } => {
                write!(f, "edge {:.3} below {:.3}", edge, threshold)
            }
            GateFailure::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "confidence {:.3} below {:.3}", confidence, threshold),
            GateFailure::NonPositiveKelly { kelly } => write!(f, "kelly {:.4} not positive", kelly),
        }
    }
}

/// A selection whose model probability beats the market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCandidate {
    pub fixture_id: i64,
    pub match_label: String,
    pub market: Market,
    pub selection: Outcome,
    pub odds: f64,
    pub model_probability: f64,
    pub implied_probability: f64,
    pub edge: f64,
    pub confidence: f64,
}

impl ValueCandidate {
    /// Candidate with edge-derived confidence. `None` unless the edge is positive.
    pub fn new(
        fixture_id: i64,
        match_label: impl Into<String>,
        selection: Outcome,
        odds: f64,
        model_probability: f64,
    ) -> Option<Self> {
        let quote = estimate_edge(model_probability, odds);
        if quote.b <= 0.0 || quote.edge.is_nan() || quote.edge <= 0.0 {
            return None;
        }
        Some(Self {
            fixture_id,
            match_label: match_label.into(),
            market: selection.market(),
            selection,
            odds,
            model_probability,
            implied_probability: quote.p_implied,
            edge: quote.edge,
            confidence: edge_confidence(quote.edge),
        })
    }

    /// Override the confidence score
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Value bet analyzer
#[derive(Debug, Clone, Default)]
pub struct ValueAnalyzer {
    config: ValueConfig,
}

impl ValueAnalyzer {
    pub fn new(config: ValueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValueConfig {
        &self.config
    }

    /// First failing gate, or `None` when the bet has value
    pub fn gate(
        &self,
        model_probability: f64,
        odds: f64,
        market: Market,
        confidence: f64,
    ) -> Option<GateFailure> {
        if !model_probability.is_finite() || !confidence.is_finite() {
            return Some(GateFailure::NonFiniteInput);
        }

        if !self.config.odds_in_range(odds) {
            return Some(GateFailure::OddsOutOfRange { odds });
        }

        let quote = estimate_edge(model_probability, odds);
        let threshold = self.config.threshold(market);
        if quote.edge < threshold {
            return Some(GateFailure::EdgeBelowThreshold {
                edge: quote.edge,
                threshold,
            });
        }

        if confidence < self.config.confidence_threshold {
            return Some(GateFailure::LowConfidence {
                confidence,
                threshold: self.config.confidence_threshold,
            });
        }

        if quote.kelly_full.is_nan() || quote.kelly_full <= 0.0 {
            return Some(GateFailure::NonPositiveKelly {
                kelly: quote.kelly_full,
            });
        }

        None
    }

    pub fn is_value_bet(
        &self,
        model_probability: f64,
        odds: f64,
        market: Market,
        confidence: f64,
    ) -> bool {
        self.gate(model_probability, odds, market, confidence).is_none()
    }

    /// Home win, draw and away win
    pub fn analyze_match_result(
        &self,
        prediction: &MatchPrediction,
        book: &OddsBook,
    ) -> Vec<ValueCandidate> {
        [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin]
            .into_iter()
            .filter_map(|selection| {
                let p = prediction.probability(&selection)?;
                self.evaluate(prediction, book, selection, p)
            })
            .collect()
    }

    /// BTTS, goal over/under lines and clean sheets
    pub fn analyze_goals(
        &self,
        prediction: &MatchPrediction,
        book: &OddsBook,
    ) -> Vec<ValueCandidate> {
        let mut candidates = Vec::new();

        for (outcome, p) in prediction.probabilities.iter() {
            if matches!(outcome, Outcome::BttsYes | Outcome::Over(_)) {
                candidates.extend(self.evaluate_with_complement(prediction, book, *outcome, *p));
            }
        }

        for selection in [Outcome::CleanSheetHome, Outcome::CleanSheetAway] {
            if let Some(p) = prediction.probability(&selection) {
                candidates.extend(self.evaluate(prediction, book, selection, p));
            }
        }

        candidates
    }

    /// Total corners and per-side corners over/under lines
    pub fn analyze_corners(
        &self,
        prediction: &MatchPrediction,
        book: &OddsBook,
    ) -> Vec<ValueCandidate> {
        prediction
            .probabilities
            .iter()
            .filter(|(outcome, _)| {
                matches!(
                    outcome,
                    Outcome::CornersOver(_) | Outcome::HomeCornersOver(_) | Outcome::AwayCornersOver(_)
                )
            })
            .flat_map(|(outcome, p)| self.evaluate_with_complement(prediction, book, *outcome, *p))
            .collect()
    }

    /// All markets, highest edge first
    pub fn analyze(&self, prediction: &MatchPrediction, book: &OddsBook) -> Vec<ValueCandidate> {
        let mut candidates = self.analyze_match_result(prediction, book);
        candidates.extend(self.analyze_goals(prediction, book));
        candidates.extend(self.analyze_corners(prediction, book));

        candidates.sort_by(|a, b| b.edge.partial_cmp(&a.edge).unwrap_or(Ordering::Equal));

        debug!(
            fixture_id = prediction.fixture.fixture_id,
            quotes = book.len(),
            value_bets = candidates.len(),
            "Analyzed fixture"
        );
        candidates
    }

    /// The selection at `p` and its complement at `1 - p`
    fn evaluate_with_complement(
        &self,
        prediction: &MatchPrediction,
        book: &OddsBook,
        selection: Outcome,
        p: f64,
    ) -> Vec<ValueCandidate> {
        let mut candidates: Vec<ValueCandidate> =
            self.evaluate(prediction, book, selection, p).into_iter().collect();
        if let Some(other) = selection.complement() {
            candidates.extend(self.evaluate(prediction, book, other, 1.0 - p));
        }
        candidates
    }

    fn evaluate(
        &self,
        prediction: &MatchPrediction,
        book: &OddsBook,
        selection: Outcome,
        model_probability: f64,
    ) -> Option<ValueCandidate> {
        let odds = book.odds(&selection)?;
        let quote = estimate_edge(model_probability, odds);
        let confidence = edge_confidence(quote.edge);

        if let Some(failure) = self.gate(model_probability, odds, selection.market(), confidence) {
            debug!(
                fixture_id = prediction.fixture.fixture_id,
                selection = %selection,
                odds,
                reason = %failure,
                "Selection rejected"
            );
            return None;
        }

        ValueCandidate::new(
            prediction.fixture.fixture_id,
            prediction.fixture.label(),
            selection,
            odds,
            model_probability,
        )
    }
}
