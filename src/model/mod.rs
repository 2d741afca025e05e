//! Goal Expectancy Model
//!
//! Closed-form Poisson estimator:
//! - Team strength from historical goals, possession and passing
//! - Expected goals (lambda) per side from league base rates
//! - Match result, over/under, BTTS and clean sheet probabilities
//! - Corners expectancy when the history carries corner counts

pub mod corners;
pub mod poisson;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DataResult;
use crate::types::{Fixture, Line, Outcome, TeamMatchRecord};

pub use corners::CornersExpectancy;
pub use poisson::GoalDistribution;

/// Goal model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalModelConfig {
    /// League-average home goals
    pub base_home_goals: f64,
    /// League-average away goals
    pub base_away_goals: f64,
    /// Strength multiplier for the home side
    pub home_advantage: f64,
    /// Strength multiplier for the away side
    pub away_factor: f64,
    /// Stand-in for a mean of zero goals conceded before inverting it
    pub conceded_epsilon: f64,
    /// Truncation bound of the match-result sum
    pub max_goals: u64,
    pub goal_lines: Vec<f64>,
    pub corner_lines: Vec<f64>,
    /// Lines for a single side's corners
    pub team_corner_lines: Vec<f64>,
}

impl Default for GoalModelConfig {
    fn default() -> Self {
        Self {
            base_home_goals: 1.5,
            base_away_goals: 1.2,
            home_advantage: 1.10,
            away_factor: 0.95,
            conceded_epsilon: 1e-6,
            max_goals: 9,
            goal_lines: vec![0.5, 1.5, 2.5],
            corner_lines: vec![4.5, 5.5, 6.5, 7.5, 8.5, 9.5],
            team_corner_lines: vec![4.5],
        }
    }
}

/// Expected goals for one fixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalExpectancy {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub lambda_total: f64,
    /// Sample-size confidence in [0, 1]
    pub model_confidence: f64,
}

/// Probability per outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeProbabilityTable(BTreeMap<Outcome, f64>);

impl OutcomeProbabilityTable {
    pub fn get(&self, outcome: &Outcome) -> Option<f64> {
        self.0.get(outcome).copied()
    }

    pub fn insert(&mut self, outcome: Outcome, probability: f64) {
        self.0.insert(outcome, probability.clamp(0.0, 1.0));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Outcome, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Full model output for one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub fixture: Fixture,
    pub expectancy: GoalExpectancy,
    pub corners: Option<CornersExpectancy>,
    pub probabilities: OutcomeProbabilityTable,
}

impl MatchPrediction {
    pub fn probability(&self, outcome: &Outcome) -> Option<f64> {
        self.probabilities.get(outcome)
    }
}

/// Poisson goal model
#[derive(Debug, Clone)]
pub struct GoalModel {
    config: GoalModelConfig,
    goal_lines: Vec<Line>,
    corner_lines: Vec<Line>,
    team_corner_lines: Vec<Line>,
}

impl GoalModel {
    pub fn new(config: GoalModelConfig) -> Self {
        let lines = |values: &[f64]| -> Vec<Line> {
            values.iter().filter_map(|v| Line::new(*v)).collect()
        };
        Self {
            goal_lines: lines(&config.goal_lines),
            corner_lines: lines(&config.corner_lines),
            team_corner_lines: lines(&config.team_corner_lines),
            config,
        }
    }

    pub fn config(&self) -> &GoalModelConfig {
        &self.config
    }

    pub fn goal_lines(&self) -> &[Line] {
        &self.goal_lines
    }

    pub fn corner_lines(&self) -> &[Line] {
        &self.corner_lines
    }

    pub fn team_corner_lines(&self) -> &[Line] {
        &self.team_corner_lines
    }

    /// Combined attack/defense strength of `team` in the given role.
    /// Neutral 1.0 when the team never played in that role.
    pub fn team_strength(&self, records: &[TeamMatchRecord], team: &str, is_home: bool) -> f64 {
        let matches: Vec<&TeamMatchRecord> = records
            .iter()
            .filter(|r| {
                if is_home {
                    r.home_team == team
                } else {
                    r.away_team == team
                }
            })
            .collect();

        if matches.is_empty() {
            return 1.0;
        }

        let n = matches.len() as f64;
        let (mut scored, mut conceded, mut possession, mut passing) = (0.0, 0.0, 0.0, 0.0);
        for m in &matches {
            if is_home {
                scored += m.home_goals as f64;
                conceded += m.away_goals as f64;
                possession += m.home_possession.unwrap_or(50.0);
                passing += m.home_pass_accuracy.unwrap_or(80.0);
            } else {
                scored += m.away_goals as f64;
                conceded += m.home_goals as f64;
                possession += m.away_possession.unwrap_or(50.0);
                passing += m.away_pass_accuracy.unwrap_or(80.0);
            }
        }

        let possession_factor = 1.0 + (possession / n - 50.0) / 100.0;
        let pass_factor = 1.0 + (passing / n - 80.0) / 100.0;
        let attack = (scored / n) * possession_factor * pass_factor;
        let mean_conceded = conceded / n;
        let mean_conceded = if mean_conceded > 0.0 {
            mean_conceded
        } else {
            self.config.conceded_epsilon
        };
        let defense = 1.0 / (mean_conceded * 0.8);

        let venue = if is_home {
            self.config.home_advantage
        } else {
            self.config.away_factor
        };

        ((attack + defense) * venue).max(0.0)
    }

    /// Fit strengths from `records` and price every outcome of `fixture`
    pub fn fit_predict(
        &self,
        fixture: &Fixture,
        records: &[TeamMatchRecord],
    ) -> DataResult<MatchPrediction> {
        fixture.validate()?;
        let (home, away) = (fixture.home_team.as_str(), fixture.away_team.as_str());

        let lambda_home = self.config.base_home_goals * self.team_strength(records, home, true);
        let lambda_away = self.config.base_away_goals * self.team_strength(records, away, false);
        let expectancy = GoalExpectancy {
            lambda_home,
            lambda_away,
            lambda_total: lambda_home + lambda_away,
            model_confidence: model_confidence(records, home, away),
        };

        let mut table = OutcomeProbabilityTable::default();

        let (home_win, draw, away_win) =
            match_result_probabilities(lambda_home, lambda_away, self.config.max_goals);
        table.insert(Outcome::HomeWin, home_win);
        table.insert(Outcome::Draw, draw);
        table.insert(Outcome::AwayWin, away_win);

        let total = GoalDistribution::new(expectancy.lambda_total);
        for line in &self.goal_lines {
            let over = total.survival(line.floor());
            table.insert(Outcome::Over(*line), over);
            table.insert(Outcome::Under(*line), 1.0 - over);
        }

        let btts = btts_probability(lambda_home, lambda_away);
        table.insert(Outcome::BttsYes, btts);
        table.insert(Outcome::BttsNo, 1.0 - btts);

        table.insert(
            Outcome::CleanSheetHome,
            GoalDistribution::new(lambda_away).pmf(0),
        );
        table.insert(
            Outcome::CleanSheetAway,
            GoalDistribution::new(lambda_home).pmf(0),
        );

        let corners = if corners::has_corner_data(records, home, away) {
            let expected = corners::expected_corners(
                &corners::team_corners(records, home),
                &corners::team_corners(records, away),
            );
            let dist = GoalDistribution::new(expected.expected_total);
            for line in &self.corner_lines {
                let over = dist.survival(line.floor());
                table.insert(Outcome::CornersOver(*line), over);
                table.insert(Outcome::CornersUnder(*line), 1.0 - over);
            }

            let home_dist = GoalDistribution::new(expected.expected_home);
            let away_dist = GoalDistribution::new(expected.expected_away);
            for line in &self.team_corner_lines {
                let home_over = home_dist.survival(line.floor());
                table.insert(Outcome::HomeCornersOver(*line), home_over);
                table.insert(Outcome::HomeCornersUnder(*line), 1.0 - home_over);
                let away_over = away_dist.survival(line.floor());
                table.insert(Outcome::AwayCornersOver(*line), away_over);
                table.insert(Outcome::AwayCornersUnder(*line), 1.0 - away_over);
            }
            Some(expected)
        } else {
            None
        };

        debug!(
            fixture_id = fixture.fixture_id,
            lambda_home = %format!("{:.3}", lambda_home),
            lambda_away = %format!("{:.3}", lambda_away),
            confidence = expectancy.model_confidence,
            corners = corners.is_some(),
            "Fitted goal model"
        );

        Ok(MatchPrediction {
            fixture: fixture.clone(),
            expectancy,
            corners,
            probabilities: table,
        })
    }
}

impl Default for GoalModel {
    fn default() -> Self {
        Self::new(GoalModelConfig::default())
    }
}

/// Home win, draw and away win, clipped and renormalized to sum to one
pub fn match_result_probabilities(
    lambda_home: f64,
    lambda_away: f64,
    max_goals: u64,
) -> (f64, f64, f64) {
    let home = GoalDistribution::new(lambda_home);
    let away = GoalDistribution::new(lambda_away);

    let mut home_win = 0.0;
    let mut away_win = 0.0;
    for k in 0..=max_goals {
        let below = k as i64 - 1;
        home_win += home.pmf(k) * away.cdf(below);
        away_win += away.pmf(k) * home.cdf(below);
    }

    let home_win = home_win.clamp(0.0, 1.0);
    let away_win = away_win.clamp(0.0, 1.0);
    let draw = (1.0 - home_win - away_win).clamp(0.0, 1.0);

    let sum = home_win + draw + away_win;
    if sum <= 0.0 {
        return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    }
    (home_win / sum, draw / sum, away_win / sum)
}

/// P(total goals > line)
pub fn over_probability(lambda_total: f64, line: Line) -> f64 {
    GoalDistribution::new(lambda_total).survival(line.floor())
}

/// P(both sides score at least once)
pub fn btts_probability(lambda_home: f64, lambda_away: f64) -> f64 {
    let home_scores = 1.0 - GoalDistribution::new(lambda_home).pmf(0);
    let away_scores = 1.0 - GoalDistribution::new(lambda_away).pmf(0);
    (home_scores * away_scores).clamp(0.0, 1.0)
}

/// Stepped confidence on the smaller sample of the two teams
pub fn model_confidence(records: &[TeamMatchRecord], home: &str, away: &str) -> f64 {
    let home_n = records.iter().filter(|r| r.involves(home)).count();
    let away_n = records.iter().filter(|r| r.involves(away)).count();
    match home_n.min(away_n) {
        0..=1 => 0.3,
        2..=4 => 0.5,
        5..=9 => 0.7,
        _ => 0.9,
    }
}
