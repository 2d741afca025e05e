//! Core types used throughout GoalEdge
//!
//! Defines the shared data model: historical match records, fixtures,
//! markets, outcome keys, odds quotes and settlement results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Bet market families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    MatchResult,
    BothTeamsToScore,
    OverUnderGoals,
    Corners,
    TeamCorners,
    CleanSheet,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::MatchResult => "match_result",
            Market::BothTeamsToScore => "both_teams_to_score",
            Market::OverUnderGoals => "over_under_goals",
            Market::Corners => "corners",
            Market::TeamCorners => "team_corners",
            Market::CleanSheet => "clean_sheet",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "match_result" | "h2h" => Ok(Market::MatchResult),
            "both_teams_to_score" | "btts" => Ok(Market::BothTeamsToScore),
            "over_under_goals" | "goals" => Ok(Market::OverUnderGoals),
            "corners" => Ok(Market::Corners),
            "team_corners" => Ok(Market::TeamCorners),
            "clean_sheet" => Ok(Market::CleanSheet),
            _ => Err(DataError::UnknownMarket(s.to_string())),
        }
    }
}

/// A total line such as 2.5 goals or 9.5 corners, stored in tenths so it
/// can be hashed and ordered exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(u16);

impl Line {
    pub const fn from_tenths(tenths: u16) -> Self {
        Line(tenths)
    }

    /// Build from a decimal line. Rejects negative and non-finite values.
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let tenths = (value * 10.0).round();
        if tenths > u16::MAX as f64 {
            return None;
        }
        Some(Line(tenths as u16))
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Largest whole count that still stays under the line (2.5 -> 2)
    pub fn floor(&self) -> u64 {
        (self.0 / 10) as u64
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Outcome key of a probability table and selection of an odds quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
    BttsYes,
    BttsNo,
    Over(Line),
    Under(Line),
    CleanSheetHome,
    CleanSheetAway,
    CornersOver(Line),
    CornersUnder(Line),
    HomeCornersOver(Line),
    HomeCornersUnder(Line),
    AwayCornersOver(Line),
    AwayCornersUnder(Line),
}

impl Outcome {
    /// Market this outcome is traded in
    pub fn market(&self) -> Market {
        match self {
            Outcome::HomeWin | Outcome::Draw | Outcome::AwayWin => Market::MatchResult,
            Outcome::BttsYes | Outcome::BttsNo => Market::BothTeamsToScore,
            Outcome::Over(_) | Outcome::Under(_) => Market::OverUnderGoals,
            Outcome::CleanSheetHome | Outcome::CleanSheetAway => Market::CleanSheet,
            Outcome::CornersOver(_) | Outcome::CornersUnder(_) => Market::Corners,
            Outcome::HomeCornersOver(_)
            | Outcome::HomeCornersUnder(_)
            | Outcome::AwayCornersOver(_)
            | Outcome::AwayCornersUnder(_) => Market::TeamCorners,
        }
    }

    /// Complementary selection whose probability is `1 - p(self)`, if any
    pub fn complement(&self) -> Option<Outcome> {
        match self {
            Outcome::BttsYes => Some(Outcome::BttsNo),
            Outcome::BttsNo => Some(Outcome::BttsYes),
            Outcome::Over(l) => Some(Outcome::Under(*l)),
            Outcome::Under(l) => Some(Outcome::Over(*l)),
            Outcome::CornersOver(l) => Some(Outcome::CornersUnder(*l)),
            Outcome::CornersUnder(l) => Some(Outcome::CornersOver(*l)),
            Outcome::HomeCornersOver(l) => Some(Outcome::HomeCornersUnder(*l)),
            Outcome::HomeCornersUnder(l) => Some(Outcome::HomeCornersOver(*l)),
            Outcome::AwayCornersOver(l) => Some(Outcome::AwayCornersUnder(*l)),
            Outcome::AwayCornersUnder(l) => Some(Outcome::AwayCornersOver(*l)),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::HomeWin => write!(f, "home_win"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::AwayWin => write!(f, "away_win"),
            Outcome::BttsYes => write!(f, "btts"),
            Outcome::BttsNo => write!(f, "no_btts"),
            Outcome::Over(l) => write!(f, "over_{}", l),
            Outcome::Under(l) => write!(f, "under_{}", l),
            Outcome::CleanSheetHome => write!(f, "clean_sheet_home"),
            Outcome::CleanSheetAway => write!(f, "clean_sheet_away"),
            Outcome::CornersOver(l) => write!(f, "corners_over_{}", l),
            Outcome::CornersUnder(l) => write!(f, "corners_under_{}", l),
            Outcome::HomeCornersOver(l) => write!(f, "home_corners_over_{}", l),
            Outcome::HomeCornersUnder(l) => write!(f, "home_corners_under_{}", l),
            Outcome::AwayCornersOver(l) => write!(f, "away_corners_over_{}", l),
            Outcome::AwayCornersUnder(l) => write!(f, "away_corners_under_{}", l),
        }
    }
}

impl FromStr for Outcome {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        let unknown = || DataError::UnknownOutcome(s.to_string());
        let line = |raw: &str| -> Result<Line, DataError> {
            raw.parse::<f64>()
                .ok()
                .and_then(Line::new)
                .ok_or_else(unknown)
        };

        match label.as_str() {
            "home_win" => return Ok(Outcome::HomeWin),
            "draw" => return Ok(Outcome::Draw),
            "away_win" => return Ok(Outcome::AwayWin),
            "btts" | "btts_yes" => return Ok(Outcome::BttsYes),
            "no_btts" | "btts_no" => return Ok(Outcome::BttsNo),
            "clean_sheet_home" => return Ok(Outcome::CleanSheetHome),
            "clean_sheet_away" => return Ok(Outcome::CleanSheetAway),
            // Bare team-corner selections quote the 4.5 line
            "home_corners" => return Ok(Outcome::HomeCornersOver(Line::from_tenths(45))),
            "away_corners" => return Ok(Outcome::AwayCornersOver(Line::from_tenths(45))),
            _ => {}
        }

        if let Some(raw) = label.strip_prefix("home_corners_over_") {
            return Ok(Outcome::HomeCornersOver(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("home_corners_under_") {
            return Ok(Outcome::HomeCornersUnder(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("away_corners_over_") {
            return Ok(Outcome::AwayCornersOver(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("away_corners_under_") {
            return Ok(Outcome::AwayCornersUnder(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("corners_over_") {
            return Ok(Outcome::CornersOver(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("corners_under_") {
            return Ok(Outcome::CornersUnder(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("over_") {
            return Ok(Outcome::Over(line(raw)?));
        }
        if let Some(raw) = label.strip_prefix("under_") {
            return Ok(Outcome::Under(line(raw)?));
        }
        Err(unknown())
    }
}

impl TryFrom<String> for Outcome {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Outcome> for String {
    fn from(value: Outcome) -> Self {
        value.to_string()
    }
}

/// Settlement result of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
    Push,
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetResult::Win => write!(f, "win"),
            BetResult::Loss => write!(f, "loss"),
            BetResult::Push => write!(f, "push"),
        }
    }
}

/// Settled result for a recommended selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub fixture_id: i64,
    pub selection: Outcome,
    pub result: BetResult,
}

/// One historical match observation, as supplied by the data provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMatchRecord {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    #[serde(default)]
    pub home_possession: Option<f64>,
    #[serde(default)]
    pub away_possession: Option<f64>,
    #[serde(default)]
    pub home_pass_accuracy: Option<f64>,
    #[serde(default)]
    pub away_pass_accuracy: Option<f64>,
    #[serde(default)]
    pub home_corners: Option<f64>,
    #[serde(default)]
    pub away_corners: Option<f64>,
}

impl TeamMatchRecord {
    pub fn new(home_team: &str, away_team: &str, home_goals: u32, away_goals: u32) -> Self {
        Self {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_goals,
            away_goals,
            ..Default::default()
        }
    }

    /// Whether the team played in this match on either side
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Corners won and conceded by `team`, when the match carries corner data
    pub fn corners_for(&self, team: &str) -> Option<(f64, f64)> {
        let (home, away) = (self.home_corners?, self.away_corners?);
        if self.home_team == team {
            Some((home, away))
        } else if self.away_team == team {
            Some((away, home))
        } else {
            None
        }
    }
}

/// Fixture descriptor for the match being priced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub fixture_id: i64,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub league_name: String,
    #[serde(default)]
    pub match_date: String,
}

impl Fixture {
    pub fn new(fixture_id: i64, home_team: &str, away_team: &str) -> Self {
        Self {
            fixture_id,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            ..Default::default()
        }
    }

    /// Team names are the only mandatory fields
    pub fn validate(&self) -> Result<(), DataError> {
        if self.home_team.trim().is_empty() {
            return Err(DataError::MissingField("home_team"));
        }
        if self.away_team.trim().is_empty() {
            return Err(DataError::MissingField("away_team"));
        }
        Ok(())
    }

    /// Human-readable label, e.g. "Arsenal vs Chelsea"
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Normalized bookmaker price for one selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub market: Market,
    pub selection: Outcome,
    /// Decimal odds, strictly greater than 1.0
    pub odds: f64,
}

impl OddsQuote {
    pub fn new(selection: Outcome, odds: f64) -> Result<Self, DataError> {
        let quote = Self {
            market: selection.market(),
            selection,
            odds,
        };
        quote.validate()?;
        Ok(quote)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.selection.market() != self.market {
            return Err(DataError::MarketMismatch {
                market: self.market.to_string(),
                selection: self.selection.to_string(),
            });
        }
        if !self.odds.is_finite() || self.odds <= 1.0 {
            return Err(DataError::InvalidOdds {
                selection: self.selection.to_string(),
                odds: self.odds,
            });
        }
        Ok(())
    }

    pub fn implied_probability(&self) -> f64 {
        1.0 / self.odds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels_parse_back() {
        let outcomes = [
            Outcome::HomeWin,
            Outcome::BttsNo,
            Outcome::Over(Line::from_tenths(25)),
            Outcome::Under(Line::from_tenths(5)),
            Outcome::CleanSheetAway,
            Outcome::CornersOver(Line::from_tenths(95)),
        ];
        for outcome in outcomes {
            let parsed: Outcome = outcome.to_string().parse().unwrap();
            assert_eq!(parsed, outcome);
        }
        assert_eq!(Outcome::Over(Line::from_tenths(25)).to_string(), "over_2.5");
        assert_eq!(
            "corners_under_8.5".parse::<Outcome>().unwrap(),
            Outcome::CornersUnder(Line::from_tenths(85))
        );
    }

    #[test]
    fn team_corner_labels() {
        let home = Outcome::HomeCornersOver(Line::from_tenths(45));
        assert_eq!(home.to_string(), "home_corners_over_4.5");
        assert_eq!(home.market(), Market::TeamCorners);
        assert_eq!("home_corners".parse::<Outcome>().unwrap(), home);
        assert_eq!(
            "away_corners_under_3.5".parse::<Outcome>().unwrap(),
            Outcome::AwayCornersUnder(Line::from_tenths(35))
        );
        assert_eq!(
            home.complement(),
            Some(Outcome::HomeCornersUnder(Line::from_tenths(45)))
        );
        assert_eq!(Outcome::Draw.complement(), None);
        assert_eq!("team_corners".parse::<Market>().unwrap(), Market::TeamCorners);
    }

    #[test]
    fn unknown_outcome_is_rejected() {
        assert!("handicap_home".parse::<Outcome>().is_err());
        assert!("over_abc".parse::<Outcome>().is_err());
        assert!("over_-1".parse::<Outcome>().is_err());
    }

    #[test]
    fn outcome_serializes_as_label() {
        let quote = OddsQuote::new(Outcome::Over(Line::from_tenths(25)), 1.95).unwrap();
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"over_2.5\""));
        assert!(json.contains("\"over_under_goals\""));

        let back: OddsQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
    }

    #[test]
    fn line_floor_and_display() {
        let line = Line::new(2.5).unwrap();
        assert_eq!(line.floor(), 2);
        assert_eq!(line.to_string(), "2.5");
        assert!((line.value() - 2.5).abs() < 1e-12);
        assert!(Line::new(f64::NAN).is_none());
    }

    #[test]
    fn odds_quote_validation() {
        assert!(OddsQuote::new(Outcome::HomeWin, 1.0).is_err());
        assert!(OddsQuote::new(Outcome::HomeWin, f64::INFINITY).is_err());

        let mismatched = OddsQuote {
            market: Market::Corners,
            selection: Outcome::HomeWin,
            odds: 2.0,
        };
        assert!(matches!(
            mismatched.validate(),
            Err(DataError::MarketMismatch { .. })
        ));
    }

    #[test]
    fn fixture_requires_team_names() {
        assert!(Fixture::new(1, "Arsenal", "Chelsea").validate().is_ok());
        assert_eq!(
            Fixture::new(1, "  ", "Chelsea").validate(),
            Err(DataError::MissingField("home_team"))
        );
        assert_eq!(
            Fixture::new(1, "Arsenal", "").validate(),
            Err(DataError::MissingField("away_team"))
        );
    }

    #[test]
    fn record_corners_follow_team_side() {
        let mut record = TeamMatchRecord::new("A", "B", 1, 0);
        assert!(record.corners_for("A").is_none());
        record.home_corners = Some(7.0);
        record.away_corners = Some(3.0);
        assert_eq!(record.corners_for("A"), Some((7.0, 3.0)));
        assert_eq!(record.corners_for("B"), Some((3.0, 7.0)));
        assert_eq!(record.corners_for("C"), None);
    }
}
