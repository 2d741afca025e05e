//! Match data sources
//!
//! The engine never talks to data providers directly. Fixtures, history and
//! odds come in through `MatchDataSource`; `SnapshotSource` serves them from
//! a JSON file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::DataError;
use crate::types::{Fixture, Market, OddsQuote, Outcome, Settlement, TeamMatchRecord};

/// Trait for fixture/history/odds providers
#[async_trait]
pub trait MatchDataSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Fixtures to price
    async fn fixtures(&self) -> Result<Vec<Fixture>>;

    /// Historical records relevant to the fixture (oldest first)
    async fn history(&self, fixture: &Fixture) -> Result<Vec<TeamMatchRecord>>;

    /// Normalized quotes for the fixture
    async fn odds(&self, fixture: &Fixture) -> Result<Vec<OddsQuote>>;

    /// Settled results for earlier recommendations
    async fn results(&self) -> Result<Vec<Settlement>> {
        Ok(Vec::new())
    }
}

/// Quote as it appears in provider payloads, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub market: String,
    pub selection: String,
    pub odds: f64,
}

impl TryFrom<&RawQuote> for OddsQuote {
    type Error = DataError;

    fn try_from(raw: &RawQuote) -> Result<Self, Self::Error> {
        let quote = OddsQuote {
            market: raw.market.parse::<Market>()?,
            selection: raw.selection.parse::<Outcome>()?,
            odds: raw.odds,
        };
        quote.validate()?;
        Ok(quote)
    }
}

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    #[serde(default)]
    pub history: Vec<TeamMatchRecord>,
    /// Quotes keyed by fixture id
    #[serde(default)]
    pub odds: HashMap<String, Vec<RawQuote>>,
    #[serde(default)]
    pub results: Vec<Settlement>,
}

/// Serves fixtures, history and odds from a JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Read a snapshot file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        info!(
            path = %path.display(),
            fixtures = snapshot.fixtures.len(),
            records = snapshot.history.len(),
            results = snapshot.results.len(),
            "Snapshot loaded"
        );
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl MatchDataSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fixtures(&self) -> Result<Vec<Fixture>> {
        Ok(self.snapshot.fixtures.clone())
    }

    async fn history(&self, fixture: &Fixture) -> Result<Vec<TeamMatchRecord>> {
        Ok(self
            .snapshot
            .history
            .iter()
            .filter(|r| r.involves(&fixture.home_team) || r.involves(&fixture.away_team))
            .cloned()
            .collect())
    }

    async fn odds(&self, fixture: &Fixture) -> Result<Vec<OddsQuote>> {
        let Some(raw) = self.snapshot.odds.get(&fixture.fixture_id.to_string()) else {
            return Ok(Vec::new());
        };
        raw.iter()
            .map(|q| OddsQuote::try_from(q).map_err(anyhow::Error::from))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid odds for fixture {}", fixture.fixture_id))
    }

    async fn results(&self) -> Result<Vec<Settlement>> {
        Ok(self.snapshot.results.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetResult, Line};

    fn raw(market: &str, selection: &str, odds: f64) -> RawQuote {
        RawQuote {
            market: market.into(),
            selection: selection.into(),
            odds,
        }
    }

    #[test]
    fn raw_quote_normalizes() {
        let q = OddsQuote::try_from(&raw("over_under_goals", "over_2.5", 1.95)).unwrap();
        assert_eq!(q.selection, Outcome::Over(Line::from_tenths(25)));
        assert_eq!(q.market, Market::OverUnderGoals);

        assert!(matches!(
            OddsQuote::try_from(&raw("btts", "home_win", 2.0)),
            Err(DataError::MarketMismatch { .. })
        ));
        assert!(matches!(
            OddsQuote::try_from(&raw("handicap", "home_win", 2.0)),
            Err(DataError::UnknownMarket(_))
        ));
        assert!(matches!(
            OddsQuote::try_from(&raw("match_result", "home_win", 1.0)),
            Err(DataError::InvalidOdds { .. })
        ));
    }

    #[test]
    fn snapshot_filters_history_and_odds() {
        let mut odds = HashMap::new();
        odds.insert("1".to_string(), vec![raw("match_result", "home_win", 2.1)]);
        odds.insert("2".to_string(), vec![raw("match_result", "draw", 0.5)]);
        let source = SnapshotSource::new(Snapshot {
            fixtures: vec![Fixture::new(1, "A", "B"), Fixture::new(2, "C", "D")],
            history: vec![
                TeamMatchRecord::new("A", "X", 1, 0),
                TeamMatchRecord::new("Y", "B", 2, 2),
                TeamMatchRecord::new("C", "D", 0, 1),
            ],
            odds,
            ..Default::default()
        });

        tokio_test::block_on(async {
            let fixtures = source.fixtures().await.unwrap();
            assert_eq!(fixtures.len(), 2);

            let history = source.history(&fixtures[0]).await.unwrap();
            assert_eq!(history.len(), 2);

            let quotes = source.odds(&fixtures[0]).await.unwrap();
            assert_eq!(quotes.len(), 1);
            assert!(source.odds(&fixtures[1]).await.is_err());
            assert!(source
                .odds(&Fixture::new(99, "E", "F"))
                .await
                .unwrap()
                .is_empty());
        });
    }

    #[test]
    fn loads_from_file() {
        let dir = std::env::temp_dir().join(format!("goaledge_source_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");
        std::fs::write(
            &path,
            r#"{
                "fixtures": [{"fixture_id": 7, "home_team": "A", "away_team": "B"}],
                "history": [{"home_team": "A", "away_team": "B", "home_goals": 2, "away_goals": 1,
                             "home_possession": 55.0}],
                "odds": {"7": [{"market": "match_result", "selection": "home_win", "odds": 2.2}]},
                "results": [{"fixture_id": 7, "selection": "home_win", "result": "win"}]
            }"#,
        )
        .unwrap();

        let source = tokio_test::block_on(SnapshotSource::load(&path)).unwrap();
        assert_eq!(source.name(), "snapshot");
        let fixtures = tokio_test::block_on(source.fixtures()).unwrap();
        assert_eq!(fixtures[0].fixture_id, 7);
        let results = tokio_test::block_on(source.results()).unwrap();
        assert_eq!(
            results,
            vec![Settlement {
                fixture_id: 7,
                selection: Outcome::HomeWin,
                result: BetResult::Win,
            }]
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
