//! Batch pricing run
//!
//! fixtures -> history + odds -> goal model -> value analysis -> staking.
//! A fixture that fails at any step is logged and skipped; the run goes on.
//! Settled results are matched back to recommendations and recorded through
//! the risk manager.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::GoalModel;
use crate::risk::{BetRecord, Recommendation, RiskManager};
use crate::source::MatchDataSource;
use crate::types::{Fixture, Settlement};
use crate::value::{OddsBook, ValueAnalyzer, ValueCandidate};

/// Outcome of one batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub analyzed: usize,
    pub skipped: usize,
    /// All value candidates across fixtures, best edge first per fixture
    pub candidates: Vec<ValueCandidate>,
    /// Candidates that passed the risk gates, highest risk score first
    pub recommendations: Vec<Recommendation>,
}

/// Outcome of recording settled results
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettlementReport {
    pub recorded: Vec<BetRecord>,
    /// Matched results the risk gates turned down at record time
    pub rejected: usize,
    /// Results with no matching recommendation
    pub unmatched: usize,
}

/// Record each settled result against the recommendation with the same
/// fixture and selection. A recommendation is settled at most once.
pub fn apply_settlements(
    risk: &RiskManager,
    recommendations: &[Recommendation],
    results: &[Settlement],
) -> SettlementReport {
    let mut report = SettlementReport::default();
    let mut settled = vec![false; recommendations.len()];

    for result in results {
        let matched = recommendations.iter().zip(&settled).position(|(rec, done)| {
            !done
                && rec.candidate.fixture_id == result.fixture_id
                && rec.candidate.selection == result.selection
        });
        let Some(i) = matched else {
            report.unmatched += 1;
            warn!(
                fixture_id = result.fixture_id,
                selection = %result.selection,
                "No recommendation for settled result"
            );
            continue;
        };
        settled[i] = true;

        match risk.validate_and_record(&recommendations[i].candidate, result.result) {
            Ok(record) => report.recorded.push(record),
            Err(rejection) => {
                report.rejected += 1;
                warn!(
                    fixture_id = result.fixture_id,
                    selection = %result.selection,
                    reason = %rejection,
                    "Settled bet rejected"
                );
            }
        }
    }
    report
}

pub struct Pipeline {
    model: GoalModel,
    analyzer: ValueAnalyzer,
}

impl Pipeline {
    pub fn new(model: GoalModel, analyzer: ValueAnalyzer) -> Self {
        Self { model, analyzer }
    }

    /// Price every fixture the source offers and size the survivors
    pub async fn run(&self, source: &dyn MatchDataSource, risk: &RiskManager) -> Result<RunReport> {
        let fixtures = source
            .fixtures()
            .await
            .with_context(|| format!("Failed to list fixtures from {}", source.name()))?;
        info!(source = source.name(), fixtures = fixtures.len(), "Starting run");

        let mut report = RunReport::default();
        for fixture in &fixtures {
            match self.price_fixture(source, fixture).await {
                Ok(candidates) => {
                    report.analyzed += 1;
                    report.candidates.extend(candidates);
                }
                Err(e) => {
                    report.skipped += 1;
                    warn!(
                        fixture_id = fixture.fixture_id,
                        error = %format!("{:#}", e),
                        "Skipping fixture"
                    );
                }
            }
        }

        report.recommendations = risk.recommendations(&report.candidates);
        info!(
            analyzed = report.analyzed,
            skipped = report.skipped,
            candidates = report.candidates.len(),
            recommendations = report.recommendations.len(),
            "Run complete"
        );
        Ok(report)
    }

    /// Fetch settled results from the source and record them
    pub async fn settle(
        &self,
        source: &dyn MatchDataSource,
        risk: &RiskManager,
        recommendations: &[Recommendation],
    ) -> Result<SettlementReport> {
        let results = source
            .results()
            .await
            .with_context(|| format!("Failed to fetch results from {}", source.name()))?;
        let report = apply_settlements(risk, recommendations, &results);
        info!(
            results = results.len(),
            recorded = report.recorded.len(),
            rejected = report.rejected,
            unmatched = report.unmatched,
            "Settlement complete"
        );
        Ok(report)
    }

    async fn price_fixture(
        &self,
        source: &dyn MatchDataSource,
        fixture: &Fixture,
    ) -> Result<Vec<ValueCandidate>> {
        fixture.validate()?;
        let history = source.history(fixture).await?;
        let book = OddsBook::from_quotes(source.odds(fixture).await?)?;

        let gates = self.analyzer.config();
        let summary = book.summary(gates.min_odds, gates.max_odds);
        debug!(
            fixture = %fixture.label(),
            quotes = summary.total,
            in_range = summary.valid,
            "Odds loaded"
        );

        let prediction = self.model.fit_predict(fixture, &history)?;
        Ok(self.analyzer.analyze(&prediction, &book))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(GoalModel::default(), ValueAnalyzer::default())
    }
}
