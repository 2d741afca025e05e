//! GoalEdge CLI
//!
//! Prices the fixtures of a JSON snapshot, prints stake recommendations,
//! records the snapshot's settled results and persists the bankroll ledger.

use anyhow::{Context, Result};
use goaledge::config::AppConfig;
use goaledge::model::GoalModel;
use goaledge::persistence::{self, CsvPersistence};
use goaledge::pipeline::Pipeline;
use goaledge::risk::RiskManager;
use goaledge::source::SnapshotSource;
use goaledge::value::ValueAnalyzer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config);
    info!(config = %config.digest(), "GoalEdge starting");

    let store = CsvPersistence::new(&config.persistence.data_dir)?;
    let state_path = store.state_path(&config.persistence.state_file);

    let saved = if config.bankroll.resume {
        persistence::load_state(&state_path)?
    } else {
        None
    };
    let risk = match saved {
        Some(ledger) => RiskManager::with_ledger(config.risk.clone(), config.value.clone(), ledger),
        None => RiskManager::new(
            config.risk.clone(),
            config.value.clone(),
            config.bankroll.initial,
        ),
    };

    let source = SnapshotSource::load(&config.input.snapshot_path).await?;
    let pipeline = Pipeline::new(
        GoalModel::new(config.model.clone()),
        ValueAnalyzer::new(config.value.clone()),
    );
    let report = pipeline
        .run(&source, &risk)
        .await
        .context("Pipeline run failed")?;

    for rec in &report.recommendations {
        info!(
            fixture = %rec.candidate.match_label,
            selection = %rec.candidate.selection,
            odds = rec.candidate.odds,
            edge = %format!("{:.3}", rec.candidate.edge),
            stake = %format!("{:.2}", rec.recommended_stake),
            "Recommendation"
        );
    }

    let settlement = pipeline
        .settle(&source, &risk, &report.recommendations)
        .await
        .context("Settlement failed")?;
    for record in &settlement.recorded {
        info!(
            fixture = %record.match_label,
            selection = %record.selection,
            result = %record.result,
            profit = %format!("{:.2}", record.profit),
            "Bet settled"
        );
    }

    for alert in risk.risk_alerts() {
        warn!(alert = %alert, "Risk alert");
    }

    let metrics = risk.performance_metrics();
    info!(
        bankroll = %format!("{:.2}", risk.current_bankroll()),
        bets = metrics.total_bets,
        win_rate = %format!("{:.3}", metrics.win_rate),
        roi = %format!("{:.3}", metrics.overall_roi),
        streak = metrics.current_streak,
        "Bankroll summary"
    );

    let ledger = risk.snapshot();
    if config.persistence.csv_enabled && !ledger.history.is_empty() {
        persistence::export_bet_history(&ledger.history, &store.bets_export_path())?;
    }
    persistence::save_state(&ledger, &state_path)?;

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
