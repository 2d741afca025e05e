//! Configuration management for GoalEdge
//!
//! Loads from YAML/TOML files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: GoalModelConfig,
    pub value: ValueConfig,
    pub risk: RiskConfig,
    pub bankroll: BankrollConfig,
    pub persistence: PersistenceConfig,
    pub input: InputConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Goal model defaults
            .set_default("model.base_home_goals", 1.5)?
            .set_default("model.base_away_goals", 1.2)?
            .set_default("model.home_advantage", 1.10)?
            .set_default("model.away_factor", 0.95)?
            .set_default("model.conceded_epsilon", 1e-6)?
            .set_default("model.max_goals", 9)?
            .set_default("model.goal_lines", vec![0.5, 1.5, 2.5])?
            .set_default("model.corner_lines", vec![4.5, 5.5, 6.5, 7.5, 8.5, 9.5])?
            .set_default("model.team_corner_lines", vec![4.5])?
            // Value gate defaults
            .set_default("value.min_odds", 1.8)?
            .set_default("value.max_odds", 8.0)?
            .set_default("value.confidence_threshold", 0.6)?
            .set_default("value.default_threshold", 0.08)?
            .set_default("value.match_result_threshold", 0.08)?
            .set_default("value.btts_threshold", 0.06)?
            .set_default("value.over_under_threshold", 0.07)?
            .set_default("value.corners_threshold", 0.05)?
            // Risk defaults
            .set_default("risk.kelly_multiplier", 0.25)?
            .set_default("risk.fixed_stake_pct", 0.02)?
            .set_default("risk.edge_unit", 0.05)?
            .set_default("risk.edge_multiplier_cap", 3.0)?
            .set_default("risk.min_stake", 10.0)?
            .set_default("risk.max_stake_pct", 0.05)?
            .set_default("risk.max_bets_per_day", 10)?
            .set_default("risk.alert_daily_ratio", 0.8)?
            .set_default("risk.alert_bankroll_decline", 0.10)?
            .set_default("risk.alert_streak", 5)?
            .set_default("risk.alert_win_rate", 0.40)?
            .set_default("risk.win_rate_window", 20)?
            .set_default("risk.win_rate_min_samples", 5)?
            // Bankroll defaults
            .set_default("bankroll.initial", 10_000.0)?
            .set_default("bankroll.resume", true)?
            // Persistence defaults
            .set_default("persistence.data_dir", "./data")?
            .set_default("persistence.csv_enabled", true)?
            .set_default("persistence.state_file", "bankroll_state.json")?
            // Input defaults
            .set_default("input.snapshot_path", "./data/snapshot.json")?
            // Logging defaults
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (GOALEDGE__*)
            .add_source(Environment::with_prefix("GOALEDGE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Generate a one-line digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "bankroll={:.2} odds=[{:.2},{:.2}] conf>={:.2} kelly_x={:.2} max_bets={} goal_lines={:?} snapshot={}",
            self.bankroll.initial,
            self.value.min_odds,
            self.value.max_odds,
            self.value.confidence_threshold,
            self.risk.kelly_multiplier,
            self.risk.max_bets_per_day,
            self.model.goal_lines,
            self.input.snapshot_path
        )
    }

    /// Reject values that would make the engine meaningless
    pub fn validate(&self) -> Result<()> {
        if self.value.min_odds >= self.value.max_odds {
            bail!(
                "value.min_odds ({}) must be below value.max_odds ({})",
                self.value.min_odds,
                self.value.max_odds
            );
        }
        if self.value.min_odds <= 1.0 {
            bail!("value.min_odds must be above 1.0");
        }
        if self.bankroll.initial.is_nan() || self.bankroll.initial <= 0.0 {
            bail!("bankroll.initial must be positive");
        }
        let multiplier = self.risk.kelly_multiplier;
        if multiplier.is_nan() || multiplier <= 0.0 || multiplier > 1.0 {
            bail!(
                "risk.kelly_multiplier must be in (0, 1], got {}",
                multiplier
            );
        }
        if self.model.goal_lines.is_empty() {
            bail!("model.goal_lines must not be empty");
        }
        if self.risk.min_stake < 0.0 {
            bail!("risk.min_stake must not be negative");
        }
        Ok(())
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
