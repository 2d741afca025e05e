//! Configuration section types and re-exports

use serde::Deserialize;

pub use crate::model::GoalModelConfig;
pub use crate::risk::RiskConfig;
pub use crate::value::ValueConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct BankrollConfig {
    /// Starting bankroll when no saved state exists
    pub initial: f64,
    /// Resume from the saved state file if present
    pub resume: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for CSV exports and state files
    pub data_dir: String,
    /// Export the bet ledger to CSV after a run
    pub csv_enabled: bool,
    /// Bankroll state file name inside `data_dir`
    pub state_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON snapshot with fixtures, history and odds
    pub snapshot_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}
