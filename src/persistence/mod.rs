//! CSV Persistence Module
//!
//! Handles the bet ledger CSV export and the bankroll state JSON file

use anyhow::{Context, Result};
use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::risk::{BetRecord, Ledger};

/// Data directory layout for exports and state
#[derive(Debug, Clone)]
pub struct CsvPersistence {
    data_dir: PathBuf,
}

impl CsvPersistence {
    /// Create the data directory (and `exports/`) if missing
    pub fn new(data_dir: &str) -> Result<Self> {
        let data_dir = PathBuf::from(data_dir);
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        fs::create_dir_all(data_dir.join("exports"))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Dated export path, e.g. `exports/bets_2024-08-17.csv`
    pub fn bets_export_path(&self) -> PathBuf {
        let today = Utc::now().format("%Y-%m-%d");
        self.data_dir
            .join("exports")
            .join(format!("bets_{}.csv", today))
    }

    pub fn state_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

/// Write every record as one CSV row, replacing any existing file
pub fn export_bet_history(records: &[BetRecord], output_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(output_path)
        .with_context(|| format!("Failed to create export file {}", output_path.display()))?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(
        path = %output_path.display(),
        bets = records.len(),
        "Exported bet history"
    );
    Ok(())
}

pub fn load_bet_history(path: &Path) -> Result<Vec<BetRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: BetRecord = row.context("Malformed bet history row")?;
        records.push(record);
    }
    Ok(records)
}

/// Save bankroll state and history as pretty JSON
pub fn save_state(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        path = %path.display(),
        bankroll = %format!("{:.2}", ledger.state.current_bankroll),
        bets = ledger.history.len(),
        "State saved"
    );
    Ok(())
}

/// Load a saved ledger; `None` when no state file exists yet
pub fn load_state(path: &Path) -> Result<Option<Ledger>> {
    if !path.exists() {
        info!(path = %path.display(), "No state file found, starting fresh");
        return Ok(None);
    }

    let json = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse state file {}", path.display()))?;
    info!(
        path = %path.display(),
        bankroll = %format!("{:.2}", ledger.state.current_bankroll),
        bets = ledger.history.len(),
        "State loaded"
    );
    Ok(Some(ledger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetResult, Line, Outcome};
    use crate::value::ValueCandidate;

    fn temp_data_dir(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "goaledge_persistence_{}_{}",
            test_name,
            uuid::Uuid::new_v4()
        ))
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new(1_000.0, Utc::now());
        let over = Outcome::Over(Line::from_tenths(25));
        let c = ValueCandidate::new(5, "A vs B", over, 2.2, 0.6).unwrap();
        ledger.record(&c, 25.0, BetResult::Win, 0.03, Utc::now());
        ledger.record(&c, 25.0, BetResult::Loss, 0.03, Utc::now());
        ledger
    }

    #[test]
    fn export_writes_one_row_per_bet() {
        let dir = temp_data_dir("export");
        let store = CsvPersistence::new(dir.to_str().unwrap()).unwrap();
        let ledger = sample_ledger();
        let path = store.bets_export_path();

        export_bet_history(&ledger.history, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.lines().next().unwrap().starts_with("id,timestamp"));
        assert!(content.contains("over_2.5"));

        let back = load_bet_history(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].selection, ledger.history[0].selection);
        assert_eq!(back[1].result, BetResult::Loss);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn state_round_trip() {
        let dir = temp_data_dir("state");
        let store = CsvPersistence::new(dir.to_str().unwrap()).unwrap();
        let path = store.state_path("bankroll_state.json");

        assert!(load_state(&path).unwrap().is_none());

        let ledger = sample_ledger();
        save_state(&ledger, &path).unwrap();
        assert_eq!(load_state(&path).unwrap(), Some(ledger));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_state_is_an_error() {
        let dir = temp_data_dir("corrupt");
        let store = CsvPersistence::new(dir.to_str().unwrap()).unwrap();
        let path = store.state_path("bankroll_state.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_state(&path).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
