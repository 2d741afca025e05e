//! GoalEdge Library
//!
//! Poisson goal model, value-bet detection and fractional Kelly staking
//! for football betting markets

pub mod config;
pub mod error;
pub mod model;
pub mod persistence;
pub mod pipeline;
pub mod risk;
pub mod source;
pub mod types;
pub mod value;

pub use error::{DataError, DataResult};
pub use model::{GoalModel, MatchPrediction};
pub use pipeline::{Pipeline, RunReport, SettlementReport};
pub use risk::{BetDecision, RiskManager};
pub use value::{ValueAnalyzer, ValueCandidate};
