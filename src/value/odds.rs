//! Normalized odds book for one fixture
//!
//! Quotes are validated once on the way in; downstream code only looks up
//! decimal odds by `Outcome`.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DataResult;
use crate::types::{OddsQuote, Outcome};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OddsBook {
    quotes: BTreeMap<Outcome, OddsQuote>,
}

/// Diagnostics over the quotes of one book
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub min_odds: Option<f64>,
    pub max_odds: Option<f64>,
    pub mean_odds: Option<f64>,
}

impl OddsBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book, failing on the first malformed quote
    pub fn from_quotes<I>(quotes: I) -> DataResult<Self>
    where
        I: IntoIterator<Item = OddsQuote>,
    {
        let mut book = Self::new();
        for quote in quotes {
            book.insert(quote)?;
        }
        Ok(book)
    }

    /// Add a quote; a later quote for the same selection replaces the earlier one
    pub fn insert(&mut self, quote: OddsQuote) -> DataResult<()> {
        quote.validate()?;
        if let Some(previous) = self.quotes.insert(quote.selection, quote) {
            debug!(
                selection = %quote.selection,
                previous = previous.odds,
                odds = quote.odds,
                "Replaced duplicate quote"
            );
        }
        Ok(())
    }

    pub fn odds(&self, outcome: &Outcome) -> Option<f64> {
        self.quotes.get(outcome).map(|q| q.odds)
    }

    pub fn quotes(&self) -> impl Iterator<Item = &OddsQuote> {
        self.quotes.values()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Copy of the book keeping only quotes with `min_odds <= odds <= max_odds`
    pub fn within_range(&self, min_odds: f64, max_odds: f64) -> OddsBook {
        let quotes = self
            .quotes
            .iter()
            .filter(|(_, q)| in_range(q.odds, min_odds, max_odds))
            .map(|(k, q)| (*k, *q))
            .collect();
        OddsBook { quotes }
    }

    pub fn summary(&self, min_odds: f64, max_odds: f64) -> OddsSummary {
        let valid: Vec<f64> = self
            .quotes
            .values()
            .map(|q| q.odds)
            .filter(|o| in_range(*o, min_odds, max_odds))
            .collect();

        let (min, max, mean) = if valid.is_empty() {
            (None, None, None)
        } else {
            (
                Some(valid.iter().copied().fold(f64::INFINITY, f64::min)),
                Some(valid.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                Some(valid.iter().sum::<f64>() / valid.len() as f64),
            )
        };

        OddsSummary {
            total: self.quotes.len(),
            valid: valid.len(),
            invalid: self.quotes.len() - valid.len(),
            min_odds: min,
            max_odds: max,
            mean_odds: mean,
        }
    }
}

fn in_range(odds: f64, min_odds: f64, max_odds: f64) -> bool {
    odds >= min_odds && odds <= max_odds
}
