//! Corners expectancy
//!
//! Recency-weighted corners for/against per team, combined into expected
//! corners per side. The over/under lines are priced by the goal model.

use serde::{Deserialize, Serialize};

use crate::types::TeamMatchRecord;

const DEFAULT_CORNERS: f64 = 5.0;
const RECENT_WINDOW: usize = 5;
const RECENT_WEIGHT: f64 = 0.7;
const HOME_CORNER_BOOST: f64 = 0.75;
/// Form weight used when a team has no matches at all
const NEUTRAL_FORM: f64 = 0.5;

/// Expected corners for one fixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornersExpectancy {
    pub expected_home: f64,
    pub expected_away: f64,
    pub expected_total: f64,
}

/// Per-team corner profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamCorners {
    pub corners_for: f64,
    pub corners_against: f64,
    pub form_weight: f64,
}

/// Whether any record involving either team carries corner counts
pub fn has_corner_data(records: &[TeamMatchRecord], home: &str, away: &str) -> bool {
    records
        .iter()
        .any(|r| r.corners_for(home).is_some() || r.corners_for(away).is_some())
}

/// 0.7 x mean of the last five observations + 0.3 x overall mean
fn recency_weighted(values: &[f64]) -> f64 {
    if values.is_empty() {
        return DEFAULT_CORNERS;
    }
    let overall = mean(values);
    let recent = if values.len() >= RECENT_WINDOW {
        mean(&values[values.len() - RECENT_WINDOW..])
    } else {
        overall
    };
    RECENT_WEIGHT * recent + (1.0 - RECENT_WEIGHT) * overall
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Corner profile for `team` from chronological records (oldest first)
pub fn team_corners(records: &[TeamMatchRecord], team: &str) -> TeamCorners {
    let played = records.iter().filter(|r| r.involves(team)).count();
    let (won, conceded): (Vec<f64>, Vec<f64>) =
        records.iter().filter_map(|r| r.corners_for(team)).unzip();

    let form_weight = if played == 0 {
        NEUTRAL_FORM
    } else {
        (played as f64 / 10.0).min(1.0)
    };

    TeamCorners {
        corners_for: recency_weighted(&won),
        corners_against: recency_weighted(&conceded),
        form_weight,
    }
}

/// Combine both profiles into expected corners per side
pub fn expected_corners(home: &TeamCorners, away: &TeamCorners) -> CornersExpectancy {
    let expected_home = ((home.corners_for + away.corners_against) / 2.0 + HOME_CORNER_BOOST)
        * (0.8 + 0.4 * home.form_weight);
    let expected_away =
        ((away.corners_for + home.corners_against) / 2.0) * (0.8 + 0.4 * away.form_weight);

    CornersExpectancy {
        expected_home,
        expected_away,
        expected_total: expected_home + expected_away,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_corners(home: &str, away: &str, hc: f64, ac: f64) -> TeamMatchRecord {
        let mut r = TeamMatchRecord::new(home, away, 1, 1);
        r.home_corners = Some(hc);
        r.away_corners = Some(ac);
        r
    }

    #[test]
    fn defaults_without_observations() {
        let profile = team_corners(&[], "A");
        assert_eq!(profile.corners_for, DEFAULT_CORNERS);
        assert_eq!(profile.corners_against, DEFAULT_CORNERS);
        assert_eq!(profile.form_weight, NEUTRAL_FORM);
    }

    #[test]
    fn recent_matches_weigh_more() {
        // Six matches: one old outlier then five recent at 4 corners
        let mut records = vec![with_corners("A", "B", 10.0, 2.0)];
        for _ in 0..5 {
            records.push(with_corners("A", "B", 4.0, 2.0));
        }
        let profile = team_corners(&records, "A");
        let overall = (10.0 + 5.0 * 4.0) / 6.0;
        let expected = 0.7 * 4.0 + 0.3 * overall;
        assert!((profile.corners_for - expected).abs() < 1e-9);
        assert!((profile.corners_against - 2.0).abs() < 1e-9);
        assert!((profile.form_weight - 0.6).abs() < 1e-9);
    }

    #[test]
    fn away_side_swaps_counts() {
        let records = vec![with_corners("B", "A", 7.0, 3.0)];
        let profile = team_corners(&records, "A");
        assert!((profile.corners_for - 3.0).abs() < 1e-9);
        assert!((profile.corners_against - 7.0).abs() < 1e-9);
    }

    #[test]
    fn home_gets_boost() {
        let neutral = TeamCorners {
            corners_for: 5.0,
            corners_against: 5.0,
            form_weight: 0.5,
        };
        let exp = expected_corners(&neutral, &neutral);
        assert!((exp.expected_home - 5.75).abs() < 1e-9);
        assert!((exp.expected_away - 5.0).abs() < 1e-9);
        assert!((exp.expected_total - 10.75).abs() < 1e-9);
    }

    #[test]
    fn detects_corner_data() {
        let plain = TeamMatchRecord::new("A", "B", 0, 0);
        assert!(!has_corner_data(&[plain.clone()], "A", "C"));
        let rich = with_corners("X", "C", 5.0, 5.0);
        assert!(has_corner_data(&[plain, rich], "A", "C"));
    }
}
