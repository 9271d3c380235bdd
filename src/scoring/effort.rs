// src/scoring/effort.rs
//! Perceived exertion to effort score mapping
//!
//! | RPE | score |   | RPE | score |
//! |-----|-------|---|-----|-------|
//! | 1   | 0.10  |   | 6   | 0.80  |
//! | 2   | 0.20  |   | 7   | 0.90  |
//! | 3   | 0.35  |   | 8   | 1.00  |
//! | 4   | 0.50  |   | 9   | 1.00  |
//! | 5   | 0.65  |   | 10  | 1.00  |

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::constants::scoring::{MAX_RPE, MIN_RPE};

const EFFORT_TABLE: [f64; 10] = [0.10, 0.20, 0.35, 0.50, 0.65, 0.80, 0.90, 1.00, 1.00, 1.00];

/// Subjective exertion rating on the 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpeRating {
    Recorded(u8),
    #[default]
    NotRecorded,
}

impl RpeRating {
    /// Rating from a raw value; out-of-range values count as not recorded
    pub fn from_value(value: Option<i32>) -> Self {
        match value {
            Some(v) if (i32::from(MIN_RPE)..=i32::from(MAX_RPE)).contains(&v) => {
                RpeRating::Recorded(v as u8)
            }
            Some(v) => {
                warn!(rpe = v, "RPE outside 1-10, treating as not recorded");
                RpeRating::NotRecorded
            }
            None => RpeRating::NotRecorded,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.effort_score().is_some()
    }

    /// Effort score from the lookup table; `None` when not recorded
    pub fn effort_score(&self) -> Option<f64> {
        match *self {
            RpeRating::Recorded(v) if (MIN_RPE..=MAX_RPE).contains(&v) => {
                Some(EFFORT_TABLE[usize::from(v - MIN_RPE)])
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_monotonic() {
        let scores: Vec<f64> = (1..=10)
            .map(|v| RpeRating::from_value(Some(v)).effort_score().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(scores[0], 0.10);
        assert_eq!(scores[9], 1.0);
    }

    #[test]
    fn test_not_recorded() {
        assert_eq!(RpeRating::from_value(None), RpeRating::NotRecorded);
        assert!(RpeRating::NotRecorded.effort_score().is_none());
        assert!(!RpeRating::default().is_recorded());
    }

    #[test]
    fn test_out_of_range_is_not_recorded() {
        assert_eq!(RpeRating::from_value(Some(0)), RpeRating::NotRecorded);
        assert_eq!(RpeRating::from_value(Some(11)), RpeRating::NotRecorded);
        assert!(RpeRating::Recorded(42).effort_score().is_none());
    }
}
