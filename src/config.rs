use std::fmt;

use crate::error::{HitError, Result};

/// How surviving hits are chosen after identity/coverage filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SelectionMode {
    /// Best hit(s) for each database gene-family cluster
    Cluster,
    /// First N hits in the aligner's score order
    Score,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Cluster => f.write_str("cluster"),
            SelectionMode::Score => f.write_str("score"),
        }
    }
}

/// Selection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub min_percent_identity: f64, // --min-identity
    pub min_coverage: f64,         // --min-coverage
    pub mode: SelectionMode,       // --method
    pub top_n: Option<usize>,      // --top-n, mandatory in score mode
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            min_percent_identity: 90.0,
            min_coverage: 60.0,
            mode: SelectionMode::Cluster,
            top_n: None,
        }
    }
}

impl SelectionConfig {
    pub fn cluster(min_percent_identity: f64, min_coverage: f64) -> Self {
        SelectionConfig {
            min_percent_identity,
            min_coverage,
            mode: SelectionMode::Cluster,
            top_n: None,
        }
    }

    pub fn score(min_percent_identity: f64, min_coverage: f64, top_n: usize) -> Self {
        SelectionConfig {
            min_percent_identity,
            min_coverage,
            mode: SelectionMode::Score,
            top_n: Some(top_n),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_percentage("min_percent_identity", self.min_percent_identity)?;
        check_percentage("min_coverage", self.min_coverage)?;

        match (self.mode, self.top_n) {
            (SelectionMode::Score, None) => Err(HitError::InvalidParameter(
                "'top_n' needs to be set when the selection mode is 'score'".to_string(),
            )),
            (SelectionMode::Score, Some(0)) => Err(HitError::InvalidParameter(
                "'top_n' must be a positive number".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn check_percentage(name: &str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(HitError::InvalidParameter(format!(
            "'{name}' must be within [0, 100], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SelectionConfig::default().validate().is_ok());
        assert!(SelectionConfig::score(95.0, 80.0, 5).validate().is_ok());
    }

    #[test]
    fn test_score_mode_requires_top_n() {
        let config = SelectionConfig {
            mode: SelectionMode::Score,
            ..SelectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HitError::InvalidParameter(_))
        ));
        assert!(SelectionConfig::score(90.0, 60.0, 0).validate().is_err());
    }

    #[test]
    fn test_thresholds_out_of_range() {
        assert!(SelectionConfig::cluster(101.0, 60.0).validate().is_err());
        assert!(SelectionConfig::cluster(90.0, -1.0).validate().is_err());
        assert!(SelectionConfig::cluster(f64::NAN, 60.0).validate().is_err());
    }
}
