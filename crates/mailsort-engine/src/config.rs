//! Job configuration

use crate::error::EngineError;
use crate::segment::SignatureRules;

/// Tunable knobs for one job
///
/// Validated before any processing starts; a bad value never produces a
/// partially processed job.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum best score for automatic categorization
    pub auto_threshold: f64,
    /// Ranked candidates shown per pending review item
    pub max_review_suggestions: usize,
    /// Weight applied to the token-set overlap score
    pub token_weight: f64,
    /// Weight applied to the edit-distance similarity score
    pub edit_weight: f64,
    /// Start/continuation detection rules for the segmenter
    pub signatures: SignatureRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_threshold: 0.85,
            max_review_suggestions: 5,
            token_weight: 1.0,
            edit_weight: 1.0,
            signatures: SignatureRules::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_auto_threshold(mut self, threshold: f64) -> Self {
        self.auto_threshold = threshold;
        self
    }

    pub fn with_max_review_suggestions(mut self, count: usize) -> Self {
        self.max_review_suggestions = count;
        self
    }

    pub fn with_signatures(mut self, signatures: SignatureRules) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.auto_threshold) {
            return Err(EngineError::Configuration(format!(
                "auto_threshold must be within [0, 1], got {}",
                self.auto_threshold
            )));
        }
        for (name, weight) in [("token_weight", self.token_weight), ("edit_weight", self.edit_weight)] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(EngineError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, weight
                )));
            }
        }
        if self.max_review_suggestions == 0 {
            return Err(EngineError::Configuration(
                "max_review_suggestions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
