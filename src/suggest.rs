//! Mood suggestions
//!
//! A [`MoodSuggester`] proposes a mood level for the user to accept or
//! override before submitting an entry. The only implementation is
//! [`SimulatedSuggester`], a stand-in for camera-based detection that waits a
//! fixed analysis time and returns a random level.

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

use crate::model::{MoodLevel, MAX_MOOD, MIN_MOOD};

/// Lowest confidence a simulated suggestion reports
pub const MIN_CONFIDENCE: f64 = 0.7;

/// A proposed mood level
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodSuggestion {
    pub mood: u8,
    /// In [0, 1]
    pub confidence: f64,
}

impl MoodSuggestion {
    pub fn level(&self) -> Option<&'static MoodLevel> {
        MoodLevel::of(self.mood)
    }
}

/// Errors that can occur while producing a suggestion
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("Suggestion unavailable: {0}")]
    Unavailable(String),

    #[error("Suggestion failed: {0}")]
    Failed(String),
}

/// Source of mood suggestions
#[async_trait]
pub trait MoodSuggester: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Produce one suggestion
    async fn suggest(&self) -> Result<MoodSuggestion, SuggestError>;
}

/// Random suggestions after a fixed delay
#[derive(Debug, Clone)]
pub struct SimulatedSuggester {
    delay: Duration,
}

impl SimulatedSuggester {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn pick<R: Rng + ?Sized>(rng: &mut R) -> MoodSuggestion {
        MoodSuggestion {
            mood: rng.gen_range(MIN_MOOD..=MAX_MOOD),
            confidence: rng.gen_range(MIN_CONFIDENCE..1.0),
        }
    }
}

#[async_trait]
impl MoodSuggester for SimulatedSuggester {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn suggest(&self) -> Result<MoodSuggestion, SuggestError> {
        tokio::time::sleep(self.delay).await;

        // ThreadRng is not Send; keep it out of the await
        let suggestion = Self::pick(&mut rand::thread_rng());

        tracing::debug!(
            mood = suggestion.mood,
            confidence = suggestion.confidence,
            "Simulated mood suggestion"
        );
        Ok(suggestion)
    }
}
