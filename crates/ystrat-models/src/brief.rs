//! Creative brief and tone models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Psychological tone selector for a strategy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Curiosity,
    Authority,
    Fear,
    Persuasive,
    Engaging,
}

impl Tone {
    /// All canonical tones, in registry order.
    pub const ALL: [Tone; 5] = [
        Tone::Curiosity,
        Tone::Authority,
        Tone::Fear,
        Tone::Persuasive,
        Tone::Engaging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Curiosity => "curiosity",
            Tone::Authority => "authority",
            Tone::Fear => "fear",
            Tone::Persuasive => "persuasive",
            Tone::Engaging => "engaging",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown tone '{0}' (expected curiosity, authority, fear, persuasive or engaging)")]
pub struct ToneParseError(pub String);

impl std::str::FromStr for Tone {
    type Err = ToneParseError;

    /// Parses a tone name. Legacy vocabulary seen in older exports is
    /// accepted as aliases: `fomo` -> fear, `scarcity` -> persuasive,
    /// `emotional` -> engaging.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curiosity" => Ok(Tone::Curiosity),
            "authority" => Ok(Tone::Authority),
            "fear" | "fomo" => Ok(Tone::Fear),
            "persuasive" | "scarcity" => Ok(Tone::Persuasive),
            "engaging" | "emotional" => Ok(Tone::Engaging),
            other => Err(ToneParseError(other.to_string())),
        }
    }
}

/// The creator's creative intent for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub goal: String,
    pub audience: String,
    pub tone: Tone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_hint: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BriefError {
    #[error("goal must be 1..=500 characters")]
    Goal,
    #[error("audience must be 1..=200 characters")]
    Audience,
}

impl Brief {
    pub fn new(goal: impl Into<String>, audience: impl Into<String>, tone: Tone) -> Self {
        Self {
            goal: goal.into(),
            audience: audience.into(),
            tone,
            language_hint: None,
        }
    }

    pub fn with_language_hint(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = Some(hint.into());
        self
    }

    pub fn validate(&self) -> Result<(), BriefError> {
        let goal_len = self.goal.trim().chars().count();
        if goal_len == 0 || goal_len > 500 {
            return Err(BriefError::Goal);
        }
        let audience_len = self.audience.trim().chars().count();
        if audience_len == 0 || audience_len > 200 {
            return Err(BriefError::Audience);
        }
        Ok(())
    }
}
