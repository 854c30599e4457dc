//! Prompt models.

use serde::{Deserialize, Serialize};

use crate::brief::Tone;

/// Metadata recorded alongside a rendered prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub tone: Tone,
    pub template_version: u32,
    pub included_keywords: Vec<String>,
    pub included_gaps: Vec<String>,
    pub examples_used: Vec<String>,
}

/// A rendered generation prompt. Byte-identical for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    pub metadata: PromptMetadata,
}
