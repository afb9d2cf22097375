//! Generation pipeline: provider call and history write as one logical unit.
//!
//! Flow: build prompt → provider.generate() → history.insert() → return text + id.
//!
//! A history row is only ever written for a successful generation. If the write
//! itself fails, the whole operation fails and the generated text is dropped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, RESUME_REWRITE_PROMPT_TEMPLATE,
    RESUME_REWRITE_SYSTEM,
};
use crate::history::{HistoryStore, NewHistoryEntry, StoreError};
use crate::llm_client::{LlmError, PromptMessage, TextGenerator};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// What to generate. The serialized form is the history `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationKind {
    #[serde(rename = "cover")]
    CoverLetter,
    #[serde(rename = "resume")]
    Resume,
}

impl GenerationKind {
    pub fn history_tag(self) -> &'static str {
        match self {
            GenerationKind::CoverLetter => "cover",
            GenerationKind::Resume => "resume",
        }
    }

    fn system_prompt(self) -> &'static str {
        match self {
            GenerationKind::CoverLetter => COVER_LETTER_SYSTEM,
            GenerationKind::Resume => RESUME_REWRITE_SYSTEM,
        }
    }

    fn prompt_template(self) -> &'static str {
        match self {
            GenerationKind::CoverLetter => COVER_LETTER_PROMPT_TEMPLATE,
            GenerationKind::Resume => RESUME_REWRITE_PROMPT_TEMPLATE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub job_description: String,
    pub resume: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub text: String,
    pub history_id: i64,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation provider is not configured")]
    NotConfigured,

    #[error("Generation provider call failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Failed to save generated output: {0}")]
    Persist(#[source] StoreError),
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GenerationPipeline {
    provider: Option<Arc<dyn TextGenerator>>,
    history: HistoryStore,
}

impl GenerationPipeline {
    /// `provider` is `None` when no API key is configured; every run then fails
    /// with `NotConfigured` before touching the store.
    pub fn new(provider: Option<Arc<dyn TextGenerator>>, history: HistoryStore) -> Self {
        Self { provider, history }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn run(
        &self,
        kind: GenerationKind,
        input: GenerationInput,
    ) -> Result<GenerationOutcome, GenerationError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;

        let messages = build_messages(kind, &input);
        let text = provider.generate(&messages).await?;

        let saved = self
            .history
            .insert(NewHistoryEntry {
                kind: kind.history_tag().to_string(),
                job_description: input.job_description,
                resume: input.resume,
                output: text.clone(),
            })
            .await
            .map_err(|e| {
                warn!(
                    "Discarding {} chars of generated {} output: history write failed",
                    text.chars().count(),
                    kind.history_tag()
                );
                GenerationError::Persist(e)
            })?;

        info!("Generated {} saved as history entry {}", kind.history_tag(), saved.id);

        Ok(GenerationOutcome {
            text,
            history_id: saved.id,
        })
    }
}

/// Fixed system/user prompt pair for `kind`.
pub fn build_messages(kind: GenerationKind, input: &GenerationInput) -> Vec<PromptMessage> {
    let user = kind
        .prompt_template()
        .replace("{job_description}", &input.job_description)
        .replace("{resume}", &input.resume);

    vec![PromptMessage::system(kind.system_prompt()), PromptMessage::user(user)]
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
