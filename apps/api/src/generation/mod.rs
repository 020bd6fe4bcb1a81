//! Post generation facade.
//!
//! Turns a `(mode, tone, input)` request into an ordered list of text
//! variants: 5 post ideas for `generate`, 3 rewrites for `optimize`.
//! Two backends implement `PostGenerator`; `AppState` holds an
//! `Arc<dyn PostGenerator>` chosen at startup:
//!   - `LlmPostGenerator` — live chat-completion call via `llm_client`.
//!   - `MockGenerator` — deterministic tone-keyed variants, used when no
//!     API key is configured.
//!
//! The request gate must have granted a credit before this is invoked.

pub mod handlers;
pub mod mock;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm_client::{parse_string_array, LlmClient, LlmError};

/// What the caller wants done with the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Produce post ideas from a topic list.
    Generate,
    /// Rewrite an existing post.
    Optimize,
}

impl Mode {
    /// Number of variants the facade returns for this mode.
    pub fn variant_count(&self) -> usize {
        match self {
            Mode::Generate => 5,
            Mode::Optimize => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Viral,
    Professional,
    Concise,
}

#[async_trait]
pub trait PostGenerator: Send + Sync {
    /// Returns an ordered list of nonempty variants. `input` is nonempty
    /// (validated at the HTTP layer). Fails with `LlmError::EmptyContent`
    /// when the provider yields zero usable strings.
    async fn generate(&self, mode: Mode, tone: Tone, input: &str)
        -> Result<Vec<String>, LlmError>;
}

/// Live generator backed by the chat-completions client.
pub struct LlmPostGenerator {
    llm: LlmClient,
}

impl LlmPostGenerator {
    pub fn new(llm: LlmClient) -> Self {
        LlmPostGenerator { llm }
    }
}

#[async_trait]
impl PostGenerator for LlmPostGenerator {
    async fn generate(
        &self,
        mode: Mode,
        tone: Tone,
        input: &str,
    ) -> Result<Vec<String>, LlmError> {
        let system = prompts::system_prompt(mode);
        let prompt = prompts::build_prompt(mode, tone, input);

        let content = self.llm.call(system, &prompt).await?;
        let variants = parse_string_array(&content);

        if variants.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        info!(
            mode = ?mode,
            tone = ?tone,
            count = variants.len(),
            "generation call produced variants"
        );

        Ok(variants)
    }
}
