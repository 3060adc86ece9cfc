//! Context assembly for retrieval-augmented prompts

use serde::{Deserialize, Serialize};

use crate::rag::search::ScoredEntry;

/// Base instructions for the GRC assistant
pub const SYSTEM_PROMPT: &str = "You are an assistant for governance, risk and compliance (GRC) \
teams. Answer precisely, cite the relevant standard when you can, and say so when the \
provided excerpts do not cover the question.";

/// Context assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum characters of retrieved text
    pub max_context_chars: usize,
    /// Include source file and score with each excerpt
    pub include_metadata: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 6000,
            include_metadata: true,
        }
    }
}

/// Assembled context for prompt augmentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledContext {
    /// The formatted context text
    pub text: String,
    /// Number of excerpts included
    pub document_count: usize,
    /// Characters of excerpt text included
    pub chars: usize,
    /// Source files of included excerpts, in order
    pub sources: Vec<String>,
}

/// Builds the system prompt from retrieved excerpts
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    config: ContextConfig,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Format excerpts until the character budget runs out
    pub fn build(&self, hits: &[ScoredEntry]) -> AssembledContext {
        let mut parts = Vec::new();
        let mut total_chars = 0;
        let mut sources = Vec::new();

        for hit in hits {
            let chars = hit.text.chars().count();
            if total_chars + chars > self.config.max_context_chars {
                break;
            }

            let index = parts.len() + 1;
            let formatted = if self.config.include_metadata {
                format!(
                    "[Excerpt {}] (source: {}, topic: {}, score: {:.2})\n{}",
                    index, hit.metadata.source, hit.topic, hit.score, hit.text
                )
            } else {
                format!("[Excerpt {}]\n{}", index, hit.text)
            };

            parts.push(formatted);
            total_chars += chars;
            sources.push(hit.metadata.source.clone());
        }

        let text = if parts.is_empty() {
            String::new()
        } else {
            format!(
                "Reference excerpts ({}):\n\n{}\n",
                parts.len(),
                parts.join("\n\n")
            )
        };

        AssembledContext {
            text,
            document_count: parts.len(),
            chars: total_chars,
            sources,
        }
    }

    /// System prompt with excerpts appended; just the base prompt when none fit
    pub fn system_prompt(&self, hits: &[ScoredEntry]) -> String {
        self.compose(&self.build(hits))
    }

    /// System prompt around an already assembled context
    pub fn compose(&self, context: &AssembledContext) -> String {
        if context.document_count == 0 {
            return SYSTEM_PROMPT.to_string();
        }

        format!(
            "{}\n\nUse the following excerpts from the indexed standards when relevant.\n\n{}",
            SYSTEM_PROMPT, context.text
        )
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}
