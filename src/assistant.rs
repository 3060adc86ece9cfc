//! Retrieval-augmented chat for one session and role
//!
//! Flow per question: role-filtered search, system prompt built from the
//! hits, prior turns of the session, then the question itself. The
//! exchange is recorded in the session once the reply is complete.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::Config;
use crate::errors::{RagError, Result};
use crate::rag::context::{ContextBuilder, ContextConfig};
use crate::rag::engine::RagEngine;
use crate::roles::Role;
use crate::session::ChatSessions;
use crate::streaming::{ChatClient, ChatModel};
use crate::types::ChatMessage;

/// Complete reply plus the documents it drew on
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub reply: String,
    pub sources: Vec<String>,
}

/// Reply arriving in fragments
#[derive(Debug)]
pub struct StreamingAnswer {
    pub sources: Vec<String>,
    pub fragments: mpsc::Receiver<Result<String>>,
}

pub struct Assistant {
    engine: Arc<RagEngine>,
    chat: Arc<dyn ChatModel>,
    sessions: Arc<ChatSessions>,
    context: ContextBuilder,
}

impl Assistant {
    pub fn new(
        engine: Arc<RagEngine>,
        chat: Arc<dyn ChatModel>,
        sessions: Arc<ChatSessions>,
        context: ContextBuilder,
    ) -> Self {
        Self {
            engine,
            chat,
            sessions,
            context,
        }
    }

    /// Production wiring around an existing engine
    pub fn from_config(config: &Config, engine: Arc<RagEngine>) -> Result<Self> {
        let chat = ChatClient::with_config(
            &config.ollama_url(),
            &config.ollama.chat_model,
            Duration::from_secs(config.ollama.request_timeout_secs),
        )?;
        let sessions = ChatSessions::new(
            Duration::from_secs(config.sessions.ttl_minutes * 60),
            config.sessions.max_messages,
        );
        let context = ContextBuilder::with_config(ContextConfig {
            max_context_chars: config.search.max_context_chars,
            ..ContextConfig::default()
        });

        Ok(Self::new(engine, Arc::new(chat), Arc::new(sessions), context))
    }

    /// Answer `prompt` in one piece
    pub async fn ask(&self, session_id: &str, role: Role, prompt: &str) -> Result<Answer> {
        let (messages, sources) = self.prepare(session_id, role, prompt).await?;

        let reply = self.chat.chat(&messages).await?;
        self.sessions
            .record(session_id, ChatMessage::user(prompt), ChatMessage::assistant(reply.clone()))
            .await;

        info!(session = session_id, %role, sources = sources.len(), "answered question");
        Ok(Answer { reply, sources })
    }

    /// Answer `prompt` as a stream of fragments
    ///
    /// The session records the exchange only if the stream completes.
    /// Dropping the receiver cancels generation upstream.
    pub async fn ask_stream(
        &self,
        session_id: &str,
        role: Role,
        prompt: &str,
    ) -> Result<StreamingAnswer> {
        let (messages, sources) = self.prepare(session_id, role, prompt).await?;
        let mut upstream = self.chat.chat_stream(messages).await?;

        let (tx, rx) = mpsc::channel(64);
        let sessions = Arc::clone(&self.sessions);
        let session_id = session_id.to_string();
        let prompt = prompt.to_string();

        tokio::spawn(async move {
            let mut reply = String::new();

            while let Some(item) = upstream.recv().await {
                let failed = item.is_err();
                if let Ok(fragment) = &item {
                    reply.push_str(fragment);
                }
                if tx.send(item).await.is_err() {
                    debug!(session = %session_id, "stream consumer went away");
                    return;
                }
                if failed {
                    warn!(session = %session_id, "chat stream ended with an error");
                    return;
                }
            }

            sessions
                .record(&session_id, ChatMessage::user(prompt), ChatMessage::assistant(reply))
                .await;
        });

        Ok(StreamingAnswer {
            sources,
            fragments: rx,
        })
    }

    /// Messages to send, plus distinct sources of the context used
    async fn prepare(
        &self,
        session_id: &str,
        role: Role,
        prompt: &str,
    ) -> Result<(Vec<ChatMessage>, Vec<String>)> {
        if prompt.trim().is_empty() {
            return Err(RagError::InvalidInput("prompt must not be empty".to_string()));
        }

        let hits = self
            .engine
            .search_scored(prompt, role, self.engine.options().top_k)
            .await?;
        if hits.is_empty() {
            debug!(%role, "no indexed context, answering without retrieval");
        }

        let context = self.context.build(&hits);
        let mut sources: Vec<String> = Vec::new();
        for source in &context.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }

        let mut messages = vec![ChatMessage::system(self.context.compose(&context))];
        messages.extend(self.sessions.history(session_id).await);
        messages.push(ChatMessage::user(prompt));

        Ok((messages, sources))
    }

    pub fn sessions(&self) -> &ChatSessions {
        &self.sessions
    }

    pub fn engine(&self) -> &RagEngine {
        &self.engine
    }

    pub fn chat_model(&self) -> &str {
        self.chat.model()
    }
}
