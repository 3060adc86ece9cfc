//! Integration tests for retrieval-augmented chat
//!
//! A scripted chat model stands in for Ollama and records what it was sent.

mod common;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use common::{write_corpus, Fixture};
use grcrag::assistant::Assistant;
use grcrag::rag::context::{ContextBuilder, SYSTEM_PROMPT};
use grcrag::roles::Role;
use grcrag::session::ChatSessions;
use grcrag::streaming::ChatModel;
use grcrag::types::{ChatMessage, ChatRole};
use grcrag::{RagError, Result};

/// Replies with fixed fragments and keeps every request
#[derive(Default)]
struct ScriptedChat {
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    /// Stream forever instead of the fixed fragments
    endless: bool,
    /// End the stream with an error after the first fragment
    truncated: bool,
    stopped: Arc<Notify>,
}

impl ScriptedChat {
    fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

const FRAGMENTS: [&str; 3] = ["Apply ", "ISO ", "27005."];

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        Ok(FRAGMENTS.concat())
    }

    async fn chat_stream(&self, messages: Vec<ChatMessage>) -> Result<mpsc::Receiver<Result<String>>> {
        self.requests.lock().unwrap().push(messages);
        let (tx, rx) = mpsc::channel(4);
        let endless = self.endless;
        let truncated = self.truncated;
        let stopped = Arc::clone(&self.stopped);

        tokio::spawn(async move {
            if endless {
                for i in 0.. {
                    if tx.send(Ok(format!("token{} ", i))).await.is_err() {
                        stopped.notify_one();
                        return;
                    }
                }
            }
            if truncated {
                let _ = tx.send(Ok(FRAGMENTS[0].to_string())).await;
                let _ = tx
                    .send(Err(RagError::StreamingError("stream ended before done".to_string())))
                    .await;
                return;
            }
            for fragment in FRAGMENTS {
                if tx.send(Ok(fragment.to_string())).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn assistant(fixture: Fixture, chat: Arc<ScriptedChat>) -> (Assistant, Fixture) {
    // the fixture owns the temp dirs; keep it alive next to the assistant
    let engine = Arc::new(common::engine_at(
        &fixture.state,
        fixture.docs.path(),
        fixture.embedder.clone(),
    ));
    let sessions = Arc::new(ChatSessions::new(Duration::from_secs(60), 10));
    (
        Assistant::new(engine, chat, sessions, ContextBuilder::new()),
        fixture,
    )
}

#[tokio::test]
async fn test_empty_index_answers_without_context() {
    let chat = Arc::new(ScriptedChat::default());
    let (assistant, _fixture) = assistant(Fixture::new(), chat.clone());

    let answer = assistant.ask("s1", Role::RiskManager, "What is risk appetite?").await.unwrap();
    assert_eq!(answer.reply, "Apply ISO 27005.");
    assert!(answer.sources.is_empty());

    let sent = &chat.requests()[0];
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], ChatMessage::system(SYSTEM_PROMPT));
    assert_eq!(sent[1], ChatMessage::user("What is risk appetite?"));
}

#[tokio::test]
async fn test_context_is_role_filtered() {
    let fixture = Fixture::new();
    write_corpus(&fixture);
    fixture.engine.reindex().await.unwrap();

    let chat = Arc::new(ScriptedChat::default());
    let (assistant, _fixture) = assistant(fixture, chat.clone());

    let answer = assistant.ask("s1", Role::Auditeur, "risk and audit").await.unwrap();
    assert!(!answer.sources.contains(&"iso27005.pdf".to_string()));
    assert!(answer.sources.contains(&"iso27001.pdf".to_string()));

    let system = &chat.requests()[0][0];
    assert_eq!(system.role, ChatRole::System);
    assert!(system.content.contains("audit evidence and audit programme"));
    assert!(!system.content.contains("risk appetite"));
}

#[tokio::test]
async fn test_history_carries_into_next_question() {
    let chat = Arc::new(ScriptedChat::default());
    let (assistant, _fixture) = assistant(Fixture::new(), chat.clone());

    assistant.ask("s1", Role::SuperAdmin, "first").await.unwrap();
    assistant.ask("s1", Role::SuperAdmin, "second").await.unwrap();
    assistant.ask("other", Role::SuperAdmin, "third").await.unwrap();

    let requests = chat.requests();
    assert_eq!(requests[1].len(), 4);
    assert_eq!(requests[1][1], ChatMessage::user("first"));
    assert_eq!(requests[1][2], ChatMessage::assistant("Apply ISO 27005."));
    assert_eq!(requests[2].len(), 2);
}

#[tokio::test]
async fn test_empty_prompt_rejected() {
    let chat = Arc::new(ScriptedChat::default());
    let (assistant, _fixture) = assistant(Fixture::new(), chat.clone());

    let err = assistant.ask("s1", Role::SuperAdmin, "   ").await.unwrap_err();
    assert!(matches!(err, RagError::InvalidInput(_)));
    assert!(chat.requests().is_empty());
}

#[tokio::test]
async fn test_stream_records_complete_reply() {
    let chat = Arc::new(ScriptedChat::default());
    let (assistant, _fixture) = assistant(Fixture::new(), chat);

    let mut answer = assistant.ask_stream("s1", Role::SuperAdmin, "controls?").await.unwrap();
    let mut reply = String::new();
    while let Some(fragment) = answer.fragments.recv().await {
        reply.push_str(&fragment.unwrap());
    }
    assert_eq!(reply, "Apply ISO 27005.");

    let history = assistant.sessions().history("s1").await;
    assert_eq!(history, vec![ChatMessage::user("controls?"), ChatMessage::assistant(reply)]);
}

#[tokio::test]
async fn test_cut_off_stream_is_not_recorded() {
    let chat = Arc::new(ScriptedChat {
        truncated: true,
        ..Default::default()
    });
    let (assistant, _fixture) = assistant(Fixture::new(), chat);

    let mut answer = assistant.ask_stream("s1", Role::SuperAdmin, "controls?").await.unwrap();
    let mut items = Vec::new();
    while let Some(item) = answer.fragments.recv().await {
        items.push(item);
    }

    assert_eq!(items.len(), 2);
    assert!(matches!(items[1], Err(RagError::StreamingError(_))));
    assert!(assistant.sessions().history("s1").await.is_empty());
}

#[tokio::test]
async fn test_dropping_stream_stops_producer() {
    let chat = Arc::new(ScriptedChat {
        endless: true,
        ..Default::default()
    });
    let stopped = Arc::clone(&chat.stopped);
    let (assistant, _fixture) = assistant(Fixture::new(), chat);

    let mut answer = assistant.ask_stream("s1", Role::SuperAdmin, "go").await.unwrap();
    assert!(answer.fragments.recv().await.unwrap().is_ok());
    drop(answer);

    tokio::time::timeout(Duration::from_secs(5), stopped.notified())
        .await
        .expect("producer kept running after the consumer left");
    assert!(assistant.sessions().history("s1").await.is_empty());
}

#[tokio::test]
async fn test_search_failure_reaches_caller() {
    let fixture = Fixture::new();
    write_corpus(&fixture);
    fixture.engine.reindex().await.unwrap();

    let chat = Arc::new(ScriptedChat::default());
    let (assistant, _fixture) = assistant(fixture, chat.clone());

    let err = assistant.ask("s1", Role::SuperAdmin, "boom").await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingUnavailable { .. }));
    assert!(chat.requests().is_empty());
}
