//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use ticketing_console::client::{ApiClient, HttpTransport, TransportResponse};
use ticketing_console::error::{ConsoleError, Result};
use ticketing_console::{ConsoleConfig, ConsoleStore, Executor, HttpMethod, MemoryBackend, SharedStore};

/// What the scripted transport answers next
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    NetworkDown,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Status(200, body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Status(status, body.to_string())
    }
}

/// A request as the transport saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
}

/// Transport answering from a queue; `fallback` once the queue is empty
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Self::with_fallback(replies, Reply::ok("{}"))
    }

    pub fn with_fallback(replies: Vec<Reply>, fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.seen().into_iter().map(|r| r.url).collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, method: HttpMethod, url: &str, body: Option<&str>) -> Result<TransportResponse> {
        self.seen.lock().unwrap().push(SeenRequest {
            method,
            url: url.to_string(),
            body: body.map(str::to_string),
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            Reply::Status(status, body) => Ok(TransportResponse { status, body }),
            Reply::NetworkDown => Err(ConsoleError::network(format!("{} {}: connection refused", method, url))),
        }
    }
}

/// Executor over an in-memory store and the given transport
pub fn executor(transport: Arc<ScriptedTransport>) -> (Executor, SharedStore) {
    let store = ConsoleStore::open(Box::new(MemoryBackend::new())).into_shared();
    let client = ApiClient::with_transport(&ConsoleConfig::default(), transport);
    (Executor::new(client, store.clone()), store)
}
