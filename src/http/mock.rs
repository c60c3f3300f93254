use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use crate::http::client::{Transport, parse_json_body};
use crate::http::error::TransportError;
use crate::http::progress::ProgressHandle;
use crate::http::request::{Request, RequestBody};

// ============================================================================
// Scripted transport (for testing without a backend)
// ============================================================================

/// Canned outcome for one call to an endpoint.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// 2xx with a JSON body
    Json(Value),
    /// 2xx with a raw body, decoded the same way the real transport does
    Raw(String),
    /// Non-2xx with a raw body
    Status(u16, String),
    /// No response at all
    NetworkDown(String),
}

/// Records every request and replays scripted outcomes per endpoint.
///
/// Outcomes queue up per endpoint; the last one sticks once the queue is
/// down to a single entry, so a single script answers every repeat call.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<HashMap<String, VecDeque<Scripted>>>,
    sent: RefCell<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, endpoint: &str, outcome: Scripted) -> &Self {
        self.routes
            .borrow_mut()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn respond_json(&self, endpoint: &str, body: Value) -> &Self {
        self.script(endpoint, Scripted::Json(body))
    }

    pub fn respond_status(&self, endpoint: &str, status: u16, body: &str) -> &Self {
        self.script(endpoint, Scripted::Status(status, body.to_string()))
    }

    pub fn respond_raw(&self, endpoint: &str, body: &str) -> &Self {
        self.script(endpoint, Scripted::Raw(body.to_string()))
    }

    pub fn fail_network(&self, endpoint: &str) -> &Self {
        self.script(endpoint, Scripted::NetworkDown("connection refused".into()))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.sent.borrow().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.sent
            .borrow()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }

    pub fn last_request(&self, endpoint: &str) -> Option<Request> {
        self.sent
            .borrow()
            .iter()
            .rev()
            .find(|r| r.endpoint == endpoint)
            .cloned()
    }

    fn next_outcome(&self, endpoint: &str) -> Option<Scripted> {
        let mut routes = self.routes.borrow_mut();
        let queue = routes.get_mut(endpoint)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &Request,
        progress: Option<&ProgressHandle>,
    ) -> Result<Value, TransportError> {
        self.sent.borrow_mut().push(request.clone());

        let outcome = self
            .next_outcome(&request.endpoint)
            .unwrap_or_else(|| Scripted::NetworkDown(format!("no script for {}", request.endpoint)));

        if let Scripted::NetworkDown(msg) = &outcome {
            return Err(TransportError::Network(msg.clone()));
        }

        if let (RequestBody::Multipart(payload), Some(handle)) = (&request.body, progress) {
            let total = payload.total_file_bytes();
            handle.report(total / 2, total);
            handle.report(total, total);
        }

        match outcome {
            Scripted::Json(value) => Ok(value),
            Scripted::Raw(body) => parse_json_body(&body),
            Scripted::Status(status, body) => Err(TransportError::Server { status, body }),
            Scripted::NetworkDown(msg) => Err(TransportError::Network(msg)),
        }
    }
}
