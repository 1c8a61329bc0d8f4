//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::http::{ApiRequest, ApiResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(u16, Vec<u8>, Duration),
    Fail,
}

/// Answers requests from per-route queues and records every request.
///
/// The last scripted answer of a route is sticky: it keeps being served
/// once the queue is down to one entry. Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, answer: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(answer);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.respond_raw(method, path, status, serde_json::to_vec(&body).unwrap());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: Vec<u8>) {
        self.push(method, path, Scripted::Respond(status, body, Duration::ZERO));
    }

    /// Like [`Self::respond`], answered only after `delay`.
    pub fn respond_after(
        &self,
        delay: Duration,
        method: Method,
        path: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        let body = serde_json::to_vec(&body).unwrap();
        self.push(method, path, Scripted::Respond(status, body, delay));
    }

    pub fn fail(&self, method: Method, path: &str) {
        self.push(method, path, Scripted::Fail);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| format!("{} {}", c.method, c.path))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = (request.method.clone(), request.path.clone());
        self.calls.lock().unwrap().push(request);

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match answer {
            Some(Scripted::Respond(status, body, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(ApiResponse { status, body })
            }
            Some(Scripted::Fail) => Err(TransportError("connection refused".into())),
            None => Ok(ApiResponse {
                status: 404,
                body: br#"{"message":"not scripted"}"#.to_vec(),
            }),
        }
    }
}
