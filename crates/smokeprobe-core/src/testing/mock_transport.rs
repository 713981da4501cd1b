//! Scripted transport for tests.
//!
//! Routes are matched on method and URL (query parameters are not part of the
//! URL). A route answers the same way every time it is hit. Requests with no
//! route fail with a `Connect` error, which is what an unreachable host looks
//! like to the runner.
//!
//! # Example
//!
//! ```
//! use smokeprobe_core::testing::MockTransport;
//! use smokeprobe_core::HttpMethod;
//!
//! let transport = MockTransport::new()
//!     .respond(HttpMethod::Get, "https://proj.example.test/rest/v1/tasks", 200, "[]");
//! assert_eq!(transport.request_count(), 0);
//! ```

use async_trait::async_trait;
use smokeprobe_proto::{HttpMethod, ProbeRequest, ProbeResponse, Transport, TransportError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Respond(ProbeResponse),
    Fail(TransportError),
}

#[derive(Debug, Default)]
struct State {
    routes: Vec<(HttpMethod, String, Reply)>,
    requests: Vec<(ProbeRequest, Duration)>,
}

/// A transport that answers from a fixed route table and records every call.
///
/// Clones share state, so a test can keep a handle after moving a clone into
/// a runner.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method url` with a status and body.
    pub fn respond(
        self,
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.route(method, url.into(), Reply::Respond(ProbeResponse::new(status, body)))
    }

    /// Fails `method url` with a transport error.
    pub fn fail(self, method: HttpMethod, url: impl Into<String>, error: TransportError) -> Self {
        self.route(method, url.into(), Reply::Fail(error))
    }

    fn route(self, method: HttpMethod, url: String, reply: Reply) -> Self {
        self.lock().routes.push((method, url, reply));
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking test thread must not hide the recorded calls from the others.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<ProbeRequest> {
        self.lock().requests.iter().map(|(r, _)| r.clone()).collect()
    }

    /// The timeout passed with each request, in order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.lock().requests.iter().map(|(_, t)| *t).collect()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<ProbeResponse, TransportError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push((request.clone(), timeout));
            state
                .routes
                .iter()
                .find(|(m, u, _)| *m == request.method && *u == request.url)
                .map(|(_, _, reply)| reply.clone())
        };

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(error)) => Err(error),
            None => Err(TransportError::Connect(format!(
                "no mock route for {} {}",
                request.method, request.url
            ))),
        }
    }
}
