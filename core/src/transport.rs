//! Transport boundary: the capability that performs network I/O.
//!
//! # Design
//! The dispatch core makes exactly one outward call: `Transport::execute`
//! with a fully formed request and a one-shot completion. Implementations
//! own their concurrency — `execute` must return promptly and signal the
//! completion from whatever thread does the I/O. Everything transport-ish
//! (sockets, TLS, redirects, timeouts) lives behind this trait.
//!
//! `UreqTransport` is the bundled default: a shared ureq agent with
//! status-as-error disabled, so 4xx/5xx responses arrive as data and status
//! interpretation stays with response handlers. Each request runs on its own
//! worker thread.

use std::thread;

use crate::dispatch::{Completion, Outcome};
use crate::error::ServiceError;
use crate::request::{Method, RequestDescriptor, ResponseMeta};

/// Executes fully formed HTTP requests asynchronously.
pub trait Transport: Send + Sync {
    /// Submit `request` for execution. Must not block; `completion` is
    /// invoked exactly once, from any thread, with the outcome.
    fn execute(&self, request: RequestDescriptor, completion: Completion);
}

/// Default transport backed by ureq, one worker thread per request.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: RequestDescriptor, completion: Completion) {
        let agent = self.agent.clone();
        thread::spawn(move || completion(perform(&agent, request)));
    }
}

fn perform(agent: &ureq::Agent, request: RequestDescriptor) -> Outcome {
    let result = match request.method {
        Method::Get | Method::Delete => {
            let mut builder = match request.method {
                Method::Get => agent.get(&request.url),
                _ => agent.delete(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match request.body {
                // A body on GET/DELETE is legitimate here: JSON-encoded
                // parameters ride in the body whatever the verb.
                Some(body) => builder.force_send_body().send(&body[..]),
                None => builder.call(),
            }
        }
        Method::Post | Method::Put => {
            let mut builder = match request.method {
                Method::Post => agent.post(&request.url),
                _ => agent.put(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match request.body {
                Some(body) => builder.send(&body[..]),
                None => builder.send_empty(),
            }
        }
    };

    match result {
        Ok(mut response) => {
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            match response.body_mut().read_to_vec() {
                Ok(data) => Outcome::Success {
                    data,
                    meta: ResponseMeta { status, headers },
                },
                Err(err) => Outcome::Failure {
                    error: ServiceError::Transport(err.to_string()),
                },
            }
        }
        Err(err) => Outcome::Failure {
            error: classify(err),
        },
    }
}

/// Map ureq's error space onto ours: requests that never produced a valid
/// target URL versus everything the network can do wrong.
fn classify(error: ureq::Error) -> ServiceError {
    match error {
        ureq::Error::BadUri(uri) => ServiceError::InvalidUrl(uri),
        other => ServiceError::Transport(other.to_string()),
    }
}
