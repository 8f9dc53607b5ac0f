//! Dispatch core: outcome production and handler fan-out.
//!
//! # Design
//! A dispatch hands the frozen descriptor to the transport together with a
//! one-shot completion callback. The transport produces exactly one
//! `Outcome`; the completion transitions the task handle from `Running` to
//! `Completed` with a compare-and-swap, so a dispatch cancelled in flight
//! drops its delivery instead of racing it. Delivery walks the handler
//! registry once: on success every raw handler fires, then every JSON
//! handler — but only if the body parsed as JSON, a failed parse skips them
//! silently. On failure only error handlers fire. Handlers of the same kind
//! fire in registration order; each invocation is submitted to the
//! handler's own execution context.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::ServiceError;
use crate::request::{RequestDescriptor, ResponseMeta};
use crate::transport::Transport;

/// One-shot completion callback handed to the transport. Being `FnOnce`,
/// a transport cannot signal completion twice.
pub type Completion = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// Terminal result of one dispatch. Produced exactly once.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The transport delivered a response, whatever its status code.
    Success { data: Vec<u8>, meta: ResponseMeta },
    /// The request never completed: bad URL, serialization failure, or a
    /// network-level error.
    Failure { error: ServiceError },
}

/// Observable lifecycle of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Cancelled,
}

const RUNNING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

/// Handle to an in-flight dispatch. Cloneable; all clones observe the same
/// task.
#[derive(Clone)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
}

impl TaskHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(RUNNING)),
        }
    }

    /// Current state. Reads `Running` from the moment `resume()` is called
    /// until the outcome is signalled or the task is cancelled.
    pub fn state(&self) -> TaskState {
        match self.state.load(Ordering::Acquire) {
            COMPLETED => TaskState::Completed,
            CANCELLED => TaskState::Cancelled,
            _ => TaskState::Running,
        }
    }

    /// Cancel a running dispatch. Pending handler invocations are
    /// suppressed and the state becomes `Cancelled`; no handler of any kind
    /// fires afterwards. Cancelling a finished task has no effect.
    pub fn cancel(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, CANCELLED, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Claim the transition to `Completed`. Fails if the task was cancelled
    /// or already completed, in which case delivery must not happen.
    fn try_complete(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

pub(crate) type RawHandler = Box<dyn FnOnce(Vec<u8>, ResponseMeta) + Send + 'static>;
pub(crate) type JsonHandler = Box<dyn FnOnce(Value) + Send + 'static>;
pub(crate) type ErrorHandler = Box<dyn FnOnce(ServiceError) + Send + 'static>;

pub(crate) enum HandlerKind {
    Raw(RawHandler),
    Json(JsonHandler),
    Error(ErrorHandler),
}

/// One registered callback with its delivery context.
pub(crate) struct HandlerEntry {
    pub(crate) context: ExecutionContext,
    pub(crate) kind: HandlerKind,
}

/// Ordered registry of handlers collected by the builder. Multiple entries
/// per kind are expected and all of them fire.
#[derive(Default)]
pub(crate) struct Handlers {
    entries: Vec<HandlerEntry>,
}

impl Handlers {
    pub(crate) fn push(&mut self, entry: HandlerEntry) {
        self.entries.push(entry);
    }

    fn has_json(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry.kind, HandlerKind::Json(_)))
    }
}

/// Submit a frozen descriptor to the transport. The network call happens
/// regardless of how many handlers are registered — zero included.
pub(crate) fn dispatch(
    transport: Arc<dyn Transport>,
    descriptor: RequestDescriptor,
    handlers: Handlers,
    handle: TaskHandle,
) {
    transport.execute(
        descriptor,
        Box::new(move |outcome| {
            if handle.try_complete() {
                deliver(handlers, outcome);
            }
        }),
    );
}

/// Complete a dispatch that failed before reaching the transport. Delivery
/// still happens off the caller's thread so `resume()` returns with the
/// handle observably running.
pub(crate) fn fail(handlers: Handlers, handle: TaskHandle, error: ServiceError) {
    thread::spawn(move || {
        if handle.try_complete() {
            deliver(handlers, Outcome::Failure { error });
        }
    });
}

fn deliver(handlers: Handlers, outcome: Outcome) {
    match outcome {
        Outcome::Success { data, meta } => {
            // Parse at most once, and only when someone wants the result.
            let parsed = if handlers.has_json() {
                match serde_json::from_slice::<Value>(&data) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        log::debug!("response is not JSON, skipping JSON handlers: {err}");
                        None
                    }
                }
            } else {
                None
            };
            for entry in handlers.entries {
                match entry.kind {
                    HandlerKind::Raw(handler) => {
                        let data = data.clone();
                        let meta = meta.clone();
                        entry.context.submit(Box::new(move || handler(data, meta)));
                    }
                    HandlerKind::Json(handler) => {
                        if let Some(value) = parsed.clone() {
                            entry.context.submit(Box::new(move || handler(value)));
                        }
                    }
                    HandlerKind::Error(_) => {}
                }
            }
        }
        Outcome::Failure { error } => {
            for entry in handlers.entries {
                if let HandlerKind::Error(handler) = entry.kind {
                    let error = error.clone();
                    entry.context.submit(Box::new(move || handler(error)));
                }
            }
        }
    }
}
