//! Fluent HTTP client core.
//!
//! # Overview
//! A [`WebService`] owns a base URL and hands out chainable request
//! builders for the four verbs. A builder accumulates headers, parameters
//! (form URL-encoded or JSON), and response handlers; `resume()` freezes it
//! into an immutable descriptor, executes it through a pluggable
//! [`Transport`], and fans the outcome out to the registered handlers, each
//! marshaled onto its chosen [`ExecutionContext`].
//!
//! ```no_run
//! use webservice_core::WebService;
//!
//! let service = WebService::new("http://httpbin.org/");
//! let task = service
//!     .get("/get")
//!     .set_parameters([("foo", "bar")])
//!     .response(|data, meta| println!("{} bytes, status {}", data.len(), meta.status))
//!     .response_error(|err| eprintln!("request failed: {err}"))
//!     .resume();
//! assert_eq!(task.state(), webservice_core::TaskState::Running);
//! ```
//!
//! # Design
//! - Exactly one outcome per dispatch: either every raw/JSON handler fires,
//!   or every error handler does — never both, never twice.
//! - Errors are delivered only through error handlers; `resume()` never
//!   blocks and never throws. Register an error handler or failures are
//!   silent.
//! - The transport is an opaque capability behind the [`Transport`] trait;
//!   the bundled default runs each request through ureq on its own thread.

pub mod context;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod request;
pub mod service;
pub mod transport;
pub mod url;

pub use context::ExecutionContext;
pub use dispatch::{Completion, Outcome, TaskHandle, TaskState};
pub use encoding::{EncodedParameters, ParameterEncoding};
pub use error::ServiceError;
pub use request::{Method, RequestDescriptor, ResponseMeta, ServiceRequest};
pub use service::WebService;
pub use transport::{Transport, UreqTransport};
