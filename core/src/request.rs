//! Chainable request builder and the frozen request descriptor.
//!
//! # Design
//! `ServiceRequest` accumulates method, path, headers, parameters, and
//! handlers through chained calls, each consuming and returning the builder.
//! Nothing is resolved or encoded until `resume()`, which takes a single
//! snapshot (`freeze`) into an immutable `RequestDescriptor`: the URL is
//! resolved exactly once, parameters are encoded exactly once, and the
//! result is what the transport sees. Configuration applied after other
//! configuration replaces it — a parameter map set after a raw body (or
//! vice versa) overwrites, never merges.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::ExecutionContext;
use crate::dispatch::{self, HandlerEntry, HandlerKind, Handlers, TaskHandle};
use crate::encoding::{self, EncodedParameters, ParameterEncoding};
use crate::error::ServiceError;
use crate::transport::Transport;
use crate::url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether form-encoded parameters travel in the query string rather
    /// than the body for this method.
    fn query_encodes_parameters(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, fully resolved request produced when a builder is
/// dispatched. This is exactly what the transport executes; no further
/// resolution or encoding happens past this point.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Transport-level metadata delivered to raw response handlers.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

enum Payload {
    /// Parameters awaiting encoding at freeze time.
    Parameters(Value),
    /// A pre-serialized body, passed through unmodified. Its content type
    /// is whatever the headers say; the encoder never touches it.
    Raw(Vec<u8>),
}

/// A mutable, chainable request under construction. Created by the verb
/// methods on [`WebService`](crate::WebService); consumed by [`resume`].
///
/// [`resume`]: ServiceRequest::resume
pub struct ServiceRequest {
    method: Method,
    path: String,
    base_url: String,
    headers: Vec<(String, String)>,
    payload: Option<Payload>,
    encoding: ParameterEncoding,
    handlers: Handlers,
    default_context: ExecutionContext,
    transport: Arc<dyn Transport>,
}

impl ServiceRequest {
    pub(crate) fn new(
        method: Method,
        path: &str,
        base_url: String,
        transport: Arc<dyn Transport>,
        default_context: ExecutionContext,
    ) -> Self {
        Self {
            method,
            path: path.to_string(),
            base_url,
            headers: Vec::new(),
            payload: None,
            encoding: ParameterEncoding::default(),
            handlers: Handlers::default(),
            default_context,
            transport,
        }
    }

    /// Set the request parameters, replacing any previously configured
    /// parameters or raw body. The encoding in effect at dispatch decides
    /// how they reach the wire; the default is form URL-encoding.
    pub fn set_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let map: serde_json::Map<String, Value> = parameters
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.payload = Some(Payload::Parameters(Value::Object(map)));
        self
    }

    /// [`set_parameters`](Self::set_parameters) plus an explicit encoding in
    /// one call.
    pub fn set_parameters_encoded<I, K, V>(self, parameters: I, encoding: ParameterEncoding) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.set_parameter_encoding(encoding).set_parameters(parameters)
    }

    /// Change the parameter encoding without touching stored parameters.
    /// Order-independent of the parameter setters: the combination in
    /// effect when `resume()` runs is what gets applied.
    pub fn set_parameter_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Use an arbitrary JSON value (object, array, scalar) as the parameter
    /// payload. Implies JSON encoding.
    pub fn set_json(mut self, value: Value) -> Self {
        self.encoding = ParameterEncoding::Json;
        self.payload = Some(Payload::Parameters(value));
        self
    }

    /// Merge headers into the request. Names compare case-insensitively;
    /// the last write to a name wins.
    pub fn set_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            put_header(&mut self.headers, &name.into(), &value.into());
        }
        self
    }

    /// Set a single header, overwriting any case-insensitive match.
    pub fn set_header(mut self, name: &str, value: &str) -> Self {
        put_header(&mut self.headers, name, value);
        self
    }

    /// Supply a pre-serialized request body, replacing any configured
    /// parameters. The body is transmitted unmodified — on any verb — and
    /// its content type is never overridden; set one via
    /// [`set_header`](Self::set_header) if the server needs it.
    pub fn set_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(Payload::Raw(body.into()));
        self
    }

    /// Register a raw response handler on the default delivery context. It
    /// receives the response bytes and transport metadata whenever the
    /// transport delivers a response, whatever the HTTP status code.
    pub fn response<F>(self, handler: F) -> Self
    where
        F: FnOnce(Vec<u8>, ResponseMeta) + Send + 'static,
    {
        let context = self.default_context.clone();
        self.response_on(&context, handler)
    }

    /// Register a raw response handler on an explicit context.
    pub fn response_on<F>(mut self, context: &ExecutionContext, handler: F) -> Self
    where
        F: FnOnce(Vec<u8>, ResponseMeta) + Send + 'static,
    {
        self.handlers.push(HandlerEntry {
            context: context.clone(),
            kind: HandlerKind::Raw(Box::new(handler)),
        });
        self
    }

    /// Register a JSON response handler on the default delivery context.
    /// The response body is parsed as JSON once per dispatch; if parsing
    /// fails, JSON handlers are silently skipped (raw handlers still fire,
    /// error handlers do not).
    pub fn response_json<F>(self, handler: F) -> Self
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let context = self.default_context.clone();
        self.response_json_on(&context, handler)
    }

    /// Register a JSON response handler on an explicit context.
    pub fn response_json_on<F>(mut self, context: &ExecutionContext, handler: F) -> Self
    where
        F: FnOnce(Value) + Send + 'static,
    {
        self.handlers.push(HandlerEntry {
            context: context.clone(),
            kind: HandlerKind::Json(Box::new(handler)),
        });
        self
    }

    /// Register an error handler on the default delivery context. It fires
    /// only when the dispatch fails before or during transport — never for
    /// a delivered response with a non-2xx status, which is the raw/JSON
    /// handlers' business.
    pub fn response_error<F>(self, handler: F) -> Self
    where
        F: FnOnce(ServiceError) + Send + 'static,
    {
        let context = self.default_context.clone();
        self.response_error_on(&context, handler)
    }

    /// Register an error handler on an explicit context.
    pub fn response_error_on<F>(mut self, context: &ExecutionContext, handler: F) -> Self
    where
        F: FnOnce(ServiceError) + Send + 'static,
    {
        self.handlers.push(HandlerEntry {
            context: context.clone(),
            kind: HandlerKind::Error(Box::new(handler)),
        });
        self
    }

    /// Freeze the configuration and submit the request for execution.
    ///
    /// Returns without blocking; the handle's state reads `Running` until
    /// the transport signals completion. The request executes even if no
    /// handler was registered — its results are simply dropped.
    pub fn resume(self) -> TaskHandle {
        let handle = TaskHandle::new();
        let frozen = self.freeze();
        let ServiceRequest {
            handlers, transport, ..
        } = self;
        match frozen {
            Ok(descriptor) => {
                log::debug!("dispatching {} {}", descriptor.method, descriptor.url);
                dispatch::dispatch(transport, descriptor, handlers, handle.clone());
            }
            Err(error) => dispatch::fail(handlers, handle.clone(), error),
        }
        handle
    }

    /// Snapshot the builder into an immutable descriptor: resolve the URL,
    /// encode parameters, finalize headers. Called exactly once per
    /// dispatch, by `resume`.
    pub(crate) fn freeze(&self) -> Result<RequestDescriptor, ServiceError> {
        let mut url = url::resolve(&self.base_url, &self.path);
        let mut headers = self.headers.clone();
        let body = match &self.payload {
            None => None,
            Some(Payload::Raw(bytes)) => Some(bytes.clone()),
            Some(Payload::Parameters(value)) => match encoding::encode(value, self.encoding)? {
                EncodedParameters::Form(query) if self.method.query_encodes_parameters() => {
                    if !query.is_empty() {
                        url.push(if url.contains('?') { '&' } else { '?' });
                        url.push_str(&query);
                    }
                    None
                }
                encoded => {
                    put_header(&mut headers, "Content-Type", encoded.content_type());
                    Some(match encoded {
                        EncodedParameters::Form(query) => query.into_bytes(),
                        EncodedParameters::Json(bytes) => bytes,
                    })
                }
            },
        };
        Ok(RequestDescriptor {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

/// Case-insensitive insert-or-overwrite preserving first-seen position.
fn put_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(slot) => slot.1 = value.to_string(),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
