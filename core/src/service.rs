//! Service facade: a base URL plus per-verb request factories.

use std::fmt;
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::request::{Method, ServiceRequest};
use crate::transport::{Transport, UreqTransport};
use crate::url;

/// Entry point for talking to one HTTP endpoint.
///
/// Holds the immutable base URL, the transport, and the default delivery
/// context for handlers registered without an explicit one — a dedicated
/// `webservice-delivery` worker created with the service and shared by all
/// of its builders. Cloning is cheap and clones share both.
///
/// The base URL is not validated here; a malformed or unsupported base
/// surfaces as a failure outcome when a request built from it is dispatched.
#[derive(Clone)]
pub struct WebService {
    base_url: String,
    transport: Arc<dyn Transport>,
    default_context: ExecutionContext,
}

impl WebService {
    /// A service using the bundled ureq transport.
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, Arc::new(UreqTransport::new()))
    }

    /// A service executing its requests through a caller-supplied transport.
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.to_string(),
            transport,
            default_context: ExecutionContext::worker("webservice-delivery"),
        }
    }

    /// Replace the default delivery context handed to handlers registered
    /// without an explicit context.
    pub fn with_default_context(mut self, context: ExecutionContext) -> Self {
        self.default_context = context;
        self
    }

    /// A fresh GET request builder for `path`.
    pub fn get(&self, path: &str) -> ServiceRequest {
        self.request(Method::Get, path)
    }

    /// A fresh POST request builder for `path`.
    pub fn post(&self, path: &str) -> ServiceRequest {
        self.request(Method::Post, path)
    }

    /// A fresh PUT request builder for `path`.
    pub fn put(&self, path: &str) -> ServiceRequest {
        self.request(Method::Put, path)
    }

    /// A fresh DELETE request builder for `path`.
    pub fn delete(&self, path: &str) -> ServiceRequest {
        self.request(Method::Delete, path)
    }

    /// The URL `path` would resolve to against this service's base.
    pub fn absolute_url(&self, path: &str) -> String {
        url::resolve(&self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> ServiceRequest {
        ServiceRequest::new(
            method,
            path,
            self.base_url.clone(),
            self.transport.clone(),
            self.default_context.clone(),
        )
    }
}

impl fmt::Debug for WebService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebService")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Completion;
    use crate::request::RequestDescriptor;

    struct NullTransport;

    impl Transport for NullTransport {
        fn execute(&self, _request: RequestDescriptor, _completion: Completion) {}
    }

    fn service() -> WebService {
        WebService::with_transport("http://www.walmart.com/", Arc::new(NullTransport))
            .with_default_context(ExecutionContext::inline())
    }

    #[test]
    fn absolute_url_joins_base_and_path() {
        assert_eq!(service().absolute_url("/foo"), "http://www.walmart.com/foo");
    }

    #[test]
    fn verb_methods_bind_the_method_and_path() {
        let svc = service();
        let cases = [
            (svc.get("/get"), Method::Get),
            (svc.post("/post"), Method::Post),
            (svc.put("/put"), Method::Put),
            (svc.delete("/delete"), Method::Delete),
        ];
        for (request, method) in cases {
            let descriptor = request.freeze().unwrap();
            assert_eq!(descriptor.method, method);
            assert_eq!(
                descriptor.url,
                format!("http://www.walmart.com/{}", method.as_str().to_lowercase())
            );
        }
    }

    #[test]
    fn each_verb_call_returns_an_independent_builder() {
        let svc = service();
        let a = svc.get("/a").set_header("X-One", "1").freeze().unwrap();
        let b = svc.get("/b").freeze().unwrap();
        assert_eq!(a.headers.len(), 1);
        assert!(b.headers.is_empty());
    }
}
