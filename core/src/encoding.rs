//! Parameter serialization: form URL-encoding and JSON.
//!
//! # Design
//! `encode` is pure and idempotent — the same parameters and encoding always
//! produce byte-identical output. The destination of the encoded payload
//! (query string vs body) is the request builder's decision, made per HTTP
//! method at freeze time; this module only produces the wire form and knows
//! which content type belongs to it.
//!
//! Parameters are modeled as a `serde_json::Value` so one payload type
//! serves both encodings. Form encoding requires an object-shaped value;
//! JSON encoding takes anything serializable, objects and arrays included.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::ServiceError;

/// Content type set alongside form-encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Content type set alongside JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Every byte outside RFC 3986's unreserved set gets percent-escaped.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Strategy for serializing request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterEncoding {
    /// Percent-encoded `key=value` pairs joined with `&`. Becomes the query
    /// string for GET/DELETE and the request body for POST/PUT.
    #[default]
    Form,

    /// A JSON document. Always becomes the request body, regardless of
    /// method.
    Json,
}

/// Wire form of an encoded parameter payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedParameters {
    /// Percent-encoded pairs, ready for a query string or a form body.
    Form(String),

    /// A serialized JSON document, ready to be the request body.
    Json(Vec<u8>),
}

impl EncodedParameters {
    /// The `Content-Type` value matching this wire form.
    pub fn content_type(&self) -> &'static str {
        match self {
            EncodedParameters::Form(_) => FORM_CONTENT_TYPE,
            EncodedParameters::Json(_) => JSON_CONTENT_TYPE,
        }
    }
}

/// Serialize `parameters` using the chosen encoding.
///
/// Form encoding fails on non-object values; there is no key/value shape to
/// flatten an array or scalar into, and guessing one would silently drop
/// data.
pub fn encode(
    parameters: &Value,
    encoding: ParameterEncoding,
) -> Result<EncodedParameters, ServiceError> {
    match encoding {
        ParameterEncoding::Form => {
            let map = parameters.as_object().ok_or_else(|| {
                ServiceError::Serialization(
                    "form encoding requires key/value parameters".to_string(),
                )
            })?;
            let pairs: Vec<String> = map
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(key, FORM),
                        utf8_percent_encode(&scalar(value), FORM)
                    )
                })
                .collect();
            Ok(EncodedParameters::Form(pairs.join("&")))
        }
        ParameterEncoding::Json => serde_json::to_vec(parameters)
            .map(EncodedParameters::Json)
            .map_err(|e| ServiceError::Serialization(e.to_string())),
    }
}

/// Text rendering of a single form value. Strings stay bare (no quotes),
/// null renders empty, and anything else falls back to its JSON text.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
