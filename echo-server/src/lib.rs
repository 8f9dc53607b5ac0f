//! httpbin-style echo server used by the client integration tests.
//!
//! Mirrors the handful of httpbin endpoints the client exercises: each verb
//! route replies with a JSON document echoing back the request's query
//! arguments, form fields, JSON body, and headers, so tests can assert what
//! actually went over the wire. `/status/{code}` responds with the requested
//! status and an empty body.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;

/// Echoed view of one request, in httpbin's field layout.
#[derive(Debug, Serialize)]
pub struct EchoReply {
    pub args: BTreeMap<String, String>,
    pub data: String,
    pub form: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub json: Option<Value>,
    pub method: String,
    pub url: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/delete", delete(echo))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(args): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<EchoReply> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let data = String::from_utf8_lossy(&body).into_owned();

    let form = if content_type.starts_with("application/x-www-form-urlencoded") {
        parse_form(&data)
    } else {
        BTreeMap::new()
    };
    let json = if content_type.starts_with("application/json") {
        serde_json::from_slice(&body).ok()
    } else {
        None
    };

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    Json(EchoReply {
        args,
        data,
        form,
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        json,
        method: method.as_str().to_string(),
        url: format!("http://{host}{uri}"),
    })
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Decode an `application/x-www-form-urlencoded` body. Later duplicates of
/// a key win, matching how the client's tests use it.
fn parse_form(body: &str) -> BTreeMap<String, String> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(component: &str) -> String {
    let unplussed = component.replace('+', " ");
    percent_encoding::percent_decode_str(&unplussed)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_bodies_are_percent_decoded() {
        let form = parse_form("foo=bar&msg=this%20needs%20percent%20encoding");
        assert_eq!(form["foo"], "bar");
        assert_eq!(form["msg"], "this needs percent encoding");
    }

    #[test]
    fn plus_decodes_to_space() {
        let form = parse_form("q=a+b");
        assert_eq!(form["q"], "a b");
    }

    #[test]
    fn valueless_pairs_decode_to_empty_strings() {
        let form = parse_form("flag&key=");
        assert_eq!(form["flag"], "");
        assert_eq!(form["key"], "");
    }

    #[test]
    fn reply_serializes_with_httpbin_field_names() {
        let reply = EchoReply {
            args: BTreeMap::new(),
            data: String::new(),
            form: BTreeMap::new(),
            headers: BTreeMap::new(),
            json: None,
            method: "GET".to_string(),
            url: "http://localhost/get".to_string(),
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert!(value.get("args").is_some());
        assert!(value.get("form").is_some());
        assert_eq!(value["json"], Value::Null);
        assert_eq!(value["method"], "GET");
    }
}
