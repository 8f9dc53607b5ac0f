use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(http::header::CONTENT_TYPE, content_type);
    }
    builder.body(body.to_string()).unwrap()
}

#[tokio::test]
async fn get_echoes_query_args() {
    let app = echo_server::app();
    let resp = app
        .oneshot(request(
            "GET",
            "/get?foo=bar&msg=needs%20encoding",
            None,
            "",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let reply = body_json(resp).await;
    assert_eq!(reply["args"]["foo"], "bar");
    assert_eq!(reply["args"]["msg"], "needs encoding");
    assert_eq!(reply["method"], "GET");
}

#[tokio::test]
async fn post_echoes_form_fields() {
    let app = echo_server::app();
    let resp = app
        .oneshot(request(
            "POST",
            "/post",
            Some("application/x-www-form-urlencoded"),
            "foo=bar&msg=this%20needs%20percent%20encoding",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let reply = body_json(resp).await;
    assert_eq!(reply["form"]["foo"], "bar");
    assert_eq!(reply["form"]["msg"], "this needs percent encoding");
    assert_eq!(reply["json"], Value::Null);
}

#[tokio::test]
async fn post_echoes_json_body() {
    let app = echo_server::app();
    let resp = app
        .oneshot(request(
            "POST",
            "/post",
            Some("application/json"),
            r#"{"foo":"bar","number":42}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let reply = body_json(resp).await;
    assert_eq!(reply["json"]["foo"], "bar");
    assert_eq!(reply["json"]["number"], 42);
    assert_eq!(reply["data"], r#"{"foo":"bar","number":42}"#);
}

#[tokio::test]
async fn put_and_delete_routes_exist() {
    for (method, uri) in [("PUT", "/put"), ("DELETE", "/delete")] {
        let app = echo_server::app();
        let resp = app.oneshot(request(method, uri, None, "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{method} {uri}");
        let reply = body_json(resp).await;
        assert_eq!(reply["method"], method);
    }
}

#[tokio::test]
async fn headers_are_echoed_lowercased() {
    let app = echo_server::app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/get")
                .header("Some-Test-Header", "testValue")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    let reply = body_json(resp).await;
    assert_eq!(reply["headers"]["some-test-header"], "testValue");
}

#[tokio::test]
async fn status_route_returns_requested_code() {
    for code in [200u16, 204, 404, 500] {
        let app = echo_server::app();
        let resp = app
            .oneshot(request("GET", &format!("/status/{code}"), None, ""))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), code);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn unroutable_status_code_becomes_400() {
    let app = echo_server::app();
    let resp = app
        .oneshot(request("GET", "/status/9", None, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
