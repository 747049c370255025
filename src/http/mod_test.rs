use super::*;
use serde_json::json;

#[test]
fn header_lookup_is_case_insensitive() {
    let mut request = HttpRequest::new(Method::Get, "http://api.test/x");
    request.set_header("Content-Type", "application/json");
    assert_eq!(request.header("content-type"), Some("application/json"));
    request.set_header("CONTENT-TYPE", "text/plain");
    assert_eq!(request.headers.len(), 1);
    assert_eq!(request.header("Content-Type"), Some("text/plain"));
}

#[test]
fn success_range_is_2xx() {
    assert!(HttpResponse::new(200, "").is_success());
    assert!(HttpResponse::new(204, "").is_success());
    assert!(!HttpResponse::new(301, "").is_success());
    assert!(!HttpResponse::new(401, "").is_success());
}

#[test]
fn server_message_prefers_message_then_error() {
    assert_eq!(
        HttpResponse::new(400, r#"{"message":"Invalid credentials","error":"x"}"#).server_message().as_deref(),
        Some("Invalid credentials")
    );
    assert_eq!(HttpResponse::new(400, r#"{"error":"Bad input"}"#).server_message().as_deref(), Some("Bad input"));
    assert_eq!(HttpResponse::new(502, "<html>gateway</html>").server_message(), None);
    assert_eq!(HttpResponse::new(400, r#"{"message":"  "}"#).server_message(), None);
}

#[test]
fn into_error_falls_back_to_status_text() {
    let err = HttpResponse::new(503, "").into_error();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "server returned 503: request failed with status 503");
}

#[test]
fn empty_body_decodes_as_null() {
    let value: Value = HttpResponse::new(204, "").json().unwrap();
    assert_eq!(value, Value::Null);
    let unit: Option<String> = HttpResponse::new(204, "  ").json().unwrap();
    assert!(unit.is_none());
}

#[test]
fn malformed_body_is_decode_error() {
    let err = HttpResponse::new(200, "{oops").json::<Value>().unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));
}

#[test]
fn api_request_builder_defaults_to_default_signing() {
    let request = ApiRequest::post("/orders").body(json!({ "item": 1 }));
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.signing, Signing::Default);
    assert_eq!(request.body, Some(json!({ "item": 1 })));
    assert_eq!(ApiRequest::get("/x").signing(Signing::Delivery).signing, Signing::Delivery);
}
