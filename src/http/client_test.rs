use super::*;
use crate::http::interceptor::{BearerAuth, UnauthorizedRedirect};
use crate::http::test_helpers::MockTransport;
use crate::http::{Method, Signing};
use crate::nav::{MemoryNavigator, Navigator};
use crate::store::CredentialStore;
use crate::types::TokenKind;
use serde_json::{Value, json};

fn bare_client(transport: &Arc<MockTransport>) -> ApiClient {
    ApiClient::new("http://api.test/api/", transport.clone())
}

#[test]
fn url_for_joins_relative_paths() {
    let client = bare_client(&Arc::new(MockTransport::new()));
    assert_eq!(client.base_url(), "http://api.test/api");
    assert_eq!(client.url_for("/orders").unwrap(), "http://api.test/api/orders");
    assert_eq!(client.url_for("orders/7").unwrap(), "http://api.test/api/orders/7");
    assert_eq!(client.url_for("").unwrap(), "http://api.test/api");
    assert_eq!(client.url_for("https://maps.test/geo").unwrap(), "https://maps.test/geo");
}

#[test]
fn url_for_rejects_whitespace() {
    let client = bare_client(&Arc::new(MockTransport::new()));
    assert!(matches!(client.url_for("/orders/ 7"), Err(SessionError::InvalidUrl(_))));
}

#[tokio::test]
async fn execute_sets_default_json_headers() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(200, &json!({}));
    let client = bare_client(&transport);

    client.execute(ApiRequest::get("/menu")).await.unwrap();
    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::Get);
    assert_eq!(sent.url, "http://api.test/api/menu");
    assert_eq!(sent.header("Content-Type"), Some("application/json"));
    assert_eq!(sent.header("Accept"), Some("application/json"));
    assert_eq!(sent.header("Authorization"), None);
}

#[tokio::test]
async fn post_serializes_body_and_decodes_response() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(201, &json!({ "orderId": "o-1" }));
    let client = bare_client(&transport);

    let created: Value = client.post("/orders", &json!({ "items": [1, 2] })).await.unwrap();
    assert_eq!(created["orderId"], "o-1");
    assert_eq!(transport.requests()[0].body, Some(json!({ "items": [1, 2] })));
}

#[tokio::test]
async fn put_patch_delete_use_matching_methods() {
    let transport = Arc::new(MockTransport::new());
    for _ in 0..3 {
        transport.respond(200, &json!({ "ok": true }));
    }
    let client = bare_client(&transport);

    let _: Value = client.put("/menu/1", &json!({ "price": 9 })).await.unwrap();
    let _: Value = client.patch("/menu/1", &json!({ "price": 8 })).await.unwrap();
    let _: Value = client.delete("/menu/1").await.unwrap();

    let methods: Vec<Method> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::Put, Method::Patch, Method::Delete]);
}

#[tokio::test]
async fn non_success_maps_to_status_error_with_server_message() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(404, &json!({ "message": "Restaurant not found" }));
    let client = bare_client(&transport);

    let err = client.get::<Value>("/restaurants/9").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Restaurant not found"));
}

#[tokio::test]
async fn transport_failure_propagates() {
    let transport = Arc::new(MockTransport::new());
    transport.fail("connection refused");
    let client = bare_client(&transport);

    let err = client.get::<Value>("/orders").await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
}

#[tokio::test]
async fn interceptors_sign_requests_and_observe_401() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(401, &json!({ "message": "Token expired" }));
    let store = CredentialStore::in_memory();
    store
        .set(TokenKind::User, "user-tok", &json!({ "id": "u1", "role": "customer" }))
        .unwrap();
    let nav = Arc::new(MemoryNavigator::new("/orders"));
    let client = bare_client(&transport)
        .with_request_interceptor(Arc::new(BearerAuth::new(store.clone())))
        .with_response_interceptor(Arc::new(UnauthorizedRedirect::new(store.clone(), nav.clone())));

    let err = client.get::<Value>("/orders").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Token expired"));
    assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer user-tok"));
    assert_eq!(nav.current_path(), "/login");
    assert!(!store.get(TokenKind::User).is_complete());
}

#[tokio::test]
async fn delivery_scoped_request_uses_delivery_token() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(200, &json!([]));
    let store = CredentialStore::in_memory();
    store.set(TokenKind::User, "user-tok", &json!({ "id": "u1" })).unwrap();
    store.set(TokenKind::Delivery, "rider-tok", &json!({ "id": "d1" })).unwrap();
    let client = bare_client(&transport).with_request_interceptor(Arc::new(BearerAuth::new(store)));

    let _: Value = client
        .send(ApiRequest::get("/delivery/orders").signing(Signing::Delivery))
        .await
        .unwrap();
    assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer rider-tok"));
}

#[test]
fn origin_compares_scheme_host_and_port() {
    assert!(same_origin("http://api.test/api/orders", "http://api.test/api"));
    assert!(same_origin("HTTP://API.test?x=1", "http://api.test/api"));
    assert!(!same_origin("https://api.test/api", "http://api.test/api"));
    assert!(!same_origin("http://api.test:8080/api", "http://api.test/api"));
    assert!(!same_origin("http://api.test.evil/api", "http://api.test/api"));
}

#[tokio::test]
async fn absolute_urls_are_signed_only_on_the_api_origin() {
    let transport = Arc::new(MockTransport::new());
    transport.respond(200, &json!({}));
    transport.respond(200, &json!({}));
    let store = CredentialStore::in_memory();
    store.set(TokenKind::User, "user-tok", &json!({ "id": "u1" })).unwrap();
    let client = bare_client(&transport).with_request_interceptor(Arc::new(BearerAuth::new(store)));

    let _: Value = client.get("https://maps.test/geo").await.unwrap();
    let _: Value = client.get("http://api.test/api/orders").await.unwrap();

    let sent = transport.requests();
    assert_eq!(sent[0].header("Authorization"), None);
    assert_eq!(sent[1].header("Authorization"), Some("Bearer user-tok"));
}
