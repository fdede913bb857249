//! Cross-module flows: session, route gating and the API client together

use serde_json::json;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use rolling_logger::{LogBuffer, RollingLayer};

use crate::api::mock::MockTransport;
use crate::api::{self, ApiClient, MemoryTokenStore, Query};
use crate::error::{ApiError, ErrorClass, FormError, SubmitError};
use crate::forms::{submit_sale, SaleDraft};
use crate::router::{guard, Gate, Route};
use crate::session::{LoginOutcome, SessionStatus, SessionStore};

fn session(mock: &MockTransport, token: Option<&str>) -> SessionStore {
    SessionStore::new(ApiClient::new(mock.clone(), MemoryTokenStore::new(token)))
}

fn admin() -> serde_json::Value {
    json!({"_id": "u1", "name": "Ana", "email": "ana@x.com", "role": "admin", "emailVerified": true})
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let mock = MockTransport::new();
    let session = session(&mock, None);

    let route = Route::parse("/sales");
    assert_eq!(guard(&route, &session.status()), Gate::Loading);

    session.check().await;
    assert_eq!(guard(&route, &session.status()), Gate::Redirect(Route::Login));
    assert_eq!(guard(&Route::Login, &session.status()), Gate::Render);
}

#[tokio::test]
async fn test_login_then_private_requests_carry_token() {
    let mock = MockTransport::new();
    mock.push(200, json!({"success": true, "data": {"user": admin(), "token": "jwt-1"}}));
    mock.push(200, json!({"success": true, "data": {"products": [{"_id": "p1", "name": "Casquinha", "stock": 3}]}}));
    let session = session(&mock, None);

    let outcome = session.login("ana@x.com", "segredo").await.unwrap();
    assert!(matches!(outcome, LoginOutcome::SignedIn { .. }));
    assert_eq!(guard(&Route::Login, &session.status()), Gate::Redirect(Route::Dashboard));
    assert_eq!(guard(&Route::Users, &session.status()), Gate::Render);

    let page = api::list_products(session.api(), Query::new().limit(10)).await.unwrap();
    assert_eq!(page.items[0].name, "Casquinha");

    let requests = mock.requests();
    assert_eq!(requests[0].bearer, None);
    assert_eq!(requests[1].bearer.as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_expired_token_mid_session_returns_to_login() {
    let mock = MockTransport::new();
    mock.push(200, json!({"success": true, "data": {"user": admin()}}));
    mock.push(401, json!({"message": "Token expirado"}));
    let session = session(&mock, Some("old"));

    session.check().await;
    assert!(session.user().is_some());

    let err = api::list_clients(session.api(), Query::new()).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Auth);
    assert!(!session.api().has_token());

    session.expire();
    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert_eq!(guard(&Route::Clients, &session.status()), Gate::Redirect(Route::Login));
}

#[tokio::test]
async fn test_rate_limit_is_quiet_and_keeps_session() {
    let buffer = LogBuffer::with_capacity(32);
    let subscriber =
        tracing_subscriber::registry().with(RollingLayer::silent(buffer.clone(), Level::DEBUG));
    let _default = tracing::subscriber::set_default(subscriber);

    let mock = MockTransport::new();
    mock.push(200, json!({"success": true, "data": {"user": admin()}}));
    mock.push(429, json!({}));
    mock.push(429, json!({}));
    let session = session(&mock, Some("keep-me"));

    session.check().await;
    let err = api::list_sales(session.api(), Query::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited));
    assert_eq!(err.class(), ErrorClass::RateLimited);

    // a second check hitting the limit keeps who we are
    session.check().await;
    assert!(session.user().is_some());
    assert!(session.api().has_token());
    assert_eq!(buffer.count_at(Level::ERROR), 0);
    assert!(buffer.count_at(Level::DEBUG) > 0);
}

#[tokio::test]
async fn test_empty_sale_never_reaches_the_server() {
    let mock = MockTransport::new();
    let session = session(&mock, Some("t"));

    let draft = SaleDraft { client_id: "c1".into(), ..Default::default() };
    let err = submit_sale(session.api(), &draft).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(FormError::NoSaleItems)));
    assert_eq!(mock.request_count(), 0);
}
