//! REST API Bindings
//!
//! Frontend bindings to the backend REST API, organized by domain.
//! Every call goes through [`ApiClient`], which owns the bearer-token policy
//! and maps HTTP failures onto [`ApiError`].

mod auth;
mod clients;
mod http;
mod materials;
mod products;
mod purchases;
mod sales;
mod token;
mod withdrawals;

#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::models::Pagination;

// Re-export all public items
pub use auth::*;
pub use clients::*;
pub use http::HttpTransport;
pub use materials::*;
pub use products::*;
pub use purchases::*;
pub use sales::*;
pub use token::{BrowserTokenStore, MemoryTokenStore, TokenStore};
pub use withdrawals::*;

/// Unreserved characters stay as-is in path segments
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode an id or token for use inside a path
pub fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

// ========================
// Transport
// ========================

/// One HTTP exchange, relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body, `Null` when empty or not JSON
    pub body: Value,
}

/// Sends requests; swapped for a scripted mock in tests
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

// ========================
// Envelope
// ========================

/// `{ success, message, data }` wrapper around every response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub requires_verification: bool,
    #[serde(default)]
    pub verification_url: Option<String>,
}

impl<T> Envelope<T> {
    /// The payload, or a decode error naming what was expected
    pub fn into_data(self, what: &str) -> ApiResult<T> {
        self.data
            .ok_or_else(|| ApiError::Decode(format!("response without {}", what)))
    }
}

/// A list payload: `data.<key>` plus optional pagination
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// Server-side total if paginated, else the number of items returned
    pub fn total(&self) -> u64 {
        self.pagination
            .as_ref()
            .map(|p| p.total)
            .unwrap_or(self.items.len() as u64)
    }
}

// ========================
// Query
// ========================

/// Query-string builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always sent, even when empty
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Sent only when non-empty
    pub fn param_if(self, key: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self
        } else {
            self.param(key, value.trim())
        }
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    pub fn params<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        for (key, value) in pairs {
            self.0.push((key.to_string(), value));
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

// ========================
// Client
// ========================

fn body_message(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(String::from)
}

/// Shared handle to the backend
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(transport: impl Transport + 'static, tokens: impl TokenStore + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            tokens: Arc::new(tokens),
        }
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn has_token(&self) -> bool {
        self.tokens.load().is_some()
    }

    /// Send a request and return the raw JSON body of a 2xx response
    ///
    /// A 401 clears the stored token before returning `Unauthorized`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query: query.0,
            body,
            bearer: self.tokens.load(),
        };
        debug!(method = %request.method, path, "api request");

        let response = self.transport.send(request).await?;
        match response.status {
            200..=299 => Ok(response.body),
            401 => {
                info!(path, "token rejected, clearing stored session token");
                self.tokens.clear();
                Err(ApiError::Unauthorized(body_message(&response.body)))
            }
            429 => {
                debug!(path, "rate limited");
                Err(ApiError::RateLimited)
            }
            status => Err(ApiError::Rejected {
                status,
                message: body_message(&response.body),
                body: response.body,
            }),
        }
    }

    pub async fn envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> ApiResult<Envelope<T>> {
        let raw = self.send(method, path, query, body).await?;
        Ok(serde_json::from_value(raw)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> ApiResult<Envelope<T>> {
        self.envelope(Method::GET, path, query, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Envelope<T>> {
        let body = serde_json::to_value(body)?;
        self.envelope(Method::POST, path, Query::new(), Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Envelope<T>> {
        let body = serde_json::to_value(body)?;
        self.envelope(Method::PUT, path, Query::new(), Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, Query::new(), None).await?;
        Ok(())
    }

    /// GET a list nested under `data.<key>`; a missing key is an empty list
    pub async fn page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
        key: &str,
    ) -> ApiResult<Page<T>> {
        let mut data: Value = self.get::<Value>(path, query).await?.data.unwrap_or_default();
        let items = match data.get_mut(key).map(Value::take) {
            Some(Value::Null) | None => Vec::new(),
            Some(items) => serde_json::from_value(items)?,
        };
        let pagination = match data.get_mut("pagination").map(Value::take) {
            Some(Value::Null) | None => None,
            Some(pagination) => Some(serde_json::from_value(pagination)?),
        };
        Ok(Page { items, pagination })
    }

    /// Single record nested under `data.<key>`
    pub async fn record<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        key: &str,
    ) -> ApiResult<T> {
        let mut data = self
            .envelope::<Value>(method, path, Query::new(), body)
            .await?
            .into_data(key)?;
        match data.get_mut(key).map(Value::take) {
            Some(Value::Null) | None => Err(ApiError::Decode(format!("response without {}", key))),
            Some(record) => Ok(serde_json::from_value(record)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde_json::json;

    fn client_with(mock: &MockTransport, token: Option<&str>) -> ApiClient {
        let tokens = MemoryTokenStore::new(token);
        ApiClient::new(mock.clone(), tokens)
    }

    #[tokio::test]
    async fn test_bearer_header_only_with_token() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "data": {"products": []}}));
        mock.push(200, json!({"success": true, "data": {"products": []}}));

        let anonymous = client_with(&mock, None);
        anonymous.page::<Value>("/products", Query::new(), "products").await.unwrap();
        let signed_in = client_with(&mock, Some("abc"));
        signed_in.page::<Value>("/products", Query::new(), "products").await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].bearer, None);
        assert_eq!(requests[1].bearer.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_401_clears_token() {
        let mock = MockTransport::new();
        mock.push(401, json!({"success": false, "message": "Token inválido"}));
        let client = client_with(&mock, Some("stale"));

        let err = client.delete("/products/p1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(Some(_))));
        assert_eq!(client.tokens().load(), None);
    }

    #[tokio::test]
    async fn test_429_keeps_token() {
        let mock = MockTransport::new();
        mock.push(429, json!({"message": "Too many requests"}));
        let client = client_with(&mock, Some("abc"));

        let err = client.get::<Value>("/auth/me", Query::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
        assert_eq!(client.tokens().load().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_rejection_carries_server_message() {
        let mock = MockTransport::new();
        mock.push(400, json!({"success": false, "message": "Estoque insuficiente"}));
        let client = client_with(&mock, Some("abc"));

        let err = client.post::<Value, _>("/sales", &json!({})).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message("Erro ao registrar venda"), "Estoque insuficiente");
    }

    #[tokio::test]
    async fn test_envelope_payload_needs_no_default() {
        #[derive(Debug, Deserialize)]
        struct Receipt {
            id: String,
        }

        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "data": {"id": "r1"}}));
        mock.push(200, json!({"success": true, "message": "ok"}));
        let client = client_with(&mock, None);

        let full = client.get::<Receipt>("/receipts/r1", Query::new()).await.unwrap();
        assert_eq!(full.into_data("receipt").unwrap().id, "r1");
        let bare = client.get::<Receipt>("/receipts/r2", Query::new()).await.unwrap();
        assert!(bare.success);
        assert!(matches!(bare.into_data("receipt"), Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_token() {
        let mock = MockTransport::new();
        mock.push_error(ApiError::Transport("connection refused".into()));
        let client = client_with(&mock, Some("abc"));

        let err = client.delete("/clients/c1").await.unwrap_err();
        assert_eq!(err.class(), crate::error::ErrorClass::Unexpected);
        assert_eq!(client.tokens().load().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_page_reads_items_and_pagination() {
        let mock = MockTransport::new();
        mock.push(
            200,
            json!({"success": true, "data": {
                "clients": [{"_id": "c1", "name": "Maria"}],
                "pagination": {"total": 42, "page": 1, "pages": 42, "limit": 1}
            }}),
        );
        mock.push(200, json!({"success": true, "data": {}}));
        let client = client_with(&mock, None);

        let page = client
            .page::<crate::models::Client>("/clients", Query::new().limit(1), "clients")
            .await
            .unwrap();
        assert_eq!(page.items[0].name, "Maria");
        assert_eq!(page.total(), 42);

        let empty = client
            .page::<crate::models::Client>("/clients", Query::new(), "clients")
            .await
            .unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total(), 0);
        assert_eq!(mock.requests()[0].query, vec![("limit".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc-123_x.y~z"), "abc-123_x.y~z");
        assert_eq!(segment("a/b c?"), "a%2Fb%20c%3F");
    }

    #[test]
    fn test_query_param_if_skips_blank() {
        let query = Query::new().param("search", "").param_if("role", "  ").param_if("role", "admin");
        assert_eq!(
            query.pairs(),
            &[
                ("search".to_string(), "".to_string()),
                ("role".to_string(), "admin".to_string())
            ]
        );
    }
}
