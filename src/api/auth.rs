//! Auth Endpoints
//!
//! Sign-in, registration, account recovery and user administration.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{segment, ApiClient, Envelope, Page, Query};
use crate::error::ApiResult;
use crate::models::{Role, User};

// ========================
// Payloads
// ========================

/// `data` of login, registration, verification and reset responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub requires_verification: bool,
    #[serde(default)]
    pub verification_url: Option<String>,
}

/// Self-registration and first-admin setup
#[derive(Debug, Clone, Serialize)]
pub struct RegisterArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Account created by an admin
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: String,
}

#[derive(Serialize)]
struct LoginArgs<'a> {
    email: &'a str,
    password: &'a str,
}

// ========================
// Commands
// ========================

pub async fn login(api: &ApiClient, email: &str, password: &str) -> ApiResult<Envelope<AuthData>> {
    api.post("/auth/login", &LoginArgs { email, password }).await
}

pub async fn register(api: &ApiClient, args: &RegisterArgs) -> ApiResult<Envelope<AuthData>> {
    api.post("/auth/register", args).await
}

pub async fn create_first_admin(api: &ApiClient, args: &RegisterArgs) -> ApiResult<Envelope<AuthData>> {
    api.post("/auth/create-first-admin", args).await
}

pub async fn logout(api: &ApiClient) -> ApiResult<()> {
    api.send(Method::POST, "/auth/logout", Query::new(), None).await?;
    Ok(())
}

/// Current user for the stored token
pub async fn me(api: &ApiClient) -> ApiResult<Envelope<AuthData>> {
    api.get("/auth/me", Query::new()).await
}

pub async fn list_users(api: &ApiClient, search: &str, role: Option<Role>) -> ApiResult<Page<User>> {
    let query = Query::new()
        .param_if("search", search)
        .param_if("role", role.as_ref().map(Role::as_str).unwrap_or(""));
    api.page("/auth/users", query, "users").await
}

pub async fn create_user(api: &ApiClient, args: &CreateUserArgs) -> ApiResult<Envelope<AuthData>> {
    api.post("/auth/create-user", args).await
}

pub async fn forgot_password(api: &ApiClient, email: &str) -> ApiResult<Envelope<Value>> {
    api.post("/auth/forgot-password", &json!({ "email": email })).await
}

pub async fn reset_password(
    api: &ApiClient,
    reset_token: &str,
    password: &str,
) -> ApiResult<Envelope<AuthData>> {
    let path = format!("/auth/reset-password/{}", segment(reset_token));
    api.put(&path, &json!({ "password": password })).await
}

pub async fn verify_email(api: &ApiClient, verification_token: &str) -> ApiResult<Envelope<AuthData>> {
    let path = format!("/auth/verify-email/{}", segment(verification_token));
    api.get(&path, Query::new()).await
}

pub async fn resend_verification(api: &ApiClient, email: &str) -> ApiResult<Envelope<Value>> {
    api.post("/auth/resend-verification", &json!({ "email": email })).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::MemoryTokenStore;

    #[tokio::test]
    async fn test_reset_password_encodes_token() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "message": "Senha redefinida", "data": {"token": "t2"}}));
        let api = ApiClient::new(mock.clone(), MemoryTokenStore::default());

        let envelope = reset_password(&api, "abc/def", "secret1").await.unwrap();
        assert_eq!(envelope.data.unwrap().token.as_deref(), Some("t2"));

        let request = &mock.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/auth/reset-password/abc%2Fdef");
        assert_eq!(request.body, Some(json!({"password": "secret1"})));
    }

    #[tokio::test]
    async fn test_list_users_sends_only_set_filters() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "data": {"users": [{"_id": "u1", "name": "Ana", "role": "admin"}]}}));
        let api = ApiClient::new(mock.clone(), MemoryTokenStore::new(Some("t")));

        let page = list_users(&api, "", Some(Role::Vendedor)).await.unwrap();
        assert_eq!(page.items[0].role, Role::Admin);
        assert_eq!(
            mock.requests()[0].query,
            vec![("role".to_string(), "vendedor".to_string())]
        );
    }
}
