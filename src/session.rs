//! Session Lifecycle
//!
//! `SessionStore` owns who is signed in. It is created once by the app,
//! checked on start, updated by login/logout and dropped with the app.
//! UI code mirrors its status into a signal (see `context::AuthContext`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, error, info, warn};

use crate::api::{self, ApiClient, AuthData, Envelope, RegisterArgs};
use crate::error::{ApiError, ApiResult};
use crate::models::User;

const LOGIN_REJECTED: &str = "Erro ao fazer login";
const REGISTER_REJECTED: &str = "Erro ao registrar";
const SETUP_REJECTED: &str = "Erro ao criar administrador";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionStatus {
    /// Startup check not finished yet
    #[default]
    Checking,
    Anonymous,
    Authenticated(User),
}

impl SessionStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, SessionStatus::Checking)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    SignedIn { user: User, message: Option<String> },
    Rejected { message: String },
}

/// Result of registration or first-admin setup
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn { user: User, message: Option<String> },
    /// Account exists but the e-mail must be confirmed first
    VerificationPending {
        message: Option<String>,
        verification_url: Option<String>,
    },
    /// Account exists, sign in manually
    Created { message: Option<String> },
    Rejected { message: String },
}

pub struct SessionStore {
    api: ApiClient,
    status: Mutex<SessionStatus>,
    checking: AtomicBool,
}

/// Resets the in-flight flag however the check ends
struct CheckGuard<'a>(&'a AtomicBool);

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clears the local session however logout ends, including when the
/// logout future is dropped mid-request
struct SignOutGuard<'a>(&'a SessionStore);

impl Drop for SignOutGuard<'_> {
    fn drop(&mut self) {
        self.0.api.tokens().clear();
        self.0.set_status(SessionStatus::Anonymous);
        info!("signed out");
    }
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            status: Mutex::new(SessionStatus::Checking),
            checking: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn status(&self) -> SessionStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn user(&self) -> Option<User> {
        self.status().user().cloned()
    }

    fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    fn sign_in(&self, user: User, token: Option<&str>) {
        if let Some(token) = token {
            self.api.tokens().save(token);
        }
        info!(user = %user.email, role = user.role.as_str(), "signed in");
        self.set_status(SessionStatus::Authenticated(user));
    }

    /// Verify the stored token with `GET /auth/me`
    ///
    /// Only one check runs at a time; an overlapping call returns at once.
    pub async fn check(&self) {
        if self.checking.swap(true, Ordering::AcqRel) {
            debug!("session check already in flight");
            return;
        }
        let _guard = CheckGuard(&self.checking);

        if !self.api.has_token() {
            self.set_status(SessionStatus::Anonymous);
            return;
        }

        match api::me(&self.api).await {
            Ok(Envelope { success: true, data: Some(AuthData { user: Some(user), .. }), .. }) => {
                self.sign_in(user, None);
            }
            Ok(Envelope { success: false, .. }) => {
                info!("session token refused, clearing");
                self.api.tokens().clear();
                self.set_status(SessionStatus::Anonymous);
            }
            Ok(_) => {
                warn!("session check succeeded without a user payload");
                self.set_status(SessionStatus::Anonymous);
            }
            // the client already dropped the token
            Err(ApiError::Unauthorized(_)) => self.set_status(SessionStatus::Anonymous),
            Err(ApiError::RateLimited) => {
                debug!("session check rate limited, keeping current state");
                if self.status().is_checking() {
                    self.set_status(SessionStatus::Anonymous);
                }
            }
            Err(err) => {
                error!(error = %err, "session check failed");
                self.set_status(SessionStatus::Anonymous);
            }
        }
    }

    /// Re-run the check, e.g. after e-mail verification or a password reset
    pub async fn refresh(&self) {
        self.check().await;
    }

    /// Transport and API errors are returned as-is so the page can inspect them
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginOutcome> {
        let envelope = api::login(&self.api, email, password).await?;
        let rejected = || LoginOutcome::Rejected { message: LOGIN_REJECTED.to_string() };
        if !envelope.success {
            return Ok(rejected());
        }
        let data = envelope.data.unwrap_or_default();
        match data.user {
            Some(user) => {
                self.sign_in(user.clone(), data.token.as_deref());
                Ok(LoginOutcome::SignedIn { user, message: envelope.message })
            }
            None => {
                warn!("login succeeded without a user payload");
                Ok(rejected())
            }
        }
    }

    /// Signs in only when the new account is already verified and a token came back
    pub async fn register(&self, args: &RegisterArgs) -> ApiResult<SignUpOutcome> {
        let envelope = api::register(&self.api, args).await?;
        if !envelope.success {
            return Ok(SignUpOutcome::Rejected { message: REGISTER_REJECTED.to_string() });
        }
        let message = envelope.message;
        let data = envelope.data.unwrap_or_default();
        match (data.user, data.token) {
            (Some(user), Some(token)) if user.email_verified => {
                self.sign_in(user.clone(), Some(&token));
                Ok(SignUpOutcome::SignedIn { user, message })
            }
            _ => Ok(SignUpOutcome::VerificationPending {
                message,
                verification_url: data.verification_url.or(envelope.verification_url),
            }),
        }
    }

    /// First admin account; signs in with the same credentials when already verified
    pub async fn create_first_admin(&self, args: &RegisterArgs) -> ApiResult<SignUpOutcome> {
        let envelope = api::create_first_admin(&self.api, args).await?;
        if !envelope.success {
            return Ok(SignUpOutcome::Rejected { message: SETUP_REJECTED.to_string() });
        }
        let message = envelope.message;
        let data = envelope.data.unwrap_or_default();
        let verified = data.user.as_ref().is_some_and(|user| user.email_verified);
        if envelope.requires_verification || data.requires_verification || !verified {
            return Ok(SignUpOutcome::VerificationPending {
                message,
                verification_url: data.verification_url.or(envelope.verification_url),
            });
        }

        let Some(token) = data.token else {
            return Ok(SignUpOutcome::Created { message });
        };
        self.api.tokens().save(&token);
        match self.login(&args.email, &args.password).await? {
            LoginOutcome::SignedIn { user, .. } => Ok(SignUpOutcome::SignedIn { user, message }),
            LoginOutcome::Rejected { .. } => Ok(SignUpOutcome::Created { message }),
        }
    }

    /// Adopt a token handed out outside login (password reset)
    pub fn store_token(&self, token: &str) {
        self.api.tokens().save(token);
    }

    /// `POST /auth/logout`; the local session is cleared whatever happens
    pub async fn logout(&self) {
        let _cleanup = SignOutGuard(self);
        match api::logout(&self.api).await {
            Ok(()) | Err(ApiError::Unauthorized(_)) => {}
            Err(ApiError::RateLimited) => debug!("logout rate limited"),
            Err(err) => error!(error = %err, "server logout failed"),
        }
    }

    /// Downgrade after a call site saw a 401
    pub fn expire(&self) {
        if self.status().user().is_some() {
            info!("session expired");
        }
        self.api.tokens().clear();
        self.set_status(SessionStatus::Anonymous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::MemoryTokenStore;
    use crate::models::Role;
    use serde_json::json;
    use std::future::Future;
    use std::task::{Context, Waker};

    fn store(mock: &MockTransport, token: Option<&str>) -> SessionStore {
        SessionStore::new(ApiClient::new(mock.clone(), MemoryTokenStore::new(token)))
    }

    fn me_ok() -> serde_json::Value {
        json!({"success": true, "data": {"user": {
            "_id": "u1", "name": "Ana Souza", "email": "ana@x.com", "role": "admin", "emailVerified": true
        }}})
    }

    fn token(session: &SessionStore) -> Option<String> {
        session.api().tokens().load()
    }

    #[tokio::test]
    async fn test_check_without_token_skips_network() {
        let mock = MockTransport::new();
        let session = store(&mock, None);

        session.check().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_check_with_valid_token() {
        let mock = MockTransport::new();
        mock.push(200, me_ok());
        let session = store(&mock, Some("t1"));

        session.check().await;
        let user = session.user().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(mock.requests()[0].path, "/auth/me");
        assert_eq!(mock.requests()[0].bearer.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_check_refused_clears_token() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": false}));
        mock.push(401, json!({"message": "Token expirado"}));
        let session = store(&mock, Some("t1"));

        session.check().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session), None);

        session.store_token("t2");
        session.check().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session), None);
    }

    #[tokio::test]
    async fn test_check_without_user_keeps_token() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "data": {}}));
        let session = store(&mock, Some("t1"));

        session.check().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session).as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_check_rate_limited_keeps_identity() {
        let mock = MockTransport::new();
        mock.push(200, me_ok());
        mock.push(429, json!({}));
        let session = store(&mock, Some("t1"));

        session.check().await;
        session.refresh().await;
        assert!(session.user().is_some());
        assert_eq!(token(&session).as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_check_rate_limited_on_start_is_anonymous() {
        let mock = MockTransport::new();
        mock.push(429, json!({}));
        let session = store(&mock, Some("t1"));

        session.check().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session).as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_check_server_error_keeps_token() {
        let mock = MockTransport::new();
        mock.push(500, json!({"message": "db down"}));
        let session = store(&mock, Some("t1"));

        session.check().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session).as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_overlapping_checks_issue_one_request() {
        let mock = MockTransport::new();
        mock.yield_before_reply();
        mock.push(200, me_ok());
        let session = store(&mock, Some("t1"));

        tokio::join!(session.check(), session.check());
        assert_eq!(mock.request_count(), 1);
        assert!(session.user().is_some());

        // the guard is released afterwards
        mock.push(200, me_ok());
        session.check().await;
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "message": "Bem-vindo", "data": {
            "user": {"_id": "u1", "name": "Ana", "role": "vendedor"}, "token": "fresh"
        }}));
        let session = store(&mock, None);

        let outcome = session.login("ana@x.com", "secret").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::SignedIn { ref message, .. } if message.as_deref() == Some("Bem-vindo")));
        assert_eq!(token(&session).as_deref(), Some("fresh"));
        assert_eq!(session.user().unwrap().role, Role::Vendedor);
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"email": "ana@x.com", "password": "secret"}))
        );
    }

    #[tokio::test]
    async fn test_login_unsuccessful_envelope() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": false, "message": "ignored"}));
        let session = store(&mock, None);

        let outcome = session.login("a@b.com", "x").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected { message: "Erro ao fazer login".into() });
        assert_eq!(session.status(), SessionStatus::Checking);
    }

    #[tokio::test]
    async fn test_login_unverified_is_returned_as_error() {
        let mock = MockTransport::new();
        mock.push(403, json!({"success": false, "message": "Verifique seu email", "requiresVerification": true}));
        let session = store(&mock, None);

        let err = session.login("a@b.com", "x").await.unwrap_err();
        assert!(err.requires_verification());
        assert_eq!(token(&session), None);
    }

    #[tokio::test]
    async fn test_register_waits_for_verification() {
        let mock = MockTransport::new();
        mock.push(201, json!({"success": true, "message": "Verifique seu email", "data": {
            "user": {"_id": "u2", "name": "Bia", "emailVerified": false},
            "token": "early",
            "verificationUrl": "http://localhost:5173/verify-email/abc"
        }}));
        let session = store(&mock, None);
        let args = RegisterArgs {
            name: "Bia".into(),
            email: "bia@x.com".into(),
            password: "123456".into(),
            phone: "".into(),
        };

        let outcome = session.register(&args).await.unwrap();
        assert_eq!(
            outcome,
            SignUpOutcome::VerificationPending {
                message: Some("Verifique seu email".into()),
                verification_url: Some("http://localhost:5173/verify-email/abc".into()),
            }
        );
        assert_eq!(token(&session), None);
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_register_verified_signs_in() {
        let mock = MockTransport::new();
        mock.push(201, json!({"success": true, "data": {
            "user": {"_id": "u2", "name": "Bia", "emailVerified": true}, "token": "t9"
        }}));
        let session = store(&mock, None);
        let args = RegisterArgs {
            name: "Bia".into(),
            email: "bia@x.com".into(),
            password: "123456".into(),
            phone: "".into(),
        };

        let outcome = session.register(&args).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn { .. }));
        assert_eq!(token(&session).as_deref(), Some("t9"));
    }

    #[tokio::test]
    async fn test_first_admin_verified_logs_in() {
        let mock = MockTransport::new();
        mock.push(201, json!({"success": true, "message": "Administrador criado", "data": {
            "user": {"_id": "a1", "name": "Root", "role": "admin", "emailVerified": true}, "token": "setup"
        }}));
        mock.push(200, json!({"success": true, "data": {
            "user": {"_id": "a1", "name": "Root", "role": "admin", "emailVerified": true}, "token": "session"
        }}));
        let session = store(&mock, None);
        let args = RegisterArgs {
            name: "Root".into(),
            email: "root@x.com".into(),
            password: "123456".into(),
            phone: "".into(),
        };

        let outcome = session.create_first_admin(&args).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn { ref user, .. } if user.role == Role::Admin));
        assert_eq!(mock.requests()[1].path, "/auth/login");
        assert_eq!(token(&session).as_deref(), Some("session"));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let mock = MockTransport::new();
        mock.push(200, me_ok());
        mock.push(500, json!({"message": "boom"}));
        let session = store(&mock, Some("t1"));
        session.check().await;

        session.logout().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session), None);
        assert_eq!(mock.requests()[1].path, "/auth/logout");
    }

    #[tokio::test]
    async fn test_logout_clears_when_dropped_mid_request() {
        let mock = MockTransport::new();
        mock.push(200, me_ok());
        let session = store(&mock, Some("t1"));
        session.check().await;

        mock.yield_before_reply();
        mock.push(200, json!({"success": true}));
        let mut cx = Context::from_waker(Waker::noop());
        let mut logout = Box::pin(session.logout());
        assert!(logout.as_mut().poll(&mut cx).is_pending());
        drop(logout);

        assert_eq!(mock.request_count(), 2);
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session), None);
    }

    #[tokio::test]
    async fn test_expire() {
        let mock = MockTransport::new();
        mock.push(200, me_ok());
        let session = store(&mock, Some("t1"));
        session.check().await;

        session.expire();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(token(&session), None);
    }
}
