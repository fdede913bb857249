//! Application Context
//!
//! Shared state provided via Leptos Context API: the API client, the session
//! mirrored into a signal, toasts and the router.

use std::sync::Arc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{debug, error, warn};

use crate::access::Capability;
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::{ApiError, ErrorClass, SubmitError};
use crate::models::User;
use crate::router::{Route, Router};
use crate::session::{SessionStatus, SessionStore};

// ========================
// Session
// ========================

/// Reactive view of the `SessionStore`
///
/// The store is the source of truth; `sync` copies its status into the
/// signal after every operation that may have changed it.
#[derive(Clone, Copy)]
pub struct AuthContext {
    store: StoredValue<Arc<SessionStore>>,
    status: RwSignal<SessionStatus>,
}

impl AuthContext {
    pub fn new(store: Arc<SessionStore>) -> Self {
        let status = RwSignal::new(store.status());
        Self {
            store: StoredValue::new(store),
            status,
        }
    }

    /// Handle for async work; call `sync` when it is done
    pub fn session(&self) -> Arc<SessionStore> {
        self.store.get_value()
    }

    pub fn status(&self) -> ReadSignal<SessionStatus> {
        self.status.read_only()
    }

    pub fn user(&self) -> Option<User> {
        self.status.with(|status| status.user().cloned())
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.status
            .with(|status| status.user().is_some_and(|user| user.role.can(capability)))
    }

    pub fn sync(&self) {
        let status = self.store.with_value(|store| store.status());
        if self.status.get_untracked() != status {
            self.status.set(status);
        }
    }

    /// Startup check (and re-checks); overlapping calls are dropped by the store
    pub fn check(&self) {
        let this = *self;
        let session = self.session();
        spawn_local(async move {
            session.check().await;
            this.sync();
        });
    }

    pub fn logout(&self) {
        let this = *self;
        let session = self.session();
        spawn_local(async move {
            session.logout().await;
            this.sync();
        });
    }

    pub fn expire(&self) {
        self.store.with_value(|store| store.expire());
        self.sync();
    }
}

// ========================
// Toasts
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            ToastKind::Success => "notification notification-success",
            ToastKind::Error => "notification notification-error",
            ToastKind::Info => "notification notification-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Transient notifications, dismissed after `AppConfig::toast_duration`
#[derive(Clone, Copy)]
pub struct Toasts {
    list: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    duration_ms: u32,
}

impl Toasts {
    pub fn new(config: &AppConfig) -> Self {
        let duration_ms = u32::try_from(config.toast_duration.as_millis()).unwrap_or(u32::MAX);
        Self {
            list: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
            duration_ms,
        }
    }

    pub fn list(&self) -> ReadSignal<Vec<Toast>> {
        self.list.read_only()
    }

    pub fn push(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.list.update(|list| {
            list.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });

        self.schedule_dismiss(id);
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_dismiss(&self, id: u64) {
        let this = *self;
        Timeout::new(self.duration_ms, move || this.dismiss(id)).forget();
    }

    /// No browser timer off wasm32; toasts stay until dismissed
    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_dismiss(&self, _id: u64) {}

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.list.update(|list| list.retain(|toast| toast.id != id));
    }
}

// ========================
// App
// ========================

/// App-wide services provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    api: StoredValue<ApiClient>,
    config: StoredValue<AppConfig>,
    pub toasts: Toasts,
    pub router: Router,
    pub auth: AuthContext,
}

impl AppContext {
    pub fn new(config: AppConfig, api: ApiClient, router: Router) -> Self {
        let session = Arc::new(SessionStore::new(api.clone()));
        Self {
            api: StoredValue::new(api),
            toasts: Toasts::new(&config),
            config: StoredValue::new(config),
            router,
            auth: AuthContext::new(session),
        }
    }

    pub fn api(&self) -> ApiClient {
        self.api.get_value()
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    pub fn navigate(&self, route: Route) {
        self.router.navigate(route);
    }

    /// Navigate once the success toast has been seen
    pub fn navigate_after(&self, route: Route, delay_ms: u32) {
        let router = self.router;
        Timeout::new(delay_ms, move || router.replace(route)).forget();
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.auth.can(capability)
    }

    /// Turn a failed call into what the user sees
    pub fn report(&self, err: &ApiError, fallback: &str) {
        match err.class() {
            ErrorClass::Auth => self.auth.expire(),
            ErrorClass::RateLimited => debug!(fallback, "rate limited"),
            ErrorClass::Business(message) => {
                warn!(status = ?err.status(), message = %message, "request rejected");
                self.toasts.error(message);
            }
            ErrorClass::Unexpected => {
                error!(error = %err, "{fallback}");
                self.toasts.error(fallback);
            }
        }
    }

    /// Public pages: a 401 there is a refused credential, not an expired session
    pub fn report_public(&self, err: &ApiError, fallback: &str) {
        match err {
            ApiError::Unauthorized(_) => {
                self.toasts.error(err.server_message().unwrap_or(fallback));
            }
            _ => self.report(err, fallback),
        }
    }

    /// Background refreshes: no toast, retried on the next tick
    pub fn report_quietly(&self, err: &ApiError, what: &str) {
        match err.class() {
            ErrorClass::Auth => self.auth.expire(),
            _ => debug!(error = %err, "{what} refresh failed"),
        }
    }

    pub fn report_submit(&self, err: &SubmitError) {
        match err {
            SubmitError::Invalid(form) => self.toasts.error(form.to_string()),
            SubmitError::Failed { source, fallback } => self.report(source, fallback),
        }
    }
}

/// Get the app context
pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::{self, MemoryTokenStore, Query};
    use crate::error::FormError;
    use leptos::reactive::owner::Owner;
    use rolling_logger::{LogBuffer, RollingLayer};
    use serde_json::json;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    /// Signed-in admin context plus the captured log
    async fn signed_in(owner: &Owner, mock: &MockTransport) -> (AppContext, LogBuffer) {
        mock.push(200, json!({"success": true, "data": {"user": {
            "_id": "u1", "name": "Ana", "email": "ana@x.com", "role": "admin", "emailVerified": true
        }}}));
        let api = ApiClient::new(mock.clone(), MemoryTokenStore::new(Some("t1")));
        let ctx = owner.with(|| {
            AppContext::new(AppConfig::default(), api, Router::starting_at(Route::Dashboard))
        });
        ctx.auth.session().check().await;
        ctx.auth.sync();
        assert!(ctx.auth.user().is_some());
        (ctx, LogBuffer::with_capacity(64))
    }

    fn capture(buffer: &LogBuffer) -> tracing::subscriber::DefaultGuard {
        let subscriber =
            tracing_subscriber::registry().with(RollingLayer::silent(buffer.clone(), Level::DEBUG));
        tracing::subscriber::set_default(subscriber)
    }

    fn toast_messages(ctx: &AppContext) -> Vec<String> {
        ctx.toasts.list().get_untracked().into_iter().map(|t| t.message).collect()
    }

    #[tokio::test]
    async fn test_rate_limited_is_silent() {
        let owner = Owner::new();
        let mock = MockTransport::new();
        let (ctx, buffer) = signed_in(&owner, &mock).await;
        let _log = capture(&buffer);
        mock.push(429, json!({}));

        let err = api::list_sales(&ctx.api(), Query::new()).await.unwrap_err();
        ctx.report(&err, "Erro ao buscar vendas");

        assert_eq!(buffer.count_at(Level::ERROR), 0);
        assert!(toast_messages(&ctx).is_empty());
        assert!(ctx.auth.user().is_some());
        assert_eq!(ctx.api().tokens().load().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_unauthorized_expires_session() {
        let owner = Owner::new();
        let mock = MockTransport::new();
        let (ctx, _) = signed_in(&owner, &mock).await;
        mock.push(401, json!({"message": "Token expirado"}));

        let err = api::list_clients(&ctx.api(), Query::new()).await.unwrap_err();
        ctx.report(&err, "Erro ao buscar clientes");

        assert_eq!(ctx.auth.status().get_untracked(), SessionStatus::Anonymous);
        assert_eq!(ctx.api().tokens().load(), None);
        assert!(toast_messages(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_business_message_shown_verbatim() {
        let owner = Owner::new();
        let mock = MockTransport::new();
        let (ctx, buffer) = signed_in(&owner, &mock).await;
        let _log = capture(&buffer);
        mock.push(400, json!({"success": false, "message": "Estoque insuficiente"}));

        let err = api::list_products(&ctx.api(), Query::new()).await.unwrap_err();
        ctx.report(&err, "Erro ao buscar produtos");

        assert_eq!(toast_messages(&ctx), ["Estoque insuficiente"]);
        assert_eq!(ctx.toasts.list().get_untracked()[0].kind, ToastKind::Error);
        assert_eq!(buffer.count_at(Level::ERROR), 0);
    }

    #[tokio::test]
    async fn test_unexpected_failure_uses_fallback_and_logs() {
        let owner = Owner::new();
        let mock = MockTransport::new();
        let (ctx, buffer) = signed_in(&owner, &mock).await;
        let _log = capture(&buffer);
        mock.push_error(ApiError::Transport("connection reset".into()));

        let err = api::list_materials(&ctx.api(), Query::new()).await.unwrap_err();
        ctx.report(&err, "Erro ao buscar materiais");

        assert_eq!(toast_messages(&ctx), ["Erro ao buscar materiais"]);
        assert_eq!(buffer.count_at(Level::ERROR), 1);
        assert!(ctx.auth.user().is_some());
    }

    #[tokio::test]
    async fn test_background_refresh_failures_stay_quiet() {
        let owner = Owner::new();
        let mock = MockTransport::new();
        let (ctx, buffer) = signed_in(&owner, &mock).await;
        let _log = capture(&buffer);

        ctx.report_quietly(&ApiError::Transport("offline".into()), "dashboard");
        assert!(toast_messages(&ctx).is_empty());
        assert_eq!(buffer.count_at(Level::ERROR), 0);
        assert!(ctx.auth.user().is_some());

        ctx.report_quietly(&ApiError::Unauthorized(None), "dashboard");
        assert_eq!(ctx.auth.status().get_untracked(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_public_and_form_errors() {
        let owner = Owner::new();
        let mock = MockTransport::new();
        let (ctx, _) = signed_in(&owner, &mock).await;

        ctx.report_public(&ApiError::Unauthorized(Some("Senha incorreta".into())), "Erro ao fazer login");
        ctx.report_submit(&SubmitError::Invalid(FormError::NoSaleItems));

        assert_eq!(
            toast_messages(&ctx),
            ["Senha incorreta".to_string(), FormError::NoSaleItems.to_string()]
        );
        // a refused credential on a public page is not an expired session
        assert!(ctx.auth.user().is_some());
    }
}
