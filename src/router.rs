//! Routing
//!
//! Route table, the session gate in front of it, and History API navigation.

use leptos::ev;
use leptos::prelude::*;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::access::Capability;
use crate::api::segment;
use crate::session::SessionStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    SetupAdmin,
    ForgotPassword,
    ResetPassword(String),
    VerifyEmail(String),
    Dashboard,
    Products,
    Clients,
    Sales,
    Reports,
    Materials,
    MaterialPurchases,
    MaterialWithdrawals,
    MaterialConsumption,
    Productions,
    Users,
}

/// Who may open a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only without a session
    Public,
    /// Only with a session
    Private,
}

impl Route {
    /// `/` and unknown paths resolve to the dashboard
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["setup-admin"] => Route::SetupAdmin,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password", raw] => Route::ResetPassword(decode_segment(raw)),
            ["verify-email", raw] => Route::VerifyEmail(decode_segment(raw)),
            ["dashboard"] => Route::Dashboard,
            ["products"] => Route::Products,
            ["clients"] => Route::Clients,
            ["sales"] => Route::Sales,
            ["reports"] => Route::Reports,
            ["materials"] => Route::Materials,
            ["material-purchases"] => Route::MaterialPurchases,
            ["material-withdrawals"] => Route::MaterialWithdrawals,
            ["material-consumption"] => Route::MaterialConsumption,
            ["productions"] => Route::Productions,
            ["users"] => Route::Users,
            _ => Route::Dashboard,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::SetupAdmin => "/setup-admin".into(),
            Route::ForgotPassword => "/forgot-password".into(),
            Route::ResetPassword(token) => format!("/reset-password/{}", segment(token)),
            Route::VerifyEmail(token) => format!("/verify-email/{}", segment(token)),
            Route::Dashboard => "/dashboard".into(),
            Route::Products => "/products".into(),
            Route::Clients => "/clients".into(),
            Route::Sales => "/sales".into(),
            Route::Reports => "/reports".into(),
            Route::Materials => "/materials".into(),
            Route::MaterialPurchases => "/material-purchases".into(),
            Route::MaterialWithdrawals => "/material-withdrawals".into(),
            Route::MaterialConsumption => "/material-consumption".into(),
            Route::Productions => "/productions".into(),
            Route::Users => "/users".into(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Login
            | Route::Register
            | Route::SetupAdmin
            | Route::ForgotPassword
            | Route::ResetPassword(_)
            | Route::VerifyEmail(_) => Access::Public,
            _ => Access::Private,
        }
    }

    /// Capability needed to see the route in navigation
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Route::Materials
            | Route::MaterialPurchases
            | Route::MaterialWithdrawals
            | Route::MaterialConsumption
            | Route::Productions
            | Route::Reports => Some(Capability::ViewInventory),
            Route::Users => Some(Capability::ManageUsers),
            _ => None,
        }
    }

    /// Navigation entries in menu order
    pub fn menu() -> [(Route, &'static str); 11] {
        [
            (Route::Dashboard, "Dashboard"),
            (Route::Sales, "Vendas"),
            (Route::Products, "Produtos"),
            (Route::Clients, "Clientes"),
            (Route::Materials, "Materiais"),
            (Route::MaterialPurchases, "Entradas"),
            (Route::MaterialWithdrawals, "Saídas"),
            (Route::MaterialConsumption, "Consumo"),
            (Route::Productions, "Produções"),
            (Route::Reports, "Relatórios"),
            (Route::Users, "Usuários"),
        ]
    }
}

fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// What to do with a route for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Session check still running
    Loading,
    Render,
    Redirect(Route),
}

pub fn guard(route: &Route, status: &SessionStatus) -> Gate {
    match (route.access(), status) {
        (_, SessionStatus::Checking) => Gate::Loading,
        (Access::Public, SessionStatus::Authenticated(_)) => Gate::Redirect(Route::Dashboard),
        (Access::Private, SessionStatus::Anonymous) => Gate::Redirect(Route::Login),
        _ => Gate::Render,
    }
}

// ========================
// Browser navigation
// ========================

/// Current route, kept in sync with the address bar
#[derive(Clone, Copy)]
pub struct Router {
    route: RwSignal<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::starting_at(Route::parse(&current_path()))
    }

    /// Router that has not read the address bar yet
    pub fn starting_at(route: Route) -> Self {
        Self {
            route: RwSignal::new(route),
        }
    }

    pub fn route(&self) -> Route {
        self.route.get()
    }

    pub fn signal(&self) -> ReadSignal<Route> {
        self.route.read_only()
    }

    /// Normalize the initial URL and follow back/forward buttons
    pub fn install(&self) {
        let route = self.route.get_untracked();
        if route.path() != current_path() {
            write_history(&route, true);
        }
        let signal = self.route;
        let _ = window_event_listener(ev::popstate, move |_| {
            let route = Route::parse(&current_path());
            debug!(path = %route.path(), "history navigation");
            signal.set(route);
        });
    }

    /// New history entry
    pub fn navigate(&self, route: Route) {
        if self.route.get_untracked() == route {
            return;
        }
        write_history(&route, false);
        self.route.set(route);
    }

    /// Replace the current entry (redirects)
    pub fn replace(&self, route: Route) {
        write_history(&route, true);
        self.route.set(route);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn current_path() -> String {
    window().location().pathname().unwrap_or_else(|_| "/".to_string())
}

fn write_history(route: &Route, replace: bool) {
    let path = route.path();
    let Ok(history) = window().history() else {
        warn!("history API unavailable");
        return;
    };
    let result = if replace {
        history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path))
    } else {
        history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path))
    };
    if result.is_err() {
        warn!(path, "failed to update history");
    }
}

/// In-app link that navigates without a page load
#[component]
pub fn Link(
    route: Route,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_context::<Router>().expect("Router should be provided");
    let href = route.path();
    view! {
        <a
            href=href
            class=class
            on:click=move |ev| {
                ev.prevent_default();
                router.navigate(route.clone());
            }
        >
            {children()}
        </a>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[test]
    fn test_parse_known_and_unknown_paths() {
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/material-withdrawals/"), Route::MaterialWithdrawals);
        assert_eq!(Route::parse("/reset-password/ab%2Fc"), Route::ResetPassword("ab/c".into()));
        assert_eq!(Route::parse("/verify-email/xyz?src=mail"), Route::VerifyEmail("xyz".into()));
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse("/nope/deeper"), Route::Dashboard);
        assert_eq!(Route::ResetPassword("ab/c".into()).path(), "/reset-password/ab%2Fc");
    }

    #[test]
    fn test_guard_private_routes() {
        assert_eq!(guard(&Route::Sales, &SessionStatus::Anonymous), Gate::Redirect(Route::Login));
        assert_eq!(guard(&Route::Sales, &SessionStatus::Checking), Gate::Loading);
        let signed_in = SessionStatus::Authenticated(User::default());
        assert_eq!(guard(&Route::Sales, &signed_in), Gate::Render);
    }

    #[test]
    fn test_guard_public_routes() {
        let signed_in = SessionStatus::Authenticated(User::default());
        assert_eq!(guard(&Route::Login, &signed_in), Gate::Redirect(Route::Dashboard));
        assert_eq!(
            guard(&Route::VerifyEmail("t".into()), &signed_in),
            Gate::Redirect(Route::Dashboard)
        );
        assert_eq!(guard(&Route::Register, &SessionStatus::Anonymous), Gate::Render);
        assert_eq!(guard(&Route::Login, &SessionStatus::Checking), Gate::Loading);
    }

    #[test]
    fn test_menu_capabilities() {
        let gated: Vec<_> = Route::menu()
            .into_iter()
            .filter(|(route, _)| route.capability().is_some())
            .map(|(route, _)| route)
            .collect();
        assert_eq!(gated.len(), 7);
        assert_eq!(Route::Users.capability(), Some(Capability::ManageUsers));
        assert_eq!(Route::Sales.capability(), None);
    }
}
