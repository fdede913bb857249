//! Business Dashboard App
//!
//! Root component: wires the services into context, gates every route on
//! the session and renders the matching page.

use leptos::prelude::*;
use reactive_stores::Store;
use tracing::{debug, info};

use crate::api::{ApiClient, BrowserTokenStore, HttpTransport};
use crate::components::{Layout, Loading, ToastHost};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::pages::*;
use crate::router::{guard, Access, Gate, Route, Router};
use crate::store::CatalogState;

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_build_env();
    info!(api_url = %config.api_url, "starting dashboard");

    let api = ApiClient::new(HttpTransport::new(config.api_url.clone()), BrowserTokenStore);
    let router = Router::new();
    let ctx = AppContext::new(config, api, router);

    // Provide context to all children
    provide_context(ctx);
    provide_context(router);
    provide_context(Store::new(CatalogState::default()));

    router.install();
    ctx.auth.check();

    let gate = Memo::new(move |_| {
        let route = router.signal().get();
        ctx.auth.status().with(|status| guard(&route, status))
    });
    let access = Memo::new(move |_| router.signal().with(Route::access));

    Effect::new(move |_| {
        if let Gate::Redirect(target) = gate.get() {
            debug!(from = %router.route().path(), to = %target.path(), "route redirected");
            router.replace(target);
        }
    });

    // Layout stays mounted while moving between private pages
    let outlet = move || match (gate.get(), access.get()) {
        (Gate::Render, Access::Public) => {
            (move || page(router.signal().get())).into_any()
        }
        (Gate::Render, Access::Private) => view! {
            <Layout>{move || page(router.signal().get())}</Layout>
        }
        .into_any(),
        _ => view! { <Loading /> }.into_any(),
    };

    view! {
        {outlet}
        <ToastHost />
    }
}

fn page(route: Route) -> AnyView {
    match route {
        Route::Login => view! { <LoginPage /> }.into_any(),
        Route::Register => view! { <RegisterPage /> }.into_any(),
        Route::SetupAdmin => view! { <SetupAdminPage /> }.into_any(),
        Route::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        Route::ResetPassword(token) => view! { <ResetPasswordPage token=token /> }.into_any(),
        Route::VerifyEmail(token) => view! { <VerifyEmailPage token=token /> }.into_any(),
        Route::Dashboard => view! { <DashboardPage /> }.into_any(),
        Route::Products => view! { <ProductsPage /> }.into_any(),
        Route::Clients => view! { <ClientsPage /> }.into_any(),
        Route::Sales => view! { <SalesPage /> }.into_any(),
        Route::Reports => view! { <ReportsPage /> }.into_any(),
        Route::Materials => view! { <MaterialsPage /> }.into_any(),
        Route::MaterialPurchases => view! { <MaterialPurchasesPage /> }.into_any(),
        Route::MaterialWithdrawals => view! { <MaterialWithdrawalsPage /> }.into_any(),
        Route::MaterialConsumption => view! { <MaterialConsumptionPage /> }.into_any(),
        Route::Productions => view! { <ProductionsPage /> }.into_any(),
        Route::Users => view! { <UsersPage /> }.into_any(),
    }
}
