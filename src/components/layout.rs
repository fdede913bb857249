//! Layout Component
//!
//! Navigation shell around every private page: sidebar, mobile menu, user
//! box with logout, and the low-stock banner.

use leptos::prelude::*;

use crate::access::Capability;
use crate::context::use_app;
use crate::router::Route;

use super::StockAlert;

/// Sidebar or mobile navigation, filtered by the user's role
#[component]
fn NavLinks(link_class: &'static str, on_navigate: Callback<()>) -> impl IntoView {
    let ctx = use_app();
    let current = ctx.router.signal();

    Route::menu()
        .into_iter()
        .map(|(route, label)| {
            let visible = {
                let route = route.clone();
                move || route.capability().is_none_or(|capability| ctx.can(capability))
            };
            let class = {
                let route = route.clone();
                move || {
                    if current.get() == route {
                        format!("{} active", link_class)
                    } else {
                        link_class.to_string()
                    }
                }
            };
            let href = route.path();
            view! {
                <Show when=visible>
                    <a
                        href=href.clone()
                        class=class.clone()
                        on:click={
                            let route = route.clone();
                            move |ev| {
                                ev.prevent_default();
                                ctx.navigate(route.clone());
                                on_navigate.run(());
                            }
                        }
                    >
                        {label}
                    </a>
                </Show>
            }
        })
        .collect_view()
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    let ctx = use_app();
    let (mobile_open, set_mobile_open) = signal(false);
    let close_menu = Callback::new(move |_| set_mobile_open.set(false));

    let user_name = move || ctx.auth.user().map(|user| user.name).unwrap_or_default();
    let user_role = move || ctx.auth.user().map(|user| user.role.label()).unwrap_or_default();

    view! {
        <div class="layout">
            <header class="page-top-header">
                <button
                    class="mobile-menu-toggle"
                    aria-label="Menu"
                    on:click=move |_| set_mobile_open.update(|open| *open = !*open)
                >
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class="header-title">
                    <h2>"Sistema de Finanças"</h2>
                </div>
            </header>

            <nav class="navbar">
                <div class="navbar-container">
                    <div class="navbar-brand">
                        <h1>"Sistema de Finanças"</h1>
                        <span class="navbar-subtitle">"Controle de vendas"</span>
                    </div>
                    <nav class="navbar-nav">
                        <NavLinks link_class="nav-link" on_navigate=close_menu />
                    </nav>
                    <div class="navbar-footer">
                        <div class="navbar-user">
                            <div class="user-info">
                                <span class="user-name">{user_name}</span>
                                <span class="user-role">{user_role}</span>
                            </div>
                            <button class="btn-logout" on:click=move |_| ctx.auth.logout()>
                                "Sair"
                            </button>
                        </div>
                    </div>
                </div>

                <div class=move || if mobile_open.get() { "mobile-menu open" } else { "mobile-menu" }>
                    <div class="mobile-menu-header">
                        <span class="user-name">{user_name}</span>
                        <button class="mobile-menu-close" aria-label="Fechar" on:click=move |_| close_menu.run(())>
                            "×"
                        </button>
                    </div>
                    <nav class="mobile-nav">
                        <NavLinks link_class="mobile-nav-link" on_navigate=close_menu />
                    </nav>
                    <button class="btn-logout" on:click=move |_| ctx.auth.logout()>
                        "Sair"
                    </button>
                </div>
            </nav>

            <main class="main-content">
                <Show when=move || ctx.can(Capability::ViewInventory)>
                    <StockAlert />
                </Show>
                {children()}
            </main>
        </div>
    }
}
