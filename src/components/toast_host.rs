//! Toast Host Component
//!
//! Renders the toasts queued on `AppContext::toasts`.

use leptos::prelude::*;

use crate::context::use_app;

#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_app().toasts;

    view! {
        <div class="notification-stack">
            <For
                each=move || toasts.list().get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div
                            class=format!("{} show", toast.kind.css_class())
                            on:click=move |_| toasts.dismiss(id)
                        >
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
