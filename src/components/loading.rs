//! Loading placeholder

use leptos::prelude::*;

#[component]
pub fn Loading(#[prop(optional, into)] message: Option<String>) -> impl IntoView {
    view! { <div class="loading">{message.unwrap_or_else(|| "Carregando...".to_string())}</div> }
}
