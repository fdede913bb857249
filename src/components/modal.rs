//! Modal Component
//!
//! Overlay dialog used by every create/edit form.

use leptos::prelude::*;

/// Dialog shown while `open` is true
///
/// Clicking the backdrop or the × button runs `on_close`; clicks inside the
/// dialog do not propagate to the backdrop.
#[component]
pub fn Modal(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(into)] on_close: Callback<()>,
    #[prop(optional, into)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let dialog_class = format!("modal {}", class).trim_end().to_string();

    view! {
        <Show when=move || open.get()>
            <div class="modal-overlay" on:click=move |_| on_close.run(())>
                <div class=dialog_class.clone() on:click=|ev| ev.stop_propagation()>
                    <div class="modal-header">
                        <h2>{move || title.get()}</h2>
                        <button
                            type="button"
                            class="modal-close"
                            aria-label="Fechar"
                            on:click=move |_| on_close.run(())
                        >
                            "×"
                        </button>
                    </div>
                    {children()}
                </div>
            </div>
        </Show>
    }
}
