//! Form Field Helpers
//!
//! Inputs bound to one `String` field of a draft held in a signal.

use leptos::prelude::*;

/// True while the modal still edits `id`; false once the page is gone
pub fn is_editing(editing: RwSignal<Option<String>>, id: &str) -> bool {
    editing.try_get_untracked().flatten().as_deref() == Some(id)
}

/// Labelled `<input>` reading and writing `draft.<field>`
pub fn field<D: Send + Sync + 'static>(
    label: &'static str,
    input_type: &'static str,
    draft: RwSignal<D>,
    read: fn(&D) -> &String,
    write: fn(&mut D) -> &mut String,
) -> impl IntoView {
    view! {
        <div class="form-group">
            <label>{label}</label>
            <input
                type=input_type
                step=(input_type == "number").then_some("any")
                placeholder=label
                prop:value=move || draft.with(|d| read(d).clone())
                on:input=move |ev| draft.update(|d| *write(d) = event_target_value(&ev))
            />
        </div>
    }
}

/// Labelled `<textarea>` reading and writing `draft.<field>`
pub fn text_area<D: Send + Sync + 'static>(
    label: &'static str,
    draft: RwSignal<D>,
    read: fn(&D) -> &String,
    write: fn(&mut D) -> &mut String,
) -> impl IntoView {
    view! {
        <div class="form-group">
            <label>{label}</label>
            <textarea
                rows="3"
                placeholder=label
                prop:value=move || draft.with(|d| read(d).clone())
                on:input=move |ev| draft.update(|d| *write(d) = event_target_value(&ev))
            ></textarea>
        </div>
    }
}

/// Search box bound to a signal
pub fn search_box(placeholder: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <div class="search-bar">
            <input
                type="text"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </div>
    }
}

/// Required `<input type="date">` bound to a signal
pub fn date_input(label: &'static str, value: RwSignal<String>) -> impl IntoView {
    view! {
        <div class="form-group">
            <label>{label}</label>
            <input
                type="date"
                required
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;

    #[test]
    fn test_late_refresh_after_unmount_is_ignored() {
        let owner = Owner::new();
        let editing = owner.with(|| RwSignal::new(Some("c1".to_string())));
        assert!(is_editing(editing, "c1"));
        assert!(!is_editing(editing, "c2"));

        drop(owner);
        assert!(!is_editing(editing, "c1"));
        // writes to a disposed draft are dropped, not a crash
        editing.set(None);
    }
}
