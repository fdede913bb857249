//! Date Filter Bar Component
//!
//! Period selector (all, today, last 7 days, last month, custom) with the
//! custom range inputs.

use leptos::prelude::*;

use crate::dates::DateFilter;

#[component]
pub fn DateFilterBar(
    filter: RwSignal<DateFilter>,
    custom_start: RwSignal<String>,
    custom_end: RwSignal<String>,
) -> impl IntoView {
    view! {
        <div class="date-filter">
            <label>"Período:"</label>
            <select
                prop:value=move || filter.get().as_str()
                on:change=move |ev| filter.set(DateFilter::parse(&event_target_value(&ev)))
            >
                {DateFilter::ALL
                    .iter()
                    .map(|option| view! { <option value=option.as_str()>{option.label()}</option> })
                    .collect_view()}
            </select>
            <Show when=move || filter.get() == DateFilter::Custom>
                <input
                    type="date"
                    prop:value=move || custom_start.get()
                    on:input=move |ev| custom_start.set(event_target_value(&ev))
                />
                <span>"até"</span>
                <input
                    type="date"
                    prop:value=move || custom_end.get()
                    on:input=move |ev| custom_end.set(event_target_value(&ev))
                />
            </Show>
        </div>
    }
}
