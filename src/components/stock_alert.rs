//! Stock Alert Component
//!
//! Collapsible banner listing materials at or below their minimum stock,
//! refreshed on a fixed period while mounted.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_interval::use_interval;
use tracing::debug;

use crate::api;
use crate::calc::format_quantity;
use crate::context::use_app;
use crate::models::Material;
use crate::router::{Link, Route};

#[component]
pub fn StockAlert() -> impl IntoView {
    let ctx = use_app();
    let (low_stock, set_low_stock) = signal(Vec::<Material>::new());
    let (expanded, set_expanded) = signal(false);

    let fetch = move || {
        spawn_local(async move {
            match api::material_stats(&ctx.api()).await {
                Ok(stats) => {
                    debug!(count = stats.low_stock_materials.len(), "low stock refreshed");
                    set_low_stock.set(stats.low_stock_materials);
                }
                Err(err) => ctx.report_quietly(&err, "low stock"),
            }
        });
    };

    fetch();
    let _timer = use_interval(ctx.config().stock_alert_refresh, fetch);

    view! {
        <Show when=move || !low_stock.with(Vec::is_empty)>
            <div class="stock-alert-container">
                <div class="stock-alert-header" on:click=move |_| set_expanded.update(|e| *e = !*e)>
                    <div class="stock-alert-icon">"⚠"</div>
                    <div class="stock-alert-info">
                        <strong>
                            {move || format!("{} material(is) com estoque baixo", low_stock.with(Vec::len))}
                        </strong>
                        <span>"Clique para ver detalhes"</span>
                    </div>
                    <span class="stock-alert-toggle">{move || if expanded.get() { "▼" } else { "▶" }}</span>
                </div>
                <Show when=move || expanded.get()>
                    <div class="stock-alert-list">
                        <For
                            each=move || low_stock.get()
                            key=|material| material.id.clone()
                            children=move |material| {
                                let unit = material.unit.as_str();
                                view! {
                                    <div class="stock-alert-item">
                                        <div class="stock-alert-item-info">
                                            <strong>{material.name.clone()}</strong>
                                            <span>
                                                {format!(
                                                    "Estoque: {} {} (mínimo: {} {})",
                                                    format_quantity(material.quantity_in_stock),
                                                    unit,
                                                    format_quantity(material.minimum_stock),
                                                    unit,
                                                )}
                                            </span>
                                        </div>
                                        <Link route=Route::Materials class="stock-alert-link">
                                            "Ver Material"
                                        </Link>
                                    </div>
                                }
                            }
                        />
                    </div>
                </Show>
            </div>
        </Show>
    }
}
