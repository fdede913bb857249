//! Productions Page
//!
//! Cost and output of each production batch, as aggregated by the backend.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::calc::{format_currency, format_opt_date, format_quantity};
use crate::components::Loading;
use crate::context::use_app;
use crate::models::{ref_name, Production, Ref};

#[component]
pub fn ProductionsPage() -> impl IntoView {
    let ctx = use_app();
    let (productions, set_productions) = signal(Vec::<Production>::new());
    let (loaded, set_loaded) = signal(false);
    let expanded = RwSignal::new(None::<String>);

    spawn_local(async move {
        match api::list_productions(&ctx.api()).await {
            Ok(list) => set_productions.set(list),
            Err(err) => ctx.report(&err, "Erro ao buscar produções"),
        }
        set_loaded.set(true);
    });

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando produções..." /> }>
            <div class="productions-page">
                <div class="page-header">
                    <h1>"Produções"</h1>
                    <p class="page-description">
                        "Visualize o custo total de cada produção e a quantidade produzida"
                    </p>
                </div>

                <Show
                    when=move || !productions.with(Vec::is_empty)
                    fallback=|| view! {
                        <div class="productions-empty-state">
                            <p>"Nenhuma produção registrada ainda."</p>
                            <p class="empty-hint">
                                "Para registrar uma produção:"
                                <br />
                                "1. Vá em \"Saídas\" e registre os materiais utilizados com um lote de produção"
                                <br />
                                "2. Vá em \"Produtos\" e adicione os produtos produzidos com o mesmo lote"
                            </p>
                        </div>
                    }
                >
                    <div class="productions-list">
                        <For
                            each=move || productions.get()
                            key=|p| p.production_batch.clone()
                            children=move |production| view! { <ProductionCard production=production expanded=expanded /> }
                        />
                    </div>
                </Show>
            </div>
        </Show>
    }
}

#[component]
fn ProductionCard(production: Production, expanded: RwSignal<Option<String>>) -> impl IntoView {
    let batch = StoredValue::new(production.production_batch.clone());
    let is_expanded =
        move || expanded.with(|current| batch.with_value(|b| current.as_deref() == Some(b.as_str())));
    let toggle = move |_| {
        let batch = batch.get_value();
        expanded.update(|current| {
            *current = if current.as_deref() == Some(batch.as_str()) { None } else { Some(batch) };
        });
    };
    let Production {
        production_batch,
        date,
        total_material_cost,
        total_products_quantity,
        cost_per_unit,
        materials,
        products,
    } = production;
    let materials = StoredValue::new(materials);
    let products = StoredValue::new(products);

    view! {
        <div class="production-card">
            <div class="production-card-header" on:click=toggle>
                <div class="production-card-header-left">
                    <h3 class="production-batch-name">{production_batch}</h3>
                    <span class="production-date">{format_opt_date(date.as_deref())}</span>
                </div>
                <div class="production-card-header-right">
                    <div class="production-summary">
                        <div class="production-summary-item">
                            <span class="summary-label">"Custo Total:"</span>
                            <strong class="summary-value cost">{format_currency(total_material_cost)}</strong>
                        </div>
                        <div class="production-summary-item">
                            <span class="summary-label">"Produzido:"</span>
                            <strong class="summary-value quantity">
                                {format!("{} unidades", format_quantity(total_products_quantity))}
                            </strong>
                        </div>
                        {(total_products_quantity > 0.0).then(|| view! {
                            <div class="production-summary-item">
                                <span class="summary-label">"Custo/Unidade:"</span>
                                <strong class="summary-value cost-per-unit">{format_currency(cost_per_unit)}</strong>
                            </div>
                        })}
                    </div>
                    <span class="production-toggle">{move || if is_expanded() { "▼" } else { "▶" }}</span>
                </div>
            </div>

            <Show when=is_expanded>
                <div class="production-details">
                    <div class="production-section">
                        <h4>"Materiais Utilizados"</h4>
                        {materials.with_value(|materials| {
                            if materials.is_empty() {
                                return view! { <p class="no-items">"Nenhum material registrado"</p> }.into_any();
                            }
                            view! {
                                <div class="materials-list">
                                    {materials.iter().map(|w| {
                                        let material = w.material.as_ref().and_then(Ref::populated);
                                        let unit = material.map_or("", |m| m.unit.label());
                                        view! {
                                            <div class="material-item">
                                                <div class="material-item-info">
                                                    <strong>{ref_name(&w.material).unwrap_or("N/A").to_string()}</strong>
                                                    <span>{material.map_or("", |m| m.category.label())}</span>
                                                </div>
                                                <div class="material-item-details">
                                                    <span>{format!("{} {unit}", format_quantity(w.quantity))}</span>
                                                    <span class="material-cost">
                                                        {format!(
                                                            "{} / {unit}",
                                                            format_currency(material.map_or(0.0, |m| m.cost_per_unit))
                                                        )}
                                                    </span>
                                                    <strong class="material-total-cost">{format_currency(w.cost())}</strong>
                                                </div>
                                            </div>
                                        }
                                    }).collect_view()}
                                </div>
                            }.into_any()
                        })}
                    </div>
                    <div class="production-section">
                        <h4>"Produtos Produzidos"</h4>
                        {products.with_value(|products| {
                            if products.is_empty() {
                                return view! {
                                    <p class="no-items">"Nenhum produto registrado para esta produção"</p>
                                }.into_any();
                            }
                            view! {
                                <div class="products-list">
                                    {products.iter().map(|product| view! {
                                        <div class="product-item">
                                            <div class="product-item-info">
                                                <strong>{product.name.clone()}</strong>
                                                {product.description.clone().filter(|d| !d.is_empty()).map(|d| view! {
                                                    <span class="product-description">{d}</span>
                                                })}
                                            </div>
                                            <div class="product-item-details">
                                                <span class="product-quantity">{format!("{} unidades", product.stock)}</span>
                                                <span class="product-cost-price">
                                                    {format!("Custo: {} / un", format_currency(product.cost_price))}
                                                </span>
                                                <span class="product-sale-price">
                                                    {format!("Venda: {} / un", format_currency(product.price))}
                                                </span>
                                            </div>
                                        </div>
                                    }).collect_view()}
                                </div>
                            }.into_any()
                        })}
                    </div>
                </div>
            </Show>
        </div>
    }
}
