//! Products Page
//!
//! Product catalog with the create/edit modal, the cost-per-unit
//! calculator and the production batch picker.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::debug;

use crate::access::Capability;
use crate::api::{self, Query};
use crate::calc::{format_currency, product_stock_is_low};
use crate::components::{DeleteConfirmButton, Loading, Modal};
use crate::context::use_app;
use crate::dates::today_production_label;
use crate::forms::{CostCalculator, ProductDraft};
use crate::models::Product;

use super::fields::{field, is_editing, search_box, text_area};

#[component]
pub fn ProductsPage() -> impl IntoView {
    let ctx = use_app();
    let search = RwSignal::new(String::new());
    let (products, set_products) = signal(Vec::<Product>::new());
    let (loaded, set_loaded) = signal(false);
    let (batches, set_batches) = signal(Vec::<String>::new());

    let modal_open = RwSignal::new(false);
    let editing = RwSignal::new(None::<String>);
    let draft = RwSignal::new(ProductDraft::default());
    let show_calculator = RwSignal::new(false);
    let calculator = RwSignal::new(CostCalculator::default());

    let can_edit = move || ctx.can(Capability::EditProducts);
    let can_delete = move || ctx.can(Capability::DeleteProducts);

    let fetch = move || {
        let Some(term) = search.try_get_untracked() else {
            return;
        };
        spawn_local(async move {
            match api::list_products(&ctx.api(), Query::new().param("search", term)).await {
                Ok(page) => set_products.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar produtos"),
            }
            set_loaded.set(true);
        });
    };

    let fetch_batches = move || {
        spawn_local(async move {
            match api::withdrawals_by_production(&ctx.api()).await {
                Ok(summaries) => {
                    set_batches.set(summaries.into_iter().map(|s| s.production_batch).collect())
                }
                Err(err) => debug!(error = %err, "production batches unavailable"),
            }
        });
    };

    Effect::new(move |_| {
        search.track();
        fetch();
        fetch_batches();
    });

    let reset = move || {
        draft.set(ProductDraft::default());
        editing.set(None);
        show_calculator.set(false);
        calculator.set(CostCalculator::default());
    };

    let open_new = move |_| {
        reset();
        modal_open.set(true);
    };

    let open_edit = move |product: Product| {
        reset();
        draft.set(ProductDraft::from_product(&product));
        editing.set(Some(product.id.clone()));
        modal_open.set(true);
        spawn_local(async move {
            match api::get_product(&ctx.api(), &product.id).await {
                Ok(fresh) if is_editing(editing, &fresh.id) => {
                    draft.set(ProductDraft::from_product(&fresh));
                }
                Ok(_) => {}
                Err(err) => debug!(error = %err, "using listed product for edit"),
            }
        });
    };

    let dismiss = move || {
        modal_open.set(false);
        reset();
    };
    let close = Callback::new(move |_| dismiss());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match draft.with(ProductDraft::build) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        let id = editing.get_untracked();
        spawn_local(async move {
            let api = ctx.api();
            let result = match &id {
                Some(id) => api::update_product(&api, id, &args).await,
                None => api::create_product(&api, &args).await,
            };
            match result {
                Ok(()) => {
                    ctx.toasts.success(if id.is_some() {
                        "Produto atualizado com sucesso!"
                    } else {
                        "Produto criado com sucesso!"
                    });
                    dismiss();
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao salvar produto"),
            }
        });
    };

    let delete = move |id: String| {
        spawn_local(async move {
            match api::delete_product(&ctx.api(), &id).await {
                Ok(()) => {
                    ctx.toasts.success("Produto excluído com sucesso!");
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao excluir produto"),
            }
        });
    };

    let backfill = move |cost: Option<String>| {
        if let Some(cost) = cost {
            draft.update(|d| d.cost_price = cost);
        }
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando produtos..." /> }>
            <div class="products-page">
                <div class="page-header">
                    <h1>"Produtos"</h1>
                    <Show when=can_edit>
                        <button class="btn-primary" on:click=open_new>"+ Novo Produto"</button>
                    </Show>
                </div>

                {search_box("Buscar produtos...", search)}

                <table class="products-data-table">
                    <thead>
                        <tr>
                            <th>"Nome"</th>
                            <th>"Preço"</th>
                            <th>"Preço de Custo"</th>
                            <th>"Estoque"</th>
                            <th>"Categoria"</th>
                            <Show when=can_edit><th>"Ações"</th></Show>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || products.with(Vec::is_empty)>
                            <tr><td colspan="6" class="empty-state">"Nenhum produto encontrado"</td></tr>
                        </Show>
                        <For
                            each=move || products.get()
                            key=|product| (product.id.clone(), product.name.clone(), product.stock)
                            children=move |product| {
                                let stock_class = if product_stock_is_low(product.stock) {
                                    "products-stock-low"
                                } else {
                                    "products-stock-ok"
                                };
                                let id = StoredValue::new(product.id.clone());
                                let edit_target = product.clone();
                                view! {
                                    <tr>
                                        <td>
                                            <strong>{product.name.clone()}</strong>
                                            {product.description.clone().map(|d| view! {
                                                <div class="products-text-muted">{d}</div>
                                            })}
                                        </td>
                                        <td>{format_currency(product.price)}</td>
                                        <td>{format_currency(product.cost_price)}</td>
                                        <td><span class=stock_class>{product.stock}</span></td>
                                        <td>{product.category.clone().unwrap_or_else(|| "-".to_string())}</td>
                                        <Show when=can_edit>
                                            <td>
                                                <button
                                                    class="products-btn-edit"
                                                    on:click={
                                                        let target = edit_target.clone();
                                                        move |_| open_edit(target.clone())
                                                    }
                                                >
                                                    "Editar"
                                                </button>
                                                <Show when=can_delete>
                                                    <DeleteConfirmButton
                                                        button_class="products-btn-delete"
                                                        on_confirm=move |_| delete(id.get_value())
                                                    />
                                                </Show>
                                            </td>
                                        </Show>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <Modal
                    open=modal_open
                    title=Signal::derive(move || {
                        if editing.with(Option::is_some) { "Editar Produto" } else { "Novo Produto" }.to_string()
                    })
                    on_close=close
                >
                    <form on:submit=on_submit>
                        {field("Nome *", "text", draft, |d| &d.name, |d| &mut d.name)}
                        {text_area("Descrição", draft, |d| &d.description, |d| &mut d.description)}
                        <div class="form-row">
                            {field("Preço de Venda *", "number", draft, |d| &d.price, |d| &mut d.price)}
                            <div class="form-group">
                                <label>
                                    "Preço de Custo *"
                                    <button
                                        type="button"
                                        class="cost-calculator-toggle"
                                        on:click=move |_| show_calculator.update(|s| *s = !*s)
                                    >
                                        {move || if show_calculator.get() { "Ocultar" } else { "Calcular" }}
                                    </button>
                                </label>
                                <input
                                    type="number"
                                    step="0.01"
                                    min="0"
                                    prop:value=move || draft.with(|d| d.cost_price.clone())
                                    on:input=move |ev| draft.update(|d| d.cost_price = event_target_value(&ev))
                                />
                                <Show when=move || show_calculator.get()>
                                    <div class="cost-calculator">
                                        <div class="calculator-inputs">
                                            <input
                                                type="text"
                                                inputmode="decimal"
                                                placeholder="Custo Total (ex: 46,95 ou 46.95)"
                                                prop:value=move || calculator.with(|c| c.total_cost.clone())
                                                on:input=move |ev| {
                                                    let value = event_target_value(&ev);
                                                    backfill(calculator.try_update(|c| c.set_total_cost(&value)).flatten());
                                                }
                                            />
                                            <span>"÷"</span>
                                            <input
                                                type="number"
                                                min="1"
                                                placeholder="Quantidade (ex: 40)"
                                                prop:value=move || calculator.with(|c| c.quantity.clone())
                                                on:input=move |ev| {
                                                    let value = event_target_value(&ev);
                                                    backfill(calculator.try_update(|c| c.set_quantity(&value)).flatten());
                                                }
                                            />
                                            <span>"="</span>
                                            <span class="calculator-result">
                                                {move || {
                                                    let cost = draft.with(|d| d.cost_price.clone());
                                                    format!("R$ {}", if cost.is_empty() { "0.00".to_string() } else { cost })
                                                }}
                                            </span>
                                        </div>
                                        <small class="cost-calculator-hint">
                                            "Insira o custo total dos materiais e a quantidade produzida"
                                        </small>
                                    </div>
                                </Show>
                            </div>
                        </div>
                        <div class="form-row">
                            {field("Estoque *", "number", draft, |d| &d.stock, |d| &mut d.stock)}
                            {field("Categoria", "text", draft, |d| &d.category, |d| &mut d.category)}
                            <div class="form-group">
                                <label>
                                    "Lote de Produção"
                                    <button
                                        type="button"
                                        class="btn-production-today-small"
                                        title="Usar produção de hoje"
                                        on:click=move |_| draft.update(|d| d.production_batch = today_production_label())
                                    >
                                        "Hoje"
                                    </button>
                                </label>
                                <Show when=move || !batches.with(Vec::is_empty)>
                                    <select
                                        class="production-batch-select"
                                        prop:value=move || draft.with(|d| d.production_batch.clone())
                                        on:change=move |ev| draft.update(|d| d.production_batch = event_target_value(&ev))
                                    >
                                        <option value="">"Criar nova produção ou deixar vazio"</option>
                                        {move || batches.get().into_iter().map(|batch| {
                                            view! { <option value=batch.clone()>{batch.clone()}</option> }
                                        }).collect_view()}
                                    </select>
                                </Show>
                                <input
                                    type="text"
                                    placeholder="Ou digite o nome da produção"
                                    prop:value=move || draft.with(|d| d.production_batch.clone())
                                    on:input=move |ev| draft.update(|d| d.production_batch = event_target_value(&ev))
                                />
                            </div>
                        </div>
                        <div class="modal-actions">
                            <button type="button" class="btn-secondary" on:click=move |_| close.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">"Salvar"</button>
                        </div>
                    </form>
                </Modal>
            </div>
        </Show>
    }
}
