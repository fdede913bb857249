//! Material Purchases Page
//!
//! Restocking of materials already in the catalog.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::access::Capability;
use crate::api::{self, Query};
use crate::calc::{format_currency, format_opt_date, format_quantity, purchases_total};
use crate::components::{Loading, Modal};
use crate::context::use_app;
use crate::forms::PurchaseDraft;
use crate::models::{ref_name, MaterialPurchase};
use crate::store::{load_materials, material_by_id, use_catalog, CatalogStateStoreFields, OPTION_LIMIT};

use super::fields::{field, text_area};

#[component]
pub fn MaterialPurchasesPage() -> impl IntoView {
    let ctx = use_app();
    let catalog = use_catalog();
    let can_record = move || ctx.can(Capability::RecordStockMovements);
    let (purchases, set_purchases) = signal(Vec::<MaterialPurchase>::new());
    let (loaded, set_loaded) = signal(false);
    let modal_open = RwSignal::new(false);
    let draft = RwSignal::new(PurchaseDraft::default());

    let fetch = move || {
        spawn_local(async move {
            match api::list_purchases(&ctx.api(), Query::new().limit(OPTION_LIMIT)).await {
                Ok(page) => set_purchases.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar compras"),
            }
            set_loaded.set(true);
        });
    };

    fetch();
    if ctx.can(Capability::RecordStockMovements) {
        load_materials(ctx, catalog);
    }

    // "Comprar" on the materials page opens the form once the list is in
    Effect::new(move |_| {
        catalog.materials().track();
        let Some(id) = catalog.restock().get_untracked() else {
            return;
        };
        if !can_record() {
            catalog.restock().set(None);
            return;
        }
        if let Some(material) = material_by_id(&catalog, &id) {
            catalog.restock().set(None);
            draft.set(PurchaseDraft::for_material(&material));
            modal_open.set(true);
        }
    });

    let dismiss = move || {
        modal_open.set(false);
        draft.set(PurchaseDraft::default());
    };
    let close = Callback::new(move |_| dismiss());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match draft.with(PurchaseDraft::build) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        spawn_local(async move {
            match api::create_purchase(&ctx.api(), &args).await {
                Ok(()) => {
                    ctx.toasts.success("Compra registrada com sucesso!");
                    dismiss();
                    fetch();
                    load_materials(ctx, catalog);
                }
                Err(err) => ctx.report(&err, "Erro ao registrar compra"),
            }
        });
    };

    let selected_unit = move || {
        draft.with(|d| material_by_id(&catalog, &d.material_id).map(|m| m.unit.label()))
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando compras..." /> }>
            <div class="material-purchases-page">
                <div class="page-header">
                    <h1>"Reposição de Estoque"</h1>
                    <p class="page-subtitle">
                        "Use esta página apenas quando comprar MAIS de um material que já está cadastrado."
                        <br />
                        <strong>"Para cadastrar material novo:"</strong>
                        " Use a página \"Materiais\" - a quantidade inicial já registra a primeira compra automaticamente."
                    </p>
                    <Show when=can_record>
                        <button
                            class="btn-primary"
                            on:click=move |_| {
                                draft.set(PurchaseDraft::default());
                                modal_open.set(true);
                            }
                        >
                            "+ Registrar Compra"
                        </button>
                    </Show>
                </div>

                <Show when=move || !purchases.with(Vec::is_empty)>
                    <div class="purchases-summary">
                        <div class="summary-card">
                            <h3>"Total Investido"</h3>
                            <p class="summary-value">{move || purchases.with(|p| format_currency(purchases_total(p)))}</p>
                            <small class="summary-hint">
                                "Valor total investido em compras (não altera com saídas)"
                            </small>
                        </div>
                        <div class="summary-card">
                            <h3>"Total de Compras"</h3>
                            <p class="summary-value">{move || purchases.with(Vec::len)}</p>
                        </div>
                    </div>
                </Show>

                <table class="data-table">
                    <thead>
                        <tr>
                            <th>"Data"</th>
                            <th>"Material"</th>
                            <th>"Quantidade"</th>
                            <th>"Preço Unitário"</th>
                            <th>"Total"</th>
                            <th>"Fornecedor"</th>
                            <th>"Comprado Por"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || purchases.with(Vec::is_empty)>
                            <tr><td colspan="7" class="empty-state">"Nenhuma compra registrada"</td></tr>
                        </Show>
                        <For
                            each=move || purchases.get()
                            key=|purchase| purchase.id.clone()
                            children=move |purchase| {
                                let material = purchase.material.as_ref().and_then(|m| m.populated()).cloned();
                                let unit = material.as_ref().map(|m| m.unit.label()).unwrap_or("");
                                view! {
                                    <tr>
                                        <td>{format_opt_date(purchase.purchase_date.as_deref())}</td>
                                        <td>
                                            <strong>{ref_name(&purchase.material).unwrap_or("N/A").to_string()}</strong>
                                            {material.as_ref().map(|m| view! {
                                                <div class="text-muted">{m.category.label()}</div>
                                            })}
                                        </td>
                                        <td>{format!("{} {unit}", format_quantity(purchase.quantity))}</td>
                                        <td>{format_currency(purchase.unit_price)}</td>
                                        <td><strong>{format_currency(purchase.total_cost)}</strong></td>
                                        <td>{purchase.supplier.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "-".to_string())}</td>
                                        <td>{ref_name(&purchase.purchased_by).unwrap_or("N/A").to_string()}</td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <Modal open=modal_open title="Registrar Entrada de Material".to_string() on_close=close>
                    <form class="purchase-form" on:submit=on_submit>
                        <div class="form-group">
                            <label>"Material *"</label>
                            <select
                                prop:value=move || draft.with(|d| d.material_id.clone())
                                on:change=move |ev| {
                                    let id = event_target_value(&ev);
                                    draft.update(|d| match material_by_id(&catalog, &id) {
                                        Some(material) => {
                                            *d = PurchaseDraft {
                                                quantity: d.quantity.clone(),
                                                notes: d.notes.clone(),
                                                ..PurchaseDraft::for_material(&material)
                                            }
                                        }
                                        None => d.material_id = id,
                                    });
                                }
                            >
                                <option value="">"Selecione um material"</option>
                                {move || catalog.materials().get().into_iter().map(|material| view! {
                                    <option value=material.id.clone()>
                                        {format!(
                                            "{} - Estoque atual: {} {}",
                                            material.name,
                                            format_quantity(material.quantity_in_stock),
                                            material.unit.label()
                                        )}
                                    </option>
                                }).collect_view()}
                            </select>
                        </div>
                        <div class="form-row">
                            {field("Quantidade *", "number", draft, |d| &d.quantity, |d| &mut d.quantity)}
                            {field("Preço Unitário *", "number", draft, |d| &d.unit_price, |d| &mut d.unit_price)}
                        </div>
                        {move || selected_unit().map(|unit| view! { <small class="form-help">{format!("Unidade: {unit}")}</small> })}
                        {field("Fornecedor", "text", draft, |d| &d.supplier, |d| &mut d.supplier)}
                        {text_area("Observações", draft, |d| &d.notes, |d| &mut d.notes)}
                        <div class="purchase-total">
                            "Total: " {move || format_currency(draft.with(PurchaseDraft::total))}
                        </div>
                        <div class="form-actions">
                            <button type="button" on:click=move |_| close.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">"Registrar Compra"</button>
                        </div>
                    </form>
                </Modal>
            </div>
        </Show>
    }
}
