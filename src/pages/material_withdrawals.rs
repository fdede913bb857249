//! Material Withdrawals Page
//!
//! Stock exits not tied to a sale, grouped by production batch.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::access::Capability;
use crate::api::{self, Query};
use crate::calc::{format_currency, format_opt_date, format_quantity, withdrawals_total};
use crate::components::{Loading, Modal};
use crate::context::use_app;
use crate::dates::today_production_label;
use crate::forms::WithdrawalDraft;
use crate::models::{ref_name, Material, MaterialWithdrawal, ProductionSummary, Ref, WithdrawalReason};
use crate::store::{load_materials, use_catalog, CatalogStateStoreFields, OPTION_LIMIT};

use super::fields::{field, text_area};

fn populated_material(withdrawal: &MaterialWithdrawal) -> Option<&Material> {
    withdrawal.material.as_ref().and_then(Ref::populated)
}

fn unit_label(withdrawal: &MaterialWithdrawal) -> &'static str {
    populated_material(withdrawal).map_or("", |m| m.unit.label())
}

#[component]
pub fn MaterialWithdrawalsPage() -> impl IntoView {
    let ctx = use_app();
    let catalog = use_catalog();
    let can_record = move || ctx.can(Capability::RecordStockMovements);

    let (withdrawals, set_withdrawals) = signal(Vec::<MaterialWithdrawal>::new());
    let (productions, set_productions) = signal(Vec::<ProductionSummary>::new());
    let (loaded, set_loaded) = signal(false);
    let selected_batch = RwSignal::new(String::new());
    let expanded_batch = RwSignal::new(None::<String>);
    // batch the form starts with: today's, once it exists
    let active_batch = RwSignal::new(String::new());

    let modal_open = RwSignal::new(false);
    let draft = RwSignal::new(WithdrawalDraft::default());
    let detail = RwSignal::new(None::<MaterialWithdrawal>);

    let fetch_withdrawals = move || {
        spawn_local(async move {
            match api::list_withdrawals(&ctx.api(), Query::new().limit(OPTION_LIMIT)).await {
                Ok(page) => set_withdrawals.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar saídas"),
            }
            set_loaded.set(true);
        });
    };

    let fetch_productions = move || {
        spawn_local(async move {
            match api::withdrawals_by_production(&ctx.api()).await {
                Ok(summaries) => {
                    let today = today_production_label();
                    if summaries.iter().any(|s| s.production_batch == today) {
                        active_batch.set(today.clone());
                        draft.update(|d| d.production_batch = today);
                    }
                    set_productions.set(summaries);
                }
                Err(err) => ctx.report_quietly(&err, "production summary"),
            }
        });
    };

    fetch_withdrawals();
    fetch_productions();
    if ctx.can(Capability::RecordStockMovements) {
        load_materials(ctx, catalog);
    }

    let filtered = move || {
        let batch = selected_batch.get();
        withdrawals.with(|all| {
            all.iter()
                .filter(|w| batch.is_empty() || w.production_batch.as_deref() == Some(batch.as_str()))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let total_cost = move || {
        let batch = selected_batch.get();
        withdrawals.with(|all| withdrawals_total(all, (!batch.is_empty()).then_some(batch.as_str())))
    };

    let fresh_draft = move || WithdrawalDraft {
        production_batch: active_batch.try_get_untracked().unwrap_or_default(),
        ..Default::default()
    };

    let dismiss = move || {
        modal_open.set(false);
        draft.set(fresh_draft());
    };
    let close = Callback::new(move |_| dismiss());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match draft.with(WithdrawalDraft::build) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        spawn_local(async move {
            match api::create_withdrawal(&ctx.api(), &args).await {
                Ok(()) => {
                    ctx.toasts.success("Saída registrada com sucesso!");
                    dismiss();
                    fetch_withdrawals();
                    fetch_productions();
                    load_materials(ctx, catalog);
                }
                Err(err) => ctx.report(&err, "Erro ao registrar saída"),
            }
        });
    };

    let show_detail = move |id: String| {
        spawn_local(async move {
            match api::get_withdrawal(&ctx.api(), &id).await {
                Ok(withdrawal) => detail.set(Some(withdrawal)),
                Err(err) => ctx.report(&err, "Erro ao buscar saída"),
            }
        });
    };

    let set_batch = move |batch: String| {
        active_batch.set(batch.clone());
        draft.update(|d| d.production_batch = batch);
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando saídas..." /> }>
            <div class="material-withdrawals-page">
                <div class="page-header">
                    <h1>"Saídas de Materiais"</h1>
                    <p class="page-subtitle">
                        "Registre saídas de materiais que não estão relacionadas a vendas (perdas, descartes, testes, etc.)"
                    </p>
                    <Show when=can_record>
                        <button
                            class="btn-primary"
                            on:click=move |_| {
                                draft.set(fresh_draft());
                                modal_open.set(true);
                            }
                        >
                            "+ Registrar Saída"
                        </button>
                    </Show>
                </div>

                <Show when=move || !productions.with(Vec::is_empty)>
                    <div class="productions-summary">
                        <h3>"Gastos por Produção"</h3>
                        <div class="productions-list">
                            <For
                                each=move || productions.get()
                                key=|p| (p.production_batch.clone(), p.total_cost.to_bits())
                                children=move |production| {
                                    let batch = production.production_batch.clone();
                                    let toggle_batch = batch.clone();
                                    let is_expanded = {
                                        let batch = batch.clone();
                                        move || expanded_batch.with(|b| b.as_deref() == Some(batch.as_str()))
                                    };
                                    view! {
                                        <div class="production-item">
                                            <div
                                                class="production-header"
                                                on:click=move |_| expanded_batch.update(|b| {
                                                    *b = if b.as_deref() == Some(toggle_batch.as_str()) {
                                                        None
                                                    } else {
                                                        Some(toggle_batch.clone())
                                                    };
                                                })
                                            >
                                                <div class="production-header-left">
                                                    <span class="production-batch">{batch.clone()}</span>
                                                    <span class="production-date">{format_opt_date(production.date.as_deref())}</span>
                                                </div>
                                                <div class="production-header-right">
                                                    <span class="production-items">{format!("{} itens", format_quantity(production.total_items))}</span>
                                                    <strong class="production-total">{format_currency(production.total_cost)}</strong>
                                                    <span class="production-toggle">
                                                        {let is_expanded = is_expanded.clone(); move || if is_expanded() { "▼" } else { "▶" }}
                                                    </span>
                                                </div>
                                            </div>
                                            <Show when=is_expanded.clone()>
                                                <div class="production-details-expanded">
                                                    <div class="production-materials-list">
                                                        <h4>"Materiais Utilizados:"</h4>
                                                        {
                                                            let batch = batch.clone();
                                                            move || withdrawals.with(|all| {
                                                                all.iter()
                                                                    .filter(|w| w.production_batch.as_deref() == Some(batch.as_str()))
                                                                    .map(|w| {
                                                                        let unit_cost = populated_material(w).map_or(0.0, |m| m.cost_per_unit);
                                                                        view! {
                                                                            <div class="production-material-item">
                                                                                <div class="material-item-info">
                                                                                    <strong>{ref_name(&w.material).unwrap_or("N/A").to_string()}</strong>
                                                                                    <span class="material-item-category">
                                                                                        {populated_material(w).map_or("", |m| m.category.label())}
                                                                                    </span>
                                                                                </div>
                                                                                <div class="material-item-quantity">
                                                                                    {format!("{} {}", format_quantity(w.quantity), unit_label(w))}
                                                                                </div>
                                                                                <div class="material-item-unit-cost">
                                                                                    {format!("{} / {}", format_currency(unit_cost), unit_label(w))}
                                                                                </div>
                                                                                <div class="material-item-total-cost">
                                                                                    <strong>{format_currency(w.cost())}</strong>
                                                                                </div>
                                                                            </div>
                                                                        }
                                                                    })
                                                                    .collect_view()
                                                            })
                                                        }
                                                    </div>
                                                    <div class="production-summary-footer">
                                                        <div class="production-summary-row">
                                                            <span>"Total de Itens:"</span>
                                                            <strong>{format_quantity(production.total_items)}</strong>
                                                        </div>
                                                        <div class="production-summary-row">
                                                            <span>"Custo Total:"</span>
                                                            <strong class="production-final-total">{format_currency(production.total_cost)}</strong>
                                                        </div>
                                                    </div>
                                                </div>
                                            </Show>
                                        </div>
                                    }
                                }
                            />
                        </div>
                    </div>

                    <div class="production-filter">
                        <select
                            class="filter-select"
                            prop:value=move || selected_batch.get()
                            on:change=move |ev| selected_batch.set(event_target_value(&ev))
                        >
                            <option value="">"Todas as Produções"</option>
                            {move || productions.get().into_iter().map(|p| view! {
                                <option value=p.production_batch.clone()>
                                    {format!("{} - {}", p.production_batch, format_currency(p.total_cost))}
                                </option>
                            }).collect_view()}
                        </select>
                    </div>
                </Show>

                <Show when=move || !withdrawals.with(Vec::is_empty)>
                    <div class="withdrawals-summary">
                        <div class="summary-card">
                            <h3>
                                {move || if selected_batch.with(String::is_empty) { "Total em Saídas" } else { "Total da Produção" }}
                            </h3>
                            <p class="summary-value">{move || format_currency(total_cost())}</p>
                        </div>
                        <div class="summary-card">
                            <h3>"Total de Saídas"</h3>
                            <p class="summary-value">{move || filtered().len()}</p>
                        </div>
                    </div>
                </Show>

                <table class="withdrawals-data-table">
                    <thead>
                        <tr>
                            <th>"Data"</th>
                            <th>"Produção"</th>
                            <th>"Material"</th>
                            <th>"Quantidade"</th>
                            <th>"Custo Unitário"</th>
                            <th>"Custo Total"</th>
                            <th>"Motivo"</th>
                            <th>"Registrado Por"</th>
                            <th>"Observações"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || filtered().is_empty()>
                            <tr>
                                <td colspan="9" class="empty-state">
                                    {move || if selected_batch.with(String::is_empty) {
                                        "Nenhuma saída registrada"
                                    } else {
                                        "Nenhuma saída encontrada para esta produção"
                                    }}
                                </td>
                            </tr>
                        </Show>
                        <For
                            each=filtered
                            key=|w| w.id.clone()
                            children=move |w| {
                                let id = w.id.clone();
                                let unit_cost = populated_material(&w).map_or(0.0, |m| m.cost_per_unit);
                                view! {
                                    <tr class="withdrawal-row" on:click=move |_| show_detail(id.clone())>
                                        <td>{format_opt_date(w.withdrawal_date.as_deref())}</td>
                                        <td>
                                            {match w.production_batch.clone() {
                                                Some(batch) => view! { <span class="production-badge">{batch}</span> }.into_any(),
                                                None => view! { <span class="text-muted">"-"</span> }.into_any(),
                                            }}
                                        </td>
                                        <td>
                                            <strong>{ref_name(&w.material).unwrap_or("N/A").to_string()}</strong>
                                            {populated_material(&w).map(|m| view! {
                                                <div class="text-muted">{m.category.label()}</div>
                                            })}
                                        </td>
                                        <td>{format!("{} {}", format_quantity(w.quantity), unit_label(&w))}</td>
                                        <td>{format_currency(unit_cost)}</td>
                                        <td><strong>{format_currency(w.cost())}</strong></td>
                                        <td>
                                            <span class=format!("reason-badge reason-{}", w.reason.as_str())>{w.reason.label()}</span>
                                        </td>
                                        <td>{ref_name(&w.withdrawn_by).unwrap_or("N/A").to_string()}</td>
                                        <td>{w.notes.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| "-".to_string())}</td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <Modal open=modal_open title="Registrar Saída de Material".to_string() on_close=close>
                    <form class="withdrawal-form" on:submit=on_submit>
                        <div class="form-group">
                            <select
                                prop:value=move || draft.with(|d| d.material_id.clone())
                                on:change=move |ev| draft.update(|d| d.material_id = event_target_value(&ev))
                            >
                                <option value="">"Material *"</option>
                                {move || catalog.materials().get().into_iter().map(|m| view! {
                                    <option value=m.id.clone()>
                                        {format!(
                                            "{} ({}) - Estoque: {} {}",
                                            m.name,
                                            m.category.label(),
                                            format_quantity(m.quantity_in_stock),
                                            m.unit.label()
                                        )}
                                    </option>
                                }).collect_view()}
                            </select>
                        </div>
                        <div class="form-row">
                            {field("Quantidade *", "number", draft, |d| &d.quantity, |d| &mut d.quantity)}
                            <div class="form-group">
                                <select
                                    prop:value=move || draft.with(|d| d.reason.map_or("", |r| r.as_str()))
                                    on:change=move |ev| {
                                        let value = event_target_value(&ev);
                                        draft.update(|d| {
                                            d.reason = (!value.is_empty()).then(|| WithdrawalReason::parse(&value))
                                        });
                                    }
                                >
                                    <option value="">"Motivo *"</option>
                                    {WithdrawalReason::ALL.iter().map(|r| view! {
                                        <option value=r.as_str()>{r.label()}</option>
                                    }).collect_view()}
                                </select>
                            </div>
                        </div>
                        <div class="form-group production-batch-group">
                            <label>"Produção"</label>
                            <div class="production-batch-controls">
                                <select
                                    prop:value=move || draft.with(|d| d.production_batch.clone())
                                    on:change=move |ev| set_batch(event_target_value(&ev))
                                >
                                    <option value="">"Sem produção"</option>
                                    {move || productions.get().into_iter().map(|p| view! {
                                        <option value=p.production_batch.clone()>{p.production_batch.clone()}</option>
                                    }).collect_view()}
                                </select>
                                <button
                                    type="button"
                                    class="btn-production-today"
                                    on:click=move |_| set_batch(today_production_label())
                                >
                                    "Produção de Hoje"
                                </button>
                            </div>
                            <input
                                type="text"
                                placeholder="Ou digite o nome da produção"
                                prop:value=move || draft.with(|d| d.production_batch.clone())
                                on:input=move |ev| draft.update(|d| d.production_batch = event_target_value(&ev))
                            />
                        </div>
                        {text_area("Observações", draft, |d| &d.notes, |d| &mut d.notes)}
                        <div class="form-actions">
                            <button type="button" on:click=move |_| close.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">"Registrar Saída"</button>
                        </div>
                    </form>
                </Modal>

                <Modal
                    open=Signal::derive(move || detail.with(Option::is_some))
                    title="Detalhes da Saída".to_string()
                    on_close=move |_| detail.set(None)
                >
                    {move || detail.get().map(|w| view! {
                        <div class="withdrawal-detail">
                            <p><strong>"Material: "</strong>{ref_name(&w.material).unwrap_or("N/A").to_string()}</p>
                            <p><strong>"Quantidade: "</strong>{format!("{} {}", format_quantity(w.quantity), unit_label(&w))}</p>
                            <p><strong>"Motivo: "</strong>{w.reason.label()}</p>
                            <p><strong>"Produção: "</strong>{w.production_batch.clone().unwrap_or_else(|| "-".to_string())}</p>
                            <p><strong>"Data: "</strong>{format_opt_date(w.withdrawal_date.as_deref())}</p>
                            <p><strong>"Registrado Por: "</strong>{ref_name(&w.withdrawn_by).unwrap_or("N/A").to_string()}</p>
                            <p><strong>"Custo: "</strong>{format_currency(w.cost())}</p>
                            {w.notes.clone().filter(|n| !n.is_empty()).map(|n| view! { <p class="text-muted">{n}</p> })}
                        </div>
                    })}
                </Modal>
            </div>
        </Show>
    }
}
