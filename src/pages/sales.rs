//! Sales Page
//!
//! Sales list with payment and period filters, the new-sale modal (line
//! items with optional materials, quick client, direct sale) and the
//! pending-payment workflow.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::info;

use crate::access::Capability;
use crate::api::{self, Query};
use crate::calc::{format_currency, format_opt_date, material_usage_cost, parse_decimal};
use crate::components::{DateFilterBar, DeleteConfirmButton, Loading, Modal};
use crate::context::use_app;
use crate::dates::{date_range, local_now, DateFilter};
use crate::forms::{submit_sale, MaterialUseDraft, QuickClientDraft, SaleDraft, SaleItemDraft};
use crate::models::{ref_name, PaymentMethod, PaymentStatus, Sale};
use crate::store::{
    load_clients, load_materials, load_products, store_add_client, use_catalog,
    CatalogStateStoreFields, OPTION_LIMIT,
};

use super::fields::field;

fn payment_filter_value(filter: Option<PaymentStatus>) -> &'static str {
    filter.map_or("all", |status| status.as_str())
}

#[component]
pub fn SalesPage() -> impl IntoView {
    let ctx = use_app();
    let catalog = use_catalog();
    let can_record = move || ctx.can(Capability::RecordSales);

    let payment_filter = RwSignal::new(None::<PaymentStatus>);
    let date_filter = RwSignal::new(DateFilter::All);
    let custom_start = RwSignal::new(String::new());
    let custom_end = RwSignal::new(String::new());
    let (sales, set_sales) = signal(Vec::<Sale>::new());
    let (loaded, set_loaded) = signal(false);

    let sale_open = RwSignal::new(false);
    let draft = RwSignal::new(SaleDraft::default());
    let quick_client_open = RwSignal::new(false);
    let quick_client = RwSignal::new(QuickClientDraft::default());
    let detail = RwSignal::new(None::<Sale>);
    let submitting = RwSignal::new(false);

    if ctx.can(Capability::RecordSales) {
        load_clients(ctx, catalog);
        load_products(ctx, catalog);
        load_materials(ctx, catalog);
    }

    let fetch = move || {
        let (Some(filter), Some(start), Some(end)) = (
            date_filter.try_get_untracked(),
            custom_start.try_get_untracked(),
            custom_end.try_get_untracked(),
        ) else {
            return;
        };
        let range = date_range(filter, &start, &end, local_now());
        spawn_local(async move {
            let mut query = Query::new().limit(OPTION_LIMIT);
            if let Some(range) = range {
                query = query.params(range.date_params());
            }
            match api::list_sales(&ctx.api(), query).await {
                Ok(page) => set_sales.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar vendas"),
            }
            set_loaded.set(true);
        });
    };

    Effect::new(move |_| {
        date_filter.track();
        custom_start.track();
        custom_end.track();
        fetch();
    });

    // payment status is filtered locally
    let visible = move || {
        let status = payment_filter.get();
        sales.with(|sales| {
            sales
                .iter()
                .filter(|sale| status.is_none_or(|status| sale.payment_status == status))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let dismiss_sale = move || {
        sale_open.set(false);
        draft.set(SaleDraft::default());
    };
    let close_sale = Callback::new(move |_| dismiss_sale());

    let open_sale = move |quick_sale: bool| {
        draft.set(SaleDraft {
            quick_sale,
            ..Default::default()
        });
        sale_open.set(true);
    };

    let on_submit_sale = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let sale = draft.get_untracked();
        submitting.set(true);
        spawn_local(async move {
            match submit_sale(&ctx.api(), &sale).await {
                Ok(receipt) => {
                    if let Some(client) = receipt.created_client {
                        store_add_client(&catalog, client);
                    }
                    ctx.toasts.success("Venda registrada com sucesso!");
                    dismiss_sale();
                    fetch();
                    // stock moved on the server
                    load_products(ctx, catalog);
                    load_materials(ctx, catalog);
                }
                Err(err) => ctx.report_submit(&err),
            }
            submitting.set(false);
        });
    };

    let dismiss_quick_client = move || {
        quick_client_open.set(false);
        quick_client.set(QuickClientDraft::default());
    };
    let close_quick_client = Callback::new(move |_| dismiss_quick_client());

    let on_submit_quick_client = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match quick_client.with(QuickClientDraft::build) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        spawn_local(async move {
            match api::create_client(&ctx.api(), &args).await {
                Ok(client) => {
                    info!(client = %client.id, "quick client created");
                    draft.update(|d| d.client_id = client.id.clone());
                    store_add_client(&catalog, client);
                    ctx.toasts.success("Cliente criado com sucesso!");
                    dismiss_quick_client();
                }
                Err(err) => ctx.report(&err, "Erro ao criar cliente"),
            }
        });
    };

    let mark_paid = move |id: String| {
        spawn_local(async move {
            match api::update_payment_status(&ctx.api(), &id, PaymentStatus::Pago).await {
                Ok(()) => {
                    ctx.toasts.success("Venda marcada como paga!");
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao atualizar status de pagamento"),
            }
        });
    };

    let show_detail = move |id: String| {
        spawn_local(async move {
            match api::get_sale(&ctx.api(), &id).await {
                Ok(sale) => detail.set(Some(sale)),
                Err(err) => ctx.report(&err, "Erro ao buscar venda"),
            }
        });
    };

    let line_count = Memo::new(move |_| draft.with(|d| d.items.len()));
    let sale_total = move || {
        let total = catalog
            .products()
            .with(|products| draft.with(|d| d.total(products)));
        format_currency(total)
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando vendas..." /> }>
            <div class="sales-page">
                <div class="page-header">
                    <h1>"Vendas"</h1>
                    <div class="header-actions">
                        <Show when=can_record>
                            <button
                                class="btn-quick-sale"
                                title="Venda rápida sem cadastro"
                                on:click=move |_| open_sale(true)
                            >
                                "⚡ Venda Direta"
                            </button>
                        </Show>
                        <select
                            class="filter-select"
                            prop:value=move || payment_filter_value(payment_filter.get())
                            on:change=move |ev| {
                                let value = event_target_value(&ev);
                                payment_filter.set(match value.as_str() {
                                    "all" => None,
                                    other => Some(PaymentStatus::parse(other)),
                                });
                            }
                        >
                            <option value="all">"Todas as Vendas"</option>
                            <option value=PaymentStatus::Pago.as_str()>"Pagas"</option>
                            <option value=PaymentStatus::Pendente.as_str()>"Pendentes"</option>
                        </select>
                        <DateFilterBar filter=date_filter custom_start=custom_start custom_end=custom_end />
                        <Show when=can_record>
                            <button class="btn-primary" on:click=move |_| open_sale(false)>
                                "+ Nova Venda"
                            </button>
                        </Show>
                    </div>
                </div>

                <table class="sales-data-table">
                    <thead>
                        <tr>
                            <th>"Data"</th>
                            <th>"Cliente"</th>
                            <th>"Itens"</th>
                            <th>"Valor Total"</th>
                            <th>"Lucro Líquido"</th>
                            <th>"Pagamento"</th>
                            <th>"Status"</th>
                            <th>"Ações"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=visible
                            key=|sale| (sale.id.clone(), sale.payment_status)
                            children=move |sale| {
                                let pending = sale.is_pending();
                                let id = sale.id.clone();
                                let detail_id = sale.id.clone();
                                let status = sale.status.clone().unwrap_or_default();
                                view! {
                                    <tr>
                                        <td>{format_opt_date(sale.sale_date.as_deref())}</td>
                                        <td>{ref_name(&sale.client).unwrap_or("N/A").to_string()}</td>
                                        <td>{format!("{} itens", sale.items.len())}</td>
                                        <td>{format_currency(sale.total_amount)}</td>
                                        <td>{format_currency(sale.net_profit)}</td>
                                        <td>
                                            <span class=format!("payment-badge payment-{}", sale.payment_status.as_str())>
                                                {sale.payment_status.label()}
                                            </span>
                                        </td>
                                        <td>
                                            <span class=format!("status-badge status-{status}")>{status.clone()}</span>
                                        </td>
                                        <td>
                                            <button
                                                class="btn-sale-detail"
                                                on:click=move |_| show_detail(detail_id.clone())
                                            >
                                                "Detalhes"
                                            </button>
                                            {(pending && ctx.can(Capability::RecordSales)).then(|| view! {
                                                <DeleteConfirmButton
                                                    button_class="btn-mark-paid"
                                                    label="Marcar como Pago"
                                                    question="Marcar como paga? O estoque será atualizado."
                                                    on_confirm=move |_| mark_paid(id.clone())
                                                />
                                            })}
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
                <Show when=move || sales.with(Vec::is_empty)>
                    <div class="sales-empty-state">"Nenhuma venda encontrada"</div>
                </Show>

                <Modal open=sale_open title="Nova Venda".to_string() on_close=close_sale>
                    <form class="sale-form" on:submit=on_submit_sale>
                        <div class="form-group">
                            <Show
                                when=move || draft.with(|d| d.quick_sale)
                                fallback=move || view! {
                                    <div class="client-select-wrapper">
                                        <select
                                            prop:value=move || draft.with(|d| d.client_id.clone())
                                            on:change=move |ev| draft.update(|d| d.client_id = event_target_value(&ev))
                                        >
                                            <option value="">"Cliente *"</option>
                                            {move || catalog.clients().get().into_iter().map(|client| {
                                                let label = match client.phone.as_deref().filter(|p| !p.is_empty()) {
                                                    Some(phone) => format!("{} ({phone})", client.name),
                                                    None => client.name.clone(),
                                                };
                                                view! { <option value=client.id.clone()>{label}</option> }
                                            }).collect_view()}
                                        </select>
                                        <button
                                            type="button"
                                            class="btn-quick-client"
                                            title="Criar cliente rápido"
                                            on:click=move |_| quick_client_open.set(true)
                                        >
                                            "+ Novo Cliente"
                                        </button>
                                    </div>
                                }
                            >
                                <div class="quick-sale-indicator">
                                    <span class="quick-sale-badge">"⚡ Venda Direta"</span>
                                    <p class="quick-sale-hint">
                                        "Cliente temporário será criado automaticamente ao finalizar a venda"
                                    </p>
                                </div>
                            </Show>
                        </div>

                        <div class="sale-items">
                            <div class="sale-items-header">
                                <button
                                    type="button"
                                    class="btn-add-item"
                                    on:click=move |_| draft.update(|d| d.items.push(SaleItemDraft::default()))
                                >
                                    "+ Adicionar Produto"
                                </button>
                            </div>
                            {move || (0..line_count.get())
                                .map(|index| view! { <SaleLine index=index draft=draft /> })
                                .collect_view()}
                        </div>

                        <div class="form-group">
                            <select
                                prop:value=move || draft.with(|d| d.payment_method.as_str())
                                on:change=move |ev| {
                                    draft.update(|d| d.payment_method = PaymentMethod::parse(&event_target_value(&ev)))
                                }
                            >
                                {PaymentMethod::ALL.iter().map(|method| view! {
                                    <option value=method.as_str()>{method.label()}</option>
                                }).collect_view()}
                            </select>
                            <small class="form-help">
                                "Selecione \"Pagamento Pendente\" para vendas a prazo"
                            </small>
                        </div>

                        <div class="sale-total">"Total: " {sale_total}</div>

                        <div class="form-actions">
                            <button type="button" on:click=move |_| close_sale.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary" disabled=move || submitting.get()>
                                "Registrar Venda"
                            </button>
                        </div>
                    </form>
                </Modal>

                <Modal
                    open=quick_client_open
                    title="Criar Cliente Rápido".to_string()
                    on_close=close_quick_client
                >
                    <form class="quick-client-form" on:submit=on_submit_quick_client>
                        {field("Nome do Cliente *", "text", quick_client, |d| &d.name, |d| &mut d.name)}
                        {field("Telefone (opcional)", "tel", quick_client, |d| &d.phone, |d| &mut d.phone)}
                        {field("Email (opcional)", "email", quick_client, |d| &d.email, |d| &mut d.email)}
                        <div class="form-actions">
                            <button type="button" on:click=move |_| close_quick_client.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">"Criar e Usar"</button>
                        </div>
                    </form>
                </Modal>

                <Modal
                    open=Signal::derive(move || detail.with(Option::is_some))
                    title="Detalhes da Venda".to_string()
                    on_close=move |_| detail.set(None)
                >
                    {move || detail.get().map(|sale| view! { <SaleDetail sale=sale /> })}
                </Modal>
            </div>
        </Show>
    }
}

/// One line of the new-sale form, addressed by position
#[component]
fn SaleLine(index: usize, draft: RwSignal<SaleDraft>) -> impl IntoView {
    let catalog = use_catalog();
    let line = move || draft.with(|d| d.items.get(index).cloned().unwrap_or_default());
    let material_count = Memo::new(move |_| {
        draft.with(|d| d.items.get(index).map_or(0, |item| item.materials.len()))
    });
    let update = move |f: &dyn Fn(&mut SaleItemDraft)| {
        draft.update(|d| {
            if let Some(item) = d.items.get_mut(index) {
                f(item);
            }
        })
    };
    let subtotal = move || {
        catalog
            .products()
            .with(|products| line().subtotal(products))
            .map(format_currency)
    };

    view! {
        <div class="sale-item">
            <select
                prop:value=move || line().product_id
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    update(&|item: &mut SaleItemDraft| item.product_id = value.clone());
                }
            >
                <option value="">"Selecione um produto"</option>
                {move || catalog.products().get().into_iter().map(|product| view! {
                    <option value=product.id.clone()>
                        {format!(
                            "{} - {} (Estoque: {})",
                            product.name,
                            format_currency(product.price),
                            product.stock
                        )}
                    </option>
                }).collect_view()}
            </select>
            <input
                type="number"
                min="1"
                placeholder="Qtd"
                prop:value=move || line().quantity
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    update(&|item: &mut SaleItemDraft| item.quantity = value.clone());
                }
            />
            {move || subtotal().map(|value| view! { <span class="item-subtotal">{value}</span> })}
            <Show when=move || draft.with(|d| d.items.len() > 1)>
                <button
                    type="button"
                    class="btn-remove-item"
                    on:click=move |_| draft.update(|d| {
                        if index < d.items.len() {
                            d.items.remove(index);
                        }
                    })
                >
                    "×"
                </button>
            </Show>

            <Show when=move || !line().product_id.is_empty()>
                <div class="item-materials">
                    <div class="materials-header">
                        <button
                            type="button"
                            class="btn-add-material"
                            on:click=move |_| update(&|item: &mut SaleItemDraft| item.materials.push(MaterialUseDraft {
                                material_id: String::new(),
                                quantity: "1".to_string(),
                            }))
                        >
                            "+ Adicionar Material (Opcional)"
                        </button>
                    </div>
                    {move || (0..material_count.get())
                        .map(|material_index| view! { <MaterialLine index=index material_index=material_index draft=draft /> })
                        .collect_view()}
                </div>
            </Show>
        </div>
    }
}

/// Material consumed by one sale line
#[component]
fn MaterialLine(index: usize, material_index: usize, draft: RwSignal<SaleDraft>) -> impl IntoView {
    let catalog = use_catalog();
    let used = move || {
        draft.with(|d| {
            d.items
                .get(index)
                .and_then(|item| item.materials.get(material_index))
                .cloned()
                .unwrap_or_default()
        })
    };
    let update = move |f: &dyn Fn(&mut MaterialUseDraft)| {
        draft.update(|d| {
            if let Some(used) = d.items.get_mut(index).and_then(|item| item.materials.get_mut(material_index)) {
                f(used);
            }
        })
    };
    let cost = move || {
        let used = used();
        let line_quantity = draft.with(|d| d.items.get(index).map_or(0, SaleItemDraft::quantity));
        catalog.materials().with(|materials| {
            materials.iter().find(|m| m.id == used.material_id).map(|material| {
                format_currency(material_usage_cost(
                    material.cost_per_unit,
                    parse_decimal(&used.quantity),
                    line_quantity.max(1),
                ))
            })
        })
    };

    view! {
        <div class="material-item-row">
            <select
                prop:value=move || used().material_id
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    update(&|used: &mut MaterialUseDraft| used.material_id = value.clone());
                }
            >
                <option value="">"Selecione um material"</option>
                {move || catalog.materials().get().into_iter().map(|material| view! {
                    <option value=material.id.clone()>
                        {format!(
                            "{} ({}) - Estoque: {} {}",
                            material.name,
                            material.category.label(),
                            material.quantity_in_stock,
                            material.unit.label()
                        )}
                    </option>
                }).collect_view()}
            </select>
            <input
                type="number"
                step="0.01"
                min="0.01"
                placeholder="Qtd por item"
                class="material-quantity-input"
                prop:value=move || used().quantity
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    update(&|used: &mut MaterialUseDraft| used.quantity = value.clone());
                }
            />
            {move || cost().map(|value| view! { <span class="material-cost">{value}</span> })}
            <button
                type="button"
                class="btn-remove-material"
                on:click=move |_| draft.update(|d| {
                    if let Some(item) = d.items.get_mut(index) {
                        if material_index < item.materials.len() {
                            item.materials.remove(material_index);
                        }
                    }
                })
            >
                "×"
            </button>
        </div>
    }
}

#[component]
fn SaleDetail(sale: Sale) -> impl IntoView {
    view! {
        <div class="sale-detail">
            <p>
                <strong>"Cliente: "</strong>
                {ref_name(&sale.client).unwrap_or("N/A").to_string()}
            </p>
            <p><strong>"Data: "</strong>{format_opt_date(sale.sale_date.as_deref())}</p>
            <p>
                <strong>"Pagamento: "</strong>
                {sale.payment_method.map(|m| m.label()).unwrap_or("-")}
                " / "
                {sale.payment_status.label()}
            </p>
            <table class="sale-detail-items">
                <thead>
                    <tr>
                        <th>"Produto"</th>
                        <th>"Qtd"</th>
                    </tr>
                </thead>
                <tbody>
                    {sale.items.iter().map(|item| view! {
                        <tr>
                            <td>{ref_name(&item.product).unwrap_or("-").to_string()}</td>
                            <td>{item.quantity}</td>
                        </tr>
                    }).collect_view()}
                </tbody>
            </table>
            <p><strong>"Total: "</strong>{format_currency(sale.total_amount)}</p>
            <p><strong>"Lucro Líquido: "</strong>{format_currency(sale.net_profit)}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_filter_value() {
        assert_eq!(payment_filter_value(None), "all");
        assert_eq!(payment_filter_value(Some(PaymentStatus::Pendente)), "pendente");
    }
}
