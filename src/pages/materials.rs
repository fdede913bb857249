//! Materials Page
//!
//! Raw-material catalog. A new material registered with stock is booked by
//! the backend as its first purchase.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::debug;

use crate::access::Capability;
use crate::api::{self, Query};
use crate::calc::{format_currency, format_quantity, material_stock_status, material_stock_value};
use crate::components::{DeleteConfirmButton, Loading, Modal};
use crate::context::use_app;
use crate::forms::MaterialDraft;
use crate::models::{Material, MaterialCategory, Unit};
use crate::router::Route;
use crate::store::{use_catalog, CatalogStateStoreFields, OPTION_LIMIT};

use super::fields::{field, is_editing, search_box, text_area};

#[component]
pub fn MaterialsPage() -> impl IntoView {
    let ctx = use_app();
    let catalog = use_catalog();
    let search = RwSignal::new(String::new());
    let category = RwSignal::new(None::<MaterialCategory>);
    let (materials, set_materials) = signal(Vec::<Material>::new());
    let (loaded, set_loaded) = signal(false);

    let modal_open = RwSignal::new(false);
    let editing = RwSignal::new(None::<String>);
    let draft = RwSignal::new(MaterialDraft::default());

    let can_edit = move || ctx.can(Capability::EditMaterials);
    let can_delete = move || ctx.can(Capability::DeleteMaterials);

    let fetch = move || {
        let (Some(term), Some(selected)) = (search.try_get_untracked(), category.try_get_untracked())
        else {
            return;
        };
        let query = Query::new()
            .param("search", term)
            .param_if("category", selected.map_or("", |c| c.as_str()))
            .limit(OPTION_LIMIT);
        spawn_local(async move {
            match api::list_materials(&ctx.api(), query).await {
                Ok(page) => set_materials.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar materiais"),
            }
            set_loaded.set(true);
        });
    };

    Effect::new(move |_| {
        search.track();
        category.track();
        fetch();
    });

    let dismiss = move || {
        modal_open.set(false);
        draft.set(MaterialDraft::default());
        editing.set(None);
    };
    let close = Callback::new(move |_| dismiss());

    let open_new = move |_| {
        draft.set(MaterialDraft::default());
        editing.set(None);
        modal_open.set(true);
    };

    let open_edit = move |material: Material| {
        editing.set(Some(material.id.clone()));
        draft.set(MaterialDraft::from_material(&material));
        modal_open.set(true);
        spawn_local(async move {
            match api::get_material(&ctx.api(), &material.id).await {
                Ok(fresh) if is_editing(editing, &fresh.id) => {
                    draft.set(MaterialDraft::from_material(&fresh));
                }
                Ok(_) => {}
                Err(err) => debug!(error = %err, "using listed material for edit"),
            }
        });
    };

    let restock = move |id: String| {
        catalog.restock().set(Some(id));
        ctx.navigate(Route::MaterialPurchases);
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let id = editing.get_untracked();
        let args = match draft.with(|d| d.build(id.is_none())) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        spawn_local(async move {
            let api = ctx.api();
            let result = match &id {
                Some(id) => api::update_material(&api, id, &args).await,
                None => api::create_material(&api, &args).await,
            };
            match result {
                Ok(()) => {
                    ctx.toasts.success(match (&id, args.initial_purchase) {
                        (Some(_), _) => "Material atualizado com sucesso!",
                        (None, true) => "Material criado e estoque inicial registrado!",
                        (None, false) => "Material criado com sucesso!",
                    });
                    dismiss();
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao salvar material"),
            }
        });
    };

    let delete = move |id: String| {
        spawn_local(async move {
            match api::delete_material(&ctx.api(), &id).await {
                Ok(()) => {
                    ctx.toasts.success("Material excluído com sucesso!");
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao excluir material"),
            }
        });
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando materiais..." /> }>
            <div class="materials-page">
                <div class="page-header">
                    <h1>"Materiais"</h1>
                    <p class="page-description">
                        "Cadastre seus materiais aqui. Ao informar a quantidade inicial, ela será automaticamente registrada como primeira compra."
                    </p>
                    <Show when=can_edit>
                        <div class="header-actions-group">
                            <button
                                class="btn-secondary"
                                title="Comprar mais de materiais já cadastrados"
                                on:click=move |_| ctx.navigate(Route::MaterialPurchases)
                            >
                                "Comprar Mais (Reposição)"
                            </button>
                            <button class="btn-primary" on:click=open_new>"+ Novo Material"</button>
                        </div>
                    </Show>
                </div>

                <div class="filters-bar">
                    {search_box("Buscar materiais...", search)}
                    <select
                        class="filter-select"
                        prop:value=move || category.get().map_or("", |c| c.as_str())
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            category.set((!value.is_empty()).then(|| MaterialCategory::parse(&value)));
                        }
                    >
                        <option value="">"Todas as Categorias"</option>
                        {MaterialCategory::ALL.iter().map(|c| view! {
                            <option value=c.as_str()>{c.label()}</option>
                        }).collect_view()}
                    </select>
                </div>

                <table class="data-table">
                    <thead>
                        <tr>
                            <th>"Nome"</th>
                            <th>"Categoria"</th>
                            <th>"Custo/Unidade"</th>
                            <th>"Estoque"</th>
                            <th>"Unidade"</th>
                            <th>"Valor Total"</th>
                            <th>"Fornecedor"</th>
                            <Show when=can_edit><th>"Ações"</th></Show>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || materials.with(Vec::is_empty)>
                            <tr><td colspan="8" class="empty-state">"Nenhum material encontrado"</td></tr>
                        </Show>
                        <For
                            each=move || materials.get()
                            key=|m| (m.id.clone(), m.name.clone(), m.quantity_in_stock.to_bits())
                            children=move |material| {
                                let status = material_stock_status(&material);
                                let id = StoredValue::new(material.id.clone());
                                let restock_id = material.id.clone();
                                let edit_target = material.clone();
                                view! {
                                    <tr>
                                        <td>
                                            <strong>{material.name.clone()}</strong>
                                            {material.description.clone().filter(|d| !d.is_empty()).map(|d| view! {
                                                <div class="text-muted">{d}</div>
                                            })}
                                        </td>
                                        <td>
                                            <span class=format!("category-badge category-{}", material.category.as_str())>
                                                {material.category.label()}
                                            </span>
                                        </td>
                                        <td>{format_currency(material.cost_per_unit)}</td>
                                        <td>
                                            <span class=format!("stock-status {}", status.css_class()) title=status.label()>
                                                {format!("{} {}", format_quantity(material.quantity_in_stock), material.unit.label())}
                                                {(material.minimum_stock > 0.0).then(|| view! {
                                                    <small>{format!(" (mín: {})", format_quantity(material.minimum_stock))}</small>
                                                })}
                                            </span>
                                        </td>
                                        <td>{material.unit.label()}</td>
                                        <td>{format_currency(material_stock_value(&material))}</td>
                                        <td>{material.supplier.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "-".to_string())}</td>
                                        <Show when=can_edit>
                                            <td>
                                                <div class="action-buttons">
                                                    <button
                                                        class="btn-buy"
                                                        title="Comprar mais deste material"
                                                        on:click={
                                                            let id = restock_id.clone();
                                                            move |_| restock(id.clone())
                                                        }
                                                    >
                                                        "Comprar"
                                                    </button>
                                                    <button
                                                        class="btn-edit"
                                                        on:click={
                                                            let target = edit_target.clone();
                                                            move |_| open_edit(target.clone())
                                                        }
                                                    >
                                                        "Editar"
                                                    </button>
                                                    <Show when=can_delete>
                                                        <DeleteConfirmButton
                                                            button_class="btn-delete"
                                                            on_confirm=move |_| delete(id.get_value())
                                                        />
                                                    </Show>
                                                </div>
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
                        if editing.with(Option::is_some) { "Editar Material" } else { "Novo Material" }.to_string()
                    })
                    on_close=close
                >
                    <form class="material-form" on:submit=on_submit>
                        {field("Nome *", "text", draft, |d| &d.name, |d| &mut d.name)}
                        {text_area("Descrição", draft, |d| &d.description, |d| &mut d.description)}
                        <div class="form-row">
                            <div class="form-group">
                                <label>"Categoria *"</label>
                                <select
                                    prop:value=move || draft.with(|d| d.category.as_str())
                                    on:change=move |ev| {
                                        draft.update(|d| d.category = MaterialCategory::parse(&event_target_value(&ev)))
                                    }
                                >
                                    {MaterialCategory::ALL.iter().map(|c| view! {
                                        <option value=c.as_str()>{c.label()}</option>
                                    }).collect_view()}
                                </select>
                            </div>
                            <div class="form-group">
                                <label>"Unidade *"</label>
                                <select
                                    prop:value=move || draft.with(|d| d.unit.as_str())
                                    on:change=move |ev| draft.update(|d| d.unit = Unit::parse(&event_target_value(&ev)))
                                >
                                    {Unit::ALL.iter().map(|u| view! {
                                        <option value=u.as_str()>{u.label()}</option>
                                    }).collect_view()}
                                </select>
                            </div>
                        </div>
                        <div class="form-row">
                            {field("Custo por Unidade *", "number", draft, |d| &d.cost_per_unit, |d| &mut d.cost_per_unit)}
                            {field("Quantidade em Estoque", "number", draft, |d| &d.quantity_in_stock, |d| &mut d.quantity_in_stock)}
                            {field("Estoque Mínimo", "number", draft, |d| &d.minimum_stock, |d| &mut d.minimum_stock)}
                        </div>
                        <Show when=move || editing.with(Option::is_none)>
                            <small class="form-help">
                                "A quantidade inicial será registrada como primeira compra."
                            </small>
                        </Show>
                        <div class="form-row">
                            {field("Fornecedor", "text", draft, |d| &d.supplier, |d| &mut d.supplier)}
                            {field("Telefone do Fornecedor", "tel", draft, |d| &d.supplier_phone, |d| &mut d.supplier_phone)}
                        </div>
                        {text_area("Observações", draft, |d| &d.notes, |d| &mut d.notes)}
                        <div class="form-actions">
                            <button type="button" on:click=move |_| close.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">
                                {move || if editing.with(Option::is_some) { "Atualizar" } else { "Criar" }}
                            </button>
                        </div>
                    </form>
                </Modal>
            </div>
        </Show>
    }
}
