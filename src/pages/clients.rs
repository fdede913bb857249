//! Clients Page

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::debug;

use crate::access::Capability;
use crate::api::{self, Query};
use crate::calc::{format_currency, format_opt_date};
use crate::components::{DeleteConfirmButton, Loading, Modal};
use crate::context::use_app;
use crate::forms::ClientDraft;
use crate::models::{Client, Sale};

use super::fields::{field, is_editing, search_box};

#[component]
pub fn ClientsPage() -> impl IntoView {
    let ctx = use_app();
    let search = RwSignal::new(String::new());
    let (clients, set_clients) = signal(Vec::<Client>::new());
    let (loaded, set_loaded) = signal(false);

    let modal_open = RwSignal::new(false);
    let editing = RwSignal::new(None::<String>);
    let draft = RwSignal::new(ClientDraft::default());

    // purchase history of one client
    let history_open = RwSignal::new(false);
    let history_title = RwSignal::new(String::new());
    let (history, set_history) = signal(None::<Vec<Sale>>);

    let can_edit = move || ctx.can(Capability::EditClients);
    let can_delete = move || ctx.can(Capability::DeleteClients);

    let fetch = move || {
        let Some(term) = search.try_get_untracked() else {
            return;
        };
        spawn_local(async move {
            match api::list_clients(&ctx.api(), Query::new().param("search", term)).await {
                Ok(page) => set_clients.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar clientes"),
            }
            set_loaded.set(true);
        });
    };

    Effect::new(move |_| {
        search.track();
        fetch();
    });

    let dismiss = move || {
        modal_open.set(false);
        draft.set(ClientDraft::default());
        editing.set(None);
    };
    let close = Callback::new(move |_| dismiss());

    let open_new = move |_| {
        draft.set(ClientDraft::default());
        editing.set(None);
        modal_open.set(true);
    };

    // the row may be stale; prefer the current record
    let open_edit = move |client: Client| {
        editing.set(Some(client.id.clone()));
        draft.set(ClientDraft::from_client(&client));
        modal_open.set(true);
        spawn_local(async move {
            match api::get_client(&ctx.api(), &client.id).await {
                Ok(fresh) if is_editing(editing, &fresh.id) => {
                    draft.set(ClientDraft::from_client(&fresh));
                }
                Ok(_) => {}
                Err(err) => debug!(error = %err, "using listed client for edit"),
            }
        });
    };

    let open_history = move |client: Client| {
        history_title.set(format!("Compras de {}", client.name));
        set_history.set(None);
        history_open.set(true);
        spawn_local(async move {
            match api::client_purchases(&ctx.api(), &client.id).await {
                Ok(sales) => set_history.set(Some(sales)),
                Err(err) => {
                    set_history.set(Some(Vec::new()));
                    ctx.report(&err, "Erro ao buscar compras do cliente");
                }
            }
        });
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match draft.with(ClientDraft::build) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        let id = editing.get_untracked();
        spawn_local(async move {
            let api = ctx.api();
            let result = match &id {
                Some(id) => api::update_client(&api, id, &args).await,
                None => api::create_client(&api, &args).await,
            };
            match result {
                Ok(_) => {
                    ctx.toasts.success(if id.is_some() {
                        "Cliente atualizado com sucesso!"
                    } else {
                        "Cliente criado com sucesso!"
                    });
                    dismiss();
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao salvar cliente"),
            }
        });
    };

    let delete = move |id: String| {
        spawn_local(async move {
            match api::delete_client(&ctx.api(), &id).await {
                Ok(()) => {
                    ctx.toasts.success("Cliente excluído com sucesso!");
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao excluir cliente"),
            }
        });
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando clientes..." /> }>
            <div class="clients-page">
                <div class="page-header">
                    <h1>"Clientes"</h1>
                    <Show when=can_edit>
                        <button class="btn-primary" on:click=open_new>"+ Novo Cliente"</button>
                    </Show>
                </div>

                {search_box("Buscar clientes...", search)}

                <table class="clients-data-table">
                    <thead>
                        <tr>
                            <th>"Nome"</th>
                            <th>"Email"</th>
                            <th>"Telefone"</th>
                            <th>"Cidade"</th>
                            <th>"Ações"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || clients.with(Vec::is_empty)>
                            <tr><td colspan="5" class="empty-state">"Nenhum cliente encontrado"</td></tr>
                        </Show>
                        <For
                            each=move || clients.get()
                            key=|client| (client.id.clone(), client.name.clone())
                            children=move |client| {
                                let city = client
                                    .address
                                    .as_ref()
                                    .map(|a| a.city.clone())
                                    .filter(|c| !c.is_empty())
                                    .unwrap_or_else(|| "-".to_string());
                                let history_target = client.clone();
                                let edit_target = client.clone();
                                let id = client.id.clone();
                                view! {
                                    <tr>
                                        <td><strong>{client.name.clone()}</strong></td>
                                        <td>{client.email.clone().unwrap_or_default()}</td>
                                        <td>{client.phone.clone().unwrap_or_default()}</td>
                                        <td>{city}</td>
                                        <td>
                                            <button
                                                class="clients-btn-history"
                                                on:click=move |_| open_history(history_target.clone())
                                            >
                                                "Compras"
                                            </button>
                                            <Show when=can_edit>
                                                <button
                                                    class="clients-btn-edit"
                                                    on:click={
                                                        let target = edit_target.clone();
                                                        move |_| open_edit(target.clone())
                                                    }
                                                >
                                                    "Editar"
                                                </button>
                                            </Show>
                                            <Show when=can_delete>
                                                <DeleteConfirmButton
                                                    button_class="clients-btn-delete"
                                                    on_confirm={
                                                        let id = id.clone();
                                                        move |_| delete(id.clone())
                                                    }
                                                />
                                            </Show>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <Modal
                    open=modal_open
                    title=Signal::derive(move || {
                        if editing.with(Option::is_some) { "Editar Cliente" } else { "Novo Cliente" }.to_string()
                    })
                    on_close=close
                >
                    <form class="client-form" on:submit=on_submit>
                        {field("Nome *", "text", draft, |d| &d.name, |d| &mut d.name)}
                        <div class="form-row">
                            {field("Email", "email", draft, |d| &d.email, |d| &mut d.email)}
                            {field("Telefone", "tel", draft, |d| &d.phone, |d| &mut d.phone)}
                        </div>
                        {field("CPF (opcional)", "text", draft, |d| &d.cpf, |d| &mut d.cpf)}
                        {field("Rua (opcional)", "text", draft, |d| &d.street, |d| &mut d.street)}
                        <div class="form-row">
                            {field("Cidade (opcional)", "text", draft, |d| &d.city, |d| &mut d.city)}
                            {field("Estado (opcional)", "text", draft, |d| &d.state, |d| &mut d.state)}
                        </div>
                        {field("CEP (opcional)", "text", draft, |d| &d.zip_code, |d| &mut d.zip_code)}
                        <div class="form-actions">
                            <button type="button" on:click=move |_| close.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">
                                {move || if editing.with(Option::is_some) { "Atualizar" } else { "Criar" }}
                            </button>
                        </div>
                    </form>
                </Modal>

                <Modal
                    open=history_open
                    title=history_title
                    on_close=move |_| history_open.set(false)
                >
                    {move || match history.get() {
                        None => view! { <Loading /> }.into_any(),
                        Some(sales) if sales.is_empty() => {
                            view! { <p class="empty-state">"Nenhuma compra registrada"</p> }.into_any()
                        }
                        Some(sales) => view! {
                            <table class="clients-history-table">
                                <thead>
                                    <tr>
                                        <th>"Data"</th>
                                        <th>"Itens"</th>
                                        <th>"Total"</th>
                                        <th>"Pagamento"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {sales.into_iter().map(|sale| view! {
                                        <tr>
                                            <td>{format_opt_date(sale.sale_date.as_deref())}</td>
                                            <td>{sale.items.len()}</td>
                                            <td>{format_currency(sale.total_amount)}</td>
                                            <td>{sale.payment_status.label()}</td>
                                        </tr>
                                    }).collect_view()}
                                </tbody>
                            </table>
                        }.into_any(),
                    }}
                </Modal>
            </div>
        </Show>
    }
}
