//! Users Page
//!
//! Account administration, admin only.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::access::Capability;
use crate::api;
use crate::calc::format_opt_date;
use crate::components::{Loading, Modal};
use crate::context::use_app;
use crate::forms::NewUserDraft;
use crate::models::{Role, User};

use super::fields::{field, search_box};

fn role_badge(role: Role) -> impl IntoView {
    view! { <span class=format!("role-badge badge-{}", role.as_str())>{role.label()}</span> }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let ctx = use_app();

    view! {
        <Show
            when=move || ctx.can(Capability::ManageUsers)
            fallback=|| view! {
                <div class="users-page">
                    <div class="empty-state">
                        <h2>"Acesso Negado"</h2>
                        <p>"Apenas administradores podem acessar esta página."</p>
                    </div>
                </div>
            }
        >
            <UserAdmin />
        </Show>
    }
}

#[component]
fn UserAdmin() -> impl IntoView {
    let ctx = use_app();
    let search = RwSignal::new(String::new());
    let role_filter = RwSignal::new(None::<Role>);
    let (users, set_users) = signal(Vec::<User>::new());
    let (loaded, set_loaded) = signal(false);
    let modal_open = RwSignal::new(false);
    let draft = RwSignal::new(NewUserDraft::default());

    let fetch = move || {
        let (Some(term), Some(role)) = (search.try_get_untracked(), role_filter.try_get_untracked())
        else {
            return;
        };
        spawn_local(async move {
            match api::list_users(&ctx.api(), &term, role).await {
                Ok(page) => set_users.set(page.items),
                Err(err) => ctx.report(&err, "Erro ao buscar usuários"),
            }
            set_loaded.set(true);
        });
    };

    Effect::new(move |_| {
        search.track();
        role_filter.track();
        fetch();
    });

    let dismiss = move || {
        modal_open.set(false);
        draft.set(NewUserDraft::default());
    };
    let close = Callback::new(move |_| dismiss());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match draft.with(NewUserDraft::build) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        spawn_local(async move {
            match api::create_user(&ctx.api(), &args).await {
                Ok(_) => {
                    ctx.toasts.success("Usuário criado com sucesso!");
                    dismiss();
                    fetch();
                }
                Err(err) => ctx.report(&err, "Erro ao criar usuário"),
            }
        });
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando usuários..." /> }>
            <div class="users-page">
                <div class="page-header">
                    <h1>"Usuários"</h1>
                    <button
                        class="btn-primary"
                        on:click=move |_| {
                            draft.set(NewUserDraft::default());
                            modal_open.set(true);
                        }
                    >
                        "+ Novo Usuário"
                    </button>
                </div>

                <div class="users-filters-bar">
                    {search_box("Buscar por nome, email ou telefone...", search)}
                    <div class="users-filter-select">
                        <select
                            prop:value=move || role_filter.get().map_or("", |r| r.as_str())
                            on:change=move |ev| {
                                let value = event_target_value(&ev);
                                role_filter.set((!value.is_empty()).then(|| Role::parse(&value)));
                            }
                        >
                            <option value="">"Todos os tipos"</option>
                            {Role::ALL.iter().map(|r| view! {
                                <option value=r.as_str()>{r.label()}</option>
                            }).collect_view()}
                        </select>
                    </div>
                </div>

                <table class="users-data-table">
                    <thead>
                        <tr>
                            <th>"Nome"</th>
                            <th>"Email"</th>
                            <th>"Telefone"</th>
                            <th>"Tipo"</th>
                            <th>"Data de Criação"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || users.with(Vec::is_empty)>
                            <tr><td colspan="5" class="empty-state">"Nenhum usuário encontrado"</td></tr>
                        </Show>
                        <For
                            each=move || users.get()
                            key=|user| (user.id.clone(), user.role)
                            children=|user| view! {
                                <tr>
                                    <td><strong>{user.name.clone()}</strong></td>
                                    <td>{user.email.clone()}</td>
                                    <td>{user.phone.clone().filter(|p| !p.is_empty()).unwrap_or_else(|| "-".to_string())}</td>
                                    <td>{role_badge(user.role)}</td>
                                    <td>{format_opt_date(user.created_at.as_deref())}</td>
                                </tr>
                            }
                        />
                    </tbody>
                </table>

                <Modal open=modal_open title="Novo Usuário".to_string() on_close=close>
                    <form class="user-form" on:submit=on_submit>
                        {field("Nome *", "text", draft, |d| &d.name, |d| &mut d.name)}
                        {field("Email *", "email", draft, |d| &d.email, |d| &mut d.email)}
                        <div class="form-row">
                            {field("Senha * (mín. 6 caracteres)", "password", draft, |d| &d.password, |d| &mut d.password)}
                            <div class="form-group">
                                <label>"Tipo *"</label>
                                <select
                                    prop:value=move || draft.with(|d| d.role.as_str())
                                    on:change=move |ev| draft.update(|d| d.role = Role::parse(&event_target_value(&ev)))
                                >
                                    {Role::ALL.iter().map(|r| view! {
                                        <option value=r.as_str()>{r.label()}</option>
                                    }).collect_view()}
                                </select>
                            </div>
                        </div>
                        {field("Telefone", "tel", draft, |d| &d.phone, |d| &mut d.phone)}
                        <div class="form-actions">
                            <button type="button" on:click=move |_| close.run(())>"Cancelar"</button>
                            <button type="submit" class="btn-primary">"Criar Usuário"</button>
                        </div>
                    </form>
                </Modal>
            </div>
        </Show>
    }
}
