//! Registration Pages
//!
//! Self-registration and first-admin setup share the same fields and the
//! same outcome handling.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::info;

use crate::context::{use_app, AppContext};
use crate::error::ApiResult;
use crate::forms::{RegisterDraft, MIN_PASSWORD_LEN};
use crate::router::{Link, Route};
use crate::session::SignUpOutcome;

/// Which endpoint the form posts to
#[derive(Clone, Copy, PartialEq)]
enum SignUpKind {
    Register,
    FirstAdmin,
}

impl SignUpKind {
    fn success_message(&self) -> &'static str {
        match self {
            SignUpKind::Register => "Registro realizado com sucesso!",
            SignUpKind::FirstAdmin => "Administrador criado com sucesso!",
        }
    }

    fn fallback(&self) -> &'static str {
        match self {
            SignUpKind::Register => "Erro ao registrar",
            SignUpKind::FirstAdmin => "Erro ao criar administrador",
        }
    }
}

fn handle_outcome(ctx: AppContext, kind: SignUpKind, result: ApiResult<SignUpOutcome>) {
    match result {
        Ok(SignUpOutcome::SignedIn { message, .. }) => {
            ctx.toasts.success(message.unwrap_or_else(|| kind.success_message().to_string()));
            ctx.auth.sync();
        }
        Ok(SignUpOutcome::VerificationPending { message, verification_url }) => {
            ctx.toasts.success(message.unwrap_or_else(|| kind.success_message().to_string()));
            if let Some(url) = verification_url {
                info!(url = %url, "verification link");
                ctx.toasts.info("Verifique o console para o link de verificação (modo desenvolvimento)");
            }
            ctx.navigate_after(Route::Login, 2000);
        }
        Ok(SignUpOutcome::Created { message }) => {
            ctx.toasts.success(message.unwrap_or_else(|| kind.success_message().to_string()));
            ctx.navigate_after(Route::Login, 1000);
        }
        Ok(SignUpOutcome::Rejected { message }) => ctx.toasts.error(message),
        Err(err) => ctx.report_public(&err, kind.fallback()),
    }
}

#[component]
fn SignUpForm(kind: SignUpKind, submit_label: &'static str) -> impl IntoView {
    let ctx = use_app();
    let draft = RwSignal::new(RegisterDraft::default());
    let (loading, set_loading) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let args = match draft.with(|d| d.build(MIN_PASSWORD_LEN)) {
            Ok(args) => args,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        set_loading.set(true);
        let session = ctx.auth.session();
        spawn_local(async move {
            let result = match kind {
                SignUpKind::Register => session.register(&args).await,
                SignUpKind::FirstAdmin => session.create_first_admin(&args).await,
            };
            handle_outcome(ctx, kind, result);
            set_loading.set(false);
        });
    };

    view! {
        <form on:submit=on_submit>
            <div class="auth-form-group">
                <input
                    type="text"
                    required
                    placeholder="Seu nome completo"
                    prop:value=move || draft.with(|d| d.name.clone())
                    on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
                />
                <input
                    type="email"
                    required
                    placeholder="seu@email.com"
                    prop:value=move || draft.with(|d| d.email.clone())
                    on:input=move |ev| draft.update(|d| d.email = event_target_value(&ev))
                />
                <input
                    type="tel"
                    placeholder="(00) 00000-0000"
                    prop:value=move || draft.with(|d| d.phone.clone())
                    on:input=move |ev| draft.update(|d| d.phone = event_target_value(&ev))
                />
                <input
                    type="password"
                    required
                    placeholder="••••••••"
                    prop:value=move || draft.with(|d| d.password.clone())
                    on:input=move |ev| draft.update(|d| d.password = event_target_value(&ev))
                />
                <input
                    type="password"
                    required
                    placeholder="Confirme sua senha"
                    prop:value=move || draft.with(|d| d.confirm_password.clone())
                    on:input=move |ev| draft.update(|d| d.confirm_password = event_target_value(&ev))
                />
                <button type="submit" class="auth-btn-signin" disabled=move || loading.get()>
                    {move || if loading.get() { "Enviando..." } else { submit_label }}
                </button>
            </div>
            <div class="auth-form-options">
                <div class="auth-form-links-login">
                    <Link route=Route::Login class="auth-recover">"Já tem conta? Fazer login"</Link>
                    <Link route=Route::ForgotPassword class="auth-recover">"Esqueceu a senha?"</Link>
                </div>
            </div>
        </form>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    view! {
        <div class="auth-container">
            <div class="auth-card-login">
                <SignUpForm kind=SignUpKind::Register submit_label="REGISTRAR" />
            </div>
        </div>
    }
}

#[component]
pub fn SetupAdminPage() -> impl IntoView {
    view! {
        <div class="auth-container">
            <div class="auth-card-login">
                <h2 class="auth-title">"Criar Administrador"</h2>
                <p class="auth-subtitle">"Configure a primeira conta de administrador do sistema"</p>
                <SignUpForm kind=SignUpKind::FirstAdmin submit_label="CRIAR ADMINISTRADOR" />
            </div>
        </div>
    }
}
