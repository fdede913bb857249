//! Login Page
//!
//! E-mail/password sign-in, with a resend-verification panel for accounts
//! whose e-mail is not confirmed yet.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::info;

use crate::api;
use crate::context::use_app;
use crate::router::{Link, Route};
use crate::session::LoginOutcome;

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (loading, set_loading) = signal(false);
    let (unverified_email, set_unverified_email) = signal(None::<String>);
    let (resending, set_resending) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let typed_email = email.get();
        let typed_password = password.get();
        set_loading.set(true);
        set_unverified_email.set(None);

        let session = ctx.auth.session();
        spawn_local(async move {
            match session.login(&typed_email, &typed_password).await {
                Ok(LoginOutcome::SignedIn { .. }) => {
                    ctx.toasts.success("Login realizado com sucesso!");
                    ctx.auth.sync();
                }
                Ok(LoginOutcome::Rejected { message }) => ctx.toasts.error(message),
                Err(err) if err.requires_verification() => {
                    let address = err.body_str("email").map(String::from).unwrap_or(typed_email);
                    set_unverified_email.set(Some(address));
                    ctx.toasts.error(err.server_message().unwrap_or("Verifique seu email"));
                }
                Err(err) => ctx.report_public(&err, "Erro ao fazer login"),
            }
            set_loading.set(false);
        });
    };

    let resend = move |_| {
        let Some(address) = unverified_email.get() else {
            return;
        };
        set_resending.set(true);
        spawn_local(async move {
            match api::resend_verification(&ctx.api(), &address).await {
                Ok(envelope) if envelope.success => {
                    if let Some(url) = &envelope.verification_url {
                        info!(url = %url, "verification link");
                    }
                    ctx.toasts.success(envelope.message.unwrap_or_default());
                }
                Ok(envelope) => ctx.toasts.error(envelope.message.unwrap_or_default()),
                Err(err) => ctx.report_public(&err, "Erro ao reenviar email"),
            }
            set_resending.set(false);
        });
    };

    view! {
        <div class="auth-container">
            <div class="auth-card-login">
                <form on:submit=on_submit>
                    <div class="auth-form-group">
                        <input
                            type="email"
                            required
                            placeholder="Seu email"
                            prop:value=move || email.get()
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                        <input
                            type="password"
                            required
                            placeholder="Sua senha"
                            prop:value=move || password.get()
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                    </div>
                    <div class="auth-form-options">
                        <button type="submit" class="auth-btn-signin" disabled=move || loading.get()>
                            {move || if loading.get() { "Entrando..." } else { "ENTRAR" }}
                        </button>
                        <div class="auth-form-links-login">
                            <Link route=Route::ForgotPassword class="auth-recover">"Esqueceu a senha?"</Link>
                            <Link route=Route::Register class="auth-recover">"Registrar-se"</Link>
                            <Link route=Route::SetupAdmin class="auth-recover auth-form-link-login">
                                "Primeiro acesso? Criar Administrador"
                            </Link>
                        </div>
                    </div>
                    <Show when=move || unverified_email.with(Option::is_some)>
                        <div class="verification-warning">
                            <p>"Seu email ainda não foi verificado"</p>
                            <button type="button" on:click=resend disabled=move || resending.get()>
                                {move || if resending.get() { "Enviando..." } else { "Reenviar Email de Verificação" }}
                            </button>
                        </div>
                    </Show>
                </form>
            </div>
        </div>
    }
}
