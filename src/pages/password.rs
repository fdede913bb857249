//! Password Recovery Pages

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::context::use_app;
use crate::error::FormError;
use crate::forms::{check_new_password, MIN_PASSWORD_LEN};
use crate::router::{Link, Route};

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let ctx = use_app();
    let (email, set_email) = signal(String::new());
    let (loading, set_loading) = signal(false);
    let (sent, set_sent) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let address = email.get();
        set_loading.set(true);
        spawn_local(async move {
            match api::forgot_password(&ctx.api(), &address).await {
                Ok(envelope) if envelope.success => {
                    ctx.toasts.success(envelope.message.unwrap_or_default());
                    set_sent.set(true);
                }
                Ok(envelope) => ctx.toasts.error(envelope.message.unwrap_or_default()),
                Err(err) => ctx.report_public(&err, "Erro ao enviar email de reset"),
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="auth-container">
            <div class="auth-card-login">
                <Show
                    when=move || sent.get()
                    fallback=move || view! {
                        <form on:submit=on_submit>
                            <div class="auth-form-group">
                                <p class="auth-subtitle">"Informe seu email para receber o link de redefinição"</p>
                                <input
                                    type="email"
                                    required
                                    placeholder="seu@email.com"
                                    prop:value=move || email.get()
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                />
                                <button type="submit" class="auth-btn-signin" disabled=move || loading.get()>
                                    {move || if loading.get() { "Enviando..." } else { "ENVIAR LINK" }}
                                </button>
                            </div>
                            <div class="auth-form-links-login">
                                <Link route=Route::Login class="auth-recover">"Voltar para o login"</Link>
                            </div>
                        </form>
                    }
                >
                    <div class="auth-message-container">
                        <h2 class="auth-message-title">"Email enviado!"</h2>
                        <p class="auth-message-text">
                            {move || format!(
                                "Se o email {} estiver cadastrado, você receberá um link para redefinir sua senha.",
                                email.get(),
                            )}
                        </p>
                        <div class="auth-form-links-login">
                            <Link route=Route::Login class="auth-recover">"Voltar para o login"</Link>
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}

#[component]
pub fn ResetPasswordPage(token: String) -> impl IntoView {
    let ctx = use_app();
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (loading, set_loading) = signal(false);
    let token = StoredValue::new(token);

    if token.with_value(|t| t.trim().is_empty()) {
        ctx.toasts.error(FormError::MissingToken.to_string());
        ctx.router.replace(Route::ForgotPassword);
    }

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let new_password = password.get();
        if let Err(err) = check_new_password(&new_password, &confirm.get(), MIN_PASSWORD_LEN) {
            return ctx.toasts.error(err.to_string());
        }
        set_loading.set(true);
        let reset_token = token.get_value();
        let session = ctx.auth.session();
        spawn_local(async move {
            match api::reset_password(&ctx.api(), &reset_token, &new_password).await {
                Ok(envelope) if envelope.success => {
                    ctx.toasts.success(envelope.message.clone().unwrap_or_default());
                    if let Some(token) = envelope.data.and_then(|data| data.token) {
                        session.store_token(&token);
                    }
                    session.refresh().await;
                    ctx.auth.sync();
                    ctx.navigate_after(Route::Dashboard, 1000);
                }
                Ok(envelope) => ctx.toasts.error(envelope.message.unwrap_or_default()),
                Err(err) => {
                    ctx.report_public(&err, "Erro ao redefinir senha");
                    if err.status() == Some(400) {
                        ctx.navigate_after(Route::ForgotPassword, 2000);
                    }
                }
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="auth-container">
            <div class="auth-card-login">
                <form on:submit=on_submit>
                    <div class="auth-form-group">
                        <h2 class="auth-title">"Redefinir senha"</h2>
                        <input
                            type="password"
                            required
                            placeholder="Nova senha"
                            prop:value=move || password.get()
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                        />
                        <input
                            type="password"
                            required
                            placeholder="Confirme a nova senha"
                            prop:value=move || confirm.get()
                            on:input=move |ev| set_confirm.set(event_target_value(&ev))
                        />
                        <button type="submit" class="auth-btn-signin" disabled=move || loading.get()>
                            {move || if loading.get() { "Redefinindo..." } else { "REDEFINIR SENHA" }}
                        </button>
                    </div>
                    <div class="auth-form-links-login">
                        <Link route=Route::Login class="auth-recover">"Voltar para o login"</Link>
                    </div>
                </form>
            </div>
        </div>
    }
}
