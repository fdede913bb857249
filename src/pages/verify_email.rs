//! Verify Email Page
//!
//! Confirms the token from the e-mail link once, on mount.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::context::use_app;
use crate::router::{Link, Route};

#[derive(Clone, PartialEq)]
enum Verification {
    Pending,
    Verified,
    Failed(String),
}

#[component]
pub fn VerifyEmailPage(token: String) -> impl IntoView {
    let ctx = use_app();
    let (state, set_state) = signal(Verification::Pending);

    if token.trim().is_empty() {
        set_state.set(Verification::Failed("Token inválido".to_string()));
    } else {
        let session = ctx.auth.session();
        spawn_local(async move {
            match api::verify_email(&ctx.api(), &token).await {
                Ok(envelope) if envelope.success => {
                    set_state.set(Verification::Verified);
                    ctx.toasts.success(envelope.message.unwrap_or_default());
                    session.refresh().await;
                    ctx.auth.sync();
                    ctx.navigate_after(Route::Dashboard, 2000);
                }
                Ok(envelope) => set_state.set(Verification::Failed(
                    envelope.message.unwrap_or_else(|| "Erro ao verificar email".to_string()),
                )),
                Err(err) => {
                    let message = err.user_message("Erro ao verificar email");
                    set_state.set(Verification::Failed(message));
                    ctx.report_public(&err, "Erro ao verificar email");
                }
            }
        });
    }

    view! {
        <div class="auth-container">
            <div class="auth-card-login">
                <div class="auth-message-container">
                    {move || match state.get() {
                        Verification::Pending => view! {
                            <h2 class="auth-message-title">"Verificando email..."</h2>
                            <p class="auth-message-text-no-margin">"Aguarde enquanto verificamos seu email."</p>
                        }
                        .into_any(),
                        Verification::Verified => view! {
                            <h2 class="auth-message-title">"Email verificado!"</h2>
                            <p class="auth-message-text">
                                "Seu email foi verificado com sucesso. Você será redirecionado para o dashboard."
                            </p>
                        }
                        .into_any(),
                        Verification::Failed(message) => view! {
                            <h2 class="auth-message-title">"Verificação falhou"</h2>
                            <p class="auth-message-text">{message}</p>
                            <div class="auth-form-links-login">
                                <Link route=Route::Login class="auth-recover">"Ir para Login"</Link>
                            </div>
                        }
                        .into_any(),
                    }}
                </div>
            </div>
        </div>
    }
}
