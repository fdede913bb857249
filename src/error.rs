//! Error Types
//!
//! `ApiError` covers everything that can go wrong talking to the backend,
//! `FormError` covers client-side validation that runs before any request.

use serde_json::Value;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 401: the stored token has already been cleared by the client
    #[error("Not authenticated: {}", .0.as_deref().unwrap_or("no message"))]
    Unauthorized(Option<String>),

    /// 429: transient, never surfaced to the user
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other non-2xx response
    #[error("API error [{status}]: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
        body: Value,
    },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// How a failure is presented
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorClass {
    /// Session downgraded, route guard redirects; no toast
    Auth,
    /// Silently ignored
    RateLimited,
    /// Server-provided message shown verbatim
    Business(String),
    /// Generic fallback message, logged as an error
    Unexpected,
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Unauthorized(_) => ErrorClass::Auth,
            ApiError::RateLimited => ErrorClass::RateLimited,
            ApiError::Rejected { message: Some(message), .. } if !message.trim().is_empty() => {
                ErrorClass::Business(message.clone())
            }
            _ => ErrorClass::Unexpected,
        }
    }

    /// Message for a toast: the server's message if it sent one, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self.class() {
            ErrorClass::Business(message) => message,
            _ => fallback.to_string(),
        }
    }

    /// Message sent by the server, whatever the class
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(message) | ApiError::Rejected { message, .. } => message
                .as_deref()
                .filter(|message| !message.trim().is_empty()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::RateLimited => Some(429),
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Login answers 403 with `requiresVerification` for unverified accounts
    pub fn requires_verification(&self) -> bool {
        match self {
            ApiError::Rejected { status: 403, body, .. } => body
                .get("requiresVerification")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Extra string field of a rejection body (e.g. `email`)
    pub fn body_str(&self, key: &str) -> Option<&str> {
        match self {
            ApiError::Rejected { body, .. } => body.get(key).and_then(Value::as_str),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Validation failures caught before a request is sent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Selecione um cliente")]
    MissingClient,

    #[error("Adicione pelo menos um produto")]
    NoSaleItems,

    #[error("Nome do cliente é obrigatório")]
    MissingClientName,

    #[error("Preencha todos os campos obrigatórios")]
    MissingRequiredFields,

    #[error("Valor inválido para {0}")]
    InvalidNumber(&'static str),

    #[error("As senhas não coincidem")]
    PasswordMismatch,

    #[error("A senha deve ter no mínimo {0} caracteres")]
    PasswordTooShort(usize),

    #[error("Selecione as datas inicial e final")]
    MissingDateRange,

    #[error("Token inválido")]
    MissingToken,
}

/// A form submission that may fail locally or at any of its requests
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    /// `fallback` is the toast text when the server sends no message
    #[error("{fallback}: {source}")]
    Failed {
        source: ApiError,
        fallback: &'static str,
    },
}

impl SubmitError {
    pub fn failed(fallback: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| SubmitError::Failed { source, fallback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected(status: u16, body: Value) -> ApiError {
        let message = body.get("message").and_then(Value::as_str).map(String::from);
        ApiError::Rejected { status, message, body }
    }

    #[test]
    fn test_classes() {
        let unauthorized = ApiError::Unauthorized(Some("Credenciais inválidas".into()));
        assert_eq!(unauthorized.class(), ErrorClass::Auth);
        assert_eq!(unauthorized.server_message(), Some("Credenciais inválidas"));
        assert_eq!(ApiError::RateLimited.class(), ErrorClass::RateLimited);
        assert_eq!(
            rejected(400, json!({"message": "Estoque insuficiente"})).class(),
            ErrorClass::Business("Estoque insuficiente".into())
        );
        assert_eq!(rejected(500, json!({})).class(), ErrorClass::Unexpected);
        assert_eq!(ApiError::Transport("offline".into()).class(), ErrorClass::Unexpected);
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = rejected(422, json!({"message": "Email já cadastrado"}));
        assert_eq!(err.user_message("Erro ao salvar"), "Email já cadastrado");

        let err = ApiError::Decode("eof".into());
        assert_eq!(err.user_message("Erro ao salvar"), "Erro ao salvar");

        let err = rejected(400, json!({"message": "   "}));
        assert_eq!(err.user_message("Erro ao salvar"), "Erro ao salvar");
    }

    #[test]
    fn test_requires_verification() {
        let err = rejected(
            403,
            json!({"message": "Verifique seu email", "requiresVerification": true, "email": "a@b.com"}),
        );
        assert!(err.requires_verification());
        assert_eq!(err.body_str("email"), Some("a@b.com"));

        let err = rejected(403, json!({"message": "Conta desativada"}));
        assert!(!err.requires_verification());
    }
}
