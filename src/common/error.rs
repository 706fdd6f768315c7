use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Cada variante mapeia para um status HTTP no IntoResponse abaixo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Sessão ausente ou expirada")]
    AuthenticationRequired,

    #[error("Assinatura do webhook inválida")]
    InvalidSignature,

    #[error("Comerciante não encontrado")]
    MerchantNotFound,

    #[error("Comerciante ainda não aprovado")]
    MerchantNotApproved,

    #[error("Voucher não encontrado")]
    VoucherNotFound,

    #[error("Item de presente não encontrado")]
    GiftItemNotFound,

    #[error("Local não encontrado")]
    LocationNotFound,

    // --- Estados inválidos do resgate ---
    #[error("Voucher já foi resgatado")]
    AlreadyRedeemed,

    #[error("Pagamento ainda em processamento")]
    PaymentProcessing,

    #[error("Voucher foi reembolsado")]
    Refunded,

    #[error("Voucher está em disputa")]
    Disputed,

    #[error("Local não é válido para este voucher")]
    LocationNotValid,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Política uniforme do webhook: erros de infraestrutura devem virar 5xx
    // (o Stripe reenvia o evento); recusas de domínio são terminais e o
    // evento é confirmado com 200 para não gerar tempestade de retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_) | AppError::InternalServerError(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken | AppError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "Sessão inválida ou ausente.")
            }
            AppError::InvalidSignature => {
                (StatusCode::BAD_REQUEST, "Assinatura do webhook inválida.")
            }
            AppError::MerchantNotFound => (StatusCode::NOT_FOUND, "Comerciante não encontrado."),
            AppError::MerchantNotApproved => {
                (StatusCode::FORBIDDEN, "Comerciante ainda não aprovado.")
            }
            AppError::VoucherNotFound => (StatusCode::NOT_FOUND, "Voucher não encontrado."),
            AppError::GiftItemNotFound => {
                (StatusCode::NOT_FOUND, "Item de presente não encontrado.")
            }
            AppError::LocationNotFound => (StatusCode::NOT_FOUND, "Local não encontrado."),
            AppError::AlreadyRedeemed => (StatusCode::CONFLICT, "Este voucher já foi resgatado."),
            AppError::PaymentProcessing => (
                StatusCode::CONFLICT,
                "O pagamento deste voucher ainda está em processamento.",
            ),
            AppError::Refunded => (StatusCode::CONFLICT, "Este voucher foi reembolsado."),
            AppError::Disputed => (StatusCode::CONFLICT, "Este voucher está em disputa."),
            AppError::LocationNotValid => (
                StatusCode::BAD_REQUEST,
                "Este local não é válido para o voucher.",
            ),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
