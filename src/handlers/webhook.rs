// src/handlers/webhook.rs

use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError, config::AppState, models::stripe_event::StripeEvent,
    services::webhook_service::verify_signature,
};

// POST /api/webhook/stripe
//
// Corpo CRU (a assinatura é sobre os bytes exatos) + cabeçalho
// `stripe-signature`. Assinatura inválida -> 400, sem tocar no banco.
#[utoipa::path(
    post,
    path = "/api/webhook/stripe",
    tag = "Webhook",
    responses(
        (status = 200, description = "Evento recebido e confirmado"),
        (status = 400, description = "Assinatura ausente ou inválida"),
        (status = 500, description = "Erro transitório; o Stripe vai reenviar")
    )
)]
pub async fn stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    verify_signature(&app_state.stripe_webhook_secret, &body, signature)?;

    // Corpo assinado mas que nunca vai parsear: terminal, confirma com 200.
    // Devolver 5xx aqui faria o Stripe reenviar um payload imprestável.
    let event: StripeEvent = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Evento do Stripe malformado: {}", e);
            return Ok((StatusCode::OK, Json(json!({ "received": true }))));
        }
    };

    match app_state.webhook_service.handle_event(&event).await {
        Ok(()) => {}
        // Infra quebrada: devolve 5xx e deixa o retry do Stripe trabalhar
        Err(e) if e.is_retryable() => return Err(e),
        // Recusa de domínio: loga e confirma para não virar tempestade
        Err(e) => {
            tracing::error!(
                "Erro terminal no webhook {} ({}): {}",
                event.id,
                event.event_type,
                e
            );
        }
    }

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}
