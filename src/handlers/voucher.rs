// src/handlers/voucher.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::stripe_event::{
        META_GIFT_ITEM_ID, META_REFERRAL_TOKEN, META_SENDER_EMAIL, META_VOUCHER_ID,
    },
    models::voucher::{RedeemPayload, Voucher},
};

// ---
// Payload: abertura de checkout
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutPayload {
    pub gift_item_id: Uuid,

    pub buyer_name: Option<String>,
    #[validate(email(message = "O e-mail do comprador é inválido."))]
    pub buyer_email: Option<String>,

    pub recipient_name: Option<String>,
    #[validate(email(message = "O e-mail do destinatário é inválido."))]
    pub recipient_email: Option<String>,

    // Token do voucher que trouxe este comprador até aqui (viral loop).
    // Vai na metadata da sessão; o webhook marca o voucher indicador.
    pub referral_token: Option<String>,
}

// A loja usa isso para montar a sessão hospedada do Stripe
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub voucher_id: Uuid,
    // Vai na metadata da sessão; o webhook acha o placeholder por aqui
    pub checkout_metadata: serde_json::Value,
}

// Monta a metadata da sessão hospedada. Além das chaves de localização
// do placeholder, o par referral_token/sender_email (quando presente)
// permite ao webhook marcar o voucher indicador.
fn checkout_metadata(voucher: &Voucher, referral_token: Option<&str>) -> serde_json::Value {
    let mut metadata = serde_json::json!({
        META_VOUCHER_ID: voucher.id,
        META_GIFT_ITEM_ID: voucher.gift_item_id,
    });

    if let Some(token) = referral_token {
        metadata[META_REFERRAL_TOKEN] = serde_json::json!(token);
        if let Some(email) = &voucher.buyer_email {
            metadata[META_SENDER_EMAIL] = serde_json::json!(email);
        }
    }

    metadata
}

// POST /api/checkout
#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Storefront",
    request_body = CreateCheckoutPayload,
    responses(
        (status = 201, description = "Placeholder de voucher criado", body = CheckoutResponse),
        (status = 404, description = "Item não encontrado ou inativo")
    )
)]
pub async fn create_checkout(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let voucher = app_state
        .voucher_service
        .create_checkout_placeholder(
            payload.gift_item_id,
            payload.buyer_name,
            payload.buyer_email,
            payload.recipient_name,
            payload.recipient_email,
        )
        .await?;

    let response = CheckoutResponse {
        voucher_id: voucher.id,
        checkout_metadata: checkout_metadata(&voucher, payload.referral_token.as_deref()),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/voucher/{voucher_id}/redeem
#[utoipa::path(
    post,
    path = "/api/voucher/{voucher_id}/redeem",
    tag = "Voucher",
    params(("voucher_id" = Uuid, Path, description = "ID do voucher")),
    request_body = RedeemPayload,
    responses(
        (status = 200, description = "Voucher resgatado"),
        (status = 404, description = "Voucher não encontrado"),
        (status = 409, description = "Já resgatado / pendente / reembolsado"),
        (status = 400, description = "Local não é válido para o voucher")
    )
)]
pub async fn redeem(
    State(app_state): State<AppState>,
    Path(voucher_id): Path<Uuid>,
    Json(payload): Json<RedeemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state
        .voucher_service
        .redeem(voucher_id, payload.merchant_location_id)
        .await?;

    Ok((StatusCode::OK, Json(response)))
}

// GET /api/voucher/code/{code}
// Página do destinatário: consulta pública pelo código de resgate
#[utoipa::path(
    get,
    path = "/api/voucher/code/{code}",
    tag = "Voucher",
    params(("code" = String, Path, description = "Código de resgate")),
    responses(
        (status = 200, description = "Dados do voucher", body = Voucher),
        (status = 404, description = "Código desconhecido")
    )
)]
pub async fn get_by_code(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let voucher = app_state.voucher_service.find_by_code(&code).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

// GET /api/voucher/{voucher_id}/pdf
pub async fn get_pdf(
    State(app_state): State<AppState>,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = app_state
        .document_service
        .generate_voucher_pdf(voucher_id)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"voucher-{}.pdf\"", voucher_id),
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::voucher::{test_voucher, VoucherStatus};

    #[test]
    fn metadata_always_carries_voucher_and_item() {
        let voucher = test_voucher(VoucherStatus::Pending);
        let metadata = checkout_metadata(&voucher, None);

        assert_eq!(
            metadata[META_VOUCHER_ID],
            serde_json::json!(voucher.id)
        );
        assert_eq!(
            metadata[META_GIFT_ITEM_ID],
            serde_json::json!(voucher.gift_item_id)
        );
        assert!(metadata.get(META_REFERRAL_TOKEN).is_none());
        assert!(metadata.get(META_SENDER_EMAIL).is_none());
    }

    #[test]
    fn metadata_carries_referral_pair_when_token_present() {
        let voucher = test_voucher(VoucherStatus::Pending);
        let metadata = checkout_metadata(&voucher, Some("tok_indicador"));

        assert_eq!(metadata[META_REFERRAL_TOKEN], "tok_indicador");
        // O e-mail do comprador vira o sender_email do par
        assert_eq!(metadata[META_SENDER_EMAIL], "ana@example.com");
    }

    #[test]
    fn metadata_omits_sender_email_without_buyer_email() {
        let mut voucher = test_voucher(VoucherStatus::Pending);
        voucher.buyer_email = None;
        let metadata = checkout_metadata(&voucher, Some("tok_indicador"));

        assert_eq!(metadata[META_REFERRAL_TOKEN], "tok_indicador");
        assert!(metadata.get(META_SENDER_EMAIL).is_none());
    }
}
