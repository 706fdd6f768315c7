// src/handlers/admin.rs
//
// Back-office: aprovação de comerciantes, taxa Brontie e categorias.
// Todas as rotas passam pelo admin_guard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::merchant::MerchantStatus,
};

// GET /api/admin/merchants
pub async fn list_merchants(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let merchants = app_state.merchant_repo.list_all().await?;
    Ok((StatusCode::OK, Json(merchants)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusPayload {
    pub status: MerchantStatus,
}

// PUT /api/admin/merchants/{merchant_id}/status
pub async fn set_merchant_status(
    State(app_state): State<AppState>,
    Path(merchant_id): Path<Uuid>,
    Json(payload): Json<SetStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let merchant = app_state
        .merchant_repo
        .set_status(merchant_id, payload.status)
        .await?
        .ok_or(AppError::MerchantNotFound)?;

    tracing::info!("Comerciante {} agora está {:?}", merchant.id, merchant.status);
    Ok((StatusCode::OK, Json(merchant)))
}

fn validate_rate(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE {
        let mut err = ValidationError::new("range");
        err.message = Some("A comissão deve estar entre 0 e 1.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetFeePayload {
    pub fee_active: bool,
    #[validate(custom(function = "validate_rate"))]
    pub commission_rate: Decimal,
}

// PUT /api/admin/merchants/{merchant_id}/fee
pub async fn set_merchant_fee(
    State(app_state): State<AppState>,
    Path(merchant_id): Path<Uuid>,
    Json(payload): Json<SetFeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let merchant = app_state
        .merchant_repo
        .set_fee_settings(merchant_id, payload.fee_active, payload.commission_rate)
        .await?
        .ok_or(AppError::MerchantNotFound)?;

    Ok((StatusCode::OK, Json(merchant)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O slug é obrigatório."))]
    pub slug: String,
}

// POST /api/admin/categories
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .catalog_repo
        .create_category(&payload.name, &payload.slug)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
