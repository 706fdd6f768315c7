// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
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
    middleware::auth::AuthenticatedMerchant,
    models::catalog::{Category, GiftItem},
};

// ---
// Validação Customizada
// ---
fn validate_positive_price(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("O preço deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Vitrine pública
// ---

#[derive(Debug, Deserialize)]
pub struct StorefrontFilter {
    pub category_id: Option<Uuid>,
}

// GET /api/gift-items (só itens ativos de comerciantes aprovados)
#[utoipa::path(
    get,
    path = "/api/gift-items",
    tag = "Storefront",
    responses((status = 200, description = "Itens à venda", body = Vec<GiftItem>))
)]
pub async fn list_active_gift_items(
    State(app_state): State<AppState>,
    Query(filter): Query<StorefrontFilter>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.catalog_repo.list_active(filter.category_id).await?;
    Ok((StatusCode::OK, Json(items)))
}

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Storefront",
    responses((status = 200, description = "Categorias da vitrine", body = Vec<Category>))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.catalog_repo.list_categories().await?;
    Ok((StatusCode::OK, Json(categories)))
}

// ---
// Portal do comerciante: itens
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GiftItemPayload {
    pub category_id: Option<Uuid>,

    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_positive_price"))]
    pub price: Decimal,

    // Locais onde o voucher pode ser resgatado; copiados para cada
    // voucher no momento da compra
    pub valid_location_ids: Vec<Uuid>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// POST /api/cafes/gift-items
pub async fn create_gift_item(
    State(app_state): State<AppState>,
    AuthenticatedMerchant(merchant): AuthenticatedMerchant,
    Json(payload): Json<GiftItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Todos os locais informados precisam ser do próprio comerciante
    let my_locations = app_state.merchant_repo.list_locations(merchant.id).await?;
    for loc_id in &payload.valid_location_ids {
        if !my_locations.iter().any(|loc| loc.id == *loc_id) {
            return Err(AppError::LocationNotFound);
        }
    }

    let item = app_state
        .catalog_repo
        .create_gift_item(
            merchant.id,
            payload.category_id,
            &payload.title,
            payload.description.as_deref(),
            payload.price,
            &payload.valid_location_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/cafes/gift-items/{item_id}
pub async fn update_gift_item(
    State(app_state): State<AppState>,
    AuthenticatedMerchant(merchant): AuthenticatedMerchant,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<GiftItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let my_locations = app_state.merchant_repo.list_locations(merchant.id).await?;
    for loc_id in &payload.valid_location_ids {
        if !my_locations.iter().any(|loc| loc.id == *loc_id) {
            return Err(AppError::LocationNotFound);
        }
    }

    let item = app_state
        .catalog_repo
        .update_gift_item(
            item_id,
            merchant.id,
            payload.category_id,
            &payload.title,
            payload.description.as_deref(),
            payload.price,
            &payload.valid_location_ids,
            payload.is_active,
        )
        .await?
        .ok_or(AppError::GiftItemNotFound)?;

    Ok((StatusCode::OK, Json(item)))
}

// GET /api/cafes/gift-items
pub async fn list_my_gift_items(
    State(app_state): State<AppState>,
    AuthenticatedMerchant(merchant): AuthenticatedMerchant,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.catalog_repo.list_by_merchant(merchant.id).await?;
    Ok((StatusCode::OK, Json(items)))
}

// ---
// Portal do comerciante: locais
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,
}

// POST /api/cafes/locations
pub async fn create_location(
    State(app_state): State<AppState>,
    AuthenticatedMerchant(merchant): AuthenticatedMerchant,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .merchant_repo
        .create_location(merchant.id, &payload.name, &payload.address)
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

// GET /api/cafes/locations
pub async fn list_my_locations(
    State(app_state): State<AppState>,
    AuthenticatedMerchant(merchant): AuthenticatedMerchant,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state.merchant_repo.list_locations(merchant.id).await?;
    Ok((StatusCode::OK, Json(locations)))
}
