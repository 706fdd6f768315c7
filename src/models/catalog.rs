// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Cafeterias")]
    pub name: String,
    #[schema(example = "cafeterias")]
    pub slug: String,
}

// Produto que um comerciante oferece como voucher de presente.
// Os locais válidos são COPIADOS para o voucher na compra.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GiftItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub merchant_id: Uuid,
    pub category_id: Option<Uuid>,

    #[schema(example = "Café da manhã para dois")]
    pub title: String,
    pub description: Option<String>,

    #[schema(example = "10.00")]
    pub price: Decimal,

    pub valid_location_ids: Vec<Uuid>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
