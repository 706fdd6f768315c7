// src/models/merchant.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "merchant_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum MerchantStatus {
    Pending,  // Aguardando aprovação do admin
    Approved, // Pode vender
    Denied,   // Recusado
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub status: MerchantStatus,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub is_admin: bool,

    // Repasse: conta bancária ou Stripe Connect
    #[serde(skip_serializing)]
    pub bank_iban: Option<String>,
    pub stripe_account_id: Option<String>,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,

    // Taxa Brontie
    pub fee_active: bool,
    #[schema(example = "0.10")]
    pub commission_rate: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MerchantLocation {
    pub id: Uuid,
    #[schema(ignore)]
    pub merchant_id: Uuid,
    #[schema(example = "Café da Praça")]
    pub name: String,
    #[schema(example = "Rua das Flores, 12")]
    pub address: String,
    pub created_at: DateTime<Utc>,
}
