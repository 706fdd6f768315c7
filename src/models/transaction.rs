// src/models/transaction.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    Purchase,   // Compra confirmada pelo webhook
    Redemption, // Resgate na loja
    Refund,     // Reembolso integral
    Failed,     // Disputa / chargeback
}

// Lançamento imutável do razão: criado uma vez, nunca alterado.
// Serve exclusivamente para a agregação do dashboard.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub voucher_id: Uuid,
    #[schema(ignore)]
    pub merchant_id: Uuid,
    pub kind: TransactionKind,

    #[schema(example = "10.00")]
    pub amount: Decimal,
    pub stripe_fee: Option<Decimal>,

    pub created_at: DateTime<Utc>,
}
