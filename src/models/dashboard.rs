// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{transaction::TransactionKind, voucher::VoucherStatus};

// --- Linhas tipadas da agregação ---
// Validadas na borda do banco antes de qualquer aritmética: nada de
// resultado de pipeline dinâmico circulando pelo código.

#[derive(Debug, Clone, FromRow)]
pub struct VoucherStatusRow {
    pub status: VoucherStatus,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct TransactionSumRow {
    pub kind: TransactionKind,
    pub count: i64,
    pub total_amount: Decimal,
}

// Uma linha por transação de compra na janela; o stripe_fee pode estar
// ausente e aí é recalculado pela fórmula fixa (1,4% + €0,25).
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseFeeRow {
    pub amount: Decimal,
    pub amount_gross: Option<Decimal>,
    pub stripe_fee: Option<Decimal>,
}

// --- Resposta do dashboard ---

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherCounts {
    pub pending: i64,
    pub issued: i64,
    pub unredeemed: i64,
    pub redeemed: i64,
    pub refunded: i64,
    pub disputed: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub voucher_counts: VoucherCounts,

    #[schema(example = "120.00")]
    pub revenue: Decimal,
    #[schema(example = "1.93")]
    pub stripe_fees: Decimal,
    #[schema(example = "12.00")]
    pub commission: Decimal,
    #[schema(example = "40.00")]
    pub redeemed_amount: Decimal,

    // balance = revenue - stripe_fees - commission(se ativa) + redeemed_amount
    #[schema(example = "146.07")]
    pub balance: Decimal,

    // Repasse liberado a partir de €5
    pub payout_eligible: bool,
}
