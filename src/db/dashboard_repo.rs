// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{PurchaseFeeRow, TransactionSumRow, VoucherStatusRow},
};

// Leituras agregadas do dashboard. Cada query devolve linhas tipadas
// (FromRow); a aritmética fica toda no service.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Snapshot consistente: as três leituras rodam na mesma transação
    pub async fn fetch_window(
        &self,
        merchant_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<
        (
            Vec<VoucherStatusRow>,
            Vec<TransactionSumRow>,
            Vec<PurchaseFeeRow>,
        ),
        AppError,
    > {
        let mut tx = self.pool.begin().await?;

        // A. Vouchers por status
        let voucher_rows = sqlx::query_as::<_, VoucherStatusRow>(
            r#"
            SELECT status,
                   COUNT(*) AS count,
                   COALESCE(SUM(amount), 0) AS total_amount
            FROM vouchers
            WHERE merchant_id = $1 AND issued_at >= $2
            GROUP BY status
            "#,
        )
        .bind(merchant_id)
        .bind(since)
        .fetch_all(&mut *tx)
        .await?;

        // B. Transações por tipo
        let transaction_rows = sqlx::query_as::<_, TransactionSumRow>(
            r#"
            SELECT kind,
                   COUNT(*) AS count,
                   COALESCE(SUM(amount), 0) AS total_amount
            FROM transactions
            WHERE merchant_id = $1 AND created_at >= $2
            GROUP BY kind
            "#,
        )
        .bind(merchant_id)
        .bind(since)
        .fetch_all(&mut *tx)
        .await?;

        // C. Uma linha por compra, para recalcular a taxa do Stripe
        //    quando ela não foi armazenada
        let fee_rows = sqlx::query_as::<_, PurchaseFeeRow>(
            r#"
            SELECT t.amount,
                   v.amount_gross,
                   t.stripe_fee
            FROM transactions t
            JOIN vouchers v ON v.id = t.voucher_id
            WHERE t.merchant_id = $1
              AND t.kind = 'PURCHASE'
              AND t.created_at >= $2
            "#,
        )
        .bind(merchant_id)
        .bind(since)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((voucher_rows, transaction_rows, fee_rows))
    }
}
