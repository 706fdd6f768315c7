// src/db/voucher_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::voucher::{Voucher, VoucherStatus},
};

// Parâmetros de criação (evita uma assinatura com 12 argumentos)
#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub redemption_code: String,
    pub status: VoucherStatus,
    pub gift_item_id: Uuid,
    pub merchant_id: Uuid,
    pub amount: Decimal,
    pub amount_gross: Option<Decimal>,
    pub stripe_fee: Option<Decimal>,
    pub valid_location_ids: Vec<Uuid>,
    pub payment_intent_id: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_token: Option<String>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

// O repositório de vouchers, responsável por todas as interações com a tabela 'vouchers'
#[derive(Clone)]
pub struct VoucherRepository {
    pool: PgPool,
}

impl VoucherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, params: &NewVoucher) -> Result<Voucher, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            INSERT INTO vouchers (
                redemption_code, status, gift_item_id, merchant_id,
                amount, amount_gross, stripe_fee, valid_location_ids,
                payment_intent_id, buyer_name, buyer_email,
                recipient_name, recipient_email, recipient_token, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&params.redemption_code)
        .bind(params.status)
        .bind(params.gift_item_id)
        .bind(params.merchant_id)
        .bind(params.amount)
        .bind(params.amount_gross)
        .bind(params.stripe_fee)
        .bind(&params.valid_location_ids)
        .bind(&params.payment_intent_id)
        .bind(&params.buyer_name)
        .bind(&params.buyer_email)
        .bind(&params.recipient_name)
        .bind(&params.recipient_email)
        .bind(&params.recipient_token)
        .bind(params.expires_at)
        .fetch_one(executor)
        .await?;

        Ok(voucher)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Voucher>, AppError> {
        let voucher = sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(voucher)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Voucher>, AppError> {
        let voucher =
            sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE redemption_code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(voucher)
    }

    // O payment_intent é único por voucher: é a chave de idempotência do webhook
    pub async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Voucher>, AppError> {
        let voucher =
            sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE payment_intent_id = $1")
                .bind(payment_intent_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(voucher)
    }

    /// Confirma um voucher pago: PENDING/ISSUED -> UNREDEEMED, estampando
    /// o confirmed_at e os valores do Stripe. UPDATE condicional: um replay
    /// do webhook não re-confirma (zero linhas afetadas).
    pub async fn confirm<'e, E>(
        &self,
        executor: E,
        voucher_id: Uuid,
        payment_intent_id: &str,
        amount_gross: Decimal,
        stripe_fee: Decimal,
    ) -> Result<Option<Voucher>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            UPDATE vouchers
            SET status = 'UNREDEEMED',
                confirmed_at = now(),
                payment_intent_id = $2,
                amount_gross = $3,
                stripe_fee = $4,
                expires_at = COALESCE(expires_at, now() + interval '5 years')
            WHERE id = $1 AND status IN ('PENDING', 'ISSUED')
            RETURNING *
            "#,
        )
        .bind(voucher_id)
        .bind(payment_intent_id)
        .bind(amount_gross)
        .bind(stripe_fee)
        .fetch_optional(executor)
        .await?;

        Ok(voucher)
    }

    /// Resgate atômico: o status só vira REDEEMED se ainda estiver
    /// UNREDEEMED. Nada de check-then-set em dois passos; duas scans
    /// simultâneas disputam esta única linha de UPDATE.
    pub async fn redeem_if_unredeemed<'e, E>(
        &self,
        executor: E,
        voucher_id: Uuid,
    ) -> Result<Option<Voucher>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            UPDATE vouchers
            SET status = 'REDEEMED', redeemed_at = now()
            WHERE id = $1 AND status = 'UNREDEEMED'
            RETURNING *
            "#,
        )
        .bind(voucher_id)
        .fetch_optional(executor)
        .await?;

        Ok(voucher)
    }

    /// Reembolso condicional: nunca toca um voucher REDEEMED (ou já
    /// REFUNDED: reembolso duplicado não gera segunda transição).
    pub async fn refund_if_refundable<'e, E>(
        &self,
        executor: E,
        payment_intent_id: &str,
    ) -> Result<Option<Voucher>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            UPDATE vouchers
            SET status = 'REFUNDED', refunded_at = now()
            WHERE payment_intent_id = $1
              AND status NOT IN ('REDEEMED', 'REFUNDED')
            RETURNING *
            "#,
        )
        .bind(payment_intent_id)
        .fetch_optional(executor)
        .await?;

        Ok(voucher)
    }

    // Disputa sobrescreve qualquer estado (chargeback depois de reembolso
    // é uma sequência real do Stripe)
    pub async fn mark_disputed<'e, E>(
        &self,
        executor: E,
        payment_intent_id: &str,
    ) -> Result<Option<Voucher>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
            UPDATE vouchers
            SET status = 'DISPUTED'
            WHERE payment_intent_id = $1 AND status <> 'DISPUTED'
            RETURNING *
            "#,
        )
        .bind(payment_intent_id)
        .fetch_optional(executor)
        .await?;

        Ok(voucher)
    }

    // Viral loop: o destinatário de um voucher antigo virou comprador
    pub async fn mark_recipient_became_sender(
        &self,
        referral_token: &str,
        sender_email: Option<&str>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET recipient_became_sender = TRUE,
                recipient_linked_sender_email = COALESCE($2, recipient_linked_sender_email)
            WHERE recipient_token = $1
            "#,
        )
        .bind(referral_token)
        .bind(sender_email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
