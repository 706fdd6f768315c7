// src/db/transaction_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::transaction::{Transaction, TransactionKind},
};

// Razão imutável: este repositório só sabe inserir, sempre dentro da
// transação de quem chama. Não existe update nem delete aqui, de propósito.
#[derive(Clone)]
pub struct TransactionRepository;

impl TransactionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        voucher_id: Uuid,
        merchant_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        stripe_fee: Option<Decimal>,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (voucher_id, merchant_id, kind, amount, stripe_fee)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(voucher_id)
        .bind(merchant_id)
        .bind(kind)
        .bind(amount)
        .bind(stripe_fee)
        .fetch_one(executor)
        .await?;

        Ok(transaction)
    }
}
