// src/db/merchant_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::merchant::{Merchant, MerchantLocation, MerchantStatus},
};

#[derive(Clone)]
pub struct MerchantRepository {
    pool: PgPool,
}

impl MerchantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Cria um novo comerciante (sempre entra como PENDING)
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        bank_iban: Option<&str>,
    ) -> Result<Merchant, AppError> {
        sqlx::query_as::<_, Merchant>(
            r#"
            INSERT INTO merchants (name, email, password_hash, bank_iban)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(bank_iban)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Merchant>, AppError> {
        let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(merchant)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Merchant>, AppError> {
        let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(merchant)
    }

    pub async fn list_all(&self) -> Result<Vec<Merchant>, AppError> {
        let merchants =
            sqlx::query_as::<_, Merchant>("SELECT * FROM merchants ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(merchants)
    }

    // Aprovação/recusa pelo admin
    pub async fn set_status(
        &self,
        id: Uuid,
        status: MerchantStatus,
    ) -> Result<Option<Merchant>, AppError> {
        let merchant = sqlx::query_as::<_, Merchant>(
            "UPDATE merchants SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(merchant)
    }

    // Liga/desliga a taxa Brontie e ajusta a comissão
    pub async fn set_fee_settings(
        &self,
        id: Uuid,
        fee_active: bool,
        commission_rate: Decimal,
    ) -> Result<Option<Merchant>, AppError> {
        let merchant = sqlx::query_as::<_, Merchant>(
            r#"
            UPDATE merchants
            SET fee_active = $2, commission_rate = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fee_active)
        .bind(commission_rate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(merchant)
    }

    // Sincroniza as capacidades do Stripe Connect (evento account.updated)
    pub async fn sync_connect_flags(
        &self,
        stripe_account_id: &str,
        charges_enabled: bool,
        payouts_enabled: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE merchants
            SET charges_enabled = $2, payouts_enabled = $3, updated_at = now()
            WHERE stripe_account_id = $1
            "#,
        )
        .bind(stripe_account_id)
        .bind(charges_enabled)
        .bind(payouts_enabled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // --- Locais físicos ---

    pub async fn create_location(
        &self,
        merchant_id: Uuid,
        name: &str,
        address: &str,
    ) -> Result<MerchantLocation, AppError> {
        let location = sqlx::query_as::<_, MerchantLocation>(
            r#"
            INSERT INTO merchant_locations (merchant_id, name, address)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(name)
        .bind(address)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    pub async fn list_locations(
        &self,
        merchant_id: Uuid,
    ) -> Result<Vec<MerchantLocation>, AppError> {
        let locations = sqlx::query_as::<_, MerchantLocation>(
            "SELECT * FROM merchant_locations WHERE merchant_id = $1 ORDER BY name",
        )
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    pub async fn find_location(&self, id: Uuid) -> Result<Option<MerchantLocation>, AppError> {
        let location =
            sqlx::query_as::<_, MerchantLocation>("SELECT * FROM merchant_locations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(location)
    }
}
