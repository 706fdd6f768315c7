// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Category, GiftItem},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Itens de presente ---

    pub async fn create_gift_item(
        &self,
        merchant_id: Uuid,
        category_id: Option<Uuid>,
        title: &str,
        description: Option<&str>,
        price: Decimal,
        valid_location_ids: &[Uuid],
    ) -> Result<GiftItem, AppError> {
        let item = sqlx::query_as::<_, GiftItem>(
            r#"
            INSERT INTO gift_items (merchant_id, category_id, title, description, price, valid_location_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(category_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(valid_location_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn update_gift_item(
        &self,
        id: Uuid,
        merchant_id: Uuid,
        category_id: Option<Uuid>,
        title: &str,
        description: Option<&str>,
        price: Decimal,
        valid_location_ids: &[Uuid],
        is_active: bool,
    ) -> Result<Option<GiftItem>, AppError> {
        // O merchant_id entra no WHERE: um comerciante não edita item dos outros
        let item = sqlx::query_as::<_, GiftItem>(
            r#"
            UPDATE gift_items
            SET category_id = $3, title = $4, description = $5,
                price = $6, valid_location_ids = $7, is_active = $8,
                updated_at = now()
            WHERE id = $1 AND merchant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(merchant_id)
        .bind(category_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(valid_location_ids)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn find_gift_item(&self, id: Uuid) -> Result<Option<GiftItem>, AppError> {
        let item = sqlx::query_as::<_, GiftItem>("SELECT * FROM gift_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn list_by_merchant(&self, merchant_id: Uuid) -> Result<Vec<GiftItem>, AppError> {
        let items = sqlx::query_as::<_, GiftItem>(
            "SELECT * FROM gift_items WHERE merchant_id = $1 ORDER BY created_at DESC",
        )
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // Vitrine pública: só itens ativos de comerciantes aprovados
    pub async fn list_active(&self, category_id: Option<Uuid>) -> Result<Vec<GiftItem>, AppError> {
        let items = sqlx::query_as::<_, GiftItem>(
            r#"
            SELECT gi.* FROM gift_items gi
            JOIN merchants m ON m.id = gi.merchant_id
            WHERE gi.is_active = TRUE
              AND m.status = 'APPROVED'
              AND ($1::uuid IS NULL OR gi.category_id = $1)
            ORDER BY gi.created_at DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // --- Categorias ---

    pub async fn create_category(&self, name: &str, slug: &str) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }
}
