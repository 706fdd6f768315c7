// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CatalogRepository, DashboardRepository, MerchantRepository, TransactionRepository,
        VoucherRepository,
    },
    services::{
        auth_service::AuthService, dashboard_service::DashboardService,
        document_service::DocumentService, mailer_service::MailerService,
        voucher_service::VoucherService, webhook_service::WebhookService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação.
// Tudo explícito: nada de cliente global nem segredo com fallback.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub stripe_webhook_secret: String,

    pub auth_service: AuthService,
    pub voucher_service: VoucherService,
    pub webhook_service: WebhookService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,

    // CRUD simples fala direto com os repositórios
    pub merchant_repo: MerchantRepository,
    pub catalog_repo: CatalogRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let stripe_webhook_secret =
            env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET deve ser definido");

        // E-mail transacional (API HTTP)
        let email_api_url = env::var("EMAIL_API_URL").expect("EMAIL_API_URL deve ser definida");
        let email_api_key = env::var("EMAIL_API_KEY").expect("EMAIL_API_KEY deve ser definida");
        let email_from =
            env::var("EMAIL_FROM").unwrap_or_else(|_| "Brontie <vouchers@brontie.eu>".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let voucher_repo = VoucherRepository::new(db_pool.clone());
        let transaction_repo = TransactionRepository::new();
        let merchant_repo = MerchantRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let mailer = MailerService::new(email_api_url, email_api_key, email_from);

        let auth_service = AuthService::new(merchant_repo.clone(), jwt_secret);
        let voucher_service = VoucherService::new(
            db_pool.clone(),
            voucher_repo.clone(),
            transaction_repo.clone(),
            catalog_repo.clone(),
            merchant_repo.clone(),
        );
        let webhook_service = WebhookService::new(
            db_pool.clone(),
            voucher_repo.clone(),
            transaction_repo,
            catalog_repo.clone(),
            merchant_repo.clone(),
            mailer,
        );
        let dashboard_service = DashboardService::new(dashboard_repo);
        let document_service =
            DocumentService::new(voucher_repo, catalog_repo.clone(), merchant_repo.clone());

        Ok(Self {
            db_pool,
            stripe_webhook_secret,
            auth_service,
            voucher_service,
            webhook_service,
            dashboard_service,
            document_service,
            merchant_repo,
            catalog_repo,
        })
    }
}
