//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{admin_guard, cafe_guard};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas da vitrine (sem sessão)
    let storefront_routes = Router::new()
        .route("/gift-items", get(handlers::catalog::list_active_gift_items))
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/checkout", post(handlers::voucher::create_checkout))
        .route("/voucher/code/{code}", get(handlers::voucher::get_by_code))
        .route("/voucher/{voucher_id}/redeem", post(handlers::voucher::redeem))
        .route("/voucher/{voucher_id}/pdf", get(handlers::voucher::get_pdf));

    // Autenticação do portal
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Portal do comerciante (protegido pelo cookie `cafe-token`)
    let cafe_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route(
            "/gift-items",
            post(handlers::catalog::create_gift_item).get(handlers::catalog::list_my_gift_items),
        )
        .route("/gift-items/{item_id}", put(handlers::catalog::update_gift_item))
        .route(
            "/locations",
            post(handlers::catalog::create_location).get(handlers::catalog::list_my_locations),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            cafe_guard,
        ));

    // Back-office (só admins)
    let admin_routes = Router::new()
        .route("/merchants", get(handlers::admin::list_merchants))
        .route(
            "/merchants/{merchant_id}/status",
            put(handlers::admin::set_merchant_status),
        )
        .route(
            "/merchants/{merchant_id}/fee",
            put(handlers::admin::set_merchant_fee),
        )
        .route("/categories", post(handlers::admin::create_category))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            admin_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/webhook/stripe", post(handlers::webhook::stripe_webhook))
        .nest("/api", storefront_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/cafes", cafe_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
