// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedMerchant,
    models::dashboard::DashboardSummary,
};

// GET /api/cafes/dashboard
//
// Resumo financeiro do comerciante: últimos 30 dias (com piso na data de
// lançamento). Só leitura, nada de escrita aqui.
#[utoipa::path(
    get,
    path = "/api/cafes/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo financeiro do comerciante", body = DashboardSummary),
        (status = 401, description = "Sessão ausente ou inválida")
    ),
    security(("cafe_token" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedMerchant(merchant): AuthenticatedMerchant,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary(&merchant).await?;

    Ok((StatusCode::OK, Json(summary)))
}
