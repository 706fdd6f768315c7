// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{common::error::AppError, config::AppState, models::merchant::Merchant};

// Nome do cookie de sessão do portal do comerciante
const SESSION_COOKIE: &str = "cafe-token";

fn extract_token(request: &axum::http::Request<axum::body::Body>) -> Option<String> {
    // 1. Cookie assinado da sessão web
    let jar = CookieJar::from_headers(request.headers());
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    // 2. Fallback: Authorization Bearer (app mobile)
    request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

// Guarda das rotas do portal (/api/cafes/*)
pub async fn cafe_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::AuthenticationRequired)?;

    let merchant = app_state.auth_service.validate_token(&token).await?;

    // Insere o comerciante nos "extensions" da requisição
    request.extensions_mut().insert(merchant);
    Ok(next.run(request).await)
}

// Guarda das rotas de back-office (/api/admin/*)
pub async fn admin_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::AuthenticationRequired)?;

    let merchant = app_state.auth_service.validate_token(&token).await?;
    if !merchant.is_admin {
        return Err(AppError::AuthenticationRequired);
    }

    request.extensions_mut().insert(merchant);
    Ok(next.run(request).await)
}

// Extrator para obter o comerciante autenticado diretamente nos handlers
pub struct AuthenticatedMerchant(pub Merchant);

impl<S> FromRequestParts<S> for AuthenticatedMerchant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Merchant>()
            .cloned()
            .map(AuthenticatedMerchant)
            .ok_or(AppError::AuthenticationRequired)
    }
}
