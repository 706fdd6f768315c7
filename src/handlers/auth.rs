// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedMerchant,
    models::auth::{AuthResponse, LoginPayload, RegisterMerchantPayload},
    models::merchant::Merchant,
};

const SESSION_COOKIE: &str = "cafe-token";

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// POST /api/auth/register (o comerciante entra como PENDING)
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterMerchantPayload,
    responses(
        (status = 201, description = "Comerciante criado (aguardando aprovação)", body = AuthResponse),
        (status = 409, description = "E-mail já está em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterMerchantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (_merchant, token) = app_state
        .auth_service
        .register_merchant(
            &payload.name,
            &payload.email,
            &payload.password,
            payload.bank_iban.as_deref(),
        )
        .await?;

    let jar = jar.add(session_cookie(&token));
    Ok((StatusCode::CREATED, jar, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (_merchant, token) = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    let jar = jar.add(session_cookie(&token));
    Ok((StatusCode::OK, jar, Json(AuthResponse { token })))
}

// GET /api/cafes/me (rota protegida)
pub async fn get_me(AuthenticatedMerchant(merchant): AuthenticatedMerchant) -> Json<Merchant> {
    Json(merchant)
}
