// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Estrutura de dados ("claims") dentro do JWT do cookie `cafe-token`
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do comerciante
    pub adm: bool,  // Sessão de administrador?
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// Dados para registro de um novo comerciante (entra como PENDING)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMerchantPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub bank_iban: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// O token vai no cookie, mas também devolvemos no corpo para o app mobile
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}
