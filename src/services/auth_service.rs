// src/services/auth_service.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::MerchantRepository,
    models::{auth::Claims, merchant::Merchant},
};

#[derive(Clone)]
pub struct AuthService {
    merchant_repo: MerchantRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(merchant_repo: MerchantRepository, jwt_secret: String) -> Self {
        Self {
            merchant_repo,
            jwt_secret,
        }
    }

    pub async fn register_merchant(
        &self,
        name: &str,
        email: &str,
        password: &str,
        bank_iban: Option<&str>,
    ) -> Result<(Merchant, String), AppError> {
        // Hashing em thread separada para não travar o runtime
        let password_clone = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let merchant = self
            .merchant_repo
            .create(name, email, &password_hash, bank_iban)
            .await?;

        tracing::info!("🏪 Novo comerciante registrado (pendente): {}", merchant.id);

        let token = self.create_token(&merchant)?;
        Ok((merchant, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(Merchant, String), AppError> {
        let merchant = self
            .merchant_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = merchant.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&merchant)?;
        Ok((merchant, token))
    }

    // Valida o JWT do cookie `cafe-token` e carrega o comerciante da sessão
    pub async fn validate_token(&self, token: &str) -> Result<Merchant, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.merchant_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::MerchantNotFound)
    }

    fn create_token(&self, merchant: &Merchant) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: merchant.id,
            adm: merchant.is_admin,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
