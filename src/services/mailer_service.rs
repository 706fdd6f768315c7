// src/services/mailer_service.rs

use rust_decimal::Decimal;
use serde_json::json;

use crate::common::error::AppError;

// Envio de e-mail transacional via API HTTP (estilo Resend/Mailgun).
// Quem chama decide se o erro é fatal; no webhook ele é engolido.
#[derive(Clone)]
pub struct MailerService {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl MailerService {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }

    pub async fn send_voucher_confirmation(
        &self,
        to: &str,
        redemption_code: &str,
        gift_item_title: &str,
        amount: Decimal,
    ) -> Result<(), AppError> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": format!("Seu voucher: {}", gift_item_title),
            "html": format!(
                "<p>Obrigado pela compra de <strong>{}</strong> (€ {}).</p>\
                 <p>Código de resgate: <strong>{}</strong></p>\
                 <p>Apresente este código (ou o QR) na loja para resgatar.</p>",
                gift_item_title, amount, redemption_code
            ),
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao chamar a API de e-mail: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("API de e-mail retornou {}: {}", status, text).into());
        }

        tracing::info!("📧 E-mail de confirmação enviado para {}", to);
        Ok(())
    }
}
