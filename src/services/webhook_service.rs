// src/services/webhook_service.rs
//
// Traduz eventos do Stripe em mudanças de estado de Voucher/Transaction.
//
// Política de erros (uniforme em todos os ramos): recusas de domínio são
// TERMINAIS: logamos e confirmamos o evento com 200, senão o Stripe
// reenvia para sempre. Só erros de infraestrutura (banco, interno) sobem
// como Err e viram 5xx para acionar o retry automático do Stripe.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{voucher_repo::NewVoucher, CatalogRepository, MerchantRepository, TransactionRepository, VoucherRepository},
    models::{
        stripe_event::{
            cents_to_decimal, Charge, CheckoutSession, ConnectAccount, Dispute, StripeEvent,
            META_GIFT_ITEM_ID, META_REFERRAL_TOKEN, META_SENDER_EMAIL, META_VOUCHER_ID,
        },
        transaction::TransactionKind,
        voucher::{Voucher, VoucherStatus},
    },
    services::{
        dashboard_service::recompute_stripe_fee,
        mailer_service::MailerService,
        voucher_service::generate_redemption_code,
    },
};

type HmacSha256 = Hmac<Sha256>;

// Tolerância do timestamp da assinatura (proteção contra replay)
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verifica o cabeçalho `stripe-signature` (formato `t=...,v1=...`):
/// HMAC-SHA256 do payload `"{t}.{corpo}"` com o segredo compartilhado.
pub fn verify_signature(secret: &str, payload: &str, header: &str) -> Result<(), AppError> {
    verify_signature_at(secret, payload, header, Utc::now().timestamp())
}

// Separado para os testes poderem injetar o relógio
fn verify_signature_at(
    secret: &str,
    payload: &str,
    header: &str,
    now_unix: i64,
) -> Result<(), AppError> {
    let mut timestamp: Option<i64> = None;
    let mut v1_signature: Option<&str> = None;

    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => v1_signature = Some(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(AppError::InvalidSignature)?;
    let v1_signature = v1_signature.ok_or(AppError::InvalidSignature)?;

    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::InvalidSignature);
    }

    let secret_key = secret.strip_prefix("whsec_").unwrap_or(secret);
    let signed_payload = format!("{}.{}", timestamp, payload);

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|_| AppError::InvalidSignature)?;
    mac.update(signed_payload.as_bytes());
    let computed = hex::encode(mac.finalize().into_bytes());

    if computed != v1_signature {
        return Err(AppError::InvalidSignature);
    }

    Ok(())
}

// Classificação do replay de checkout.session.completed: se o voucher
// desse payment_intent já saiu de PENDING/ISSUED, o evento inteiro já
// foi processado e o replay é confirmado sem efeito.
fn checkout_already_processed(voucher: &Voucher) -> bool {
    !matches!(
        voucher.status,
        VoucherStatus::Pending | VoucherStatus::Issued
    )
}

#[derive(Clone)]
pub struct WebhookService {
    pool: PgPool,
    voucher_repo: VoucherRepository,
    transaction_repo: TransactionRepository,
    catalog_repo: CatalogRepository,
    merchant_repo: MerchantRepository,
    mailer: MailerService,
}

impl WebhookService {
    pub fn new(
        pool: PgPool,
        voucher_repo: VoucherRepository,
        transaction_repo: TransactionRepository,
        catalog_repo: CatalogRepository,
        merchant_repo: MerchantRepository,
        mailer: MailerService,
    ) -> Self {
        Self {
            pool,
            voucher_repo,
            transaction_repo,
            catalog_repo,
            merchant_repo,
            mailer,
        }
    }

    pub async fn handle_event(&self, event: &StripeEvent) -> Result<(), AppError> {
        match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSession = event
                    .object_as()
                    .map_err(|e| anyhow::anyhow!("Payload de checkout inválido: {}", e))?;
                self.handle_checkout_completed(session).await
            }
            "charge.refunded" => {
                let charge: Charge = event
                    .object_as()
                    .map_err(|e| anyhow::anyhow!("Payload de charge inválido: {}", e))?;
                self.handle_charge_refunded(charge).await
            }
            kind if kind.starts_with("charge.dispute.") => {
                let dispute: Dispute = event
                    .object_as()
                    .map_err(|e| anyhow::anyhow!("Payload de disputa inválido: {}", e))?;
                self.handle_dispute(dispute).await
            }
            "account.updated" => {
                let account: ConnectAccount = event
                    .object_as()
                    .map_err(|e| anyhow::anyhow!("Payload de conta inválido: {}", e))?;
                self.handle_account_updated(account).await
            }
            other => {
                // Evento que não nos interessa: confirma e segue
                tracing::debug!("Evento ignorado: {}", other);
                Ok(())
            }
        }
    }

    // --- checkout.session.completed ---

    async fn handle_checkout_completed(&self, session: CheckoutSession) -> Result<(), AppError> {
        let Some(payment_intent) = session.payment_intent.clone() else {
            tracing::warn!("Sessão {} sem payment_intent; evento descartado", session.id);
            return Ok(());
        };

        // Idempotência: replay do mesmo payment_intent nunca duplica voucher
        if let Some(existing) = self
            .voucher_repo
            .find_by_payment_intent(&payment_intent)
            .await?
        {
            if checkout_already_processed(&existing) {
                tracing::info!(
                    "Replay de checkout.session.completed para {} (voucher {} já {:?})",
                    payment_intent,
                    existing.id,
                    existing.status
                );
                return Ok(());
            }
        }

        let placeholder_id = session
            .metadata
            .get(META_VOUCHER_ID)
            .and_then(|raw| Uuid::parse_str(raw).ok());

        let voucher = match placeholder_id {
            Some(id) => self.confirm_placeholder(id, &payment_intent, &session).await?,
            None => self.create_from_session(&payment_intent, &session).await?,
        };

        let Some(voucher) = voucher else {
            // Recusa de domínio já logada: terminal
            return Ok(());
        };

        // Viral loop: o par de tokens na metadata marca o voucher
        // indicador como "destinatário virou comprador"
        if let Some(token) = session.metadata.get(META_REFERRAL_TOKEN) {
            let sender_email = session.metadata.get(META_SENDER_EMAIL).map(String::as_str);
            let updated = self
                .voucher_repo
                .mark_recipient_became_sender(token, sender_email)
                .await?;
            if updated > 0 {
                tracing::info!("🔗 Indicação registrada para o token {}", token);
            }
        }

        // E-mail de confirmação: melhor esforço, falha não derruba o evento
        let email = session
            .customer_details
            .as_ref()
            .and_then(|d| d.email.clone())
            .or_else(|| voucher.buyer_email.clone());

        if let Some(email) = email {
            let gift_item = self.catalog_repo.find_gift_item(voucher.gift_item_id).await?;
            let title = gift_item
                .map(|item| item.title)
                .unwrap_or_else(|| "Voucher de presente".to_string());

            if let Err(e) = self
                .mailer
                .send_voucher_confirmation(&email, &voucher.redemption_code, &title, voucher.amount)
                .await
            {
                tracing::warn!("Falha ao enviar e-mail de confirmação: {}", e);
            }
        }

        Ok(())
    }

    /// Caminho 1: o checkout criou um placeholder PENDING; agora viramos
    /// para UNREDEEMED e estampamos confirmed_at + valores do Stripe.
    async fn confirm_placeholder(
        &self,
        voucher_id: Uuid,
        payment_intent: &str,
        session: &CheckoutSession,
    ) -> Result<Option<Voucher>, AppError> {
        let Some(placeholder) = self.voucher_repo.find_by_id(voucher_id).await? else {
            tracing::warn!(
                "Metadata aponta para voucher {} inexistente; evento descartado",
                voucher_id
            );
            return Ok(None);
        };

        let gross = session
            .amount_total
            .map(cents_to_decimal)
            .unwrap_or(placeholder.amount);
        let fee = recompute_stripe_fee(gross);

        let mut tx = self.pool.begin().await?;

        let Some(confirmed) = self
            .voucher_repo
            .confirm(&mut *tx, voucher_id, payment_intent, gross, fee)
            .await?
        else {
            // Replay: o placeholder já foi confirmado antes
            tracing::info!("Voucher {} já confirmado anteriormente", voucher_id);
            return Ok(None);
        };

        self.transaction_repo
            .insert(
                &mut *tx,
                confirmed.id,
                confirmed.merchant_id,
                TransactionKind::Purchase,
                confirmed.amount,
                Some(fee),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("💳 Voucher {} confirmado (pi {})", confirmed.id, payment_intent);
        Ok(Some(confirmed))
    }

    /// Caminho 2: não havia placeholder, então cria o voucher direto do evento
    /// (ISSUED), com código novo, validade de 5 anos e locais copiados do
    /// item, e confirma na mesma transação.
    async fn create_from_session(
        &self,
        payment_intent: &str,
        session: &CheckoutSession,
    ) -> Result<Option<Voucher>, AppError> {
        let Some(gift_item_id) = session
            .metadata
            .get(META_GIFT_ITEM_ID)
            .and_then(|raw| Uuid::parse_str(raw).ok())
        else {
            tracing::warn!(
                "Sessão {} sem gift_item_id na metadata; evento descartado",
                session.id
            );
            return Ok(None);
        };

        let Some(gift_item) = self.catalog_repo.find_gift_item(gift_item_id).await? else {
            tracing::warn!("Item {} não encontrado; evento descartado", gift_item_id);
            return Ok(None);
        };

        let gross = session
            .amount_total
            .map(cents_to_decimal)
            .unwrap_or(gift_item.price);
        let fee = recompute_stripe_fee(gross);

        let customer = session.customer_details.as_ref();

        let params = NewVoucher {
            redemption_code: generate_redemption_code(),
            status: VoucherStatus::Issued,
            gift_item_id: gift_item.id,
            merchant_id: gift_item.merchant_id,
            amount: gift_item.price,
            amount_gross: Some(gross),
            stripe_fee: Some(fee),
            valid_location_ids: gift_item.valid_location_ids.clone(),
            payment_intent_id: Some(payment_intent.to_string()),
            buyer_name: customer.and_then(|c| c.name.clone()),
            buyer_email: customer.and_then(|c| c.email.clone()),
            recipient_name: None,
            recipient_email: None,
            recipient_token: Some(Uuid::new_v4().simple().to_string()),
            expires_at: Some(Utc::now() + chrono::Duration::days(365 * 5)),
        };

        let mut tx = self.pool.begin().await?;

        let issued = self.voucher_repo.create(&mut *tx, &params).await?;

        self.transaction_repo
            .insert(
                &mut *tx,
                issued.id,
                issued.merchant_id,
                TransactionKind::Purchase,
                issued.amount,
                Some(fee),
            )
            .await?;

        // ISSUED -> UNREDEEMED na mesma transação: o voucher nasce pronto
        // para resgate assim que o evento é processado
        let confirmed = self
            .voucher_repo
            .confirm(&mut *tx, issued.id, payment_intent, gross, fee)
            .await?
            .unwrap_or(issued);

        tx.commit().await?;

        tracing::info!("🎁 Voucher {} emitido via webhook (pi {})", confirmed.id, payment_intent);
        Ok(Some(confirmed))
    }

    // --- charge.refunded ---

    async fn handle_charge_refunded(&self, charge: Charge) -> Result<(), AppError> {
        // Reembolso parcial nunca muda o status do voucher
        if !charge.is_full_refund() {
            tracing::info!(
                "Reembolso parcial ({}/{}) ignorado",
                charge.amount_refunded,
                charge.amount
            );
            return Ok(());
        }

        let Some(payment_intent) = charge.payment_intent else {
            tracing::warn!("charge.refunded sem payment_intent; evento descartado");
            return Ok(());
        };

        let mut tx = self.pool.begin().await?;

        let refunded = self
            .voucher_repo
            .refund_if_refundable(&mut *tx, &payment_intent)
            .await?;

        match refunded {
            Some(voucher) => {
                self.transaction_repo
                    .insert(
                        &mut *tx,
                        voucher.id,
                        voucher.merchant_id,
                        TransactionKind::Refund,
                        voucher.amount,
                        None,
                    )
                    .await?;
                tx.commit().await?;
                tracing::info!("↩️ Voucher {} reembolsado", voucher.id);
            }
            None => {
                drop(tx);
                // Descobre por que o UPDATE condicional não pegou nada
                match self.voucher_repo.find_by_payment_intent(&payment_intent).await? {
                    Some(v) if v.status == VoucherStatus::Redeemed => {
                        // Voucher já resgatado NUNCA é reembolsado; sem
                        // Transaction de reembolso
                        tracing::warn!(
                            "Reembolso recusado: voucher {} já está resgatado",
                            v.id
                        );
                    }
                    Some(v) => {
                        tracing::info!("Replay de reembolso para o voucher {}", v.id);
                    }
                    None => {
                        tracing::warn!(
                            "charge.refunded para payment_intent desconhecido: {}",
                            payment_intent
                        );
                    }
                }
            }
        }

        Ok(())
    }

    // --- charge.dispute.* ---

    async fn handle_dispute(&self, dispute: Dispute) -> Result<(), AppError> {
        let Some(payment_intent) = dispute.payment_intent else {
            tracing::warn!("Disputa sem payment_intent; evento descartado");
            return Ok(());
        };

        let mut tx = self.pool.begin().await?;

        let Some(voucher) = self
            .voucher_repo
            .mark_disputed(&mut *tx, &payment_intent)
            .await?
        else {
            drop(tx);
            tracing::warn!(
                "Disputa para payment_intent desconhecido (ou já em disputa): {}",
                payment_intent
            );
            return Ok(());
        };

        self.transaction_repo
            .insert(
                &mut *tx,
                voucher.id,
                voucher.merchant_id,
                TransactionKind::Failed,
                voucher.amount,
                None,
            )
            .await?;

        tx.commit().await?;

        tracing::warn!("⚠️ Voucher {} marcado como em disputa", voucher.id);
        Ok(())
    }

    // --- account.updated ---

    async fn handle_account_updated(&self, account: ConnectAccount) -> Result<(), AppError> {
        let updated = self
            .merchant_repo
            .sync_connect_flags(&account.id, account.charges_enabled, account.payouts_enabled)
            .await?;

        if updated == 0 {
            tracing::debug!("account.updated para conta desconhecida: {}", account.id);
        } else {
            tracing::info!(
                "Capacidades do Connect sincronizadas para {} (charges={}, payouts={})",
                account.id,
                account.charges_enabled,
                account.payouts_enabled
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";

    fn sign(payload: &str, secret: &str, timestamp: i64) -> String {
        let signed_payload = format!("{}.{}", timestamp, payload);
        let key = secret.strip_prefix("whsec_").unwrap_or(secret);
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_accepted() {
        let payload = r#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = sign(payload, SECRET, now);
        assert!(verify_signature_at(SECRET, payload, &header, now).is_ok());
    }

    #[test]
    fn wrong_secret_rejected() {
        let payload = r#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = sign(payload, "whsec_outro_segredo", now);
        assert!(matches!(
            verify_signature_at(SECRET, payload, &header, now),
            Err(AppError::InvalidSignature)
        ));
    }

    #[test]
    fn modified_payload_rejected() {
        let now = 1_700_000_000;
        let header = sign(r#"{"amount":1000}"#, SECRET, now);
        assert!(matches!(
            verify_signature_at(SECRET, r#"{"amount":9999}"#, &header, now),
            Err(AppError::InvalidSignature)
        ));
    }

    #[test]
    fn old_timestamp_rejected() {
        let payload = r#"{}"#;
        let signed_at = 1_700_000_000;
        // Assinatura válida, mas 10 minutos velha
        let header = sign(payload, SECRET, signed_at);
        assert!(matches!(
            verify_signature_at(SECRET, payload, &header, signed_at + 600),
            Err(AppError::InvalidSignature)
        ));
    }

    #[test]
    fn malformed_header_rejected() {
        let now = 1_700_000_000;
        assert!(verify_signature_at(SECRET, "{}", "v1=abc", now).is_err());
        assert!(verify_signature_at(SECRET, "{}", "t=123", now).is_err());
        assert!(verify_signature_at(SECRET, "{}", "", now).is_err());
    }

    #[test]
    fn checkout_replay_skips_settled_vouchers() {
        use crate::models::voucher::test_voucher;

        // Ainda aguardando confirmação: o evento segue o fluxo normal
        assert!(!checkout_already_processed(&test_voucher(VoucherStatus::Pending)));
        assert!(!checkout_already_processed(&test_voucher(VoucherStatus::Issued)));

        // Já processado por inteiro: o replay é confirmado sem efeito
        assert!(checkout_already_processed(&test_voucher(VoucherStatus::Unredeemed)));
        assert!(checkout_already_processed(&test_voucher(VoucherStatus::Redeemed)));
        assert!(checkout_already_processed(&test_voucher(VoucherStatus::Refunded)));
        assert!(checkout_already_processed(&test_voucher(VoucherStatus::Disputed)));
    }
}
