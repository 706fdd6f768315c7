// src/models/voucher.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "voucher_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum VoucherStatus {
    Pending,    // Placeholder criado no checkout, aguardando o webhook
    Issued,     // Criado direto pelo webhook, confirmação ainda não estampada
    Unredeemed, // Pago e confirmado, pronto para resgate
    Redeemed,   // Resgatado na loja
    Refunded,   // Reembolso integral
    Disputed,   // Chargeback aberto
}

// Motivo pelo qual um resgate foi recusado, na ordem de verificação
// do endpoint de resgate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionBlock {
    AlreadyRedeemed,
    PaymentProcessing,
    Refunded,
    Disputed,
}

impl VoucherStatus {
    /// Verifica se o resgate é permitido a partir deste estado.
    /// A ordem das checagens segue o contrato do endpoint: já resgatado,
    /// pagamento em processamento, reembolsado, em disputa.
    pub fn redemption_block(&self) -> Result<(), RedemptionBlock> {
        match self {
            VoucherStatus::Redeemed => Err(RedemptionBlock::AlreadyRedeemed),
            VoucherStatus::Pending | VoucherStatus::Issued => {
                Err(RedemptionBlock::PaymentProcessing)
            }
            VoucherStatus::Refunded => Err(RedemptionBlock::Refunded),
            VoucherStatus::Disputed => Err(RedemptionBlock::Disputed),
            VoucherStatus::Unredeemed => Ok(()),
        }
    }

    // Um voucher já resgatado NUNCA pode ser reembolsado.
    pub fn refundable(&self) -> bool {
        !matches!(self, VoucherStatus::Redeemed)
    }

    /// As únicas arestas permitidas do ciclo de vida. Tudo fora daqui
    /// é bug (o voucher só anda para frente, salvo reembolso/disputa).
    pub fn can_transition_to(&self, next: VoucherStatus) -> bool {
        use VoucherStatus::*;
        match (self, next) {
            (Pending, Unredeemed) => true,
            (Issued, Unredeemed) => true,
            (Unredeemed, Redeemed) => true,
            // Reembolso: qualquer estado não-resgatado
            (from, Refunded) => from.refundable() && *from != Refunded,
            // Disputa pode chegar a qualquer momento (inclusive após reembolso)
            (from, Disputed) => *from != Disputed,
            _ => false,
        }
    }
}

// Representa um voucher vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: Uuid,
    pub redemption_code: String,
    pub status: VoucherStatus,

    pub gift_item_id: Uuid,
    #[schema(ignore)]
    pub merchant_id: Uuid,

    #[schema(example = "10.00")]
    pub amount: Decimal,
    pub amount_gross: Option<Decimal>,
    pub stripe_fee: Option<Decimal>,

    // Cópia dos locais válidos no momento da emissão (não é link vivo)
    pub valid_location_ids: Vec<Uuid>,

    #[serde(skip_serializing)]
    pub payment_intent_id: Option<String>,

    pub buyer_name: Option<String>,
    #[serde(skip_serializing)]
    pub buyer_email: Option<String>,
    pub recipient_name: Option<String>,
    #[serde(skip_serializing)]
    pub recipient_email: Option<String>,

    // Corrente de indicação (viral loop)
    #[serde(skip_serializing)]
    pub recipient_token: Option<String>,
    pub recipient_became_sender: bool,
    #[serde(skip_serializing)]
    pub recipient_linked_sender_email: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
    pub issued_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl Voucher {
    pub fn is_location_valid(&self, location_id: Uuid) -> bool {
        self.valid_location_ids.contains(&location_id)
    }
}

// --- Payloads e respostas ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPayload {
    pub merchant_location_id: Uuid,
}

// O que o app do cliente mostra na tela após o resgate
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub gift_item_title: String,
    pub location_name: String,
    pub location_address: String,
    pub redeemed_at: DateTime<Utc>,
}

// Voucher de teste com dois locais válidos conhecidos; compartilhado
// pelos módulos de teste que precisam de um voucher completo.
#[cfg(test)]
pub fn test_voucher(status: VoucherStatus) -> Voucher {
    use rust_decimal::Decimal;

    Voucher {
        id: Uuid::from_u128(1),
        redemption_code: "ABCDEFGHJK".to_string(),
        status,
        gift_item_id: Uuid::from_u128(2),
        merchant_id: Uuid::from_u128(3),
        amount: Decimal::new(1000, 2),
        amount_gross: Some(Decimal::new(1000, 2)),
        stripe_fee: Some(Decimal::new(39, 2)),
        valid_location_ids: vec![Uuid::from_u128(10), Uuid::from_u128(11)],
        payment_intent_id: Some("pi_test".to_string()),
        buyer_name: Some("Ana".to_string()),
        buyer_email: Some("ana@example.com".to_string()),
        recipient_name: Some("Bruno".to_string()),
        recipient_email: None,
        recipient_token: Some("tok123".to_string()),
        recipient_became_sender: false,
        recipient_linked_sender_email: None,
        expires_at: None,
        issued_at: Utc::now(),
        confirmed_at: None,
        redeemed_at: None,
        refunded_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoucherStatus::*;

    #[test]
    fn redemption_only_from_unredeemed() {
        assert!(Unredeemed.redemption_block().is_ok());
        assert_eq!(
            Redeemed.redemption_block(),
            Err(RedemptionBlock::AlreadyRedeemed)
        );
        assert_eq!(
            Pending.redemption_block(),
            Err(RedemptionBlock::PaymentProcessing)
        );
        assert_eq!(
            Issued.redemption_block(),
            Err(RedemptionBlock::PaymentProcessing)
        );
        assert_eq!(Refunded.redemption_block(), Err(RedemptionBlock::Refunded));
        assert_eq!(Disputed.redemption_block(), Err(RedemptionBlock::Disputed));
    }

    #[test]
    fn location_must_be_in_copied_list() {
        let voucher = test_voucher(Unredeemed);
        assert!(voucher.is_location_valid(Uuid::from_u128(10)));
        assert!(voucher.is_location_valid(Uuid::from_u128(11)));
        assert!(!voucher.is_location_valid(Uuid::from_u128(99)));
    }

    #[test]
    fn redeemed_voucher_never_refundable() {
        assert!(!Redeemed.refundable());
        assert!(Unredeemed.refundable());
        assert!(Pending.refundable());
        assert!(Disputed.refundable());
    }

    #[test]
    fn lifecycle_edges() {
        // Arestas permitidas
        assert!(Pending.can_transition_to(Unredeemed));
        assert!(Issued.can_transition_to(Unredeemed));
        assert!(Unredeemed.can_transition_to(Redeemed));
        assert!(Unredeemed.can_transition_to(Refunded));
        assert!(Pending.can_transition_to(Refunded));
        assert!(Refunded.can_transition_to(Disputed));

        // Arestas proibidas
        assert!(!Issued.can_transition_to(Redeemed)); // precisa passar por Unredeemed
        assert!(!Pending.can_transition_to(Redeemed));
        assert!(!Redeemed.can_transition_to(Refunded)); // resgatado nunca é reembolsado
        assert!(!Redeemed.can_transition_to(Unredeemed)); // só anda para frente
        assert!(!Refunded.can_transition_to(Unredeemed));
    }
}
