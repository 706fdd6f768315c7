// src/models/stripe_event.rs
//
// Tipos mínimos do envelope de eventos do Stripe. Só desserializamos os
// campos que realmente usamos; o resto do payload fica no Value.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

// Chaves de metadata que a loja grava na sessão de checkout
pub const META_GIFT_ITEM_ID: &str = "gift_item_id";
pub const META_VOUCHER_ID: &str = "voucher_id";
pub const META_REFERRAL_TOKEN: &str = "referral_token";
pub const META_SENDER_EMAIL: &str = "sender_email";

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    // O objeto interno muda de tipo conforme o event_type
    pub fn object_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_intent: Option<String>,
    pub amount_total: Option<i64>,
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Charge {
    pub payment_intent: Option<String>,
    pub amount: i64,
    pub amount_refunded: i64,
}

impl Charge {
    // Só reembolso INTEGRAL muda o status do voucher
    pub fn is_full_refund(&self) -> bool {
        self.amount_refunded == self.amount
    }
}

#[derive(Debug, Deserialize)]
pub struct Dispute {
    pub payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectAccount {
    pub id: String,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
}

// O Stripe manda valores em centavos
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKOUT_FIXTURE: &str = r#"{
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_a1",
                "object": "checkout.session",
                "payment_intent": "pi_1",
                "amount_total": 1000,
                "customer_details": { "email": "ana@example.com", "name": "Ana" },
                "metadata": { "gift_item_id": "8f14e45f-ceea-467f-a8cb-000000000001", "voucher_id": "8f14e45f-ceea-467f-a8cb-000000000002" }
            }
        }
    }"#;

    #[test]
    fn parse_checkout_session_completed() {
        let event: StripeEvent = serde_json::from_str(CHECKOUT_FIXTURE).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");

        let session: CheckoutSession = event.object_as().unwrap();
        assert_eq!(session.payment_intent.as_deref(), Some("pi_1"));
        assert_eq!(session.amount_total, Some(1000));
        assert_eq!(
            session.metadata.get(META_VOUCHER_ID).map(String::as_str),
            Some("8f14e45f-ceea-467f-a8cb-000000000002")
        );
        assert_eq!(
            session.customer_details.unwrap().email.as_deref(),
            Some("ana@example.com")
        );
    }

    #[test]
    fn malformed_envelope_never_parses() {
        // Corpo truncado ou sem o envelope esperado: erro permanente,
        // reprocessar o mesmo payload nunca vai dar certo
        assert!(serde_json::from_str::<StripeEvent>(r#"{"id": "evt_1""#).is_err());
        assert!(serde_json::from_str::<StripeEvent>(r#"{"id": "evt_1"}"#).is_err());
        assert!(serde_json::from_str::<StripeEvent>("nao é json").is_err());
    }

    #[test]
    fn charge_full_vs_partial_refund() {
        let full: Charge = serde_json::from_str(
            r#"{ "payment_intent": "pi_1", "amount": 1000, "amount_refunded": 1000 }"#,
        )
        .unwrap();
        assert!(full.is_full_refund());

        let partial: Charge = serde_json::from_str(
            r#"{ "payment_intent": "pi_1", "amount": 1000, "amount_refunded": 400 }"#,
        )
        .unwrap();
        assert!(!partial.is_full_refund());
    }

    #[test]
    fn cents_conversion() {
        assert_eq!(cents_to_decimal(1000).to_string(), "10.00");
        assert_eq!(cents_to_decimal(25).to_string(), "0.25");
    }
}
