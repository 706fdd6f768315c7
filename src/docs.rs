// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Storefront ---
        handlers::catalog::list_active_gift_items,
        handlers::catalog::list_categories,
        handlers::voucher::create_checkout,

        // --- Voucher ---
        handlers::voucher::redeem,
        handlers::voucher::get_by_code,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,

        // --- Webhook ---
        handlers::webhook::stripe_webhook,
    ),
    components(
        schemas(
            // --- Voucher ---
            models::voucher::VoucherStatus,
            models::voucher::Voucher,
            models::voucher::RedeemPayload,
            models::voucher::RedeemResponse,

            // --- Comerciantes ---
            models::merchant::MerchantStatus,
            models::merchant::Merchant,
            models::merchant::MerchantLocation,

            // --- Vitrine ---
            models::catalog::Category,
            models::catalog::GiftItem,

            // --- Auth ---
            models::auth::RegisterMerchantPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Dashboard ---
            models::dashboard::VoucherCounts,
            models::dashboard::DashboardSummary,

            // --- Payloads ---
            handlers::voucher::CreateCheckoutPayload,
            handlers::voucher::CheckoutResponse,
        )
    ),
    tags(
        (name = "Storefront", description = "Vitrine pública e checkout"),
        (name = "Voucher", description = "Consulta e resgate de vouchers"),
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Dashboard", description = "Indicadores financeiros do comerciante"),
        (name = "Webhook", description = "Eventos do Stripe")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cafe_token",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("cafe-token"))),
        );
    }
}
