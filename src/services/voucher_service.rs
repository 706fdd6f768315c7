// src/services/voucher_service.rs

use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        voucher_repo::NewVoucher, CatalogRepository, MerchantRepository, TransactionRepository,
        VoucherRepository,
    },
    models::{
        merchant::MerchantStatus,
        transaction::TransactionKind,
        voucher::{RedemptionBlock, RedeemResponse, Voucher, VoucherStatus},
    },
};

// Sem 0/O/1/I para o atendente não se confundir ao digitar o código
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 10;

/// Gera um código de resgate curto e legível.
/// A unicidade fica por conta do índice único do banco.
pub fn generate_redemption_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

#[derive(Clone)]
pub struct VoucherService {
    pool: PgPool,
    voucher_repo: VoucherRepository,
    transaction_repo: TransactionRepository,
    catalog_repo: CatalogRepository,
    merchant_repo: MerchantRepository,
}

impl VoucherService {
    pub fn new(
        pool: PgPool,
        voucher_repo: VoucherRepository,
        transaction_repo: TransactionRepository,
        catalog_repo: CatalogRepository,
        merchant_repo: MerchantRepository,
    ) -> Self {
        Self {
            pool,
            voucher_repo,
            transaction_repo,
            catalog_repo,
            merchant_repo,
        }
    }

    /// Cria o voucher placeholder (PENDING) no momento em que a sessão de
    /// checkout é aberta. O webhook confirma (ou não) mais tarde.
    pub async fn create_checkout_placeholder(
        &self,
        gift_item_id: Uuid,
        buyer_name: Option<String>,
        buyer_email: Option<String>,
        recipient_name: Option<String>,
        recipient_email: Option<String>,
    ) -> Result<Voucher, AppError> {
        let gift_item = self
            .catalog_repo
            .find_gift_item(gift_item_id)
            .await?
            .filter(|item| item.is_active)
            .ok_or(AppError::GiftItemNotFound)?;

        let merchant = self
            .merchant_repo
            .find_by_id(gift_item.merchant_id)
            .await?
            .ok_or(AppError::MerchantNotFound)?;

        if merchant.status != MerchantStatus::Approved {
            return Err(AppError::MerchantNotApproved);
        }

        let params = NewVoucher {
            redemption_code: generate_redemption_code(),
            status: VoucherStatus::Pending,
            gift_item_id: gift_item.id,
            merchant_id: merchant.id,
            amount: gift_item.price,
            amount_gross: None,
            stripe_fee: None,
            // Cópia no momento da emissão: mudar o item depois não afeta
            // vouchers já vendidos
            valid_location_ids: gift_item.valid_location_ids.clone(),
            payment_intent_id: None,
            buyer_name,
            buyer_email,
            recipient_name,
            recipient_email,
            recipient_token: Some(Uuid::new_v4().simple().to_string()),
            expires_at: None, // Estampada na confirmação (5 anos)
        };

        let voucher = self.voucher_repo.create(&self.pool, &params).await?;
        tracing::info!("🎁 Placeholder de voucher criado: {}", voucher.id);

        Ok(voucher)
    }

    /// Resgate de um voucher escaneado na loja.
    /// As pré-condições são checadas na ordem do contrato; a virada de
    /// status em si é um único UPDATE condicional (sem check-then-set).
    pub async fn redeem(
        &self,
        voucher_id: Uuid,
        merchant_location_id: Uuid,
    ) -> Result<RedeemResponse, AppError> {
        let voucher = self
            .voucher_repo
            .find_by_id(voucher_id)
            .await?
            .ok_or(AppError::VoucherNotFound)?;

        check_redeem_preconditions(&voucher, merchant_location_id)?;

        let location = self
            .merchant_repo
            .find_location(merchant_location_id)
            .await?
            .ok_or(AppError::LocationNotFound)?;

        // 3. Virada atômica + lançamento no razão, na mesma transação
        let mut tx = self.pool.begin().await?;

        let redeemed = self
            .voucher_repo
            .redeem_if_unredeemed(&mut *tx, voucher_id)
            .await?;

        let redeemed = match redeemed {
            Some(v) => v,
            None => {
                // Perdemos a corrida: outro scan mudou o status entre a
                // leitura e o UPDATE. Relê e classifica de novo.
                drop(tx);
                let current = self
                    .voucher_repo
                    .find_by_id(voucher_id)
                    .await?
                    .ok_or(AppError::VoucherNotFound)?;
                return Err(current
                    .status
                    .redemption_block()
                    .err()
                    .map(redemption_block_to_error)
                    .unwrap_or(AppError::AlreadyRedeemed));
            }
        };

        self.transaction_repo
            .insert(
                &mut *tx,
                redeemed.id,
                redeemed.merchant_id,
                TransactionKind::Redemption,
                redeemed.amount,
                None,
            )
            .await?;

        tx.commit().await?;

        let gift_item = self
            .catalog_repo
            .find_gift_item(redeemed.gift_item_id)
            .await?
            .ok_or(AppError::GiftItemNotFound)?;

        tracing::info!("✅ Voucher {} resgatado em {}", redeemed.id, location.name);

        Ok(RedeemResponse {
            gift_item_title: gift_item.title,
            location_name: location.name,
            location_address: location.address,
            redeemed_at: redeemed.redeemed_at.unwrap_or_else(chrono::Utc::now),
        })
    }

    // Página do destinatário: consulta pelo código público
    pub async fn find_by_code(&self, code: &str) -> Result<Voucher, AppError> {
        self.voucher_repo
            .find_by_code(code)
            .await?
            .ok_or(AppError::VoucherNotFound)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Voucher, AppError> {
        self.voucher_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::VoucherNotFound)
    }
}

// Pré-condições do resgate, na ordem do contrato: primeiro o estado,
// depois o local. Só leitura; nenhum status muda antes do UPDATE atômico.
fn check_redeem_preconditions(voucher: &Voucher, location_id: Uuid) -> Result<(), AppError> {
    // 1. Estado permite resgate?
    voucher
        .status
        .redemption_block()
        .map_err(redemption_block_to_error)?;

    // 2. O QR escaneado pertence aos locais válidos do voucher?
    if !voucher.is_location_valid(location_id) {
        return Err(AppError::LocationNotValid);
    }

    Ok(())
}

fn redemption_block_to_error(block: RedemptionBlock) -> AppError {
    match block {
        RedemptionBlock::AlreadyRedeemed => AppError::AlreadyRedeemed,
        RedemptionBlock::PaymentProcessing => AppError::PaymentProcessing,
        RedemptionBlock::Refunded => AppError::Refunded,
        RedemptionBlock::Disputed => AppError::Disputed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::voucher::test_voucher;

    #[test]
    fn redemption_code_shape() {
        let code = generate_redemption_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn redemption_code_avoids_ambiguous_chars() {
        for _ in 0..200 {
            let code = generate_redemption_code();
            assert!(!code.contains('0'));
            assert!(!code.contains('O'));
            assert!(!code.contains('1'));
            assert!(!code.contains('I'));
        }
    }

    #[test]
    fn invalid_location_rejected_without_state_change() {
        let voucher = test_voucher(VoucherStatus::Unredeemed);
        let result = check_redeem_preconditions(&voucher, Uuid::from_u128(99));

        assert!(matches!(result, Err(AppError::LocationNotValid)));
        // Recusa antes de qualquer escrita: o voucher continua resgatável
        assert_eq!(voucher.status, VoucherStatus::Unredeemed);
        assert!(check_redeem_preconditions(&voucher, Uuid::from_u128(10)).is_ok());
    }

    #[test]
    fn state_checked_before_location() {
        // Voucher já resgatado com local inválido: ganha o erro de estado
        let voucher = test_voucher(VoucherStatus::Redeemed);
        assert!(matches!(
            check_redeem_preconditions(&voucher, Uuid::from_u128(99)),
            Err(AppError::AlreadyRedeemed)
        ));

        let voucher = test_voucher(VoucherStatus::Refunded);
        assert!(matches!(
            check_redeem_preconditions(&voucher, Uuid::from_u128(10)),
            Err(AppError::Refunded)
        ));
    }

    #[test]
    fn block_mapping_matches_contract() {
        assert!(matches!(
            redemption_block_to_error(RedemptionBlock::AlreadyRedeemed),
            AppError::AlreadyRedeemed
        ));
        assert!(matches!(
            redemption_block_to_error(RedemptionBlock::PaymentProcessing),
            AppError::PaymentProcessing
        ));
        assert!(matches!(
            redemption_block_to_error(RedemptionBlock::Refunded),
            AppError::Refunded
        ));
    }
}
