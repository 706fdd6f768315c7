// src/services/dashboard_service.rs

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        dashboard::{DashboardSummary, PurchaseFeeRow, TransactionSumRow, VoucherStatusRow, VoucherCounts},
        merchant::Merchant,
        transaction::TransactionKind,
        voucher::VoucherStatus,
    },
};

// Fórmula fixa do Stripe para cartões europeus: 1,4% + €0,25.
// Recalculada na leitura quando a taxa não foi armazenada, para manter os
// números consistentes com as premissas atuais.
const STRIPE_FEE_RATE: Decimal = Decimal::from_parts(14, 0, 0, false, 3); // 0.014
const STRIPE_FEE_FIXED: Decimal = Decimal::from_parts(25, 0, 0, false, 2); // 0.25

// Repasse só é liberado a partir de €5
const PAYOUT_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

// A janela de 30 dias nunca recua antes do lançamento da plataforma
const EPOCH_YEAR: i32 = 2023;
const EPOCH_MONTH: u32 = 6;
const EPOCH_DAY: u32 = 1;

pub fn recompute_stripe_fee(gross: Decimal) -> Decimal {
    (gross * STRIPE_FEE_RATE).round_dp(2) + STRIPE_FEE_FIXED
}

/// Aritmética pura sobre as linhas tipadas da agregação.
/// balance = revenue - stripe_fees - commission(se ativa) + redeemed_amount
pub fn compute_summary(
    voucher_rows: &[VoucherStatusRow],
    transaction_rows: &[TransactionSumRow],
    fee_rows: &[PurchaseFeeRow],
    fee_active: bool,
    commission_rate: Decimal,
) -> DashboardSummary {
    let mut counts = VoucherCounts::default();
    for row in voucher_rows {
        match row.status {
            VoucherStatus::Pending => counts.pending = row.count,
            VoucherStatus::Issued => counts.issued = row.count,
            VoucherStatus::Unredeemed => counts.unredeemed = row.count,
            VoucherStatus::Redeemed => counts.redeemed = row.count,
            VoucherStatus::Refunded => counts.refunded = row.count,
            VoucherStatus::Disputed => counts.disputed = row.count,
        }
    }

    let sum_for = |kind: TransactionKind| {
        transaction_rows
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.total_amount)
            .unwrap_or(Decimal::ZERO)
    };

    let revenue = sum_for(TransactionKind::Purchase);
    let redeemed_amount = sum_for(TransactionKind::Redemption);

    let stripe_fees: Decimal = fee_rows
        .iter()
        .map(|row| {
            row.stripe_fee
                .unwrap_or_else(|| recompute_stripe_fee(row.amount_gross.unwrap_or(row.amount)))
        })
        .sum();

    let commission = if fee_active {
        (revenue * commission_rate).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let balance = revenue - stripe_fees - commission + redeemed_amount;

    DashboardSummary {
        voucher_counts: counts,
        revenue,
        stripe_fees,
        commission,
        redeemed_amount,
        balance,
        payout_eligible: balance >= PAYOUT_THRESHOLD,
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    // Janela: últimos 30 dias, com piso na data de lançamento
    fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
        let epoch = Utc
            .with_ymd_and_hms(EPOCH_YEAR, EPOCH_MONTH, EPOCH_DAY, 0, 0, 0)
            .unwrap();
        (now - chrono::Duration::days(30)).max(epoch)
    }

    pub async fn get_summary(&self, merchant: &Merchant) -> Result<DashboardSummary, AppError> {
        let since = Self::window_start(Utc::now());

        let (voucher_rows, transaction_rows, fee_rows) =
            self.repo.fetch_window(merchant.id, since).await?;

        Ok(compute_summary(
            &voucher_rows,
            &transaction_rows,
            &fee_rows,
            merchant.fee_active,
            merchant.commission_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn stripe_fee_formula() {
        // €10,00 -> 10 * 1,4% + 0,25 = 0,39
        assert_eq!(recompute_stripe_fee(dec("10.00")), dec("0.39"));
        // €25,00 -> 0,35 + 0,25 = 0,60
        assert_eq!(recompute_stripe_fee(dec("25.00")), dec("0.60"));
    }

    #[test]
    fn balance_formula_with_fee_active() {
        let tx_rows = vec![
            TransactionSumRow {
                kind: TransactionKind::Purchase,
                count: 3,
                total_amount: dec("120.00"),
            },
            TransactionSumRow {
                kind: TransactionKind::Redemption,
                count: 2,
                total_amount: dec("40.00"),
            },
        ];
        // Duas compras com taxa armazenada, uma sem (recalcula sobre o bruto)
        let fee_rows = vec![
            PurchaseFeeRow {
                amount: dec("50.00"),
                amount_gross: Some(dec("50.00")),
                stripe_fee: Some(dec("0.95")),
            },
            PurchaseFeeRow {
                amount: dec("60.00"),
                amount_gross: Some(dec("60.00")),
                stripe_fee: Some(dec("1.09")),
            },
            PurchaseFeeRow {
                amount: dec("10.00"),
                amount_gross: None,
                stripe_fee: None,
            },
        ];

        let summary = compute_summary(&[], &tx_rows, &fee_rows, true, dec("0.10"));

        // fees = 0,95 + 1,09 + 0,39 = 2,43; comissão = 12,00
        assert_eq!(summary.revenue, dec("120.00"));
        assert_eq!(summary.stripe_fees, dec("2.43"));
        assert_eq!(summary.commission, dec("12.00"));
        assert_eq!(summary.redeemed_amount, dec("40.00"));
        // 120 - 2,43 - 12 + 40 = 145,57
        assert_eq!(summary.balance, dec("145.57"));
        assert!(summary.payout_eligible);
    }

    #[test]
    fn balance_formula_without_fee() {
        let tx_rows = vec![TransactionSumRow {
            kind: TransactionKind::Purchase,
            count: 1,
            total_amount: dec("4.00"),
        }];
        let fee_rows = vec![PurchaseFeeRow {
            amount: dec("4.00"),
            amount_gross: Some(dec("4.00")),
            stripe_fee: Some(dec("0.31")),
        }];

        let summary = compute_summary(&[], &tx_rows, &fee_rows, false, dec("0.10"));

        assert_eq!(summary.commission, Decimal::ZERO);
        // 4 - 0,31 = 3,69 < 5: ainda sem repasse
        assert_eq!(summary.balance, dec("3.69"));
        assert!(!summary.payout_eligible);
    }

    #[test]
    fn single_ten_euro_voucher_bought_and_redeemed() {
        // Um voucher de €10 comprado e depois resgatado, sem taxa Brontie
        let voucher_rows = vec![VoucherStatusRow {
            status: VoucherStatus::Redeemed,
            count: 1,
            total_amount: dec("10.00"),
        }];
        let tx_rows = vec![
            TransactionSumRow {
                kind: TransactionKind::Purchase,
                count: 1,
                total_amount: dec("10.00"),
            },
            TransactionSumRow {
                kind: TransactionKind::Redemption,
                count: 1,
                total_amount: dec("10.00"),
            },
        ];
        let fee_rows = vec![PurchaseFeeRow {
            amount: dec("10.00"),
            amount_gross: Some(dec("10.00")),
            stripe_fee: Some(recompute_stripe_fee(dec("10.00"))),
        }];

        let summary = compute_summary(&voucher_rows, &tx_rows, &fee_rows, false, dec("0.10"));

        assert_eq!(summary.voucher_counts.redeemed, 1);
        assert_eq!(summary.revenue, dec("10.00"));
        assert_eq!(summary.stripe_fees, dec("0.39"));
        assert_eq!(summary.redeemed_amount, dec("10.00"));
        // 10 - 0,39 + 10 = 19,61
        assert_eq!(summary.balance, dec("19.61"));
        assert!(summary.payout_eligible);
    }

    #[test]
    fn voucher_counts_mapped_by_status() {
        let rows = vec![
            VoucherStatusRow {
                status: VoucherStatus::Unredeemed,
                count: 7,
                total_amount: dec("70.00"),
            },
            VoucherStatusRow {
                status: VoucherStatus::Redeemed,
                count: 2,
                total_amount: dec("20.00"),
            },
        ];
        let summary = compute_summary(&rows, &[], &[], false, Decimal::ZERO);
        assert_eq!(summary.voucher_counts.unredeemed, 7);
        assert_eq!(summary.voucher_counts.redeemed, 2);
        assert_eq!(summary.voucher_counts.refunded, 0);
    }
}
