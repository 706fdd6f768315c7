// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, MerchantRepository, VoucherRepository},
};
use uuid::Uuid;

#[derive(Clone)]
pub struct DocumentService {
    voucher_repo: VoucherRepository,
    catalog_repo: CatalogRepository,
    merchant_repo: MerchantRepository,
}

impl DocumentService {
    pub fn new(
        voucher_repo: VoucherRepository,
        catalog_repo: CatalogRepository,
        merchant_repo: MerchantRepository,
    ) -> Self {
        Self {
            voucher_repo,
            catalog_repo,
            merchant_repo,
        }
    }

    /// Gera o PDF do voucher: item, valor, nomes, código de resgate e o
    /// QR correspondente, mais a lista de locais onde ele vale.
    pub async fn generate_voucher_pdf(&self, voucher_id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Busca os Dados
        let voucher = self
            .voucher_repo
            .find_by_id(voucher_id)
            .await?
            .ok_or(AppError::VoucherNotFound)?;

        let gift_item = self
            .catalog_repo
            .find_gift_item(voucher.gift_item_id)
            .await?
            .ok_or(AppError::GiftItemNotFound)?;

        let merchant = self
            .merchant_repo
            .find_by_id(voucher.merchant_id)
            .await?
            .ok_or(AppError::MerchantNotFound)?;

        let locations = self.merchant_repo.list_locations(merchant.id).await?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Voucher {}", voucher.redemption_code));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(merchant.name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(gift_item.title.clone())
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!("Valor: € {:.2}", voucher.amount)));

        if let Some(from) = &voucher.buyer_name {
            doc.push(elements::Paragraph::new(format!("De: {}", from)));
        }
        if let Some(to) = &voucher.recipient_name {
            doc.push(elements::Paragraph::new(format!("Para: {}", to)));
        }

        doc.push(elements::Break::new(2));

        // --- CÓDIGO DE RESGATE + QR ---
        doc.push(
            elements::Paragraph::new(format!("Código: {}", voucher.redemption_code))
                .styled(style::Style::new().bold().with_font_size(12)),
        );
        doc.push(elements::Break::new(1));

        let code = QrCode::new(voucher.redemption_code.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        // Renderiza para imagem
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);
        doc.push(elements::Break::new(2));

        // --- ONDE RESGATAR ---
        let valid: Vec<_> = locations
            .iter()
            .filter(|loc| voucher.is_location_valid(loc.id))
            .collect();

        if !valid.is_empty() {
            doc.push(
                elements::Paragraph::new("Válido em:")
                    .styled(style::Style::new().bold().with_font_size(10)),
            );
            for loc in valid {
                doc.push(
                    elements::Paragraph::new(format!("{} - {}", loc.name, loc.address))
                        .styled(style::Style::new().with_font_size(9)),
                );
            }
        }

        if let Some(expires) = voucher.expires_at {
            doc.push(elements::Break::new(1));
            doc.push(
                elements::Paragraph::new(format!("Válido até {}", expires.format("%d/%m/%Y")))
                    .styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        // 3. Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
