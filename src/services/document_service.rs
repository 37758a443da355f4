// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{GoodsRepository, SettingsRepository},
    models::{
        goods::{GoodsDirection, GoodsEntry, GoodsVariant},
        settings::BusinessSettings,
    },
};

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("PDF rendering failed: {}", e))
}

fn money(value: Decimal) -> String {
    format!("Rs. {:.2}", value)
}

/// `upi://pay` link that payment apps turn into a prefilled transfer.
pub fn upi_payment_uri(
    upi_id: &str,
    payee_name: &str,
    amount: Decimal,
    note: &str,
) -> Result<String, AppError> {
    let amount = format!("{:.2}", amount);
    let url = reqwest::Url::parse_with_params(
        "upi://pay",
        &[
            ("pa", upi_id.trim()),
            ("pn", payee_name.trim()),
            ("am", amount.as_str()),
            ("cu", "INR"),
            ("tn", note),
        ],
    )
    .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Invalid UPI link: {}", e)))?;
    Ok(url.to_string())
}

#[derive(Clone)]
pub struct DocumentService {
    goods_repo: GoodsRepository,
    settings_repo: SettingsRepository,
    pool: PgPool,
    font_dir: String,
    font_name: String,
}

impl DocumentService {
    pub fn new(
        goods_repo: GoodsRepository,
        settings_repo: SettingsRepository,
        pool: PgPool,
        font_dir: String,
        font_name: String,
    ) -> Self {
        Self { goods_repo, settings_repo, pool, font_dir, font_name }
    }

    /// Tax invoices exist for GST sales only.
    pub async fn generate_tax_invoice(&self, entry_id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let entry = self
            .goods_repo
            .find_by_id(&self.pool, entry_id)
            .await?
            .ok_or(AppError::NotFound("goods_entry"))?;

        if entry.direction != GoodsDirection::Outward || entry.variant != GoodsVariant::Gst {
            return Err(AppError::InvoiceNotAvailable);
        }

        let settings = self.settings_repo.current().await?;
        let file_name = format!(
            "invoice-{}.pdf",
            entry.invoice_number.clone().unwrap_or_else(|| entry.id.simple().to_string())
        );
        let pdf = self.render_tax_invoice(&entry, &settings)?;
        Ok((file_name, pdf))
    }

    fn render_tax_invoice(&self, entry: &GoodsEntry, settings: &BusinessSettings) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(&self.font_dir, &self.font_name, None)
            .map_err(|_| AppError::FontNotFound(format!("{} in {}", self.font_name, self.font_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        let invoice_label = entry.invoice_number.clone().unwrap_or_else(|| "-".to_string());
        doc.set_title(format!("Tax Invoice {}", invoice_label));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- HEADER ---
        let business_name = settings.business_name.clone().unwrap_or_else(|| "ScrapFlow".to_string());
        doc.push(elements::Paragraph::new(business_name.clone())
            .styled(style::Style::new().bold().with_font_size(18)));

        if let Some(address) = &settings.address {
            doc.push(elements::Paragraph::new(address.clone()).styled(style::Style::new().with_font_size(9)));
        }
        if let Some(gstin) = &settings.gstin {
            doc.push(elements::Paragraph::new(format!("GSTIN: {}", gstin))
                .styled(style::Style::new().with_font_size(10)));
        }
        if let Some(phone) = &settings.phone {
            doc.push(elements::Paragraph::new(format!("Phone: {}", phone))
                .styled(style::Style::new().with_font_size(10)));
        }

        doc.push(elements::Break::new(1.5));

        let mut title = elements::Paragraph::new("TAX INVOICE");
        title.set_alignment(genpdf::Alignment::Center);
        doc.push(title.styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new(format!("Invoice No: {}", invoice_label)));
        doc.push(elements::Paragraph::new(format!("Date: {}", entry.entry_date.format("%d/%m/%Y"))));
        doc.push(elements::Break::new(1));

        // --- BILL TO ---
        doc.push(elements::Paragraph::new("Bill to").styled(style::Style::new().bold()));
        doc.push(elements::Paragraph::new(entry.party_name.clone()));
        if let Some(gstin) = &entry.party_gstin {
            doc.push(elements::Paragraph::new(format!("GSTIN: {}", gstin)));
        }

        doc.push(elements::Break::new(1.5));

        // --- LINE ---
        // Column weights: description (4), HSN (2), qty (2), rate (2), taxable (2)
        let mut table = elements::TableLayout::new(vec![4, 2, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Description").styled(style_bold))
            .element(elements::Paragraph::new("HSN").styled(style_bold))
            .element(elements::Paragraph::new("Qty").styled(style_bold))
            .element(elements::Paragraph::new("Rate").styled(style_bold))
            .element(elements::Paragraph::new("Taxable").styled(style_bold))
            .push()
            .map_err(pdf_error)?;

        table
            .row()
            .element(elements::Paragraph::new(entry.item_name.clone()))
            .element(elements::Paragraph::new(entry.hsn_code.clone().unwrap_or_default()))
            .element(elements::Paragraph::new(format!("{:.3}", entry.quantity)))
            .element(elements::Paragraph::new(money(entry.rate)))
            .element(elements::Paragraph::new(money(entry.taxable_amount)))
            .push()
            .map_err(pdf_error)?;

        doc.push(table);
        doc.push(elements::Break::new(1));

        // --- TAX SPLIT & TOTAL ---
        let mut lines = vec![format!("Taxable value: {}", money(entry.taxable_amount))];
        if entry.igst.is_zero() {
            let half_rate = entry.gst_rate / Decimal::TWO;
            lines.push(format!("CGST @ {}%: {}", half_rate.normalize(), money(entry.cgst)));
            lines.push(format!("SGST @ {}%: {}", half_rate.normalize(), money(entry.sgst)));
        } else {
            lines.push(format!("IGST @ {}%: {}", entry.gst_rate.normalize(), money(entry.igst)));
        }
        for line in lines {
            let mut paragraph = elements::Paragraph::new(line);
            paragraph.set_alignment(genpdf::Alignment::Right);
            doc.push(paragraph);
        }

        let mut total = elements::Paragraph::new(format!("TOTAL: {}", money(entry.total_amount)));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));

        // --- PAYMENT (UPI QR) ---
        if let Some(upi_id) = settings.upi_id.as_deref().filter(|u| !u.trim().is_empty()) {
            doc.push(elements::Paragraph::new("PAY VIA UPI").styled(style::Style::new().bold().with_font_size(12)));
            doc.push(elements::Paragraph::new(format!("UPI ID: {}", upi_id)));
            doc.push(elements::Break::new(1));

            let uri = upi_payment_uri(
                upi_id,
                &business_name,
                entry.total_amount,
                &format!("Invoice {}", invoice_label),
            )?;
            let code = QrCode::new(uri.as_bytes()).map_err(pdf_error)?;

            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(pdf_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));
            doc.push(pdf_image);
        }

        if let Some(notes) = &entry.notes {
            doc.push(elements::Break::new(1));
            doc.push(elements::Paragraph::new(notes.clone()).styled(style::Style::new().italic().with_font_size(8)));
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        tracing::debug!(entry = %entry.id, bytes = buffer.len(), "Tax invoice rendered");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upi_link_carries_payee_and_amount() {
        let uri = upi_payment_uri("shivshakti@okaxis", "Shiv Shakti Traders", "5900".parse().unwrap(), "Invoice 42")
            .unwrap();
        assert!(uri.starts_with("upi://pay?"));
        assert!(uri.contains("pa=shivshakti%40okaxis"));
        assert!(uri.contains("pn=Shiv+Shakti+Traders"));
        assert!(uri.contains("am=5900.00"));
        assert!(uri.contains("cu=INR"));
    }

    #[test]
    fn money_uses_two_decimals() {
        assert_eq!(money("12.5".parse().unwrap()), "Rs. 12.50");
    }
}
