//! # Certificate rendering
//!
//! Single-page A4 document built with printpdf's builtin Times fonts. The
//! template image is stretched over the whole page, everything else is centered
//! text stacked top to bottom. A missing or undecodable template degrades to a
//! red notice line instead of failing the document.
use std::io::Cursor;

use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfLayerReference, Rgb, image_crate::codecs::png::PngDecoder,
};
use serde::Deserialize;
use tracing::warn;

use crate::{assets::TemplateSource, config::Orientation, error::AppError};

const PT_TO_MM: f32 = 25.4 / 72.0;
const TEMPLATE_DPI: f32 = 300.0;
const MARGIN_MM: f32 = 30.0;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateRequest {
    pub reviewer_name: String,
    pub contributor_role: String,
    pub submission_id: String,
    pub article_title: String,
    pub review_date: String,
}

impl CertificateRequest {
    /// `reviewDate` is allowed to be empty; the other four fields are not.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("reviewerName", &self.reviewer_name),
            ("contributorRole", &self.contributor_role),
            ("submissionId", &self.submission_id),
            ("articleTitle", &self.article_title),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "missing required field '{field}'"
                )));
            }
        }

        Ok(())
    }
}

pub struct CertificateRenderer {
    template: Option<Vec<u8>>,
    orientation: Orientation,
}

impl CertificateRenderer {
    /// Reads the template once; subsequent renders reuse the bytes.
    pub fn new(source: &impl TemplateSource, orientation: Orientation) -> Self {
        Self {
            template: source.load(),
            orientation,
        }
    }

    pub fn render(&self, request: &CertificateRequest) -> Result<Vec<u8>, AppError> {
        request.validate()?;

        let (page_w, page_h) = match self.orientation {
            Orientation::Landscape => (297.0, 210.0),
            Orientation::Portrait => (210.0, 297.0),
        };

        let (doc, page, layer) =
            PdfDocument::new("Certificate of Review", Mm(page_w), Mm(page_h), "certificate");
        let layer = doc.get_page(page).get_layer(layer);

        let serif = builtin(&doc, BuiltinFont::TimesRoman)?;
        let serif_bold = builtin(&doc, BuiltinFont::TimesBold)?;
        let serif_italic = builtin(&doc, BuiltinFont::TimesItalic)?;

        match &self.template {
            Some(bytes) => {
                if let Err(e) = draw_template(&layer, bytes, page_w, page_h) {
                    warn!("Certificate template unusable: {e}");
                    draw_template_notice(&layer, &serif, page_w, page_h);
                }
            }
            None => draw_template_notice(&layer, &serif, page_w, page_h),
        }

        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

        let mut y = page_h - 45.0;
        centered(&layer, "CERTIFICATE OF REVIEW", &serif_bold, 30.0, y, page_w);

        y -= 28.0;
        centered(
            &layer,
            &request.reviewer_name.trim().to_uppercase(),
            &serif_bold,
            24.0,
            y,
            page_w,
        );

        y -= 16.0;
        let sentence = format!(
            "for serving as {} on submission #{}",
            request.contributor_role.trim(),
            request.submission_id.trim()
        );
        centered(&layer, &sentence, &serif, 14.0, y, page_w);

        y -= 14.0;
        let quoted = format!("\"{}\"", request.article_title.trim());
        for line in wrap_text(&quoted, 16.0, page_w - 2.0 * MARGIN_MM) {
            centered(&layer, &line, &serif_italic, 16.0, y, page_w);
            y -= 9.0;
        }

        if !request.review_date.trim().is_empty() {
            y -= 6.0;
            let date_line = format!("Date of review: {}", display_date(&request.review_date));
            centered(&layer, &date_line, &serif, 12.0, y, page_w);
        }

        centered(
            &layer,
            "Issued by the editorial office in recognition of this peer review contribution.",
            &serif,
            11.0,
            22.0,
            page_w,
        );

        doc.save_to_bytes()
            .map_err(|e| AppError::Render(e.to_string()))
    }
}

fn builtin(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, AppError> {
    doc.add_builtin_font(font)
        .map_err(|e| AppError::Render(e.to_string()))
}

fn draw_template(
    layer: &PdfLayerReference,
    bytes: &[u8],
    page_w: f32,
    page_h: f32,
) -> Result<(), String> {
    let decoder = PngDecoder::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let image = Image::try_from(decoder).map_err(|e| e.to_string())?;

    let width_mm = image.image.width.0 as f32 * 25.4 / TEMPLATE_DPI;
    let height_mm = image.image.height.0 as f32 * 25.4 / TEMPLATE_DPI;
    if width_mm <= 0.0 || height_mm <= 0.0 {
        return Err("template image has no pixels".to_string());
    }

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            scale_x: Some(page_w / width_mm),
            scale_y: Some(page_h / height_mm),
            dpi: Some(TEMPLATE_DPI),
            ..Default::default()
        },
    );

    Ok(())
}

/// Cosmetic degradation only: the document still renders, with a visibly red
/// line where the template background should have been.
fn draw_template_notice(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    page_w: f32,
    page_h: f32,
) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.85, 0.15, 0.15, None)));
    centered(
        layer,
        "[ certificate template image unavailable ]",
        font,
        12.0,
        page_h - 12.0,
        page_w,
    );
}

fn centered(
    layer: &PdfLayerReference,
    text: &str,
    font: &IndirectFontRef,
    font_size: f32,
    y: f32,
    page_w: f32,
) {
    let x = ((page_w - text_width_mm(text, font_size)) / 2.0).max(MARGIN_MM / 2.0);
    layer.use_text(text, font_size, Mm(x), Mm(y), font);
}

/// Builtin fonts ship no metrics through printpdf, so estimate with an average
/// glyph width of half the font size. Good enough for centering display text.
fn text_width_mm(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5 * PT_TO_MM
}

pub(crate) fn wrap_text(text: &str, font_size: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width_mm(&candidate, font_size) > max_width_mm && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn display_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%-d %B %Y").to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}
