//! Page assembly for the three document kinds.

use serde::Deserialize;
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::format::NumberFormat;
use crate::model::ShipmentDocument;
use crate::pdf::{self, DocumentStamp};
use crate::sections::{self, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use crate::signature::{self, SignatureAsset, SIGNATURE_OFFSET};
use crate::table::{self, Table};

pub const DEFAULT_LETTERHEAD: &str = "Solmith Co., Ltd.";
pub const DEFAULT_SIGNER: &str = "Seung C. Shim";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    CommercialInvoice,
    PackingList,
    Combined,
}

impl DocumentKind {
    /// Parse the URL form (`commercial-invoice`, `packing-list`, `combined`).
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "commercial-invoice" => Some(DocumentKind::CommercialInvoice),
            "packing-list" => Some(DocumentKind::PackingList),
            "combined" => Some(DocumentKind::Combined),
            _ => None,
        }
    }

    /// Suffix used in the downloaded file name.
    pub fn file_suffix(self) -> &'static str {
        match self {
            DocumentKind::CommercialInvoice => "Commercial_Invoice",
            DocumentKind::PackingList => "Packing_List",
            DocumentKind::Combined => "Combined",
        }
    }

    fn title(self) -> &'static str {
        match self {
            DocumentKind::CommercialInvoice => "Commercial Invoice",
            DocumentKind::PackingList => "Packing List",
            DocumentKind::Combined => "Commercial Invoice & Packing List",
        }
    }
}

/// Everything about a document that does not come from the shipment itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    pub letterhead: String,
    pub signer_name: String,
    pub number_format: NumberFormat,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            letterhead: DEFAULT_LETTERHEAD.to_string(),
            signer_name: DEFAULT_SIGNER.to_string(),
            number_format: NumberFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn file_name(doc: &ShipmentDocument, kind: DocumentKind) -> String {
    format!("{}_{}.pdf", doc.invoice_number, kind.file_suffix())
}

// ============================================================================
// LAYOUT
// ============================================================================

fn draw_page(
    canvas: &mut Canvas,
    title: &str,
    table: &Table,
    body: fn(&mut Canvas, &ShipmentDocument, f32) -> f32,
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) {
    let y = sections::draw_header(canvas, &options.letterhead, title);
    let table_top = body(canvas, doc, y);
    let table_bottom = table::draw_table(canvas, table, MARGIN, table_top, MARGIN);
    debug!(title, rows = table.rows.len(), table_top, table_bottom, "table placed");

    // The signature line sits 10 below its anchor
    let mut signature_top = table_bottom + SIGNATURE_OFFSET;
    if signature_top + 10.0 > PAGE_HEIGHT - MARGIN {
        canvas.add_page();
        signature_top = MARGIN;
        debug!(title, invoice = %doc.invoice_number, "signature moved to a new page");
    }
    signature::draw_signature_block(canvas, signature_top, &options.signer_name, signature);
}

fn draw_invoice_page(
    canvas: &mut Canvas,
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) {
    let table = table::commercial_invoice_table(doc, &options.number_format);
    draw_page(
        canvas,
        sections::INVOICE_TITLE,
        &table,
        sections::invoice_sections,
        doc,
        options,
        signature,
    );
}

fn draw_packing_page(
    canvas: &mut Canvas,
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) {
    let table = table::packing_list_table(doc, &options.number_format);
    draw_page(
        canvas,
        sections::PACKING_LIST_TITLE,
        &table,
        sections::packing_sections,
        doc,
        options,
        signature,
    );
}

pub fn layout_commercial_invoice(
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Canvas {
    let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
    draw_invoice_page(&mut canvas, doc, options, signature);
    canvas
}

pub fn layout_packing_list(
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Canvas {
    let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
    draw_packing_page(&mut canvas, doc, options, signature);
    canvas
}

/// The invoice pages followed by the packing list pages in one document.
pub fn layout_combined(
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Canvas {
    let mut canvas = Canvas::new(PAGE_WIDTH, PAGE_HEIGHT);
    draw_invoice_page(&mut canvas, doc, options, signature);
    canvas.add_page();
    draw_packing_page(&mut canvas, doc, options, signature);
    canvas
}

pub fn layout(
    kind: DocumentKind,
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Canvas {
    match kind {
        DocumentKind::CommercialInvoice => layout_commercial_invoice(doc, options, signature),
        DocumentKind::PackingList => layout_packing_list(doc, options, signature),
        DocumentKind::Combined => layout_combined(doc, options, signature),
    }
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn render(
    kind: DocumentKind,
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Result<RenderedFile, RenderError> {
    let canvas = layout(kind, doc, options, signature);
    let stamp = DocumentStamp::new(&doc.invoice_number, &doc.invoice_date, kind.file_suffix());
    let bytes = pdf::write_pdf(canvas.pages(), kind.title(), &stamp)?;

    Ok(RenderedFile {
        file_name: file_name(doc, kind),
        bytes,
    })
}

pub fn render_commercial_invoice(
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Result<RenderedFile, RenderError> {
    render(DocumentKind::CommercialInvoice, doc, options, signature)
}

pub fn render_packing_list(
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Result<RenderedFile, RenderError> {
    render(DocumentKind::PackingList, doc, options, signature)
}

pub fn render_combined(
    doc: &ShipmentDocument,
    options: &GeneratorOptions,
    signature: Option<&SignatureAsset>,
) -> Result<RenderedFile, RenderError> {
    render(DocumentKind::Combined, doc, options, signature)
}
