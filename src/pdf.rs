use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use sha2::{Digest, Sha256};
use std::io::{BufWriter, Cursor};
use tracing::debug;

use crate::canvas::{self, DrawOp, Page, Raster, PT_TO_MM};
use crate::error::RenderError;
use crate::font_metrics::FontFace;

// ============================================================================
// CONSTANTS
// ============================================================================

const LAYER_NAME: &str = "Layer 1";
// Used when the invoice date does not parse
const FALLBACK_DATE: &str = "D:20000101000000Z";

// ============================================================================
// DOCUMENT IDENTITY
// ============================================================================

/// Values pinned into the file so identical input gives identical bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStamp {
    pub id: Vec<u8>,
    pub date: String,
}

impl DocumentStamp {
    /// Derive the trailer ID from the invoice number and document kind, and
    /// the creation date from the invoice date (`YYYY-MM-DD`).
    pub fn new(invoice_number: &str, invoice_date: &str, kind: &str) -> Self {
        let digest = Sha256::digest(format!("{}:{}", invoice_number, kind).as_bytes());
        let date = chrono::NaiveDate::parse_from_str(invoice_date.trim(), "%Y-%m-%d")
            .map(|d| format!("D:{}000000Z", d.format("%Y%m%d")))
            .unwrap_or_else(|_| FALLBACK_DATE.to_string());

        DocumentStamp {
            id: digest[..16].to_vec(),
            date,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Write the display list as a PDF, one PDF page per canvas page.
pub fn write_pdf(pages: &[Page], title: &str, stamp: &DocumentStamp) -> Result<Vec<u8>, RenderError> {
    let Some(first) = pages.first() else {
        return Err(RenderError::Pdf("document has no pages".to_string()));
    };

    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(first.width), Mm(first.height), LAYER_NAME);

    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(backend)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(backend)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(backend)?,
    };

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (p, l) = doc.add_page(Mm(page.width), Mm(page.height), LAYER_NAME);
            doc.get_page(p).get_layer(l)
        };
        draw_page(page, &layer, &fonts);
    }

    let mut raw = Vec::new();
    doc.save(&mut BufWriter::new(Cursor::new(&mut raw)))
        .map_err(backend)?;

    debug!(pages = pages.len(), bytes = raw.len(), "pdf written");
    stabilise(&raw, stamp)
}

fn backend(e: impl std::fmt::Debug) -> RenderError {
    RenderError::Pdf(format!("{:?}", e))
}

// ============================================================================
// OUTPUT STABILISATION
// ============================================================================

/// Replace the per-run values printpdf writes (random document ID, wall-clock
/// dates, XMP packet) with ones derived from the document itself.
fn stabilise(raw: &[u8], stamp: &DocumentStamp) -> Result<Vec<u8>, RenderError> {
    let mut pdf = ::lopdf::Document::load_mem(raw)?;

    let root = pdf.trailer.get(b"Root")?.as_reference()?;
    pdf.get_object_mut(root)?.as_dict_mut()?.remove(b"Metadata");

    if let Ok(info) = pdf.trailer.get(b"Info").and_then(::lopdf::Object::as_reference) {
        let dict = pdf.get_object_mut(info)?.as_dict_mut()?;
        for key in ["CreationDate", "ModDate"] {
            dict.set(key, ::lopdf::Object::string_literal(stamp.date.as_str()));
        }
    }

    let id = ::lopdf::Object::String(stamp.id.clone(), ::lopdf::StringFormat::Hexadecimal);
    pdf.trailer.set("ID", ::lopdf::Object::Array(vec![id.clone(), id]));

    pdf.prune_objects();

    let mut out = Vec::new();
    pdf.save_to(&mut out)?;
    Ok(out)
}

// ============================================================================
// FONTS
// ============================================================================

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
        }
    }
}

// ============================================================================
// DRAWING
// ============================================================================

fn color(c: canvas::Rgb) -> Color {
    Color::Rgb(Rgb::new(
        c.r as f32 / 255.0,
        c.g as f32 / 255.0,
        c.b as f32 / 255.0,
        None,
    ))
}

fn draw_page(page: &Page, layer: &PdfLayerReference, fonts: &Fonts) {
    // Canvas y grows downwards from the top edge
    let flip = |y: f32| page.height - y;

    layer.set_outline_color(color(canvas::Rgb::BLACK));
    layer.set_fill_color(color(canvas::Rgb::BLACK));

    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, text, face, size } => {
                layer.use_text(text.as_str(), *size, Mm(*x), Mm(flip(*y)), fonts.get(*face));
            }
            DrawOp::Line { x1, y1, x2, y2, width } => {
                layer.set_outline_thickness(width / PT_TO_MM);
                draw_line(layer, *x1, flip(*y1), *x2, flip(*y2));
            }
            DrawOp::Rect { x, y, w, h, fill, stroke } => {
                if let Some(width) = stroke {
                    layer.set_outline_thickness(width / PT_TO_MM);
                }
                if let Some(fill) = fill {
                    layer.set_fill_color(color(*fill));
                }
                draw_rect(layer, *x, flip(y + h), *w, *h, fill.is_some(), stroke.is_some());
                if fill.is_some() {
                    // Text is painted with the fill colour
                    layer.set_fill_color(color(canvas::Rgb::BLACK));
                }
            }
            DrawOp::Image { x, y, w, h, raster } => {
                add_image(layer, raster, *x, flip(y + h), *w, *h);
            }
        }
    }
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let points = vec![
        (Point::new(Mm(x1), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y2)), false),
    ];
    let line = Line { points, is_closed: false };
    layer.add_line(line);
}

/// Rectangle with its bottom-left corner at (`x`, `y`) in PDF space.
fn draw_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, fill: bool, stroke: bool) {
    let points = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ];

    if fill {
        let polygon = Polygon {
            rings: vec![points],
            mode: if stroke {
                PaintMode::FillStroke
            } else {
                PaintMode::Fill
            },
            winding_order: WindingOrder::NonZero,
        };
        layer.add_polygon(polygon);
    } else if stroke {
        let line = Line { points, is_closed: true };
        layer.add_line(line);
    }
}

fn add_image(layer: &PdfLayerReference, raster: &Raster, x: f32, y: f32, w: f32, h: f32) {
    let image = Image::from(ImageXObject {
        width: Px(raster.width as usize),
        height: Px(raster.height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: raster.pixels.clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // At 72 DPI one pixel is one point; scale from there to the target box.
    let natural_w = raster.width as f32 * PT_TO_MM;
    let natural_h = raster.height as f32 * PT_TO_MM;

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            scale_x: Some(w / natural_w),
            scale_y: Some(h / natural_h),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn sample_pages() -> Vec<Page> {
        let mut canvas = Canvas::new(297.0, 210.0);
        canvas.text("COMMERCIAL INVOICE", 200.0, 16.5);
        canvas.line(10.0, 17.0, 287.0, 17.0);
        canvas.rect(10.0, 100.0, 45.0, 6.0, Some(canvas::Rgb::gray(240)), true);
        canvas.add_page();
        canvas.text("PACKING LIST", 200.0, 16.5);
        canvas.into_pages()
    }

    #[test]
    fn test_stamp_from_invoice() {
        let stamp = DocumentStamp::new("SM-2024-001", "2024-03-15", "Combined");
        assert_eq!(stamp.date, "D:20240315000000Z");
        assert_eq!(stamp.id.len(), 16);
        assert_ne!(stamp.id, DocumentStamp::new("SM-2024-001", "2024-03-15", "Packing_List").id);
        assert_eq!(DocumentStamp::new("X", "15/03/2024", "Combined").date, FALLBACK_DATE);
    }

    #[test]
    fn test_write_pdf_page_count() {
        let stamp = DocumentStamp::new("SM-1", "2024-01-02", "Combined");
        let bytes = write_pdf(&sample_pages(), "test", &stamp).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        let doc = ::lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_output_is_stable() {
        let stamp = DocumentStamp::new("SM-1", "2024-01-02", "Combined");
        let a = write_pdf(&sample_pages(), "test", &stamp).unwrap();
        let b = write_pdf(&sample_pages(), "test", &stamp).unwrap();
        assert_eq!(a, b);

        let doc = ::lopdf::Document::load_mem(&a).unwrap();
        let info = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let created = doc.get_dictionary(info).unwrap().get(b"CreationDate").unwrap();
        assert_eq!(created.as_str().unwrap(), b"D:20240102000000Z");
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let stamp = DocumentStamp::new("SM-1", "2024-01-02", "Combined");
        assert!(matches!(write_pdf(&[], "test", &stamp), Err(RenderError::Pdf(_))));
    }
}
