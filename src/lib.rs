//! Commercial invoice and packing list PDFs for export shipments.
//!
//! Layout runs in two stages: the page is first drawn onto a [`canvas::Canvas`]
//! display list, which the [`pdf`] module then writes out with printpdf.

pub mod canvas;
pub mod config;
pub mod cursor;
pub mod documents;
pub mod error;
pub mod font_metrics;
pub mod format;
pub mod model;
pub mod pdf;
pub mod sections;
pub mod server;
pub mod signature;
pub mod table;

pub use documents::{
    layout_combined, layout_commercial_invoice, layout_packing_list, render_combined,
    render_commercial_invoice, render_packing_list, DocumentKind, GeneratorOptions, RenderedFile,
};
pub use error::{ApiError, RenderError};
pub use format::NumberFormat;
pub use model::ShipmentDocument;
pub use signature::{SignatureAsset, SignatureError};

#[cfg(test)]
pub(crate) mod testutil {
    use crate::model::ShipmentDocument;

    pub fn sample_json() -> serde_json::Value {
        serde_json::from_str(include_str!("../tests/fixtures/shipment.json")).unwrap()
    }

    pub fn sample_shipment() -> ShipmentDocument {
        serde_json::from_value(sample_json()).unwrap()
    }

    /// 40x8 transparent PNG with one opaque stroke across row 4.
    pub fn signature_png() -> Vec<u8> {
        let mut img = image::RgbaImage::new(40, 8);
        for x in 0..40 {
            img.put_pixel(x, 4, image::Rgba([20, 20, 60, 255]));
        }
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }
}
