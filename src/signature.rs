//! Signature image loading and the "Signed by" block.
//!
//! A signature that cannot be read or decoded never fails a document: the
//! block falls back to the signer's name in italics.

use std::io::Read;
use std::sync::Arc;

use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

use crate::canvas::{Canvas, Raster};
use crate::font_metrics::FontFace;

const LABEL_X: f32 = 197.0;
const LINE_START_X: f32 = 217.0;
const LINE_END_X: f32 = 277.0;
const IMAGE_X: f32 = 222.0;
const IMAGE_WIDTH: f32 = 50.0;
const IMAGE_HEIGHT: f32 = 10.0;
const FALLBACK_X: f32 = 227.0;
const FALLBACK_SIZE: f32 = 12.0;

/// Gap between the bottom of the table and the signature block.
pub const SIGNATURE_OFFSET: f32 = 15.0;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed data URL")]
    DataUrl,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("failed to read signature: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch signature: {0}")]
    Fetch(String),
}

/// A decoded signature ready to be placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAsset {
    raster: Arc<Raster>,
}

impl SignatureAsset {
    /// Decode PNG, JPEG or any other format the `image` crate recognises.
    ///
    /// Transparent pixels are composited over white.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.is_empty() {
            return Err(SignatureError::Empty);
        }

        let img = ::image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()?
            .decode()?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(SignatureError::Empty);
        }

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for px in rgba.pixels() {
            let [r, g, b, a] = px.0;
            let alpha = a as u16;
            for channel in [r, g, b] {
                let blended = (channel as u16 * alpha + 255 * (255 - alpha)) / 255;
                pixels.push(blended as u8);
            }
        }

        debug!(width, height, "decoded signature image");
        Ok(SignatureAsset {
            raster: Arc::new(Raster {
                width,
                height,
                pixels,
            }),
        })
    }

    /// Accepts `data:image/...;base64,...` URLs as well as bare base64.
    pub fn from_data_url(data: &str) -> Result<Self, SignatureError> {
        let payload = if data.starts_with("data:") {
            match data.split_once(',') {
                Some((_, payload)) => payload,
                None => return Err(SignatureError::DataUrl),
            }
        } else {
            data
        };

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        Self::from_bytes(&bytes)
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Largest rectangle with the image's aspect ratio that fits in `w` x `h`.
    fn fit(&self, w: f32, h: f32) -> (f32, f32) {
        let aspect = self.raster.width as f32 / self.raster.height as f32;
        if aspect > w / h {
            (w, w / aspect)
        } else {
            (h * aspect, h)
        }
    }
}

/// Load a signature from a data URL, an `http(s)://` URL or a file path.
pub async fn load(source: &str) -> Result<SignatureAsset, SignatureError> {
    if source.starts_with("data:") {
        return SignatureAsset::from_data_url(source);
    }

    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let url = source.to_string();
        tokio::task::spawn_blocking(move || fetch_remote(&url))
            .await
            .map_err(|e| SignatureError::Fetch(e.to_string()))??
    } else {
        tokio::fs::read(source).await?
    };

    SignatureAsset::from_bytes(&bytes)
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, SignatureError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| SignatureError::Fetch(e.to_string()))?;

    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Draw the signature block with its anchor `top` below the table.
pub fn draw_signature_block(
    canvas: &mut Canvas,
    top: f32,
    signer_name: &str,
    signature: Option<&SignatureAsset>,
) {
    let line_y = top + 10.0;

    canvas.set_font(FontFace::Regular, 9.0);
    canvas.text("Signed by", LABEL_X, line_y);
    canvas.line(LINE_START_X, line_y, LINE_END_X, line_y);

    match signature {
        Some(asset) => {
            let (w, h) = asset.fit(IMAGE_WIDTH, IMAGE_HEIGHT);
            let x = IMAGE_X + (IMAGE_WIDTH - w) / 2.0;
            let y = top - 1.0 + (IMAGE_HEIGHT - h) / 2.0;
            canvas.image(asset.raster.clone(), x, y, w, h);
        }
        None => {
            canvas.set_font(FontFace::Italic, FALLBACK_SIZE);
            canvas.text(signer_name, FALLBACK_X, top + 8.0);
            canvas.set_font(FontFace::Regular, 9.0);
        }
    }
}

/// Decode a request-supplied signature, logging and dropping it on failure.
pub fn decode_or_warn(data: &str) -> Option<SignatureAsset> {
    match SignatureAsset::from_data_url(data) {
        Ok(asset) => Some(asset),
        Err(e) => {
            warn!(error = %e, "ignoring undecodable signature, using text fallback");
            None
        }
    }
}
