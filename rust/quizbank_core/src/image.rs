//! Image normalization: bounded-width, re-encoded, embeddable payloads.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{imageops::FilterType, GenericImageView, ImageOutputFormat};

use crate::error::NormalizeError;

pub const DEFAULT_MAX_WIDTH: u32 = 1200;
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Images wider than this are downscaled to exactly this width.
    pub max_width: u32,
    /// Re-encode quality on a 0–1 scale; only meaningful for JPEG output.
    pub quality: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { max_width: DEFAULT_MAX_WIDTH, quality: DEFAULT_QUALITY }
    }
}

/// An uploaded or pasted file as handed over by the shell.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Bounded, consistently encoded representation of one input image.
/// `data_uri` encodes exactly `bytes`.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub data_uri: String,
}

/// Downscale-if-needed and re-encode in the source content type.
///
/// Aspect ratio is preserved exactly: a width over `max_width` scales to
/// (`max_width`, `height * max_width / width`); anything at or under keeps
/// its original dimensions. Failure is recoverable; callers fall back to
/// [`passthrough`].
pub fn normalize(raw: &RawImage, options: &NormalizeOptions) -> Result<NormalizedImage, NormalizeError> {
    let format = output_format(&raw.mime, options.quality)?;
    let decoded = image::load_from_memory(&raw.bytes)?;

    let (width, height) = decoded.dimensions();
    let decoded = if width > options.max_width {
        let new_height =
            std::cmp::max(1, (options.max_width as u64 * height as u64 / width as u64) as u32);
        decoded.resize_exact(options.max_width, new_height, FilterType::Triangle)
    } else {
        decoded
    };

    let mut bytes = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut bytes), format)?;

    Ok(NormalizedImage {
        name: raw.name.clone(),
        mime: raw.mime.clone(),
        data_uri: to_data_uri(&raw.mime, &bytes),
        bytes,
    })
}

/// The fallback representation: the original bytes untouched.
pub fn passthrough(raw: &RawImage) -> NormalizedImage {
    NormalizedImage {
        name: raw.name.clone(),
        mime: raw.mime.clone(),
        data_uri: to_data_uri(&raw.mime, &raw.bytes),
        bytes: raw.bytes.clone(),
    }
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Filename comparator for batch ordering: embedded digit runs compare as
/// numbers, so "img2.png" sorts before "img10.png".
pub fn file_name_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    natord::compare(a, b)
}

/// Batch order: ascending by filename per [`file_name_cmp`].
pub fn sort_for_batch(files: &mut [RawImage]) {
    files.sort_by(|a, b| file_name_cmp(&a.name, &b.name));
}

fn output_format(mime: &str, quality: f32) -> Result<ImageOutputFormat, NormalizeError> {
    match mime {
        "image/jpeg" | "image/jpg" => Ok(ImageOutputFormat::Jpeg(jpeg_quality(quality))),
        "image/png" => Ok(ImageOutputFormat::Png),
        other => Err(NormalizeError::UnsupportedType(other.to_string())),
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}
