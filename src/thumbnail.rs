//! Fixed-size thumbnail derivation.
//!
//! The source is scaled until it covers the whole canvas and the overflow is
//! cropped evenly from both sides, so the thumbnail is always exactly
//! [`THUMBNAIL_WIDTH`] x [`THUMBNAIL_HEIGHT`] whatever the source aspect ratio.

use image::imageops::FilterType;
use image::imageops::colorops::contrast_in_place;
use image::{DynamicImage, GenericImageView};

pub const THUMBNAIL_WIDTH: u32 = 300;
pub const THUMBNAIL_HEIGHT: u32 = 300;

/// Linear contrast factor applied after resampling: every colour channel's
/// distance from mid grey is scaled by this much.
pub const THUMBNAIL_CONTRAST_FACTOR: f32 = 0.7;

/// `contrast_in_place` scales by `((100 + delta) / 100)^2`; this picks the
/// delta that yields `factor`.
fn contrast_delta(factor: f32) -> f32 {
    (factor.sqrt() - 1.0) * 100.0
}

pub fn make_thumbnail(source: &DynamicImage) -> DynamicImage {
    let (width, height) = source.dimensions();
    let mut thumb = source
        .resize_to_fill(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Triangle)
        .into_rgba8();
    // Only colour channels are adjusted; the source alpha is kept as is.
    let alpha: Vec<u8> = thumb.pixels().map(|pixel| pixel[3]).collect();
    contrast_in_place(&mut thumb, contrast_delta(THUMBNAIL_CONTRAST_FACTOR));
    for (pixel, a) in thumb.pixels_mut().zip(alpha) {
        pixel[3] = a;
    }
    tracing::debug!(
        source_width = width,
        source_height = height,
        width = THUMBNAIL_WIDTH,
        height = THUMBNAIL_HEIGHT,
        "thumbnail generated"
    );
    DynamicImage::ImageRgba8(thumb)
}
