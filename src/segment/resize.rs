//! Mask to canonical glyph conversion.
//!
//! Masks come in any size. Small masks are padded with background on the bottom and
//! right, then every mask is reduced onto a `GLYPH_SIZE` grid where each cell keeps the
//! darkest value mapped into it. Thin strokes survive the reduction instead of being
//! averaged away.

use image::{ImageBuffer, Luma};

use super::glyph::CanonicalGlyph;
use super::mask::GlyphMask;
use super::{BACKGROUND_INTENSITY, GLYPH_SIZE};

/// Pads the mask with background up to `GLYPH_SIZE` in each dimension.
///
/// Dimensions already at or above `GLYPH_SIZE` are left alone; the mask is never cropped.
pub fn pad_mask(mask: &GlyphMask) -> GlyphMask {
    let (width, height) = mask.dimensions();
    if width >= GLYPH_SIZE && height >= GLYPH_SIZE {
        return mask.clone();
    }

    let padded_width = width.max(GLYPH_SIZE);
    let padded_height = height.max(GLYPH_SIZE);
    let mut padded =
        ImageBuffer::from_pixel(padded_width, padded_height, Luma([BACKGROUND_INTENSITY]));
    image::imageops::replace(&mut padded, mask, 0, 0);
    padded
}

/// Reduces a mask of at least `GLYPH_SIZE` x `GLYPH_SIZE` onto the canonical grid.
///
/// Source pixel (column c of C, row r of R) lands in cell (16c/C, 16r/R), rounded down.
fn downsample_darkest(mask: &GlyphMask) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let (width, height) = mask.dimensions();
    let mut out = ImageBuffer::from_pixel(GLYPH_SIZE, GLYPH_SIZE, Luma([BACKGROUND_INTENSITY]));

    for (x, y, pixel) in mask.enumerate_pixels() {
        let cell_x = (GLYPH_SIZE as u64 * x as u64 / width as u64) as u32;
        let cell_y = (GLYPH_SIZE as u64 * y as u64 / height as u64) as u32;
        let cell = out.get_pixel_mut(cell_x, cell_y);
        if pixel[0] < cell[0] {
            cell[0] = pixel[0];
        }
    }

    out
}

/// Normalizes any mask into a canonical glyph.
pub fn canonicalize(mask: &GlyphMask) -> CanonicalGlyph {
    let padded = pad_mask(mask);
    CanonicalGlyph(downsample_darkest(&padded))
}

/// Canonicalizes every mask in order.
pub fn canonicalize_all<I>(masks: I) -> impl Iterator<Item = CanonicalGlyph>
where
    I: IntoIterator<Item = GlyphMask>,
{
    masks.into_iter().map(|mask| canonicalize(&mask))
}
