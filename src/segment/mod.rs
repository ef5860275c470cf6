pub mod crop;
pub mod glyph;
pub mod mask;
pub mod region;
pub mod resize;

pub use crop::{GlyphCrop, crop_regions};
pub use glyph::CanonicalGlyph;
pub use mask::{GlyphMask, normalize_masks};
pub use region::{Bounds, Color, LeftToRight, Region, RegionMap, RegionOrdering, extract_regions};
pub use resize::{canonicalize, canonicalize_all};

use image::Rgb32FImage;

/// Side length of a canonical glyph.
pub const GLYPH_SIZE: u32 = 16;

/// Default number of retained colors: one background plus up to six glyphs.
pub const DEFAULT_COLOR_LIMIT: usize = 7;

/// Mask value of a glyph's own pixels.
pub const FOREGROUND_INTENSITY: f32 = 0.0;

/// Mask value of pixels that are neither glyph nor background.
pub const AMBIGUOUS_INTENSITY: f32 = 0.5;

/// Mask value of background pixels, also used for padding.
pub const BACKGROUND_INTENSITY: f32 = 1.0;

/// High-level function: image → canonical glyphs in reading order.
///
/// Finds the first `limit` colors, orders their regions, crops each one, masks it
/// against the background and reduces it to a canonical glyph. A single-color image
/// yields no glyphs.
pub fn segment_glyphs(
    img: &Rgb32FImage,
    limit: usize,
    ordering: &dyn RegionOrdering,
) -> Vec<CanonicalGlyph> {
    let regions = extract_regions(img, limit).ordered(ordering);

    crate::log(&format!(
        "Segmentation: {} color(s) retained in {}x{} image",
        regions.len(),
        img.width(),
        img.height()
    ));

    let crops = crop_regions(img, &regions);
    let masks = normalize_masks(crops);
    canonicalize_all(masks).collect()
}
