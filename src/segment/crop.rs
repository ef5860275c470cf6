use image::Rgb32FImage;

use super::region::{Color, Region};

/// The pixels inside one region's bounding box, tagged with the region's color.
#[derive(Clone, Debug)]
pub struct GlyphCrop {
    pub color: Color,
    pub image: Rgb32FImage,
}

/// Crops the bounding box of a single region.
///
/// Bounds are inclusive, so the crop spans `right - left + 1` columns and
/// `bottom - top + 1` rows.
pub fn crop_region(img: &Rgb32FImage, region: &Region) -> GlyphCrop {
    let b = region.bounds;
    let image = image::imageops::crop_imm(img, b.left, b.top, b.width(), b.height()).to_image();
    GlyphCrop {
        color: region.color,
        image,
    }
}

/// Lazily crops every region in the given order, background included.
pub fn crop_regions<'a>(
    img: &'a Rgb32FImage,
    regions: &'a [Region],
) -> impl Iterator<Item = GlyphCrop> + 'a {
    regions.iter().map(move |region| crop_region(img, region))
}
