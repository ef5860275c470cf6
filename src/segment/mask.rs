use image::{ImageBuffer, Luma};

use super::crop::GlyphCrop;
use super::region::Color;
use super::{AMBIGUOUS_INTENSITY, BACKGROUND_INTENSITY, FOREGROUND_INTENSITY};

/// Single-channel glyph mask. Values are 0.0 (glyph), 1.0 (background) or 0.5 (anything else).
pub type GlyphMask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Converts a crop into a three-level mask.
///
/// Pixels of the crop's own color become foreground, pixels of `background` become
/// background, and everything else (neighbouring glyphs, anti-aliasing) is ambiguous.
pub fn mask_glyph(crop: &GlyphCrop, background: Color) -> GlyphMask {
    let (width, height) = crop.image.dimensions();
    let mut mask = ImageBuffer::from_pixel(width, height, Luma([AMBIGUOUS_INTENSITY]));

    for (x, y, pixel) in crop.image.enumerate_pixels() {
        if crop.color.matches(pixel) {
            mask.put_pixel(x, y, Luma([FOREGROUND_INTENSITY]));
        }
        if background.matches(pixel) {
            mask.put_pixel(x, y, Luma([BACKGROUND_INTENSITY]));
        }
    }

    mask
}

/// Turns the crop sequence into masks.
///
/// The first crop is the background region: it produces no mask, only its color is
/// kept as the reference for the remaining crops. An empty sequence yields no masks.
pub fn normalize_masks<I>(crops: I) -> impl Iterator<Item = GlyphMask>
where
    I: IntoIterator<Item = GlyphCrop>,
{
    let mut crops = crops.into_iter();
    let background = crops.next().map(|crop| crop.color);

    crops.filter_map(move |crop| background.map(|bg| mask_glyph(&crop, bg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgb32FImage};

    const BG: [f32; 3] = [1.0, 1.0, 1.0];
    const FG: [f32; 3] = [0.8, 0.2, 0.2];
    const OTHER: [f32; 3] = [0.2, 0.2, 0.8];

    fn crop_of(color: [f32; 3], pixels: &[[[f32; 3]; 3]]) -> GlyphCrop {
        let height = pixels.len() as u32;
        let image = Rgb32FImage::from_fn(3, height, |x, y| Rgb(pixels[y as usize][x as usize]));
        GlyphCrop {
            color: Color(color),
            image,
        }
    }

    #[test]
    fn test_mask_glyph_three_levels() {
        let crop = crop_of(
            FG,
            &[
                [FG, BG, OTHER],
                [[0.5, 0.5, 0.5], FG, BG],
            ],
        );

        let mask = mask_glyph(&crop, Color(BG));
        assert_eq!(mask.dimensions(), (3, 2));
        assert_eq!(mask.get_pixel(0, 0)[0], 0.0);
        assert_eq!(mask.get_pixel(1, 0)[0], 1.0);
        assert_eq!(mask.get_pixel(2, 0)[0], 0.5, "Another glyph's color is ambiguous");
        assert_eq!(mask.get_pixel(0, 1)[0], 0.5, "Anti-aliased pixel is ambiguous");
        assert_eq!(mask.get_pixel(1, 1)[0], 0.0);
        assert_eq!(mask.get_pixel(2, 1)[0], 1.0);
        assert!(mask.pixels().all(|p| [0.0, 0.5, 1.0].contains(&p[0])));
    }

    #[test]
    fn test_normalize_masks_skips_background() {
        let crops = vec![
            crop_of(BG, &[[BG, BG, BG]]),
            crop_of(FG, &[[FG, BG, FG]]),
            crop_of(OTHER, &[[OTHER, FG, BG]]),
        ];

        let masks: Vec<GlyphMask> = normalize_masks(crops).collect();
        assert_eq!(masks.len(), 2);
        let first: Vec<f32> = masks[0].pixels().map(|p| p[0]).collect();
        let second: Vec<f32> = masks[1].pixels().map(|p| p[0]).collect();
        assert_eq!(first, vec![0.0, 1.0, 0.0]);
        assert_eq!(second, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_masks_background_only() {
        assert_eq!(normalize_masks(vec![crop_of(BG, &[[BG, BG, BG]])]).count(), 0);
        assert_eq!(normalize_masks(Vec::<GlyphCrop>::new()).count(), 0);
    }
}
