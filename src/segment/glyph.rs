use anyhow::{Context, Result};
use image::{GrayImage, ImageBuffer, Luma};
use std::path::Path;

use super::GLYPH_SIZE;

/// A glyph normalized to `GLYPH_SIZE` x `GLYPH_SIZE`, the only shape the classifier sees.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalGlyph(pub(super) ImageBuffer<Luma<f32>, Vec<f32>>);

impl CanonicalGlyph {
    /// Wraps an image that is already canonical. Returns `None` for any other size.
    pub fn new(img: ImageBuffer<Luma<f32>, Vec<f32>>) -> Option<Self> {
        if img.dimensions() == (GLYPH_SIZE, GLYPH_SIZE) {
            Some(Self(img))
        } else {
            None
        }
    }

    pub fn as_image(&self) -> &ImageBuffer<Luma<f32>, Vec<f32>> {
        &self.0
    }

    /// Row-major intensities, `GLYPH_SIZE * GLYPH_SIZE` values.
    pub fn values(&self) -> &[f32] {
        self.0.as_raw()
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.0.get_pixel(x, y)[0]
    }

    /// Renders the glyph as text, two characters per cell:
    /// `##` for glyph, `--` for ambiguous, blanks for background.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((GLYPH_SIZE * (GLYPH_SIZE * 2 + 1)) as usize);
        for row in self.0.rows() {
            for pixel in row {
                out.push_str(match pixel[0] {
                    v if v <= 0.0 => "##",
                    v if v >= 1.0 => "  ",
                    _ => "--",
                });
            }
            out.push('\n');
        }
        out
    }

    /// Converts to an 8-bit grayscale image.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(GLYPH_SIZE, GLYPH_SIZE, |x, y| {
            Luma([(self.get(x, y).clamp(0.0, 1.0) * 255.0).round() as u8])
        })
    }

    /// Saves the glyph as a grayscale PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_gray()
            .save(path)
            .context(format!("Failed to save glyph: {}", path.display()))
    }
}
