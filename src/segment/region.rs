//! Color region discovery.
//!
//! Captcha glyphs are drawn in flat, distinct colors over a flat background, so every
//! distinct color marks one glyph (or the background). The extractor records the first
//! `limit` colors met in raster order together with the bounding box of each.
//!
//! Coordinates: `x` is the column index, `y` is the row index. The scan is row-major,
//! so the flat index `i` of a pixel is `y * width + x`.

use image::{Rgb, Rgb32FImage};

/// An exact RGB color. Two colors are equal only if every channel is bit-for-bit equal
/// as a float; there is no tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub [f32; 3]);

impl From<Rgb<f32>> for Color {
    fn from(pixel: Rgb<f32>) -> Self {
        Color(pixel.0)
    }
}

impl Color {
    pub fn matches(&self, pixel: &Rgb<f32>) -> bool {
        self.0 == pixel.0
    }
}

/// Inclusive bounding box in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Bounds {
    /// A box covering the single pixel at (x, y).
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    /// Returns the smallest box containing both `self` and (x, y).
    pub fn include(self, x: u32, y: u32) -> Self {
        Self {
            left: self.left.min(x),
            top: self.top.min(y),
            right: self.right.max(x),
            bottom: self.bottom.max(y),
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// One retained color and where it appears.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub color: Color,
    pub bounds: Bounds,
}

/// Regions in discovery order (first seen in the raster scan comes first).
#[derive(Clone, Debug, Default)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in the order their colors were discovered.
    pub fn discovered(&self) -> &[Region] {
        &self.regions
    }

    /// Returns a new sequence in reading order. The first entry is the background.
    pub fn ordered(&self, ordering: &dyn RegionOrdering) -> Vec<Region> {
        let mut regions = self.regions.clone();
        ordering.sort(&mut regions);
        regions
    }
}

/// Decides the reading order of regions.
pub trait RegionOrdering {
    fn sort(&self, regions: &mut [Region]);
}

/// Horizontal reading order: ascending `left`, ties keep discovery order.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeftToRight;

impl RegionOrdering for LeftToRight {
    fn sort(&self, regions: &mut [Region]) {
        // sort_by_key is stable
        regions.sort_by_key(|region| region.bounds.left);
    }
}

/// Scans the image and returns the bounding boxes of the first `limit` distinct colors.
///
/// A pixel whose color is new once `limit` colors are already known is ignored.
pub fn extract_regions(img: &Rgb32FImage, limit: usize) -> RegionMap {
    let mut regions: Vec<Region> = Vec::with_capacity(limit);

    for (x, y, pixel) in img.enumerate_pixels() {
        match regions.iter().position(|region| region.color.matches(pixel)) {
            Some(idx) => {
                let region = &mut regions[idx];
                region.bounds = region.bounds.include(x, y);
            }
            None if regions.len() < limit => regions.push(Region {
                color: Color::from(*pixel),
                bounds: Bounds::at(x, y),
            }),
            None => {}
        }
    }

    RegionMap { regions }
}
