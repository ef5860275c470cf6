//! Glyph classification.
//!
//! The solver does not know how glyphs are recognized. It only needs something that maps
//! a canonical glyph to one score per alphabet symbol, in alphabet order.

pub mod alphabet;
pub mod template;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET};
pub use template::TemplateClassifier;

use anyhow::Result;

use crate::segment::CanonicalGlyph;

/// Maps canonical glyphs to per-symbol probabilities.
pub trait GlyphClassifier: Send + Sync {
    /// Scores one glyph. The result has one entry per alphabet symbol, in alphabet order.
    fn classify(&self, glyph: &CanonicalGlyph) -> Result<Vec<f32>>;

    /// Scores a batch of glyphs, one result per glyph in the same order.
    fn classify_batch(&self, glyphs: &[CanonicalGlyph]) -> Result<Vec<Vec<f32>>> {
        glyphs.iter().map(|glyph| self.classify(glyph)).collect()
    }
}

impl<C: GlyphClassifier + ?Sized> GlyphClassifier for Box<C> {
    fn classify(&self, glyph: &CanonicalGlyph) -> Result<Vec<f32>> {
        (**self).classify(glyph)
    }

    fn classify_batch(&self, glyphs: &[CanonicalGlyph]) -> Result<Vec<Vec<f32>>> {
        (**self).classify_batch(glyphs)
    }
}
