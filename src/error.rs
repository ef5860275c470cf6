//! Error types for the solve pipeline.
//!
//! Every stage is pure computation, so errors describe malformed input or a failing
//! classifier. Nothing here is retried; callers decide what to do with a failed solve.

use thiserror::Error;

/// Errors raised while turning a captcha image into ranked answers.
#[derive(Error, Debug)]
pub enum SolveError {
    /// The image has no pixels at all.
    #[error("invalid input: image is empty")]
    EmptyImage,

    /// Fewer than two colors were retained, so there is no glyph to classify.
    #[error("invalid input: found {colors} color(s), need a background and at least one glyph")]
    NoGlyphs {
        /// Number of distinct colors retained by the region extractor.
        colors: usize,
    },

    /// Ranking was asked for an answer with no glyph positions.
    #[error("invalid input: no glyph positions to rank")]
    EmptyGlyphSequence,

    /// A probability vector does not line up with the alphabet.
    #[error("invalid input: position {position} has {actual} scores, alphabet has {expected}")]
    ProbabilityLength {
        /// Glyph position, left to right.
        position: usize,
        /// Alphabet size.
        expected: usize,
        /// Number of scores the classifier produced.
        actual: usize,
    },

    /// A score is NaN and cannot be ranked.
    #[error("invalid input: position {position} has a NaN score for '{symbol}'")]
    InvalidProbability {
        /// Glyph position, left to right.
        position: usize,
        /// Symbol whose score is NaN.
        symbol: char,
    },

    /// The classifier returned a different number of results than glyphs it was given.
    #[error("classifier returned {actual} results for {expected} glyphs")]
    GlyphCountMismatch {
        /// Number of glyphs sent to the classifier.
        expected: usize,
        /// Number of score vectors received.
        actual: usize,
    },

    /// The classifier failed; the solve is aborted.
    #[error("classifier unavailable")]
    ClassifierUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The image file could not be decoded.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),
}

impl SolveError {
    /// Wraps a classifier failure.
    pub fn classifier(error: anyhow::Error) -> Self {
        SolveError::ClassifierUnavailable(error.into())
    }

    /// True for errors caused by the input rather than by the classifier.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            SolveError::EmptyImage
                | SolveError::NoGlyphs { .. }
                | SolveError::EmptyGlyphSequence
                | SolveError::ProbabilityLength { .. }
                | SolveError::InvalidProbability { .. }
        )
    }
}
