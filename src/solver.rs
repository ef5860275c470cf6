use image::Rgb32FImage;
use std::path::Path;

use crate::classify::{Alphabet, GlyphClassifier};
use crate::error::SolveError;
use crate::rank::{ANSWER_COUNT, Answer, ProbabilityVector, rank_answers};
use crate::segment::{
    CanonicalGlyph, DEFAULT_COLOR_LIMIT, LeftToRight, RegionOrdering, extract_regions,
    segment_glyphs,
};

/// Runs the whole pipeline: segmentation, classification and ranking.
pub struct Solver<C> {
    classifier: C,
    alphabet: Alphabet,
    color_limit: usize,
    ordering: Box<dyn RegionOrdering + Send + Sync>,
}

impl<C: GlyphClassifier> Solver<C> {
    /// Creates a solver with the default color limit and left-to-right reading order.
    ///
    /// `alphabet` must match the classifier's output order.
    pub fn new(classifier: C, alphabet: Alphabet) -> Self {
        Self {
            classifier,
            alphabet,
            color_limit: DEFAULT_COLOR_LIMIT,
            ordering: Box::new(LeftToRight),
        }
    }

    /// Sets the number of retained colors (background included).
    pub fn with_color_limit(mut self, color_limit: usize) -> Self {
        self.color_limit = color_limit;
        self
    }

    /// Replaces the reading order strategy.
    pub fn with_ordering(mut self, ordering: impl RegionOrdering + Send + Sync + 'static) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn color_limit(&self) -> usize {
        self.color_limit
    }

    /// Splits the image into canonical glyphs without classifying them.
    pub fn segment(&self, img: &Rgb32FImage) -> Result<Vec<CanonicalGlyph>, SolveError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(SolveError::EmptyImage);
        }
        Ok(segment_glyphs(img, self.color_limit, self.ordering.as_ref()))
    }

    /// Solves one captcha image, returning up to `ANSWER_COUNT` answers, most likely first.
    pub fn solve(&self, img: &Rgb32FImage) -> Result<Vec<Answer>, SolveError> {
        let glyphs = self.segment(img)?;
        if glyphs.is_empty() {
            return Err(SolveError::NoGlyphs {
                colors: extract_regions(img, self.color_limit).len(),
            });
        }
        self.rank_glyphs(&glyphs)
    }

    /// Classifies already segmented glyphs and ranks the answers.
    ///
    /// Lets callers that inspect `segment` output reuse it instead of segmenting twice.
    pub fn rank_glyphs(&self, glyphs: &[CanonicalGlyph]) -> Result<Vec<Answer>, SolveError> {
        let scores = self
            .classifier
            .classify_batch(glyphs)
            .map_err(SolveError::classifier)?;
        if scores.len() != glyphs.len() {
            return Err(SolveError::GlyphCountMismatch {
                expected: glyphs.len(),
                actual: scores.len(),
            });
        }

        let vectors = scores
            .iter()
            .enumerate()
            .map(|(position, s)| ProbabilityVector::from_scores(s, &self.alphabet, position))
            .collect::<Result<Vec<_>, _>>()?;

        let answers = rank_answers(&vectors, ANSWER_COUNT)?;

        crate::log(&format!(
            "Solved {} glyph(s): {}",
            glyphs.len(),
            answers
                .iter()
                .map(|a| format!("{} ({:.4})", a.text, a.probability))
                .collect::<Vec<_>>()
                .join(", ")
        ));

        Ok(answers)
    }

    /// Decodes an image file and solves it.
    pub fn solve_file(&self, path: &Path) -> Result<Vec<Answer>, SolveError> {
        let img = load_image(path)?;
        self.solve(&img)
    }
}

/// Decodes an image file into normalized RGB (each channel divided by its maximum value).
pub fn load_image(path: &Path) -> Result<Rgb32FImage, SolveError> {
    Ok(image::open(path)?.to_rgb32f())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use image::Rgb;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Returns fixed score vectors, one per glyph, in call order.
    struct FixedClassifier {
        scores: Vec<Vec<f32>>,
        seen: Mutex<Vec<CanonicalGlyph>>,
    }

    impl FixedClassifier {
        fn new(scores: Vec<Vec<f32>>) -> Self {
            Self {
                scores,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl GlyphClassifier for FixedClassifier {
        fn classify(&self, glyph: &CanonicalGlyph) -> Result<Vec<f32>> {
            let mut seen = self.seen.lock().unwrap();
            let scores = self
                .scores
                .get(seen.len())
                .cloned()
                .ok_or_else(|| anyhow!("no scores left"))?;
            seen.push(glyph.clone());
            Ok(scores)
        }
    }

    struct FailingClassifier;

    impl GlyphClassifier for FailingClassifier {
        fn classify(&self, _glyph: &CanonicalGlyph) -> Result<Vec<f32>> {
            Err(anyhow!("model not loaded"))
        }
    }

    /// Returns a wrong number of results for the batch.
    struct ShortBatchClassifier;

    impl GlyphClassifier for ShortBatchClassifier {
        fn classify(&self, _glyph: &CanonicalGlyph) -> Result<Vec<f32>> {
            Ok(vec![0.5, 0.5])
        }

        fn classify_batch(&self, _glyphs: &[CanonicalGlyph]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![0.5, 0.5]])
        }
    }

    /// Three flat blocks on white, colors chosen so discovery order differs from reading order.
    fn three_glyph_image() -> Rgb32FImage {
        Rgb32FImage::from_fn(40, 12, |x, y| match (x, y) {
            (2..=6, 4..=9) => Rgb([1.0, 0.0, 0.0]),
            (14..=18, 1..=9) => Rgb([0.0, 1.0, 0.0]),
            (26..=30, 6..=10) => Rgb([0.0, 0.0, 1.0]),
            _ => Rgb([1.0, 1.0, 1.0]),
        })
    }

    fn abcdef() -> Alphabet {
        "ABCDEF".parse().unwrap()
    }

    #[test]
    fn test_solve_end_to_end() {
        let classifier = FixedClassifier::new(vec![
            vec![0.9, 0.1, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.99, 0.01, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5],
        ]);
        let solver = Solver::new(classifier, abcdef());

        let answers = solver.solve(&three_glyph_image()).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].text, "ACE");
        assert_eq!(answers[1].text, "ACF");
        assert_eq!(answers[0].probability, 1.0f32 * 0.9 * 0.99 * 0.5);

        // Glyphs reach the classifier left to right: red (6 rows), green (9), blue (5).
        let seen = solver.classifier.seen.lock().unwrap();
        let heights: Vec<usize> = seen
            .iter()
            .map(|g| (0..16).filter(|&y| g.get(0, y) == 0.0).count())
            .collect();
        assert_eq!(heights, vec![6, 9, 5]);
    }

    #[test]
    fn test_rank_glyphs_matches_solve() {
        let scores = vec![
            vec![0.9, 0.1, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.99, 0.01, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5],
        ];
        let img = three_glyph_image();

        let solved = Solver::new(FixedClassifier::new(scores.clone()), abcdef())
            .solve(&img)
            .unwrap();

        let solver = Solver::new(FixedClassifier::new(scores), abcdef());
        let glyphs = solver.segment(&img).unwrap();
        let ranked = solver.rank_glyphs(&glyphs).unwrap();

        assert_eq!(ranked, solved);
        // Each glyph is classified exactly once, and it is the glyph segment returned.
        assert_eq!(*solver.classifier.seen.lock().unwrap(), glyphs);
    }

    #[test]
    fn test_rank_glyphs_empty() {
        let solver = Solver::new(FixedClassifier::new(vec![]), abcdef());
        let err = solver.rank_glyphs(&[]).unwrap_err();
        assert!(matches!(err, SolveError::EmptyGlyphSequence));
    }

    #[test]
    fn test_color_limit_drops_late_glyphs() {
        // Limit 2 keeps white and the green block (first glyph color in raster order).
        let classifier = FixedClassifier::new(vec![vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0]]);
        let solver = Solver::new(classifier, abcdef()).with_color_limit(2);

        let answers = solver.solve(&three_glyph_image()).unwrap();
        assert_eq!(answers[0].text, "B");
        assert_eq!(solver.classifier.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_ordering() {
        struct RightToLeft;
        impl RegionOrdering for RightToLeft {
            fn sort(&self, regions: &mut [crate::segment::Region]) {
                // Background (widest) stays first
                regions.sort_by_key(|r| std::cmp::Reverse(r.bounds.width()));
                regions[1..].sort_by_key(|r| std::cmp::Reverse(r.bounds.left));
            }
        }

        let solver = Solver::new(FixedClassifier::new(vec![]), abcdef()).with_ordering(RightToLeft);
        let glyphs = solver.segment(&three_glyph_image()).unwrap();
        let heights: Vec<usize> = glyphs
            .iter()
            .map(|g| (0..16).filter(|&y| g.get(0, y) == 0.0).count())
            .collect();
        assert_eq!(heights, vec![5, 9, 6]);
    }

    #[test]
    fn test_single_color_image() {
        let solver = Solver::new(FixedClassifier::new(vec![]), abcdef());
        let img = Rgb32FImage::from_pixel(20, 20, Rgb([1.0, 1.0, 1.0]));

        assert!(solver.segment(&img).unwrap().is_empty());
        let err = solver.solve(&img).unwrap_err();
        assert!(matches!(err, SolveError::NoGlyphs { colors: 1 }));
    }

    #[test]
    fn test_empty_image() {
        let solver = Solver::new(FixedClassifier::new(vec![]), abcdef());
        let err = solver.solve(&Rgb32FImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, SolveError::EmptyImage));
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let solver = Solver::new(FailingClassifier, abcdef());
        let err = solver.solve(&three_glyph_image()).unwrap_err();
        assert!(matches!(err, SolveError::ClassifierUnavailable(_)));
    }

    #[test]
    fn test_wrong_vector_length() {
        let classifier = FixedClassifier::new(vec![vec![1.0, 0.0]; 3]);
        let solver = Solver::new(classifier, abcdef());
        let err = solver.solve(&three_glyph_image()).unwrap_err();
        assert!(matches!(
            err,
            SolveError::ProbabilityLength {
                position: 0,
                expected: 6,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_batch_count_mismatch() {
        let solver = Solver::new(ShortBatchClassifier, "AB".parse().unwrap());
        let err = solver.solve(&three_glyph_image()).unwrap_err();
        assert!(matches!(
            err,
            SolveError::GlyphCountMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_solve_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("captcha.png");
        let img = image::RgbImage::from_fn(40, 12, |x, y| match (x, y) {
            (2..=6, 4..=9) => image::Rgb([200, 10, 10]),
            (14..=18, 1..=9) => image::Rgb([10, 200, 10]),
            _ => image::Rgb([255, 255, 255]),
        });
        img.save(&path).unwrap();

        let classifier = FixedClassifier::new(vec![
            vec![0.0, 0.0, 0.0, 0.8, 0.2, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.7],
        ]);
        let solver = Solver::new(classifier, abcdef());

        let answers = solver.solve_file(&path).unwrap();
        assert_eq!(answers[0].text, "DF");
        assert_eq!(answers[1].text, "DE");
    }
}
