//! Answer ranking.
//!
//! Each glyph position carries a probability per symbol. The best answer takes the top
//! symbol everywhere; each further answer swaps in the runner-up at the position the
//! classifier was least sure about.

use serde::{Deserialize, Serialize};

use crate::classify::Alphabet;
use crate::error::SolveError;

/// Number of answers produced per solve.
pub const ANSWER_COUNT: usize = 2;

/// Candidates kept per position before ranking.
const CANDIDATES_PER_POSITION: usize = 2;

/// One symbol and its probability at a position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Candidate {
    pub probability: f32,
    pub symbol: char,
}

/// Classifier output for one glyph position, in alphabet order.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityVector {
    candidates: Vec<Candidate>,
}

impl ProbabilityVector {
    /// Pairs raw scores with the alphabet.
    ///
    /// Fails when the score count differs from the alphabet size or a score is NaN.
    pub fn from_scores(
        scores: &[f32],
        alphabet: &Alphabet,
        position: usize,
    ) -> Result<Self, SolveError> {
        if scores.len() != alphabet.len() {
            return Err(SolveError::ProbabilityLength {
                position,
                expected: alphabet.len(),
                actual: scores.len(),
            });
        }

        let candidates = scores
            .iter()
            .zip(alphabet.symbols())
            .map(|(&probability, &symbol)| {
                if probability.is_nan() {
                    Err(SolveError::InvalidProbability { position, symbol })
                } else {
                    Ok(Candidate {
                        probability,
                        symbol,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The `n` most likely candidates, best first. Equal probabilities keep alphabet order.
    pub fn top(&self, n: usize) -> Vec<Candidate> {
        let mut sorted = self.candidates.clone();
        // sort_by is stable
        sorted.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        sorted.truncate(n);
        sorted
    }
}

/// A full answer string and its joint probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub probability: f32,
    pub text: String,
}

/// Builds up to `count` answers from per-position probabilities, most likely first.
///
/// Every round reads the current best candidate of each position, records the answer,
/// then retires the best candidate at the position with the lowest probability (the
/// earliest one on ties). If that position has nothing left to promote, ranking stops
/// early and only the answers built so far are returned.
pub fn rank_answers(vectors: &[ProbabilityVector], count: usize) -> Result<Vec<Answer>, SolveError> {
    if vectors.is_empty() {
        return Err(SolveError::EmptyGlyphSequence);
    }

    let mut positions: Vec<Vec<Candidate>> = vectors
        .iter()
        .map(|v| v.top(CANDIDATES_PER_POSITION))
        .collect();

    let mut answers = Vec::with_capacity(count);
    while answers.len() < count {
        let mut text = String::with_capacity(positions.len());
        let mut probability = 1.0f32;
        let mut weakest: Option<(usize, f32)> = None;

        for (index, candidates) in positions.iter().enumerate() {
            let Some(best) = candidates.first() else {
                crate::log(&format!("Ranking: position {} has no candidates left", index));
                return Ok(answers);
            };
            probability *= best.probability;
            text.push(best.symbol);
            if weakest.is_none_or(|(_, p)| best.probability < p) {
                weakest = Some((index, best.probability));
            }
        }

        answers.push(Answer { probability, text });
        if answers.len() == count {
            break;
        }

        if let Some((index, _)) = weakest {
            positions[index].remove(0);
            if positions[index].is_empty() {
                crate::log(&format!(
                    "Ranking: no runner-up at position {}, returning {} answer(s)",
                    index,
                    answers.len()
                ));
                break;
            }
        }
    }

    Ok(answers)
}

/// Recomputes the joint probability of `text` from the top candidates of each position.
///
/// Returns `None` when the length differs or a symbol is not among a position's top
/// candidates.
pub fn rescore(text: &str, vectors: &[ProbabilityVector]) -> Option<f32> {
    if text.chars().count() != vectors.len() {
        return None;
    }

    let mut probability = 1.0f32;
    for (symbol, vector) in text.chars().zip(vectors) {
        let candidate = vector
            .top(CANDIDATES_PER_POSITION)
            .into_iter()
            .find(|c| c.symbol == symbol)?;
        probability *= candidate.probability;
    }
    Some(probability)
}
