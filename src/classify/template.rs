//! Nearest-template classifier.
//!
//! Compares a canonical glyph against reference glyphs loaded from a JSON file and turns
//! the distances into a probability distribution with a softmax.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{Alphabet, GlyphClassifier};
use crate::segment::{CanonicalGlyph, GLYPH_SIZE};

const TEMPLATE_LEN: usize = (GLYPH_SIZE * GLYPH_SIZE) as usize;

fn default_temperature() -> f32 {
    0.05
}

/// One reference glyph, stored row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    pub symbol: char,
    pub pixels: Vec<f32>,
}

/// On-disk layout of a template set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateSet {
    #[serde(default)]
    pub alphabet: Alphabet,
    /// Softmax temperature applied to mean squared distances
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub templates: Vec<Template>,
}

/// Classifies glyphs by distance to the closest template of each symbol.
#[derive(Clone, Debug)]
pub struct TemplateClassifier {
    alphabet: Alphabet,
    temperature: f32,
    /// Templates grouped by alphabet index
    templates: Vec<Vec<Vec<f32>>>,
}

impl TemplateClassifier {
    /// Builds a classifier, checking that every template is canonical-sized and that every
    /// alphabet symbol has at least one template.
    pub fn new(set: TemplateSet) -> Result<Self> {
        if set.temperature.is_nan() || set.temperature <= 0.0 {
            return Err(anyhow!(
                "Template temperature must be positive, got {}",
                set.temperature
            ));
        }

        let mut templates: Vec<Vec<Vec<f32>>> = vec![Vec::new(); set.alphabet.len()];
        for (i, template) in set.templates.into_iter().enumerate() {
            if template.pixels.len() != TEMPLATE_LEN {
                return Err(anyhow!(
                    "Template {} ('{}') has {} pixels, expected {}",
                    i,
                    template.symbol,
                    template.pixels.len(),
                    TEMPLATE_LEN
                ));
            }
            let index = set.alphabet.index_of(template.symbol).ok_or_else(|| {
                anyhow!(
                    "Template {} uses '{}' which is not in the alphabet",
                    i,
                    template.symbol
                )
            })?;
            templates[index].push(template.pixels);
        }

        if let Some(missing) = templates.iter().position(|t| t.is_empty()) {
            return Err(anyhow!(
                "No template for '{}'",
                set.alphabet.symbols()[missing]
            ));
        }

        Ok(Self {
            alphabet: set.alphabet,
            temperature: set.temperature,
            templates,
        })
    }

    /// Parses a template set from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let set: TemplateSet =
            serde_json::from_str(json).context("Failed to parse template JSON")?;
        Self::new(set)
    }

    /// Loads a template set from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read templates: {}", path.display()))?;
        let classifier = Self::from_json(&contents)?;

        crate::log(&format!(
            "Loaded {} templates for {} symbols from {}",
            classifier.templates.iter().map(Vec::len).sum::<usize>(),
            classifier.alphabet.len(),
            path.display()
        ));

        Ok(classifier)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}

/// Mean squared difference between two equally long pixel slices.
fn mean_squared_distance(a: &[f32], b: &[f32]) -> f32 {
    let sum: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    sum / a.len() as f32
}

impl GlyphClassifier for TemplateClassifier {
    fn classify(&self, glyph: &CanonicalGlyph) -> Result<Vec<f32>> {
        let pixels = glyph.values();

        let logits: Vec<f32> = self
            .templates
            .iter()
            .map(|group| {
                let closest = group
                    .iter()
                    .map(|template| mean_squared_distance(pixels, template))
                    .fold(f32::INFINITY, f32::min);
                -closest / self.temperature
            })
            .collect();

        // Softmax, shifted by the largest logit
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exps.iter().sum();

        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}
