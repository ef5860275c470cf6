use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Symbols the classifier was trained on, in output order.
///
/// Visually ambiguous characters (0, C, I, K, O, P, S, U, V, W, X, Z and most of their
/// lowercase forms) never appear in the captchas and are left out.
pub const DEFAULT_ALPHABET: &str = "123456789ABDEFGHJLMNQRTYabdefghijmnqrty";

/// Ordered set of symbols. Position `i` names the classifier's `i`-th output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&s| s == symbol)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl FromStr for Alphabet {
    type Err = anyhow::Error;

    /// Parses an alphabet from its symbols. Rejects empty input and repeated symbols.
    fn from_str(s: &str) -> Result<Self> {
        let mut symbols: Vec<char> = Vec::with_capacity(s.len());
        for c in s.chars() {
            if symbols.contains(&c) {
                return Err(anyhow!("Alphabet contains '{}' more than once", c));
            }
            symbols.push(c);
        }
        if symbols.is_empty() {
            return Err(anyhow!("Alphabet is empty"));
        }
        Ok(Self { symbols })
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.symbols.iter().collect();
        write!(f, "{}", s)
    }
}

impl Serialize for Alphabet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Alphabet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
