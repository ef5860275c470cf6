//! Captcha Glyph Solver
//!
//! Splits a flat-colored captcha image into glyphs, normalizes each glyph into a
//! 16x16 canonical image, classifies it and ranks the most likely answers.

pub mod classify;
pub mod config;
pub mod error;
pub mod paths;
pub mod rank;
pub mod segment;
pub mod solver;

pub use classify::{Alphabet, GlyphClassifier, TemplateClassifier};
pub use error::SolveError;
pub use rank::{Answer, ProbabilityVector};
pub use segment::{CanonicalGlyph, segment_glyphs};
pub use solver::Solver;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to stderr and the log file with timestamp.
///
/// Stdout is reserved for the solver's answers.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("captcha_solver.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
