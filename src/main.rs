//! Captcha Solver
//!
//! Reads a captcha image from disk, splits it into glyphs, classifies them with a
//! template set and prints the two most likely answers.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

use captcha_solver::config::{self, SolverConfig};
use captcha_solver::{Alphabet, Answer, Solver, TemplateClassifier, log, paths};

/// Command-line options. Unset options fall back to config.json.
#[derive(Parser, Debug)]
#[command(name = "captcha-solver")]
#[command(version = "0.1.0")]
#[command(about = "Splits a captcha image into glyphs and prints the two most likely answers")]
struct Cli {
    /// Captcha image to solve
    image: PathBuf,
    /// Config file (defaults to config.json next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Template file for the classifier
    #[arg(long)]
    templates: Option<PathBuf>,
    /// Number of colors kept, background included
    #[arg(long)]
    limit: Option<usize>,
    /// Print every canonical glyph as ASCII art
    #[arg(long)]
    ascii: bool,
    /// Save every canonical glyph as PNG into this directory
    #[arg(long)]
    dump: Option<PathBuf>,
    /// Print the answers as a JSON array
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    let cli = Cli::parse();

    paths::ensure_directories()?;

    let config_path = cli.config.clone().unwrap_or_else(paths::get_config_path);
    config::init_config(&config_path);

    run(&cli, config::get_config())
}

/// The template file decides the classifier's output order, so a config naming a
/// different alphabet would pair scores with the wrong symbols.
fn check_alphabet(configured: &Alphabet, templates: &Alphabet) -> Result<()> {
    if configured != templates {
        bail!(
            "Template alphabet \"{}\" differs from configured alphabet \"{}\"",
            templates,
            configured
        );
    }
    Ok(())
}

fn render_answers(answers: &[Answer], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(answers)?);
    }
    Ok(answers
        .iter()
        .enumerate()
        .map(|(i, answer)| format!("{}. {} ({:.6})", i + 1, answer.text, answer.probability))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn run(cli: &Cli, config: &SolverConfig) -> Result<()> {
    let templates_path = cli
        .templates
        .clone()
        .unwrap_or_else(|| paths::resolve(&config.templates_path));
    let classifier = TemplateClassifier::load(&templates_path)?;
    check_alphabet(&config.alphabet, classifier.alphabet())
        .context(format!("Incompatible templates: {}", templates_path.display()))?;
    let alphabet = config.alphabet.clone();

    let solver = Solver::new(classifier, alphabet)
        .with_color_limit(cli.limit.unwrap_or(config.color_limit));

    log(&format!(
        "Solving {} (color limit {})",
        cli.image.display(),
        solver.color_limit()
    ));

    let img = captcha_solver::solver::load_image(&cli.image)
        .context(format!("Failed to load image: {}", cli.image.display()))?;

    let dump_dir = cli.dump.clone().or_else(|| {
        config
            .dump_glyphs
            .then(|| paths::get_logs_dir().join("glyphs"))
    });
    if let Some(dir) = &dump_dir {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create dump directory: {}", dir.display()))?;
    }

    let glyphs = solver.segment(&img)?;
    for (i, glyph) in glyphs.iter().enumerate() {
        if cli.ascii {
            println!("Glyph {}:\n{}", i + 1, glyph.to_ascii());
        }
        if let Some(dir) = &dump_dir {
            glyph.save_png(&dir.join(format!("glyph_{:02}.png", i + 1)))?;
        }
    }

    let answers = solver.rank_glyphs(&glyphs)?;
    println!("{}", render_answers(&answers, cli.json)?);

    Ok(())
}
