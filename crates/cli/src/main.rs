//! CLI tool for turning Word documents into slide decks.

mod pipeline;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use docdeck_core::{DeckSettings, MatchMode};
use docdeck_docx::{DocxParser, FigureExtractor};
use docdeck_llm::{AnthropicGenerator, OfflineGenerator, SlideGenerator};
use docdeck_pptx::PptxWriter;
use pipeline::{detect_topics, DeckBuilder, LayoutMode};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Convert a .docx document into a .pptx slide deck.
#[derive(Parser, Debug)]
#[command(name = "docdeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Word document (.docx)
    input: PathBuf,

    /// Output presentation (default: <input>.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for extracted images (default: <output>_figures next to the output)
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model id
    #[arg(long)]
    model: Option<String>,

    /// API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// Key topic sent with every segment
    #[arg(long, default_value = "")]
    topic: String,

    /// Ask the model for the document's key topics first
    #[arg(long)]
    detect_topics: bool,

    /// How figures are matched to slides
    #[arg(long, value_enum, default_value_t = LayoutArg::Matched)]
    layout: LayoutArg,

    /// How figure words are compared with slide text
    #[arg(long, value_enum, default_value_t = MatchArg::Substring)]
    match_mode: MatchArg,

    /// Deck settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Bullets per slide (overrides the settings file)
    #[arg(long)]
    max_bullets: Option<usize>,

    /// Build slides from the document text without calling the API
    #[arg(long)]
    offline: bool,

    /// Print placement decisions as JSON
    #[arg(long)]
    placements: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayoutArg {
    Matched,
    Sequential,
}

impl From<LayoutArg> for LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Matched => LayoutMode::Matched,
            LayoutArg::Sequential => LayoutMode::Sequential,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MatchArg {
    Substring,
    Word,
}

impl From<MatchArg> for MatchMode {
    fn from(arg: MatchArg) -> Self {
        match arg {
            MatchArg::Substring => MatchMode::Substring,
            MatchArg::Word => MatchMode::Word,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let settings = load_settings(&args)?;
    let generator = create_generator(&args)?;
    log::debug!("Using generator {}", generator.name());

    run(&args, &settings, generator.as_ref())
}

/// Read the settings file, if any, and apply flag overrides.
fn load_settings(args: &Args) -> Result<DeckSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", path.display()))?
        }
        None => DeckSettings::default(),
    };

    if let Some(max_bullets) = args.max_bullets {
        settings.max_bullets_per_slide = max_bullets;
    }
    settings.validate()?;
    Ok(settings)
}

fn create_generator(args: &Args) -> Result<Box<dyn SlideGenerator>> {
    if args.offline {
        return Ok(Box::new(OfflineGenerator::new()));
    }

    let Some(api_key) = args.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        bail!("No API key: pass --api-key, set ANTHROPIC_API_KEY, or use --offline");
    };

    let mut generator =
        AnthropicGenerator::new(api_key).with_timeout(Duration::from_secs(args.timeout));
    if let Some(model) = &args.model {
        generator = generator.with_model(model.as_str());
    }
    if let Some(url) = &args.base_url {
        generator = generator.with_base_url(url.as_str());
    }
    Ok(Box::new(generator))
}

fn run(args: &Args, settings: &DeckSettings, generator: &dyn SlideGenerator) -> Result<()> {
    let input_path = &args.input;
    if args.verbose {
        eprintln!("Processing: {}", input_path.display());
    }

    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let document = DocxParser::new()
        .parse(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", input_path.display()))?;

    let output_path = output_path(input_path, args.output.as_deref());
    let image_dir = args
        .image_dir
        .clone()
        .unwrap_or_else(|| default_image_dir(&output_path));

    let items = FigureExtractor::new(&image_dir)
        .extract(&document)
        .with_context(|| format!("Failed to extract figures into {}", image_dir.display()))?;
    if args.verbose {
        eprintln!(
            "  Found {} content items, {} images",
            items.len(),
            document.image_count()
        );
    }

    let topics = if args.detect_topics {
        detect_topics(generator, &document.full_text())
    } else {
        Vec::new()
    };

    let outcome = DeckBuilder::new()
        .with_layout(args.layout.into())
        .with_match_mode(args.match_mode.into())
        .with_max_bullets(settings.max_bullets_per_slide)
        .with_topic(args.topic.as_str())
        .with_topics(topics)
        .build(&items, generator)?;

    if outcome.deck.is_empty() {
        log::warn!("No slides were produced for {}", input_path.display());
    }

    PptxWriter::new(settings)
        .write_to_path(&outcome.deck, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if args.placements {
        println!("{}", serde_json::to_string_pretty(&outcome.placements)?);
    }
    if args.verbose {
        eprintln!(
            "Written {} slides to: {}",
            outcome.deck.len(),
            output_path.display()
        );
    }

    Ok(())
}

/// `<stem>.pptx` beside the input unless an output path was given.
fn output_path(input_path: &Path, output: Option<&Path>) -> PathBuf {
    if let Some(path) = output {
        return path.to_path_buf();
    }

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let filename = format!("{}.pptx", stem);

    match input_path.parent() {
        Some(parent) => parent.join(filename),
        None => PathBuf::from(filename),
    }
}

/// `<output-stem>_figures` beside the output file.
fn default_image_dir(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output_path.with_file_name(format!("{}_figures", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_defaults_next_to_input() {
        assert_eq!(
            output_path(Path::new("docs/report.docx"), None),
            PathBuf::from("docs/report.pptx")
        );
        assert_eq!(
            output_path(Path::new("report.docx"), Some(Path::new("out/deck.pptx"))),
            PathBuf::from("out/deck.pptx")
        );
    }

    #[test]
    fn test_default_image_dir() {
        assert_eq!(
            default_image_dir(Path::new("out/deck.pptx")),
            PathBuf::from("out/deck_figures")
        );
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["docdeck", "report.docx", "--offline"]).unwrap();
        assert!(args.offline);
        assert_eq!(args.timeout, 60);
        assert!(matches!(args.layout, LayoutArg::Matched));
        assert!(matches!(args.match_mode, MatchArg::Substring));
    }

    #[test]
    fn test_max_bullets_override_is_validated() {
        let args = Args::try_parse_from(["docdeck", "a.docx", "--max-bullets", "0"]).unwrap();
        assert!(load_settings(&args).is_err());

        let args = Args::try_parse_from(["docdeck", "a.docx", "--max-bullets", "3"]).unwrap();
        assert_eq!(load_settings(&args).unwrap().max_bullets_per_slide, 3);
    }

    #[test]
    fn test_settings_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"slide_width": 13.333}"#).unwrap();

        let args = Args::try_parse_from(["docdeck", "a.docx", "--settings", path.to_str().unwrap()])
            .unwrap();
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.slide_width, 13.333);
        assert_eq!(settings.max_bullets_per_slide, 6);
    }

    #[test]
    fn test_offline_generator_needs_no_key() {
        let args = Args::try_parse_from(["docdeck", "a.docx", "--offline"]).unwrap();
        assert_eq!(create_generator(&args).unwrap().name(), "offline");
    }
}
