use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};
use pdfanon_application::{anonymize, default_output_path};
use pdfanon_core::{PdfBackend, SourceDocument};
use pdfanon_engine::Engine;
use pdfanon_storage::{ConfigFile, ConfigLoader, Overrides};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdfanon",
    version,
    about = "Redact sensitive words in a PDF while keeping the page layout"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a redacted copy of a PDF
    Redact(RedactArgs),
    /// Print the words extracted from a PDF with their boxes
    Words(WordsArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RedactArgs {
    input: PathBuf,

    /// Output file (default: <stem>_anonymized.pdf next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file used instead of ./pdfanon.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra term to redact; repeatable
    #[arg(long = "term", value_name = "TERM")]
    terms: Vec<String>,

    #[arg(long)]
    replacement: Option<String>,

    /// Disable every heuristic rule
    #[arg(long)]
    no_heuristics: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct WordsArgs {
    input: PathBuf,

    /// Only this page (1-based)
    #[arg(long)]
    page: Option<usize>,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a sample global config file if none exists
    #[arg(long)]
    init: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Redact(args) => redact(args),
        Command::Words(args) => words(args),
        Command::Config(args) => config(args),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("PDFANON_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn loader(config: Option<PathBuf>) -> anyhow::Result<ConfigLoader> {
    let loader = ConfigLoader::discover()?;
    Ok(match config {
        Some(path) => loader.with_local_override(path),
        None => loader,
    })
}

fn redact(args: RedactArgs) -> anyhow::Result<()> {
    let overrides = Overrides {
        terms: args.terms,
        replacement: args.replacement,
        no_heuristics: args.no_heuristics,
    };
    let config = loader(args.config)?
        .resolve(&overrides)
        .context("load configuration")?;
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    let engine = Engine::new();
    let summary = anonymize(&engine, &config, &args.input, &output)
        .with_context(|| format!("anonymize {}", args.input.display()))?;

    if args.json {
        let report = serde_json::json!({
            "input": args.input,
            "output": output,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} -> {} ({} pages, {} of {} words redacted)",
            args.input.display(),
            output.display(),
            summary.pages,
            summary.redacted,
            summary.words
        );
    }
    Ok(())
}

fn words(args: WordsArgs) -> anyhow::Result<()> {
    let bytes =
        fs::read(&args.input).with_context(|| format!("read {}", args.input.display()))?;
    let engine = Engine::new();
    let source = engine.open(bytes)?;
    let count = source.page_count();

    let pages: Vec<usize> = match args.page {
        Some(page) if page == 0 || page > count => {
            anyhow::bail!("page {page} out of range 1..={count}")
        }
        Some(page) => vec![page - 1],
        None => (0..count).collect(),
    };

    let mut dump = Vec::with_capacity(pages.len());
    for index in pages {
        let content = source.read_page(index)?;
        if args.json {
            dump.push(serde_json::json!({ "page": index + 1, "content": content }));
            continue;
        }
        println!(
            "page {} ({} x {}, {} words)",
            index + 1,
            content.geometry.width,
            content.geometry.height,
            content.words.len()
        );
        for word in &content.words {
            println!(
                "  {:>8.2} {:>8.2} {:>7.2} {:>6.2}  {}",
                word.x0, word.bottom, word.width, word.height, word.text
            );
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }
    Ok(())
}

fn config(args: ConfigArgs) -> anyhow::Result<()> {
    let loader = loader(args.config)?;
    if args.init {
        let (path, written) = loader.init_global()?;
        if written {
            eprintln!("wrote {}", path.display());
        } else {
            eprintln!("{} already exists", path.display());
        }
    }

    for (label, path) in [("global", loader.global_path()), ("local", loader.local_path())] {
        if let Some(path) = path {
            let state = if path.is_file() { "" } else { " (missing)" };
            println!("# {label}: {}{state}", path.display());
        }
    }
    let config = loader.resolve(&Overrides::default())?;
    print!("{}", ConfigFile::from(&config).to_toml()?);
    Ok(())
}
