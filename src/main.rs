//! sylla - syllable-emphasis rewriter for ebooks

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use sylla::{emphasize_epub, BatchSummary, Dictionary, DocumentStatus, Options, Parity};

#[derive(Parser)]
#[command(name = "sylla")]
#[command(version, about = "Emphasize alternating syllables in an ebook's text", long_about = None)]
#[command(after_help = "EXAMPLES:
    sylla book.epub                     Write book_syllables.epub
    sylla book.epub out.epub -l de      Force German hyphenation
    sylla --in-place chapter.xhtml      Rewrite a single document in place
    sylla book.epub --tag em --first    <em> wrappers on the 1st, 3rd, ... syllables")]
struct Cli {
    /// Input file (EPUB, XHTML, or HTML)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; defaults to the input name with a _syllables suffix
    #[arg(value_name = "OUTPUT", conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(long)]
    in_place: bool,

    /// Hyphenation language tag (default: the book's dc:language)
    #[arg(short, long)]
    language: Option<String>,

    /// Emphasize the 1st, 3rd, ... syllables instead of the 2nd, 4th, ...
    #[arg(long)]
    first: bool,

    /// Element to wrap emphasized syllables in
    #[arg(long, default_value = "b", value_name = "TAG")]
    tag: String,

    /// Additional tags whose content is left untouched (repeatable)
    #[arg(long, value_name = "TAG")]
    skip: Vec<String>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = Options {
        language: cli.language.clone(),
        parity: if cli.first {
            Parity::First
        } else {
            Parity::Second
        },
        emphasis_tag: cli.tag.clone(),
        excluded_tags: {
            let mut tags = sylla::default_excluded_tags();
            tags.extend(cli.skip.iter().map(|t| t.to_ascii_lowercase()));
            tags
        },
    };

    let extension = cli
        .input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let output = output_path(cli)?;
    // When rewriting in place, write next to the input and swap afterwards.
    let target = if cli.in_place {
        cli.input.with_extension(format!("{extension}.tmp"))
    } else {
        output.clone()
    };

    match extension.as_str() {
        "epub" => {
            let summary =
                emphasize_epub(&cli.input, &target, &options).map_err(|e| e.to_string())?;
            finish(cli, &target, &output)?;
            report(cli, &output, &summary);
        }
        "xhtml" | "html" | "htm" => {
            let data = std::fs::read(&cli.input).map_err(|e| e.to_string())?;
            let language = options.language.as_deref().unwrap_or("en");
            let dictionary = Dictionary::load(language);
            let rewritten = sylla::rewrite_document(&data, &dictionary, &options)
                .map_err(|e| e.to_string())?;
            std::fs::write(&target, rewritten).map_err(|e| e.to_string())?;
            finish(cli, &target, &output)?;
            if !cli.quiet && !cli.json {
                println!("wrote {}", output.display());
            }
        }
        other => {
            return Err(format!(
                "unable to handle .{other} inputs; supported inputs: .epub, .xhtml, .html"
            ));
        }
    }

    Ok(())
}

fn output_path(cli: &Cli) -> Result<PathBuf, String> {
    if cli.in_place {
        return Ok(cli.input.clone());
    }
    if let Some(ref output) = cli.output {
        return Ok(output.clone());
    }
    let stem = cli
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("cannot derive an output name from {}", cli.input.display()))?;
    let extension = cli
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("epub");
    Ok(cli
        .input
        .with_file_name(format!("{stem}_syllables.{extension}")))
}

/// Move the temporary file over the input for --in-place runs.
fn finish(cli: &Cli, target: &Path, output: &Path) -> Result<(), String> {
    if cli.in_place && target != output {
        std::fs::rename(target, output).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn report(cli: &Cli, output: &Path, summary: &BatchSummary) {
    if cli.json {
        print_json(cli, output, summary);
        return;
    }
    if cli.quiet {
        return;
    }

    println!(
        "{}: {} of {} documents rewritten",
        output.display(),
        summary.rewritten(),
        summary.outcomes.len()
    );
    for outcome in &summary.outcomes {
        if let DocumentStatus::Failed(ref reason) = outcome.status {
            println!("  skipped {}: {}", outcome.href, reason);
        }
    }
}

fn print_json(cli: &Cli, output: &Path, summary: &BatchSummary) {
    #[derive(serde::Serialize)]
    struct Failure<'a> {
        href: &'a str,
        reason: &'a str,
    }

    #[derive(serde::Serialize)]
    struct Report<'a> {
        input: String,
        output: String,
        /// Language hyphenation actually ran with.
        language: Option<&'a str>,
        documents: usize,
        rewritten: usize,
        failed: usize,
        failures: Vec<Failure<'a>>,
    }

    let failures: Vec<Failure> = summary
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome.status {
            DocumentStatus::Failed(ref reason) => Some(Failure {
                href: &outcome.href,
                reason,
            }),
            DocumentStatus::Rewritten => None,
        })
        .collect();

    let report = Report {
        input: cli.input.display().to_string(),
        output: output.display().to_string(),
        language: summary.language.as_deref(),
        documents: summary.outcomes.len(),
        rewritten: summary.rewritten(),
        failed: summary.failed(),
        failures,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("summary serialization")
    );
}
