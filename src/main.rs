//! @ai:module:intent CLI entry point for difflint
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on linter, config, filter, output

use clap::{Parser, ValueEnum};
use difflint::{
    config, linter, output, LintOptions, OutputFormat, PathFilter, Result, TemplateTable,
};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "difflint")]
#[command(
    author,
    version,
    about = "Lint a unified diff against LINT.IF / LINT.END rules in the changed files"
)]
struct Cli {
    /// Only lint changed files matching this glob (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Skip changed files matching this glob (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// JSON file mapping extensions to extra directive templates
    #[arg(long)]
    ext_map: Option<PathBuf>,

    /// Template used for extensions with no mapping, e.g. "#LINT.?"
    #[arg(long)]
    default_template: Option<String>,

    /// Directory that paths in the diff are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Read the diff from a file instead of stdin
    #[arg(long)]
    diff: Option<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: Format,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "difflint=debug" } else { "difflint=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_options(cli: &Cli) -> Result<LintOptions> {
    let mut templates = TemplateTable::default();
    if let Some(path) = &cli.ext_map {
        templates = config::load_overrides(path)?.apply(templates)?;
    }
    if let Some(template) = &cli.default_template {
        templates = templates.with_default(template)?;
    }

    Ok(LintOptions {
        templates,
        filter: PathFilter::new(cli.include.as_slice(), cli.exclude.as_slice())?,
        root: cli.root.clone(),
    })
}

fn read_input(cli: &Cli) -> Result<String> {
    match &cli.diff {
        Some(path) => {
            let file = File::open(path).map_err(|e| difflint::Error::FileRead {
                path: path.clone(),
                source: e,
            })?;
            linter::read_diff(file)
        }
        None => linter::read_diff(io::stdin().lock()),
    }
}

fn run(cli: &Cli) -> Result<linter::LintResult> {
    let options = build_options(cli)?;
    let diff = read_input(cli)?;
    linter::lint(&diff, &options)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(result) => {
            println!("{}", output::format_lint_result(&result, cli.format.into()));

            if result.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
