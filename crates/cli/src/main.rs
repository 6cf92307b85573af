use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use querykit_protocol::Keyword;
use querykit_search::MatchProfile;
use std::io;
use std::path::{Path, PathBuf};

mod catalog;
mod commands;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "querykit")]
#[command(about = "Name, quantity and catalog matching for short free-text requests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Match profile (JSON or TOML); the bundled default profile is used otherwise
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the clean product name and its keywords
    Name(NameArgs),

    /// Find quantities written next to unit words
    Quantity(QuantityArgs),

    /// Match catalog entries against keywords
    Catalog(CatalogArgs),

    /// Pick the catalog entry whose keywords occur in the text
    Best(BestArgs),

    /// Name, quantities and catalog offers for one request
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct NameArgs {
    /// Request text
    text: String,
}

#[derive(Args)]
struct QuantityArgs {
    /// Request text
    text: String,

    /// Look for numbers glued to the unit ("13pcs") instead of "13 pcs"
    #[arg(long)]
    glued: bool,
}

#[derive(Args)]
struct CatalogArgs {
    /// JSON array of catalog entries
    #[arg(long)]
    catalog: PathBuf,

    /// Keywords as NAME or NAME:SCORE
    #[arg(required = true, value_parser = parse_keyword)]
    keywords: Vec<Keyword>,

    /// Override the profile's minimum score
    #[arg(long)]
    min_score: Option<i32>,
}

#[derive(Args)]
struct BestArgs {
    /// JSON array of catalog entries with keywords
    #[arg(long)]
    catalog: PathBuf,

    /// Value returned when no entry matches
    #[arg(long)]
    default: Option<String>,

    /// List every matching entry instead of the best one
    #[arg(long)]
    all: bool,

    /// Request text
    text: String,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Request text
    text: String,

    /// JSON array of catalog entries to match the extracted keywords against
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn parse_keyword(raw: &str) -> std::result::Result<Keyword, String> {
    let keyword = match raw.rsplit_once(':') {
        Some((name, score)) => match score.parse::<i32>() {
            Ok(score) => Keyword::with_score(name, score),
            Err(_) => Keyword::new(raw),
        },
        None => Keyword::new(raw),
    };
    if keyword.name.is_empty() {
        return Err(format!("keyword '{raw}' has an empty name"));
    }
    Ok(keyword)
}

fn load_profile(path: Option<&Path>) -> Result<MatchProfile> {
    match path {
        Some(path) => MatchProfile::from_file(path),
        None => Ok(MatchProfile::default_profile()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let profile = load_profile(cli.profile.as_deref()).context("Failed to load match profile")?;
    log::debug!("Using profile '{}'", profile.name());

    let output = match cli.command {
        Commands::Name(args) => commands::name(&profile, &args.text, cli.pretty)?,
        Commands::Quantity(args) => {
            commands::quantity(&profile, &args.text, args.glued, cli.pretty)?
        }
        Commands::Catalog(args) => {
            let entries = catalog::load_entries(&args.catalog)?;
            commands::catalog(&profile, entries, &args.keywords, args.min_score, cli.pretty)?
        }
        Commands::Best(args) => {
            let entries = catalog::load_entries(&args.catalog)?;
            commands::best(
                &profile,
                entries,
                args.default,
                &args.text,
                args.all,
                cli.pretty,
            )?
        }
        Commands::Analyze(args) => {
            let entries = match &args.catalog {
                Some(path) => catalog::load_entries(path)?,
                None => Vec::new(),
            };
            commands::analyze(&profile, entries, &args.text, cli.pretty)?
        }
    };

    print_stdout(&output)
}
