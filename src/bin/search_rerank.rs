//! search-rerank — query OpenSearch, rerank the hits with Cohere on Bedrock
//!
//! Usage:
//!   search-rerank [OPTIONS] [QUERY...]
//!
//! With no QUERY the tool prompts for one on stdin.

use anyhow::{anyhow, bail, Context};
use search_rerank::auth::Credentials;
use search_rerank::config::Settings;
use search_rerank::{report, SearchReranker};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    size: Option<usize>,
    top_n: Option<usize>,
    output: Option<PathBuf>,
    query: Vec<String>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Run(Args),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&raw) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_usage();
            ExitCode::SUCCESS
        }
        Command::Version => {
            println!("search-rerank {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Command::Run(args) => match run(args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_usage() {
    println!(
        r#"search-rerank — retrieve from OpenSearch, rerank with Cohere Rerank on Bedrock

USAGE:
    search-rerank [OPTIONS] [QUERY...]

OPTIONS:
    --config <path>     YAML settings file
    --size <n>          Documents to retrieve before reranking
    --top-n <n>         Documents to keep after reranking
    --output <path>     Where to write the JSON results
    -h, --help          Show this help message
    -V, --version       Show version information

ENVIRONMENT:
    SEARCH_RERANK_ENDPOINT      OpenSearch endpoint
    SEARCH_RERANK_INDEX         Index to query
    SEARCH_RERANK_REGION        AWS region (falls back to AWS_REGION)
    SEARCH_RERANK_MODEL_ID      Bedrock rerank model id
    SEARCH_RERANK_INITIAL_SIZE  Default for --size
    SEARCH_RERANK_TOP_N         Default for --top-n
    SEARCH_RERANK_OUTPUT        Default for --output
    AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN
    RUST_LOG                    Log filter (default: info)"#
    );
}

fn parse_args(raw: &[String]) -> anyhow::Result<Command> {
    let mut args = Args::default();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--config" => args.config = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--output" => args.output = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--size" => args.size = Some(count(&mut iter, arg)?),
            "--top-n" => args.top_n = Some(count(&mut iter, arg)?),
            "--" => {
                args.query.extend(iter.by_ref().cloned());
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            other => args.query.push(other.to_string()),
        }
    }
    Ok(Command::Run(args))
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> anyhow::Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn count<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> anyhow::Result<usize> {
    let raw = value(iter, flag)?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("{flag} expects a positive integer, got '{raw}'"),
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    let credentials = Credentials::from_env().context("failed to resolve AWS credentials")?;
    let pipeline = SearchReranker::from_settings(&settings, credentials)?;

    let query = if args.query.is_empty() {
        prompt_query()?
    } else {
        args.query.join(" ")
    };
    if query.trim().is_empty() {
        bail!("search query must not be empty");
    }

    let initial_size = args.size.unwrap_or(settings.initial_size);
    let top_n = args.top_n.unwrap_or(settings.top_n);
    let output = pipeline
        .search_and_rerank(&query, initial_size, top_n)
        .await
        .context("search and rerank failed")?;

    println!(
        "Retrieved {} documents, reranked to top {}",
        output.original_results.len(),
        output.reranked_results.len()
    );
    print!("\n{}", report::render_ranked(&output.reranked_results));

    let path = args.output.unwrap_or_else(|| settings.output_path.clone());
    report::write_json(&path, &output)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("\n\nFull results saved to {}", path.display());
    Ok(())
}

fn prompt_query() -> anyhow::Result<String> {
    print!("Enter your search query: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
