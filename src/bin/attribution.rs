//! Attribute a code snippet against a JSON corpus from the command line.
//!
//! The merged result is written to stdout as JSON. All tracing output goes
//! to stderr so stdout stays machine readable.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use snippet_attribution::backends::MemoryBackend;
use snippet_attribution::{AttributionConfig, AttributionService};

struct Args {
    corpus: PathBuf,
    snippet: String,
    limit: Option<usize>,
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args(std::env::args().skip(1).collect())? else {
        print_usage();
        return Ok(());
    };

    let config = match args.config {
        Some(ref path) => AttributionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AttributionConfig::default(),
    };
    let limit = args.limit.unwrap_or(config.default_limit);

    let backend = MemoryBackend::from_json_file(&args.corpus)
        .with_context(|| format!("failed to load corpus {}", args.corpus.display()))?;
    tracing::info!(repos = backend.repos().len(), "corpus loaded");

    let service = AttributionService::from_backend(Arc::new(backend), config);
    tracing::info!(
        federate = service.config().federate,
        limit,
        "running snippet attribution"
    );
    let found = service
        .snippet_attribution(&args.snippet, limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "attribution failed");
            anyhow::anyhow!("attribution failed: {e}")
        })?;

    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

/// Returns `None` when usage was requested.
fn parse_args(raw: Vec<String>) -> anyhow::Result<Option<Args>> {
    let mut positional = Vec::new();
    let mut limit = None;
    let mut config = None;

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => return Ok(None),
            "--limit" | "-n" => {
                let value = iter.next().context("--limit requires a value")?;
                let parsed: usize = value
                    .parse()
                    .with_context(|| format!("invalid limit `{value}`"))?;
                limit = Some(parsed);
            }
            "--config" | "-c" => {
                config = Some(PathBuf::from(iter.next().context("--config requires a path")?));
            }
            _ => positional.push(arg),
        }
    }

    let [corpus, snippet] = <[String; 2]>::try_from(positional).map_err(|given| {
        anyhow::anyhow!("expected <corpus.json> <snippet>, got {} arguments", given.len())
    })?;

    // `-` reads the snippet from stdin so multi-line code can be piped in.
    let snippet = if snippet == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read snippet from stdin")?;
        buf
    } else {
        snippet
    };
    if snippet.is_empty() {
        bail!("snippet must not be empty");
    }

    Ok(Some(Args {
        corpus: PathBuf::from(corpus),
        snippet,
        limit,
        config,
    }))
}

fn print_usage() {
    eprintln!(
        "usage: snippet-attribution <corpus.json> <snippet|-> [--limit N] [--config attribution.toml]"
    );
}
