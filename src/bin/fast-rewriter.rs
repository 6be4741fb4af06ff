use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter};
use tracing::info;

use fast_rewriter::{
    Args, Config,
    logging::{init_logging, parse_early_log_config},
};

fn main() -> Result<()> {
    // Logging comes up before clap so configuration problems are logged too
    let raw_args: Vec<String> = std::env::args().collect();
    let _log_guard = init_logging(parse_early_log_config(&raw_args));

    let args = Args::parse();

    // Handle --create-config flag
    if args.create_config {
        let path = Config::create_sample_config()?;
        eprintln!("Sample config at: {}", path.display());
        return Ok(());
    }

    // Resolve configuration from CLI args, environment variables, and config file
    let config = args.resolve_config()?;
    info!(
        chunk_size = *config.chunk_size,
        chunk_size_source = config.chunk_size.source_name(),
        line_ending = %config.line_ending,
        strict_data = *config.strict_data,
        "configuration resolved"
    );

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    // Stderr stays unlocked: the log worker shares it with the diagnostics
    let summary = config
        .rewrite(stdin, stdout, io::stderr())
        .context("Failed to rewrite fast-export stream")?;

    info!(
        commits = summary.commits,
        resets = summary.resets,
        blobs = summary.blobs,
        blob_bytes = summary.blob_bytes,
        references_added = summary.references_added,
        directory_operations_suppressed = summary.directory_operations_suppressed,
        skipped_tokens = summary.skipped_tokens,
        "done"
    );

    Ok(())
}
