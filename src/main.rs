use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use walkdir::WalkDir;

use tsqlt_discovery::discovery::{PathFilter, TestCache, TestDiscoverer};
use tsqlt_discovery::{cli, logging, output};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(logging::Verbosity::from_flags(args.verbose, args.quiet));
    args.validate().context("Invalid arguments")?;

    let sources = collect_sources(&args.path);
    let filter = PathFilter::new(&args.include).context("Invalid include pattern")?;
    let discoverer = TestDiscoverer::with_cache(TestCache::new(), filter);

    discoverer
        .discover(&sources)
        .context("Discovery failed")?;
    let classes = discoverer.classes();

    let rendered = output::format(&classes, args.format)?;
    match &args.output_file {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Cannot write output file: {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}

fn collect_sources(path: &std::path::Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
        })
        .map(|entry| entry.into_path())
        .collect()
}
