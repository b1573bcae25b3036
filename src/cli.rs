use clap::Parser;
use std::path::PathBuf;

/// Download a file over HTTP(S) using parallel byte-range requests.
///
/// The resource is split into one range per worker, fetched concurrently and
/// reassembled in order. The output is written only if every range succeeds.
#[derive(Parser, Debug)]
#[command(name = "rangefetch", version, about, long_about = None)]
pub struct Cli {
    /// URL of the resource to download
    pub url: String,

    /// Number of concurrent range requests [default: download.default_workers]
    pub threads: Option<usize>,

    /// Output path [default: last segment of the URL path]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file [default: $RANGEFETCH_CONFIG or config/rangefetch.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}
