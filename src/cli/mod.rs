use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "happyhour")]
#[command(author = "Happyhour Team")]
#[command(version)]
#[command(about = "Find a happy hour by describing it", long_about = None)]
pub struct Cli {
    /// What you are looking for; when several are given the last one is used
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// CSV file with one happy-hour spot per row
    #[arg(short, long, env = "HAPPYHOUR_DATA")]
    pub data: Option<PathBuf>,

    /// Maximum number of search results handed to the chat model
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Drop results scoring below this cosine similarity
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Re-embed every row even if the cache looks valid
    #[arg(long)]
    pub rebuild: bool,

    /// Print ranked results and skip the chat recommendation
    #[arg(long)]
    pub search_only: bool,

    /// Path to a config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The last positional argument is the query
    pub fn query(&self) -> &str {
        self.query.last().map(String::as_str).unwrap_or_default()
    }
}
