use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ranking-diff",
    version,
    about = "Compare two ranking evaluation snapshots and render a regression diff"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Diff(DiffArgs),
    Inspect(InspectArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DuplicatePolicy {
    #[value(aliases = ["last", "last-write-wins", "overwrite"])]
    LastWins,
    #[value(aliases = ["strict", "error"])]
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWins => "last-wins",
            Self::Reject => "reject",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    #[arg(long)]
    pub before: PathBuf,

    #[arg(long)]
    pub after: PathBuf,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,

    /// Aggregate metric to compare; repeat to compare several. Defaults to
    /// top1_hit_rate and mrr.
    #[arg(long = "metric")]
    pub metrics: Vec<String>,

    /// Falls back to RANKING_DIFF_DUPLICATE_CASE_IDS, then last-wins.
    #[arg(long, value_enum)]
    pub duplicate_case_ids: Option<DuplicatePolicy>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub snapshot: PathBuf,

    #[arg(long = "metric")]
    pub metrics: Vec<String>,

    #[arg(long, value_enum)]
    pub duplicate_case_ids: Option<DuplicatePolicy>,
}
