use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "review-sentiment",
    version,
    about = "Movie review sentiment labeling, evaluation and reporting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch comments, label them by rating, score them and measure agreement.
    Evaluate(EvaluateArgs),
    /// Build the asset manifest for movie posters and cast photos.
    Assets(AssetsArgs),
    /// Summarize a persisted dataset for the front end.
    Report(ReportArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ScorerBackend {
    Http,
    Lexicon,
}

impl ScorerBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Lexicon => "lexicon",
        }
    }
}

/// Which records are left out of the accuracy denominator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum NeutralFilter {
    /// Drop records whose raw rating is exactly 5.
    RawRating,
    /// Drop records whose ground truth label is -1.
    Label,
}

impl NeutralFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RawRating => "raw-rating",
            Self::Label => "label",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "149662594")]
    pub resource_id: String,

    #[arg(long, default_value = "https://comment.daum.net")]
    pub source_url: String,

    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub page_size: usize,

    #[arg(long, default_value_t = 500)]
    pub page_delay_ms: u64,

    #[arg(long, default_value_t = 30000)]
    pub request_timeout_ms: u64,

    #[arg(long, value_enum, default_value_t = ScorerBackend::Http)]
    pub scorer: ScorerBackend,

    #[arg(long, default_value = "http://127.0.0.1:8000/score")]
    pub scorer_url: String,

    #[arg(long, value_enum, default_value_t = NeutralFilter::RawRating)]
    pub neutral_filter: NeutralFilter,

    #[arg(long)]
    pub dataset_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub persist_evaluated_only: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AssetsArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "static/images/movies")]
    pub movie_dir: PathBuf,

    #[arg(long, default_value = "static/images/movies/actors")]
    pub actor_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub dataset_path: Option<PathBuf>,

    #[arg(long)]
    pub asset_manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = 200)]
    pub max_words: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "data")]
    pub data_root: PathBuf,
}
