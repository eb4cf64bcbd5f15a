use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::EvaluateArgs;
use crate::dataset::write_dataset;
use crate::model::{EvaluationCounts, EvaluationRunManifest};
use crate::rating::GroundTruth;
use crate::scorer::{SentimentScorer, build_scorer};
use crate::util::{
    default_dataset_path, ensure_directory, manifest_dir, now_utc_string, sha256_file,
    utc_compact_millis_string, utc_compact_string, write_new_json_pretty,
};

use super::accuracy::{Accuracy, NEUTRAL_RATING};
use super::fetch::{CommentSource, DaumCommentSource, FetchOptions};
use super::pipeline::{EvaluationOutcome, run_pipeline};

pub const EVALUATION_MANIFEST_PREFIX: &str = "evaluation_run_";

pub fn run(args: EvaluateArgs) -> Result<()> {
    let timeout = Duration::from_millis(args.request_timeout_ms);
    let source = DaumCommentSource::new(&args.source_url, timeout)?;
    let scorer = build_scorer(args.scorer, &args.scorer_url, timeout)?;

    run_with(&args, &source, scorer.as_ref())?;
    Ok(())
}

/// Runs one evaluation against the given source and scorer, persists the
/// dataset and run manifest, and returns the manifest path. Nothing is
/// written when fetching or scoring fails.
pub(super) fn run_with(
    args: &EvaluateArgs,
    source: &dyn CommentSource,
    scorer: &dyn SentimentScorer,
) -> Result<PathBuf> {
    if args.page_size == 0 {
        bail!("--page-size must be at least 1");
    }

    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let started = Instant::now();
    let run_id = format!("eval-{}", utc_compact_string(started_ts));

    let manifest_dir = manifest_dir(&args.data_root);
    let dataset_path = args
        .dataset_path
        .clone()
        .unwrap_or_else(|| default_dataset_path(&args.data_root));

    info!(
        run_id = %run_id,
        resource_id = %args.resource_id,
        scorer = scorer.backend(),
        neutral_filter = args.neutral_filter.as_str(),
        "starting evaluation"
    );

    let fetch_options = FetchOptions {
        page_size: args.page_size,
        page_delay: Duration::from_millis(args.page_delay_ms),
    };

    let outcome = run_pipeline(
        source,
        scorer,
        &args.resource_id,
        &fetch_options,
        args.neutral_filter,
    )?;

    let persisted = if args.persist_evaluated_only {
        outcome.evaluated_records(args.neutral_filter)
    } else {
        outcome.dataset.clone()
    };
    write_dataset(&dataset_path, &persisted)?;
    let dataset_sha256 = sha256_file(&dataset_path)?;
    info!(path = %dataset_path.display(), rows = persisted.len(), "wrote dataset");

    let warnings = collect_warnings(&outcome);
    for warning in &warnings {
        warn!(warning = %warning, "evaluation warning");
    }

    let manifest = EvaluationRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        completed_at: now_utc_string(),
        resource_id: args.resource_id.clone(),
        source_url: args.source_url.clone(),
        page_size: fetch_options.page_size,
        scorer_backend: scorer.backend().to_string(),
        neutral_filter: args.neutral_filter.as_str().to_string(),
        counts: EvaluationCounts {
            pages_requested: outcome.pages_requested,
            fetched_comments: outcome.dataset.len(),
            scored_records: outcome.dataset.len(),
            excluded_records: outcome.summary.excluded,
            evaluated_records: outcome.summary.evaluated,
            correct_records: outcome.summary.correct,
            persisted_records: persisted.len(),
        },
        accuracy: outcome.summary.accuracy.ratio(),
        accuracy_display: outcome.summary.accuracy.to_string(),
        dataset_path: dataset_path.display().to_string(),
        dataset_sha256,
        duration_ms: started.elapsed().as_millis(),
        warnings,
    };

    ensure_directory(&manifest_dir)?;
    let manifest_path = manifest_dir.join(format!(
        "{EVALUATION_MANIFEST_PREFIX}{}.json",
        utc_compact_millis_string(started_ts)
    ));
    write_new_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote evaluation manifest");

    println!("Accuracy: {}", outcome.summary.accuracy);

    Ok(manifest_path)
}

pub(super) fn collect_warnings(outcome: &EvaluationOutcome) -> Vec<String> {
    let mut warnings = Vec::new();

    if outcome.dataset.is_empty() {
        warnings.push("comment source returned no comments".to_string());
    }
    if outcome.summary.accuracy == Accuracy::Undefined {
        warnings.push("no records left after neutral filter; accuracy undefined".to_string());
    }

    let unlabeled_kept = outcome
        .dataset
        .iter()
        .filter(|record| {
            record.ground_truth() == GroundTruth::Neutral && record.raw_rating() != NEUTRAL_RATING
        })
        .count();
    if unlabeled_kept > 0 {
        warnings.push(format!(
            "{unlabeled_kept} records with out-of-range ratings carry label -1"
        ));
    }

    warnings
}
