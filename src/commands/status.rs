use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::evaluate::EVALUATION_MANIFEST_PREFIX;
use crate::dataset::count_dataset_rows;
use crate::model::{AssetManifest, EvaluationRunManifest};
use crate::util::{
    default_asset_manifest_path, default_dataset_path, latest_manifest, manifest_dir, read_json,
};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = manifest_dir(&args.data_root);
    let asset_manifest_path = default_asset_manifest_path(&args.data_root);

    info!(data_root = %args.data_root.display(), "status requested");

    let latest = match latest_manifest(&manifest_dir, EVALUATION_MANIFEST_PREFIX)? {
        Some(path) => {
            let manifest: EvaluationRunManifest = read_json(&path)?;
            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                completed_at = %manifest.completed_at,
                resource_id = %manifest.resource_id,
                scorer = %manifest.scorer_backend,
                neutral_filter = %manifest.neutral_filter,
                fetched = manifest.counts.fetched_comments,
                evaluated = manifest.counts.evaluated_records,
                excluded = manifest.counts.excluded_records,
                accuracy = %manifest.accuracy_display,
                warnings = manifest.warnings.len(),
                "loaded latest evaluation manifest"
            );
            Some(manifest)
        }
        None => {
            warn!(path = %manifest_dir.display(), "no evaluation manifest found");
            None
        }
    };

    let dataset_path = resolve_dataset_path(&args.data_root, latest.as_ref());
    if dataset_path.exists() {
        let rows = count_dataset_rows(&dataset_path)?;
        info!(path = %dataset_path.display(), rows, "dataset status");
    } else {
        warn!(path = %dataset_path.display(), "dataset file missing");
    }

    if asset_manifest_path.exists() {
        let assets: AssetManifest = read_json(&asset_manifest_path)?;
        info!(
            generated_at = %assets.generated_at,
            movies = assets.movie_count,
            actors = assets.actor_count,
            "loaded asset manifest"
        );
    } else {
        warn!(path = %asset_manifest_path.display(), "asset manifest missing");
    }

    Ok(())
}

/// The dataset the latest run wrote, or the default location when no run
/// has been recorded.
fn resolve_dataset_path(data_root: &Path, latest: Option<&EvaluationRunManifest>) -> PathBuf {
    match latest {
        Some(manifest) if !manifest.dataset_path.is_empty() => {
            PathBuf::from(&manifest.dataset_path)
        }
        _ => default_dataset_path(data_root),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::resolve_dataset_path;
    use crate::model::{EvaluationCounts, EvaluationRunManifest};
    use crate::util::default_dataset_path;

    fn manifest_with_dataset(dataset_path: &str) -> EvaluationRunManifest {
        EvaluationRunManifest {
            manifest_version: 1,
            run_id: "eval-20240501T120000Z".to_string(),
            status: "completed".to_string(),
            started_at: "2024-05-01T12:00:00Z".to_string(),
            completed_at: "2024-05-01T12:00:09Z".to_string(),
            resource_id: "149662594".to_string(),
            source_url: "https://comment.daum.net".to_string(),
            page_size: 100,
            scorer_backend: "lexicon".to_string(),
            neutral_filter: "raw-rating".to_string(),
            counts: EvaluationCounts {
                pages_requested: 1,
                fetched_comments: 0,
                scored_records: 0,
                excluded_records: 0,
                evaluated_records: 0,
                correct_records: 0,
                persisted_records: 0,
            },
            accuracy: None,
            accuracy_display: "undefined (no data)".to_string(),
            dataset_path: dataset_path.to_string(),
            dataset_sha256: "0".repeat(64),
            duration_ms: 9000,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn dataset_path_follows_latest_manifest() {
        let manifest = manifest_with_dataset("/srv/exports/rows.csv");
        let path = resolve_dataset_path(Path::new("data"), Some(&manifest));
        assert_eq!(path, PathBuf::from("/srv/exports/rows.csv"));
    }

    #[test]
    fn dataset_path_defaults_without_manifest() {
        let root = Path::new("data");
        assert_eq!(resolve_dataset_path(root, None), default_dataset_path(root));

        let blank = manifest_with_dataset("");
        assert_eq!(resolve_dataset_path(root, Some(&blank)), default_dataset_path(root));
    }
}
