use anyhow::Result;
use tracing::{info, warn};

use crate::cli::ReportArgs;
use crate::dataset::read_dataset;
use crate::model::{AssetKind, AssetManifest};
use crate::util::{
    default_asset_manifest_path, default_dataset_path, now_utc_string, read_json, sha256_file,
    write_json_pretty,
};

use super::summary::{
    SentimentReport, asset_entries, partitioned_reviews, sentiment_share, word_cloud_inputs,
};
use super::wordfreq::WordFrequencyCounter;

pub fn run(args: ReportArgs) -> Result<()> {
    let dataset_path = args
        .dataset_path
        .clone()
        .unwrap_or_else(|| default_dataset_path(&args.data_root));
    let report_path = args
        .report_path
        .clone()
        .unwrap_or_else(|| args.data_root.join("reports").join("report.json"));

    let records = read_dataset(&dataset_path)?;
    let dataset_sha256 = sha256_file(&dataset_path)?;
    info!(path = %dataset_path.display(), rows = records.len(), "loaded dataset");

    let assets = load_asset_manifest(&args)?;
    let counter = WordFrequencyCounter::new(args.max_words)?;

    let share = sentiment_share(&records);
    let (positive_reviews, negative_reviews) = partitioned_reviews(&records);
    let report = SentimentReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        dataset_path: dataset_path.display().to_string(),
        dataset_sha256,
        word_clouds: word_cloud_inputs(&records, &counter),
        movies: asset_entries(assets.as_ref(), AssetKind::Movie),
        cast: asset_entries(assets.as_ref(), AssetKind::Actor),
        share,
        positive_reviews,
        negative_reviews,
    };

    write_json_pretty(&report_path, &report)?;
    info!(
        path = %report_path.display(),
        reviews = report.share.total_reviews,
        positive_percentage = report.share.positive_percentage,
        negative_percentage = report.share.negative_percentage,
        "wrote sentiment report"
    );

    Ok(())
}

fn load_asset_manifest(args: &ReportArgs) -> Result<Option<AssetManifest>> {
    match &args.asset_manifest_path {
        Some(path) => read_json(path).map(Some),
        None => {
            let path = default_asset_manifest_path(&args.data_root);
            if path.exists() {
                read_json(&path).map(Some)
            } else {
                warn!(path = %path.display(), "asset manifest missing; report has no cast");
                Ok(None)
            }
        }
    }
}
