use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::NeutralFilter;
use crate::model::{CommentRecord, ScoredRecord, Sentiment};
use crate::scorer::{SentimentScorer, TextNormalizer, decide};

use super::accuracy::{AccuracySummary, compute_accuracy, is_excluded};
use super::fetch::{CommentSource, FetchOptions, fetch_all};

#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub dataset: Vec<ScoredRecord>,
    pub pages_requested: usize,
    pub summary: AccuracySummary,
}

impl EvaluationOutcome {
    /// Records that survive the neutral filter, in fetch order.
    pub fn evaluated_records(&self, filter: NeutralFilter) -> Vec<ScoredRecord> {
        self.dataset
            .iter()
            .filter(|record| !is_excluded(record, filter))
            .cloned()
            .collect()
    }
}

pub fn run_pipeline(
    source: &dyn CommentSource,
    scorer: &dyn SentimentScorer,
    resource_id: &str,
    fetch_options: &FetchOptions,
    filter: NeutralFilter,
) -> Result<EvaluationOutcome> {
    let fetched = fetch_all(source, resource_id, fetch_options)?;
    let normalizer = TextNormalizer::new()?;

    let mut dataset = Vec::with_capacity(fetched.comments.len());
    for (index, raw) in fetched.comments.into_iter().enumerate() {
        let comment = CommentRecord::from(raw);
        let predicted = score_comment(&normalizer, scorer, &comment)
            .with_context(|| format!("scoring failed for comment {index}"))?;
        dataset.push(ScoredRecord::new(comment, predicted));

        if (index + 1) % 100 == 0 {
            debug!(scored = index + 1, backend = scorer.backend(), "scoring progress");
        }
    }

    let summary = compute_accuracy(&dataset, filter);
    info!(
        records = dataset.len(),
        evaluated = summary.evaluated,
        excluded = summary.excluded,
        correct = summary.correct,
        accuracy = %summary.accuracy,
        "evaluation completed"
    );

    Ok(EvaluationOutcome {
        dataset,
        pages_requested: fetched.pages_requested,
        summary,
    })
}

fn score_comment(
    normalizer: &TextNormalizer,
    scorer: &dyn SentimentScorer,
    comment: &CommentRecord,
) -> Result<Sentiment> {
    let cleaned = normalizer.normalize(comment.text());
    let probability = scorer.score(&cleaned)?;
    decide(probability)
}
