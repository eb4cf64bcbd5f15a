use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::rating::{GroundTruth, classify};

/// Predicted sentiment of a comment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    pub fn code(self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Negative),
            1 => Some(Self::Positive),
            _ => None,
        }
    }
}

/// One item of a fetched comment page, before any labeling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawComment {
    #[serde(rename = "content")]
    pub text: String,
    pub rating: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    text: String,
    raw_rating: i64,
    ground_truth: GroundTruth,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>, raw_rating: i64) -> Self {
        Self {
            text: text.into(),
            raw_rating,
            ground_truth: classify(raw_rating),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn raw_rating(&self) -> i64 {
        self.raw_rating
    }

    pub fn ground_truth(&self) -> GroundTruth {
        self.ground_truth
    }
}

impl From<RawComment> for CommentRecord {
    fn from(raw: RawComment) -> Self {
        Self::new(raw.text, raw.rating)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRecord {
    comment: CommentRecord,
    predicted: Sentiment,
}

impl ScoredRecord {
    pub fn new(comment: CommentRecord, predicted: Sentiment) -> Self {
        Self { comment, predicted }
    }

    /// Rebuilds a record from persisted column values, rejecting labels that
    /// disagree with the stored rating.
    pub fn from_parts(
        text: String,
        raw_rating: i64,
        ground_truth_code: i8,
        predicted_code: u8,
    ) -> Result<Self> {
        let Some(ground_truth) = GroundTruth::from_code(ground_truth_code) else {
            bail!("invalid ground truth label {ground_truth_code}");
        };
        let Some(predicted) = Sentiment::from_code(predicted_code) else {
            bail!("invalid predicted label {predicted_code}");
        };

        let comment = CommentRecord::new(text, raw_rating);
        if comment.ground_truth() != ground_truth {
            bail!(
                "ground truth label {} does not match rating {} (expected {})",
                ground_truth_code,
                raw_rating,
                comment.ground_truth().code()
            );
        }

        Ok(Self::new(comment, predicted))
    }

    pub fn text(&self) -> &str {
        self.comment.text()
    }

    pub fn raw_rating(&self) -> i64 {
        self.comment.raw_rating()
    }

    pub fn ground_truth(&self) -> GroundTruth {
        self.comment.ground_truth()
    }

    pub fn predicted(&self) -> Sentiment {
        self.predicted
    }

    pub fn is_correct(&self) -> bool {
        self.ground_truth().agrees_with(self.predicted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCounts {
    pub pages_requested: usize,
    pub fetched_comments: usize,
    pub scored_records: usize,
    pub excluded_records: usize,
    pub evaluated_records: usize,
    pub correct_records: usize,
    pub persisted_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub resource_id: String,
    pub source_url: String,
    pub page_size: usize,
    pub scorer_backend: String,
    pub neutral_filter: String,
    pub counts: EvaluationCounts,
    pub accuracy: Option<f64>,
    pub accuracy_display: String,
    pub dataset_path: String,
    pub dataset_sha256: String,
    pub duration_ms: u128,
    pub warnings: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Movie,
    Actor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub kind: AssetKind,
    pub order: u32,
    pub name: String,
    pub slug: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub movie_count: usize,
    pub actor_count: usize,
    pub assets: Vec<AssetEntry>,
}

impl AssetManifest {
    pub fn entries(&self, kind: AssetKind) -> impl Iterator<Item = &AssetEntry> {
        self.assets.iter().filter(move |entry| entry.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::{CommentRecord, RawComment, ScoredRecord, Sentiment};
    use crate::rating::GroundTruth;

    #[test]
    fn comment_record_derives_ground_truth_from_rating() {
        let record = CommentRecord::new("재밌다", 9);
        assert_eq!(record.ground_truth(), GroundTruth::Positive);

        let record = CommentRecord::new("그냥 그렇다", 5);
        assert_eq!(record.ground_truth(), GroundTruth::Neutral);
    }

    #[test]
    fn raw_comment_deserializes_from_feed_item() {
        let raw = r#"{"content": "최고의 영화", "rating": 10, "id": 42}"#;
        let comment: RawComment = serde_json::from_str(raw).expect("feed item should parse");
        assert_eq!(comment.text, "최고의 영화");
        assert_eq!(comment.rating, 10);
    }

    #[test]
    fn from_parts_rejects_ground_truth_inconsistent_with_rating() {
        let error = ScoredRecord::from_parts("별로".to_string(), 2, 1, 0)
            .expect_err("label 1 contradicts rating 2");
        assert!(
            error.to_string().contains("does not match rating 2"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn from_parts_rejects_unknown_codes() {
        assert!(ScoredRecord::from_parts("a".to_string(), 7, 3, 1).is_err());
        assert!(ScoredRecord::from_parts("a".to_string(), 7, 1, 2).is_err());
    }

    #[test]
    fn out_of_range_rating_is_never_correct() {
        let record = ScoredRecord::new(CommentRecord::new("x", 0), Sentiment::Negative);
        assert!(!record.is_correct());
    }
}
