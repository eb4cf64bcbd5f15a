use serde::Serialize;

use crate::model::{AssetEntry, AssetKind, AssetManifest, ScoredRecord, Sentiment};

use super::wordfreq::{WordCount, WordFrequencyCounter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentShare {
    pub total_reviews: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordCloudInputs {
    pub positive: Vec<WordCount>,
    pub negative: Vec<WordCount>,
    pub all: Vec<WordCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub dataset_path: String,
    pub dataset_sha256: String,
    pub share: SentimentShare,
    pub positive_reviews: Vec<String>,
    pub negative_reviews: Vec<String>,
    pub word_clouds: WordCloudInputs,
    pub movies: Vec<AssetEntry>,
    pub cast: Vec<AssetEntry>,
}

fn has_text(record: &ScoredRecord) -> bool {
    !record.text().trim().is_empty()
}

/// Rounds through the one-decimal formatter so exact ties go to the even
/// digit, matching the `{:.1}` accuracy display (6.25 becomes 6.2).
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Shares of predicted labels among records with non-blank text.
pub fn sentiment_share(records: &[ScoredRecord]) -> SentimentShare {
    let positive_count = records
        .iter()
        .filter(|record| has_text(record) && record.predicted() == Sentiment::Positive)
        .count();
    let negative_count = records
        .iter()
        .filter(|record| has_text(record) && record.predicted() == Sentiment::Negative)
        .count();
    let total_reviews = positive_count + negative_count;

    let (positive_percentage, negative_percentage) = if total_reviews > 0 {
        let total = total_reviews as f64;
        (
            round_one_decimal(positive_count as f64 / total * 100.0),
            round_one_decimal(negative_count as f64 / total * 100.0),
        )
    } else {
        (0.0, 0.0)
    };

    SentimentShare {
        total_reviews,
        positive_count,
        negative_count,
        positive_percentage,
        negative_percentage,
    }
}

/// Non-blank review texts split by predicted label, in dataset order.
pub fn partitioned_reviews(records: &[ScoredRecord]) -> (Vec<String>, Vec<String>) {
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    for record in records.iter().filter(|record| has_text(record)) {
        match record.predicted() {
            Sentiment::Positive => positive.push(record.text().to_string()),
            Sentiment::Negative => negative.push(record.text().to_string()),
        }
    }

    (positive, negative)
}

pub fn word_cloud_inputs(
    records: &[ScoredRecord],
    counter: &WordFrequencyCounter,
) -> WordCloudInputs {
    let partition = |label: Sentiment| {
        counter.count(
            records
                .iter()
                .filter(move |record| record.predicted() == label)
                .map(|record| record.text()),
        )
    };

    WordCloudInputs {
        positive: partition(Sentiment::Positive),
        negative: partition(Sentiment::Negative),
        all: counter.count(records.iter().map(|record| record.text())),
    }
}

pub fn asset_entries(assets: Option<&AssetManifest>, kind: AssetKind) -> Vec<AssetEntry> {
    assets
        .map(|manifest| manifest.entries(kind).cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{asset_entries, partitioned_reviews, sentiment_share, word_cloud_inputs};
    use crate::commands::evaluate::accuracy::Accuracy;
    use crate::commands::report::wordfreq::{WordCount, WordFrequencyCounter};
    use crate::model::{
        AssetEntry, AssetKind, AssetManifest, CommentRecord, ScoredRecord, Sentiment,
    };

    fn record(text: &str, rating: i64, predicted: Sentiment) -> ScoredRecord {
        ScoredRecord::new(CommentRecord::new(text, rating), predicted)
    }

    #[test]
    fn share_ignores_blank_comments_and_rounds_to_one_decimal() {
        let records = vec![
            record("최고", 10, Sentiment::Positive),
            record("좋아요", 8, Sentiment::Positive),
            record("별로", 2, Sentiment::Negative),
            record("   ", 1, Sentiment::Negative),
        ];

        let share = sentiment_share(&records);
        assert_eq!(share.total_reviews, 3);
        assert_eq!(share.positive_count, 2);
        assert_eq!(share.negative_count, 1);
        assert_eq!(share.positive_percentage, 66.7);
        assert_eq!(share.negative_percentage, 33.3);
    }

    #[test]
    fn share_rounds_exact_ties_like_the_accuracy_display() {
        let mut records = vec![record("재밌다", 9, Sentiment::Positive)];
        records.extend((0..15).map(|i| record(&format!("별로 {i}"), 2, Sentiment::Negative)));

        let share = sentiment_share(&records);
        assert_eq!(share.total_reviews, 16);
        assert_eq!(share.positive_percentage, 6.2);
        assert_eq!(share.negative_percentage, 93.8);

        let accuracy = Accuracy::Defined {
            correct: 1,
            evaluated: 16,
        };
        assert_eq!(accuracy.to_string(), format!("{}%", share.positive_percentage));
    }

    #[test]
    fn reviews_are_split_by_prediction_in_file_order() {
        let records = vec![
            record("두 번 봤어요", 10, Sentiment::Positive),
            record("지루함", 2, Sentiment::Negative),
            record("  ", 9, Sentiment::Positive),
            record("배우가 좋다", 8, Sentiment::Positive),
            record("", 1, Sentiment::Negative),
        ];

        let (positive, negative) = partitioned_reviews(&records);
        assert_eq!(positive, vec!["두 번 봤어요", "배우가 좋다"]);
        assert_eq!(negative, vec!["지루함"]);
    }

    #[test]
    fn share_of_empty_dataset_is_zero() {
        let share = sentiment_share(&[]);
        assert_eq!(share.total_reviews, 0);
        assert_eq!(share.positive_percentage, 0.0);
        assert_eq!(share.negative_percentage, 0.0);
    }

    #[test]
    fn word_clouds_are_partitioned_by_prediction() {
        let records = vec![
            record("연기 최고", 10, Sentiment::Positive),
            record("스토리 별로", 3, Sentiment::Negative),
            record("연기 별로", 5, Sentiment::Negative),
        ];
        let counter = WordFrequencyCounter::new(10).expect("regex");

        let clouds = word_cloud_inputs(&records, &counter);
        let words = |entries: &[WordCount]| {
            entries.iter().map(|e| e.word.clone()).collect::<Vec<_>>()
        };
        assert_eq!(words(&clouds.positive[..]), vec!["연기", "최고"]);
        assert_eq!(words(&clouds.negative[..]), vec!["별로", "스토리", "연기"]);
        assert_eq!(clouds.all[0].word, "별로");
        assert_eq!(clouds.all[0].count, 2);
    }

    #[test]
    fn asset_entries_are_empty_without_manifest() {
        assert!(asset_entries(None, AssetKind::Actor).is_empty());

        let manifest = AssetManifest {
            manifest_version: 1,
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            movie_count: 0,
            actor_count: 1,
            assets: vec![AssetEntry {
                kind: AssetKind::Actor,
                order: 1,
                name: "마동석".to_string(),
                slug: "마동석".to_string(),
                path: "static/images/movies/actors/1_마동석.jpg".to_string(),
                sha256: "0".repeat(64),
            }],
        };
        assert_eq!(asset_entries(Some(&manifest), AssetKind::Actor).len(), 1);
        assert!(asset_entries(Some(&manifest), AssetKind::Movie).is_empty());
    }
}
