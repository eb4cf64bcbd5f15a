use std::time::Duration;

use anyhow::{Context, Result, bail};
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::cli::ScorerBackend;
use crate::model::Sentiment;

pub const DECISION_THRESHOLD: f64 = 0.5;

/// Everything except compatibility jamo, Hangul syllables and the plain space.
const NON_HANGUL_PATTERN: &str = "[^ㄱ-ㅎㅏ-ㅣ가-힣 ]";

const POSITIVE_STEMS: &[&str] = &[
    "재밌", "재미있", "최고", "좋", "감동", "추천", "훌륭", "꿀잼", "명작", "웃기", "짱", "ㅋㅋ",
];
const NEGATIVE_STEMS: &[&str] = &[
    "별로", "최악", "노잼", "지루", "실망", "아깝", "재미없", "유치", "싫", "ㅡㅡ",
];

/// Positive-class probability for already normalized comment text.
pub trait SentimentScorer {
    fn backend(&self) -> &'static str;

    fn score(&self, cleaned_text: &str) -> Result<f64>;
}

pub struct TextNormalizer {
    pattern: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        let pattern =
            Regex::new(NON_HANGUL_PATTERN).context("failed to compile Hangul filter regex")?;
        Ok(Self { pattern })
    }

    pub fn normalize(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").into_owned()
    }
}

pub fn decide(probability: f64) -> Result<Sentiment> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        bail!("scorer returned invalid probability {probability}");
    }

    Ok(if probability > DECISION_THRESHOLD {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    })
}

pub fn build_scorer(
    backend: ScorerBackend,
    scorer_url: &str,
    timeout: Duration,
) -> Result<Box<dyn SentimentScorer>> {
    match backend {
        ScorerBackend::Http => Ok(Box::new(HttpScorer::new(scorer_url, timeout)?)),
        ScorerBackend::Lexicon => Ok(Box::new(LexiconScorer)),
    }
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    probability: Option<f64>,
    logits: Option<Vec<f64>>,
}

/// Remote inference endpoint for the pretrained classifier.
pub struct HttpScorer {
    client: Client,
    url: String,
}

impl HttpScorer {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scorer http client")?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl SentimentScorer for HttpScorer {
    fn backend(&self) -> &'static str {
        ScorerBackend::Http.as_str()
    }

    fn score(&self, cleaned_text: &str) -> Result<f64> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest { text: cleaned_text })
            .send()
            .with_context(|| format!("scorer request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("scorer at {} answered with status {}", self.url, status);
        }

        let body: ScoreResponse = response
            .json()
            .with_context(|| format!("failed to decode scorer response from {}", self.url))?;
        positive_probability(&body)
    }
}

fn positive_probability(response: &ScoreResponse) -> Result<f64> {
    if let Some(probability) = response.probability {
        return Ok(probability);
    }

    match response.logits.as_deref() {
        Some(logits) => softmax_positive(logits),
        None => bail!("scorer response has neither probability nor logits"),
    }
}

/// Probability of index 1 under a softmax over two-class logits.
fn softmax_positive(logits: &[f64]) -> Result<f64> {
    let [negative, positive] = logits else {
        bail!("expected 2 logits, got {}", logits.len());
    };

    let max = negative.max(*positive);
    let negative_exp = (negative - max).exp();
    let positive_exp = (positive - max).exp();
    Ok(positive_exp / (negative_exp + positive_exp))
}

/// Offline stand-in: Laplace-smoothed share of positive stem hits.
#[derive(Debug, Default)]
pub struct LexiconScorer;

impl SentimentScorer for LexiconScorer {
    fn backend(&self) -> &'static str {
        ScorerBackend::Lexicon.as_str()
    }

    fn score(&self, cleaned_text: &str) -> Result<f64> {
        let mut positive = 0usize;
        let mut negative = 0usize;

        for token in cleaned_text.split_whitespace() {
            positive += POSITIVE_STEMS
                .iter()
                .filter(|stem| token.contains(*stem))
                .count();
            negative += NEGATIVE_STEMS
                .iter()
                .filter(|stem| token.contains(*stem))
                .count();
        }

        Ok((positive as f64 + 1.0) / ((positive + negative) as f64 + 2.0))
    }
}
