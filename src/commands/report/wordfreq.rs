use std::collections::HashMap;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

const STOPWORDS: &[&str] = &[
    "의", "가", "이", "은", "들", "는", "좀", "잘", "걍", "과", "도", "를", "으로", "자", "에", "와",
    "한", "하다",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Word-cloud style tokenizer: runs of two or more word characters.
pub struct WordFrequencyCounter {
    token_pattern: Regex,
    max_words: usize,
}

impl WordFrequencyCounter {
    pub fn new(max_words: usize) -> Result<Self> {
        let token_pattern =
            Regex::new(r"\w[\w']+").context("failed to compile word token regex")?;
        Ok(Self {
            token_pattern,
            max_words,
        })
    }

    pub fn count<'a, I>(&self, texts: I) -> Vec<WordCount>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = HashMap::<String, usize>::new();
        for text in texts {
            for token in self.token_pattern.find_iter(text) {
                let word = token.as_str().to_lowercase();
                if STOPWORDS.contains(&word.as_str()) {
                    continue;
                }
                *counts.entry(word).or_default() += 1;
            }
        }

        let mut ranked = counts
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        ranked.truncate(self.max_words);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::WordFrequencyCounter;

    #[test]
    fn counts_skip_stopwords_and_single_characters() {
        let counter = WordFrequencyCounter::new(10).expect("regex");
        let counts = counter.count(["마동석 최고 최고 하다", "Great 영화 좀 great", "a b"]);

        let words: Vec<(&str, usize)> = counts
            .iter()
            .map(|entry| (entry.word.as_str(), entry.count))
            .collect();
        assert_eq!(
            words,
            vec![("great", 2), ("최고", 2), ("마동석", 1), ("영화", 1)]
        );
    }

    #[test]
    fn ranking_is_truncated_to_max_words() {
        let counter = WordFrequencyCounter::new(1).expect("regex");
        let counts = counter.count(["영화 배우 배우"]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].word, "배우");
    }
}
