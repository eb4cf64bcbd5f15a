use std::fmt;

use crate::cli::NeutralFilter;
use crate::model::ScoredRecord;
use crate::rating::GroundTruth;

pub const NEUTRAL_RATING: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accuracy {
    Defined { correct: usize, evaluated: usize },
    /// Nothing was left after the neutral filter.
    Undefined,
}

impl Accuracy {
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Defined { correct, evaluated } => Some(correct as f64 / evaluated as f64),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio() {
            Some(ratio) => write!(f, "{:.1}%", ratio * 100.0),
            None => write!(f, "undefined (no data)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracySummary {
    pub excluded: usize,
    pub evaluated: usize,
    pub correct: usize,
    pub accuracy: Accuracy,
}

pub fn is_excluded(record: &ScoredRecord, filter: NeutralFilter) -> bool {
    match filter {
        NeutralFilter::RawRating => record.raw_rating() == NEUTRAL_RATING,
        NeutralFilter::Label => record.ground_truth() == GroundTruth::Neutral,
    }
}

pub fn compute_accuracy(records: &[ScoredRecord], filter: NeutralFilter) -> AccuracySummary {
    let mut excluded = 0usize;
    let mut evaluated = 0usize;
    let mut correct = 0usize;

    for record in records {
        if is_excluded(record, filter) {
            excluded += 1;
            continue;
        }

        evaluated += 1;
        if record.is_correct() {
            correct += 1;
        }
    }

    let accuracy = if evaluated == 0 {
        Accuracy::Undefined
    } else {
        Accuracy::Defined { correct, evaluated }
    };

    AccuracySummary {
        excluded,
        evaluated,
        correct,
        accuracy,
    }
}
