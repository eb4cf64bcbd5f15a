use serde::{Deserialize, Serialize};

use crate::model::Sentiment;

/// Sentiment implied by a user's numeric rating.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum GroundTruth {
    Positive,
    Negative,
    /// Rating 5 or anything outside 1..=10.
    Neutral,
}

impl GroundTruth {
    pub fn code(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => 0,
            Self::Neutral => -1,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Self::Positive),
            0 => Some(Self::Negative),
            -1 => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Neutral never agrees with a prediction.
    pub fn agrees_with(self, predicted: Sentiment) -> bool {
        self.code() == predicted.code() as i8
    }
}

pub fn classify(rating: i64) -> GroundTruth {
    match rating {
        6..=10 => GroundTruth::Positive,
        1..=4 => GroundTruth::Negative,
        _ => GroundTruth::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::{GroundTruth, classify};
    use crate::model::Sentiment;

    #[test]
    fn ratings_six_through_ten_are_positive() {
        for rating in 6..=10 {
            assert_eq!(classify(rating), GroundTruth::Positive, "rating {rating}");
        }
    }

    #[test]
    fn ratings_one_through_four_are_negative() {
        for rating in 1..=4 {
            assert_eq!(classify(rating), GroundTruth::Negative, "rating {rating}");
        }
    }

    #[test]
    fn five_and_out_of_range_ratings_are_neutral() {
        for rating in [5, 0, -3, 11, i64::MIN, i64::MAX] {
            assert_eq!(classify(rating), GroundTruth::Neutral, "rating {rating}");
            assert_eq!(classify(rating).code(), -1);
        }
    }

    #[test]
    fn neutral_agrees_with_neither_prediction() {
        assert!(!GroundTruth::Neutral.agrees_with(Sentiment::Positive));
        assert!(!GroundTruth::Neutral.agrees_with(Sentiment::Negative));
        assert!(GroundTruth::Positive.agrees_with(Sentiment::Positive));
        assert!(GroundTruth::Negative.agrees_with(Sentiment::Negative));
    }

    #[test]
    fn codes_round_trip_and_reject_unknown_values() {
        for label in [GroundTruth::Positive, GroundTruth::Negative, GroundTruth::Neutral] {
            assert_eq!(GroundTruth::from_code(label.code()), Some(label));
        }
        assert_eq!(GroundTruth::from_code(2), None);
    }
}
