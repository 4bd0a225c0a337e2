//! Row Height Estimation
//!
//! Approximates how tall a card renders without a layout pass. Proportional
//! fonts are modelled by a per-class character width; the result drifts from
//! real layout by a few pixels (well under 10 px for typical titles).

use crate::config::EngineConfig;
use crate::model::Card;

const UPPERCASE_WIDTH: f64 = 0.65;
const LOWERCASE_WIDTH: f64 = 0.52;
const OTHER_WIDTH: f64 = 0.5;
const LINE_HEIGHT: f64 = 1.55;

/// Estimated height of `text` wrapped to `column_width`
pub fn estimate(text: &str, column_width: f64, font_size: f64) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let em_width: f64 = text
        .chars()
        .map(|c| match c {
            'A'..='Z' => UPPERCASE_WIDTH,
            'a'..='z' => LOWERCASE_WIDTH,
            _ => OTHER_WIDTH,
        })
        .sum();
    let lines = (em_width * font_size / column_width.max(1.0)).ceil();
    lines * LINE_HEIGHT * font_size
}

/// Source of row heights for the virtual list
pub trait RowHeightEstimator {
    fn row_height(&self, card: &Card) -> f64;
}

/// Height from the title estimate plus fixed card chrome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateRowHeight {
    pub column_width: f64,
    pub font_size: f64,
    pub base_row_height: f64,
    pub due_date_row_height: f64,
}

impl From<&EngineConfig> for ApproximateRowHeight {
    fn from(config: &EngineConfig) -> Self {
        Self {
            column_width: config.column_width,
            font_size: config.font_size,
            base_row_height: config.base_row_height,
            due_date_row_height: config.due_date_row_height,
        }
    }
}

impl RowHeightEstimator for ApproximateRowHeight {
    fn row_height(&self, card: &Card) -> f64 {
        let due = if card.due_date.is_some() { self.due_date_row_height } else { 0.0 };
        self.base_row_height + estimate(&card.title, self.column_width, self.font_size) + due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_empty_text_has_no_height() {
        assert_eq!(estimate("", 300.0, 13.0), 0.0);
    }

    #[test]
    fn test_single_line() {
        // 5 lowercase chars: 5 * 0.52 * 13 = 33.8px, one line
        assert_close(estimate("hello", 300.0, 13.0), 13.0 * 1.55);
    }

    #[test]
    fn test_wraps_long_text() {
        let text = "a".repeat(100);
        // 100 * 0.52 * 13 = 676px over 300px -> 3 lines
        assert_close(estimate(&text, 300.0, 13.0), 3.0 * 13.0 * 1.55);
    }

    #[test]
    fn test_uppercase_is_wider() {
        let upper = "W".repeat(44);
        let lower = "w".repeat(44);
        // 44 * 0.65 * 13 = 371.8 (2 lines); 44 * 0.52 * 13 = 297.44 (1 line)
        assert!(estimate(&upper, 300.0, 13.0) > estimate(&lower, 300.0, 13.0));
    }

    #[test]
    fn test_monotonic_in_length() {
        let sample = "Fix the Login redirect loop on 401 responses, then ship it!";
        let mut previous = 0.0;
        for end in 1..=sample.len() {
            let height = estimate(&sample[..end], 120.0, 13.0);
            assert!(height > 0.0);
            assert!(height >= previous, "height dropped at {}", end);
            previous = height;
        }
    }

    #[test]
    fn test_row_height_adds_chrome_and_due_date() {
        let estimator = ApproximateRowHeight::from(&EngineConfig::default());
        let mut card = Card::new("c1", "hello");
        assert_close(estimator.row_height(&card), 70.0 + 13.0 * 1.55);

        card.due_date = Some(Utc::now());
        assert_close(estimator.row_height(&card), 90.0 + 13.0 * 1.55);
    }
}
