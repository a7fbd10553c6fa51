use std::collections::BTreeSet;

use serde::Serialize;

use super::ExamError;

/// Accuracy and macro-averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationScore {
    /// Fraction of exact matches.
    pub accuracy: f64,
    /// Unweighted mean of per-label precision.
    pub precision_macro: f64,
    /// Unweighted mean of per-label recall.
    pub recall_macro: f64,
    /// Unweighted mean of per-label F1.
    pub f1_macro: f64,
}

/// Whether a prediction matches ground truth, ignoring surrounding whitespace.
pub fn answers_match(truth: &str, prediction: &str) -> bool {
    truth.trim() == prediction.trim()
}

fn check_lengths<T, P>(truths: &[T], predictions: &[P]) -> Result<(), ExamError> {
    if truths.len() != predictions.len() {
        return Err(ExamError::LengthMismatch {
            truths: truths.len(),
            predictions: predictions.len(),
        });
    }
    Ok(())
}

/// Number of predictions equal to their ground truth after trimming.
///
/// Note this is a count, not a fraction; divide by the item count for the
/// accuracy.
pub fn custom_accuracy<T: AsRef<str>, P: AsRef<str>>(truths: &[T], predictions: &[P]) -> Result<usize, ExamError> {
    check_lengths(truths, predictions)?;
    Ok(truths
        .iter()
        .zip(predictions)
        .filter(|(t, p)| answers_match(t.as_ref(), p.as_ref()))
        .count())
}

/// Score label predictions.
///
/// Labels are trimmed before comparison, as in [`answers_match`]. Macro averages run over every label seen in either vector; a label with
/// no predicted (or no true) instances contributes 0 precision (or recall).
/// Empty input scores 0 throughout.
pub fn score<T: AsRef<str>, P: AsRef<str>>(y_true: &[T], y_pred: &[P]) -> Result<ClassificationScore, ExamError> {
    check_lengths(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(ClassificationScore {
            accuracy: 0.0,
            precision_macro: 0.0,
            recall_macro: 0.0,
            f1_macro: 0.0,
        });
    }

    let pairs: Vec<(&str, &str)> = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t.as_ref().trim(), p.as_ref().trim()))
        .collect();
    let labels: BTreeSet<&str> = pairs.iter().flat_map(|&(t, p)| [t, p]).collect();

    let correct = pairs.iter().filter(|(t, p)| t == p).count();
    let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
    for label in &labels {
        let tp = pairs.iter().filter(|&&(t, p)| t == *label && p == *label).count();
        let fp = pairs.iter().filter(|&&(t, p)| t != *label && p == *label).count();
        let fn_ = pairs.iter().filter(|&&(t, p)| t == *label && p != *label).count();
        precision += ratio(tp, tp + fp);
        recall += ratio(tp, tp + fn_);
        f1 += ratio(2 * tp, 2 * tp + fp + fn_);
    }

    let n = labels.len() as f64;
    Ok(ClassificationScore {
        accuracy: correct as f64 / pairs.len() as f64,
        precision_macro: precision / n,
        recall_macro: recall / n,
        f1_macro: f1 / n,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn accuracy_counts_trimmed_matches() {
        assert_eq!(custom_accuracy(&["x", " y "], &["x ", "y"]).unwrap(), 2);
        assert_eq!(custom_accuracy(&["x", "y"], &["x", "z"]).unwrap(), 1);
        assert_eq!(custom_accuracy::<&str, &str>(&[], &[]).unwrap(), 0);
    }

    #[test]
    fn accuracy_rejects_length_mismatch() {
        let err = custom_accuracy(&["x"], &["x", "y"]).unwrap_err();
        assert!(matches!(err, ExamError::LengthMismatch { truths: 1, predictions: 2 }));
    }

    #[test]
    fn macro_scores() {
        let s = score(&["A", "B", "C", "D"], &["A", "B", "C", "C"]).unwrap();
        assert!(close(s.accuracy, 0.75));
        assert!(close(s.precision_macro, 0.625));
        assert!(close(s.recall_macro, 0.75));
        assert!(close(s.f1_macro, (1.0 + 1.0 + 2.0 / 3.0) / 4.0));
    }

    #[test]
    fn label_only_in_predictions_counts() {
        // Labels {A, B}: A has p=1 r=0.5, B has p=0 r=0.
        let s = score(&["A", "A"], &["A", "B"]).unwrap();
        assert!(close(s.precision_macro, 0.5));
        assert!(close(s.recall_macro, 0.25));
    }

    #[test]
    fn labels_are_trimmed_like_accuracy() {
        let s = score(&[" A", "B\n"], &["A", " B"]).unwrap();
        assert!(close(s.accuracy, 1.0));
        assert!(close(s.f1_macro, 1.0));
        assert_eq!(custom_accuracy(&[" A", "B\n"], &["A", " B"]).unwrap(), 2);
    }

    #[test]
    fn empty_scores_zero() {
        let s = score::<&str, &str>(&[], &[]).unwrap();
        assert_eq!(s.accuracy, 0.0);
    }
}
