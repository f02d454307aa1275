//! Classification scores against ground-truth labels.
//!
//! `true` is the positive class throughout. With predictions from
//! [`anomaly_predict`](crate::detector::anomaly_predict), "positive" therefore
//! means "normal", and labels must use the same polarity.

use std::fmt;

use tracing::warn;

use crate::error::{DetectorError, Result};

/// Accuracy, precision and recall of a boolean classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationStats {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

impl ClassificationStats {
    /// Score `predictions` against `labels`.
    ///
    /// Precision or recall with a zero denominator is reported as `0.0` and
    /// logged at `warn` level.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::LengthMismatch`] if the slices differ in
    /// length, or [`DetectorError::EmptyInput`] if they are empty.
    pub fn compute(predictions: &[bool], labels: &[bool]) -> Result<Self> {
        if predictions.len() != labels.len() {
            return Err(DetectorError::length_mismatch(
                predictions.len(),
                labels.len(),
            ));
        }
        if predictions.is_empty() {
            return Err(DetectorError::empty_input("no predictions to score"));
        }

        let (mut tp, mut fp, mut fn_, mut tn) = (0usize, 0usize, 0usize, 0usize);
        for (&p, &l) in predictions.iter().zip(labels) {
            match (p, l) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }

        let accuracy = (tp + tn) as f64 / predictions.len() as f64;
        let precision = ratio(tp, tp + fp, "precision", "no predicted positives");
        let recall = ratio(tp, tp + fn_, "recall", "no true positives in labels");

        Ok(Self {
            accuracy,
            precision,
            recall,
        })
    }
}

fn ratio(num: usize, den: usize, metric: &str, reason: &str) -> f64 {
    if den == 0 {
        warn!(metric, reason, "ill-defined score, reporting 0.0");
        return 0.0;
    }
    num as f64 / den as f64
}

/// Shortest round-trip rendering of `x` with a signed, at least two-digit
/// exponent (`1.0`, `0.5`, `1e-05`, `1e+16`).
fn float_repr(x: f64) -> String {
    // Debug keeps the trailing ".0" and uses exponent form below 1e-4 and
    // from 1e16 on; only the exponent spelling needs rewriting
    let shortest = format!("{x:?}");
    match shortest.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => shortest,
    }
}

impl fmt::Display for ClassificationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy = {}", float_repr(self.accuracy))?;
        writeln!(f, "Precision = {}", float_repr(self.precision))?;
        write!(f, "Recall = {}", float_repr(self.recall))
    }
}

/// Print accuracy, precision and recall to stdout, one `"<Name> = <value>"`
/// line each.
///
/// # Errors
///
/// Same as [`ClassificationStats::compute`].
pub fn print_stats(predictions: &[bool], labels: &[bool]) -> Result<ClassificationStats> {
    let stats = ClassificationStats::compute(predictions, labels)?;
    println!("{stats}");
    Ok(stats)
}
