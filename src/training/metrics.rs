use statrs::statistics::Statistics;

/// Fraction of predictions equal to the truth. Empty input scores 0.
pub fn accuracy(predicted: &[u8], truth: &[u8]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    #[allow(clippy::cast_precision_loss)]
    let score = hits as f64 / truth.len() as f64;
    score
}

/// Mean and population standard deviation of fold scores.
pub fn summarize(scores: &[f64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    (scores.iter().mean(), scores.iter().population_std_dev())
}
