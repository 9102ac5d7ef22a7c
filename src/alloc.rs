//! Score-to-probability helpers.

/// Stable softmax over a score row.
///
/// - `temperature` controls sharpness; non-finite or non-positive values fall back to `1.0`.
/// - Uses the max-trick for numerical stability.
/// - Returns a distribution that sums to 1 (or empty if `scores` is empty).
pub fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let t = if temperature.is_finite() && temperature > 0.0 {
        temperature
    } else {
        1.0
    };

    let max_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out: Vec<f64> = scores.iter().map(|&v| ((v - max_score) / t).exp()).collect();
    let denom: f64 = out.iter().sum();
    if denom <= 0.0 || !denom.is_finite() {
        // Degenerate fallback: uniform.
        let n = scores.len() as f64;
        return vec![1.0 / n; scores.len()];
    }
    for v in &mut out {
        *v /= denom;
    }
    out
}
