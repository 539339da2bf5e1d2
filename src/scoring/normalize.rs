//! Feature scaling helpers shared by the scoring procedures.

/// Value assigned to every element of a feature with zero range.
pub const ZERO_RANGE_VALUE: f64 = 0.5;

/// Min-max scales `values` into [0, 1].
///
/// A constant feature (or one with a non-finite range) maps every element to
/// [`ZERO_RANGE_VALUE`].
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = bounds(values) else {
        return Vec::new();
    };
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return vec![ZERO_RANGE_VALUE; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Quantile with linear interpolation between the closest ranks.
///
/// `q` is clamped to [0, 1]. Returns `None` for an empty input.
pub fn linear_quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// `log10(followers + 1)`, so zero followers maps to zero.
pub fn log_followers(followers: f64) -> f64 {
    (followers + 1.0).log10()
}
