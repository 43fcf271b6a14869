use crate::analyzers::types::Summary;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean over the defined values only. Returns `None` if no value is defined.
pub fn mean_of_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let defined: Vec<f64> = values.into_iter().flatten().collect();
    if defined.is_empty() {
        None
    } else {
        Some(mean(&defined))
    }
}

/// Middle value of the sorted input; the mean of the two middle values for
/// even-sized input. Returns 0.0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Computes the sample standard deviation (n - 1) given a pre-computed mean.
/// Undefined for fewer than two values.
pub fn stddev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

pub fn summarize(values: &[f64]) -> Summary {
    let avg = mean(values);
    Summary {
        mean: avg,
        median: median(values),
        std: stddev(values, avg),
    }
}

/// Rounds to two decimal places, as used in printed reports.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
