pub fn mean<T: Copy + Into<f64>>(values: &[T]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|value| Into::<f64>::into(*value)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation: squared deviations are divided by the
/// sample count, not count - 1.
pub fn population_std_dev<T: Copy + Into<f64>>(values: &[T]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|value| (Into::<f64>::into(*value) - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Rounds a non-negative mean to the nearest whole count, ties away from zero.
pub fn round_count(value: f64) -> u32 {
    value.round() as u32
}
