// Exponential Moving Average (EMA) indicator implementation

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first sample.
///
/// There is no warm-up gap: `out[0] == values[0]` and every later point is
/// `alpha * values[i] + (1 - alpha) * out[i - 1]`.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut results = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;

    for &value in values {
        let current = match previous {
            None => value,
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
        };
        results.push(current);
        previous = Some(current);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_calculation() {
        // span 3 -> alpha 0.5
        let results = ema(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert_eq!(results, vec![10.0, 10.5, 11.25, 12.125, 13.0625]);
    }

    #[test]
    fn test_ema_defined_from_first_sample() {
        let values = [42.0, 40.0, 41.0];
        let results = ema(&values, 12);
        assert_eq!(results.len(), values.len());
        assert_eq!(results[0], 42.0);
    }

    #[test]
    fn test_ema_empty_input() {
        assert!(ema(&[], 12).is_empty());
    }

    #[test]
    fn test_ema_span_one_tracks_input() {
        let values = [3.0, 7.0, 1.0];
        assert_eq!(ema(&values, 1), values.to_vec());
    }

    #[test]
    fn test_ema_recomputation_is_bit_identical() {
        let values: Vec<f64> = (0..200).map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0).collect();
        let first = ema(&values, 26);
        let second = ema(&values, 26);
        let first_bits: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }
}
