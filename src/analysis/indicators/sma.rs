//! Simple Moving Average (SMA).

/// Arithmetic mean of the trailing `period` values.
///
/// Aligned to the input; the first `period - 1` entries are `None`.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_leading_undefined_count() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let result = sma(&values, 4);
        assert_eq!(result.len(), values.len());
        assert!(result[..3].iter().all(|v| v.is_none()));
        assert!(result[3..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_sma_values_are_window_means() {
        // Scenario from the scoring pipeline's reference data.
        let closes = [10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0];
        let result = sma(&closes, 3);

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 11.0).abs() < 1e-10);
        assert!((result[3].unwrap() - 11.333333333333334).abs() < 1e-10);
        assert!((result[10].unwrap() - 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_sma_shorter_than_period() {
        let result = sma(&[1.0, 2.0], 5);
        assert_eq!(result, vec![None, None]);
    }

    #[test]
    fn test_sma_period_one_is_identity() {
        let values = [3.0, 1.0, 4.0];
        let result = sma(&values, 1);
        assert_eq!(result, vec![Some(3.0), Some(1.0), Some(4.0)]);
    }

    #[test]
    fn test_sma_zero_period_all_undefined() {
        let result = sma(&[1.0, 2.0, 3.0], 0);
        assert!(result.iter().all(|v| v.is_none()));
    }
}
