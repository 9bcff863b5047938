//! Exponential Moving Average (EMA).

/// EMA with multiplier `2 / (period + 1)`, seeded with the SMA of the first
/// `period` values.
///
/// Unlike the other series functions this returns an unpadded series of
/// `len - period + 1` values (empty when the input is shorter than
/// `period`); callers pairing it with aligned series must account for the
/// shorter length.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);

    let seed: f64 = values.iter().take(period).sum::<f64>() / period as f64;
    out.push(seed);

    for value in &values[period..] {
        let prev = *out.last().unwrap();
        out.push((value - prev) * multiplier + prev);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_length() {
        let values: Vec<f64> = (0..20).map(|v| v as f64).collect();
        assert_eq!(ema(&values, 9).len(), 12);
    }

    #[test]
    fn test_ema_seed_is_sma() {
        let values = [2.0, 4.0, 6.0, 8.0, 10.0];
        let result = ema(&values, 3);
        assert!((result[0] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_recurrence() {
        let values = [2.0, 4.0, 6.0, 8.0];
        let result = ema(&values, 3);
        // multiplier = 0.5: (8 - 4) * 0.5 + 4 = 6
        assert!((result[1] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_deterministic() {
        let values: Vec<f64> = (0..50).map(|v| (v as f64).sin() * 10.0 + 100.0).collect();
        assert_eq!(ema(&values, 12), ema(&values, 12));
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert!(ema(&[1.0, 2.0], 5).is_empty());
    }

    #[test]
    fn test_ema_tracks_constant_series() {
        let values = [7.0; 30];
        let result = ema(&values, 10);
        assert!(result.iter().all(|v| (v - 7.0).abs() < 1e-10));
    }
}
