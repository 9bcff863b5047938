//! Moving Average Convergence Divergence (MACD).

use super::ema;

/// MACD output lines.
///
/// All three are unpadded (see [`ema`]): `macd_line` covers the overlapping
/// range of the two EMAs, `signal_line` is `signal_period - 1` entries
/// shorter again, and `histogram` is aligned with `signal_line`.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn last_macd(&self) -> Option<f64> {
        self.macd_line.last().copied()
    }

    pub fn last_histogram(&self) -> Option<f64> {
        self.histogram.last().copied()
    }
}

/// MACD line, signal line and histogram over a close series.
pub fn macd(values: &[f64], short_period: usize, long_period: usize, signal_period: usize) -> Macd {
    let fast = ema(values, short_period);
    let slow = ema(values, long_period);

    if fast.is_empty() || slow.is_empty() || long_period < short_period {
        return Macd {
            macd_line: Vec::new(),
            signal_line: Vec::new(),
            histogram: Vec::new(),
        };
    }

    // The fast EMA starts earlier; align tails on the overlapping range.
    let offset = long_period - short_period;
    let macd_line: Vec<f64> = fast
        .iter()
        .skip(offset)
        .zip(slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema(&macd_line, signal_period);
    let histogram: Vec<f64> = if signal_line.is_empty() {
        Vec::new()
    } else {
        macd_line
            .iter()
            .skip(signal_period - 1)
            .zip(signal_line.iter())
            .map(|(m, s)| m - s)
            .collect()
    };

    Macd {
        macd_line,
        signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect()
    }

    #[test]
    fn test_macd_line_length() {
        let values = series(60);
        let result = macd(&values, 12, 26, 9);
        // Overlap of EMA(12) and EMA(26): len - 26 + 1 values.
        assert_eq!(result.macd_line.len(), 35);
        assert_eq!(result.signal_line.len(), 27);
        assert_eq!(result.histogram.len(), 27);
    }

    #[test]
    fn test_macd_histogram_is_line_minus_signal() {
        let values = series(80);
        let result = macd(&values, 12, 26, 9);
        let last_macd = *result.macd_line.last().unwrap();
        let last_signal = *result.signal_line.last().unwrap();
        let last_hist = *result.histogram.last().unwrap();
        assert!((last_hist - (last_macd - last_signal)).abs() < 1e-10);
    }

    #[test]
    fn test_macd_constant_series_is_zero() {
        let values = [42.0; 60];
        let result = macd(&values, 12, 26, 9);
        assert!(result.macd_line.iter().all(|v| v.abs() < 1e-10));
        assert!(result.histogram.iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn test_macd_insufficient_data() {
        let result = macd(&series(20), 12, 26, 9);
        assert!(result.macd_line.is_empty());
        assert!(result.signal_line.is_empty());
        assert!(result.histogram.is_empty());
    }
}
