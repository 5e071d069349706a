//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::ema;

/// MACD periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    /// Fast EMA span (default: 12).
    pub fast: usize,
    /// Slow EMA span (default: 26).
    pub slow: usize,
    /// Signal line EMA span (default: 9).
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// MACD lines, each the same length as the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    /// Fast EMA minus slow EMA.
    pub macd: Vec<f64>,
    /// EMA of the MACD line.
    pub signal: Vec<f64>,
}

impl MacdOutput {
    /// MACD minus signal. Derived on demand so it can never drift from the two lines.
    pub fn histogram(&self) -> Vec<f64> {
        self.macd
            .iter()
            .zip(&self.signal)
            .map(|(m, s)| m - s)
            .collect()
    }
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }

    pub fn calculate(&self, closes: &[f64]) -> MacdOutput {
        let ema_fast = ema(closes, self.fast);
        let ema_slow = ema(closes, self.slow);
        let macd: Vec<f64> = ema_fast
            .iter()
            .zip(&ema_slow)
            .map(|(f, s)| f - s)
            .collect();
        let signal = ema(&macd, self.signal);

        MacdOutput {
            ema_fast,
            ema_slow,
            macd,
            signal,
        }
    }
}
