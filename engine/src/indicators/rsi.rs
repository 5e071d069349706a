// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use shared::models::PriceBar;

/// Windowed RSI over the trailing `window` closes.
///
/// Index `i` is defined once `i >= window - 1`; earlier indices are `None`.
/// Every value is computed from its own window with no smoothing carried
/// between windows. A window with no losses yields 0, not 100.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut results = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return results;
    }

    for end in (window - 1)..closes.len() {
        let start = end + 1 - window;
        let mut gains = 0.0;
        let mut losses = 0.0;
        for i in (start + 1)..=end {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }

        results[end] = if losses == 0.0 {
            Some(0.0)
        } else {
            Some(100.0 - 100.0 / (1.0 + gains / losses))
        };
    }
    results
}

pub struct Rsi {
    name: String,
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self {
            name: format!("RSI({})", window),
            window,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn calculate(&self, data: &[PriceBar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = data.iter().map(|b| b.close).collect();
        rsi(&closes, self.window)
    }
}
