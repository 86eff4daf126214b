use crate::error::{IsingError, Result};

/// Append-only time series of the magnetization per site, one entry per step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagnetizationSeries {
    values: Vec<f64>,
}

impl MagnetizationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn series(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Final `fraction` of the series.
    ///
    /// The window starts at `floor((1 - fraction) * len)`, so `0.5` selects
    /// the second half with the middle entry included for odd lengths.
    pub fn trailing_window(&self, fraction: f64) -> Result<&[f64]> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(IsingError::Observable(format!(
                "trailing fraction must lie in (0, 1], got {fraction}"
            )));
        }
        if self.values.is_empty() {
            return Err(IsingError::Observable(
                "magnetization series is empty".to_string(),
            ));
        }
        let len = self.values.len();
        // 1 - fraction rounds to 1 for tiny fractions; keep the last entry
        let start = (((1.0 - fraction) * len as f64).floor() as usize).min(len - 1);
        Ok(&self.values[start..])
    }

    /// Steady-state magnetization: mean over the trailing window
    pub fn trailing_mean(&self, fraction: f64) -> Result<f64> {
        let window = self.trailing_window(fraction)?;
        Ok(window.iter().sum::<f64>() / window.len() as f64)
    }

    /// Mean of `|M|` over the trailing window; insensitive to which ordered
    /// state the run fell into
    pub fn trailing_abs_mean(&self, fraction: f64) -> Result<f64> {
        let window = self.trailing_window(fraction)?;
        Ok(window.iter().map(|m| m.abs()).sum::<f64>() / window.len() as f64)
    }

    /// Population standard deviation over the trailing window
    pub fn trailing_std_dev(&self, fraction: f64) -> Result<f64> {
        let window = self.trailing_window(fraction)?;
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let mean_sq = window.iter().map(|m| m * m).sum::<f64>() / n;
        Ok((mean_sq - mean * mean).max(0.0).sqrt())
    }
}

impl From<MagnetizationSeries> for Vec<f64> {
    fn from(series: MagnetizationSeries) -> Self {
        series.values
    }
}
