//! Small numeric helpers shared by the pipeline stages
//!
//! Percentiles use linear interpolation between closest ranks (the
//! "linear" method), so the 5th/95th percentile of a single value is that
//! value.

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile (0-100) using linear interpolation between order statistics
///
/// Algorithm:
/// 1. Sort values ascending
/// 2. rank = p/100 × (n - 1)
/// 3. Interpolate between sorted[floor(rank)] and sorted[ceil(rank)]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Ordinary least-squares line through (x, y) points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit y = slope × x + intercept. Needs at least two distinct x values.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }

        // Centre x to keep the normal equations well conditioned for year-sized values
        let x_mean = mean(xs)?;
        let y_mean = mean(ys)?;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            let dx = x - x_mean;
            sxx += dx * dx;
            sxy += dx * (y - y_mean);
        }

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fill interior gaps by straight lines between the nearest known values
///
/// Positions are assumed evenly spaced. Leading and trailing gaps have no
/// known value on one side and stay `None`.
pub fn interpolate_gaps(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut last_known: Option<(usize, f64)> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(v) = *value else { continue };

        if let Some((start, start_value)) = last_known {
            let span = (i - start) as f64;
            for (offset, slot) in out[start + 1..i].iter_mut().enumerate() {
                let t = (offset + 1) as f64 / span;
                *slot = Some(start_value + (v - start_value) * t);
            }
        }
        last_known = Some((i, v));
    }

    out
}

/// Carry the most recent known value forward over `None`s
pub fn forward_fill<T: Clone>(values: &[Option<T>]) -> Vec<Option<T>> {
    let mut last: Option<T> = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = v.clone();
            }
            last.clone()
        })
        .collect()
}
