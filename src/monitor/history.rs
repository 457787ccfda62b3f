use std::collections::VecDeque;

/// Samples required before the smoothing model replaces the plain mean.
pub const MIN_FORECAST_SAMPLES: usize = 10;

const SMOOTHING_GRID_STEPS: usize = 19;

/// Fixed-capacity ring of recent CPU-usage values, oldest first.
#[derive(Debug, Clone)]
pub struct CpuHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl CpuHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Projects the CPU load `horizon` steps ahead with additive-trend
    /// exponential smoothing. Falls back to [`CpuHistory::mean`] while the
    /// buffer holds fewer than [`MIN_FORECAST_SAMPLES`] values.
    pub fn trend_forecast(&self, horizon: usize) -> f64 {
        if self.samples.len() < MIN_FORECAST_SAMPLES {
            return self.mean();
        }

        let values = self.values();
        let fit = HoltFit::best_for(&values);
        fit.forecast(horizon).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct HoltFit {
    level: f64,
    trend: f64,
    sse: f64,
}

impl HoltFit {
    fn best_for(values: &[f64]) -> Self {
        let mut best: Option<HoltFit> = None;
        for alpha in smoothing_grid() {
            for beta in smoothing_grid() {
                let candidate = Self::run(values, alpha, beta);
                if best.is_none_or(|current| candidate.sse < current.sse) {
                    best = Some(candidate);
                }
            }
        }

        best.unwrap_or_else(|| Self::run(values, 0.5, 0.5))
    }

    fn run(values: &[f64], alpha: f64, beta: f64) -> Self {
        let mut level = values[0];
        let mut trend = values.get(1).map_or(0.0, |second| second - values[0]);
        let mut sse = 0.0;

        for &observed in &values[1..] {
            let predicted = level + trend;
            let error = observed - predicted;
            sse += error * error;

            let previous_level = level;
            level = alpha * observed + (1.0 - alpha) * (level + trend);
            trend = beta * (level - previous_level) + (1.0 - beta) * trend;
        }

        Self { level, trend, sse }
    }

    fn forecast(&self, horizon: usize) -> f64 {
        self.level + self.trend * horizon.max(1) as f64
    }
}

fn smoothing_grid() -> impl Iterator<Item = f64> {
    (1..=SMOOTHING_GRID_STEPS).map(|step| step as f64 * 0.05)
}
