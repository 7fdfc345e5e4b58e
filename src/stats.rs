//! Descriptive statistics over the counted runs of a benchmark.

use std::time::Duration;

use thiserror::Error;

/// Percentiles reported after every benchmark.
pub const REPORTED_PERCENTILES: [f64; 10] =
    [75.0, 80.0, 85.0, 90.0, 95.0, 97.5, 98.0, 99.0, 99.9, 100.0];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("no measurements were recorded")]
    Empty,
    #[error("percentile {0} is outside [0, 100]")]
    OutOfBounds(f64),
}

/// One boot-and-connect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub elapsed: Duration,
    /// Probe attempts made before the server answered.
    pub attempts: u64,
}

/// Measurements of the counted runs, in the order they were taken.
#[derive(Debug, Clone, Default)]
pub struct RunSet {
    measurements: Vec<Measurement>,
}

impl RunSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            measurements: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    fn nanos(&self) -> Vec<f64> {
        self.measurements
            .iter()
            .map(|m| m.elapsed.as_nanos() as f64)
            .collect()
    }
}

impl FromIterator<Duration> for RunSet {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self {
            measurements: iter
                .into_iter()
                .map(|elapsed| Measurement { elapsed, attempts: 1 })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outliers {
    pub mild: Vec<Duration>,
    pub extreme: Vec<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
    pub std_dev: Duration,
    pub outliers: Outliers,
    /// `(percentile, value)` for each of [`REPORTED_PERCENTILES`].
    pub percentiles: Vec<(f64, Duration)>,
}

impl Summary {
    pub fn compute(runs: &RunSet) -> Result<Self, StatsError> {
        if runs.is_empty() {
            return Err(StatsError::Empty);
        }
        let mut sorted = runs.nanos();
        sorted.sort_by(f64::total_cmp);

        let percentiles = REPORTED_PERCENTILES
            .iter()
            .map(|&p| Ok((p, to_duration(percentile_sorted(&sorted, p)?))))
            .collect::<Result<Vec<_>, StatsError>>()?;
        let outliers = quartile_outliers(&sorted)?;

        Ok(Self {
            count: sorted.len(),
            min: to_duration(sorted[0]),
            max: to_duration(sorted[sorted.len() - 1]),
            median: to_duration(percentile_sorted(&sorted, 50.0)?),
            std_dev: to_duration(std_dev(&sorted)),
            outliers: Outliers {
                mild: outliers.mild.into_iter().map(to_duration).collect(),
                extreme: outliers.extreme.into_iter().map(to_duration).collect(),
            },
            percentiles,
        })
    }
}

fn to_duration(nanos: f64) -> Duration {
    Duration::from_nanos(nanos.round().max(0.0) as u64)
}

/// Linear-interpolation percentile of unsorted data.
pub fn percentile(data: &[f64], p: f64) -> Result<f64, StatsError> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Linear interpolation between closest ranks, with rank = p/100 * (n - 1).
fn percentile_sorted(sorted: &[f64], p: f64) -> Result<f64, StatsError> {
    if sorted.is_empty() {
        return Err(StatsError::Empty);
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::OutOfBounds(p));
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawOutliers {
    pub mild: Vec<f64>,
    pub extreme: Vec<f64>,
}

/// Tukey fences: mild beyond 1.5 IQR of the nearest quartile, extreme beyond 3 IQR.
pub fn quartile_outliers(data: &[f64]) -> Result<RawOutliers, StatsError> {
    let q1 = percentile(data, 25.0)?;
    let q3 = percentile(data, 75.0)?;
    let iqr = q3 - q1;
    let (inner_low, inner_high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let (outer_low, outer_high) = (q1 - 3.0 * iqr, q3 + 3.0 * iqr);

    let mut outliers = RawOutliers {
        mild: Vec::new(),
        extreme: Vec::new(),
    };
    for &v in data {
        if v < outer_low || v > outer_high {
            outliers.extreme.push(v);
        } else if v < inner_low || v > inner_high {
            outliers.mild.push(v);
        }
    }
    Ok(outliers)
}
