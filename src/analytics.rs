//! Derived price metrics
//!
//! Rolling averages, percentage returns, and summary statistics computed from
//! a normalized `PriceSeries`. Undefined values are `None`, never NaN or
//! infinity.

use serde::Serialize;

use crate::data::PriceSeries;

/// Short moving-average window used by the dashboard
pub const SHORT_MA_WINDOW: usize = 7;

/// Long moving-average window used by the dashboard
pub const LONG_MA_WINDOW: usize = 20;

/// Simple moving average of `values` over a trailing `window`
///
/// The output has the same length as the input. Index `i` holds the mean of
/// `values[i + 1 - window..=i]`, or `None` for the first `window - 1` points.
/// A zero window yields all `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Percentage change between consecutive closes
///
/// Returns `n - 1` values for `n` closes (empty for fewer than two). Element
/// `k` is `(closes[k + 1] - closes[k]) / closes[k] * 100`, or `None` when
/// `closes[k]` is zero.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    closes
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev == 0.0 {
                None
            } else {
                Some((curr - prev) / prev * 100.0)
            }
        })
        .collect()
}

/// Summary statistics over the defined values of a return series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnStats {
    pub mean: f64,
    /// Sample standard deviation (N-1); `None` with fewer than two values
    pub std_dev: Option<f64>,
    pub max: f64,
    pub min: f64,
    /// Number of defined returns the statistics cover
    pub count: usize,
}

impl ReturnStats {
    /// Computes statistics over the `Some` values of `returns`
    ///
    /// Returns `None` when no value is defined.
    pub fn from_returns(returns: &[Option<f64>]) -> Option<Self> {
        let defined: Vec<f64> = returns.iter().flatten().copied().collect();
        if defined.is_empty() {
            return None;
        }

        let count = defined.len();
        let mean = defined.iter().sum::<f64>() / count as f64;
        let std_dev = (count > 1).then(|| {
            let var = defined.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        });
        let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = defined.iter().copied().fold(f64::INFINITY, f64::min);

        Some(Self {
            mean,
            std_dev,
            max,
            min,
            count,
        })
    }
}

/// Headline numbers for the latest bar of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub latest_close: f64,
    pub latest_open: f64,
    pub latest_high: f64,
    pub latest_volume: u64,
    /// Latest close minus the previous close
    pub change: f64,
    /// `change` as a percentage of the previous close, 0 if that close is 0
    pub change_pct: f64,
    /// Highest high across the whole series
    pub max_high: f64,
    pub records: usize,
}

impl PriceSummary {
    /// Summarizes `series`; `None` for an empty series
    ///
    /// A single-bar series is compared against itself, so its change is 0.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let latest = series.latest()?;
        let previous = series
            .points
            .len()
            .checked_sub(2)
            .and_then(|i| series.points.get(i))
            .unwrap_or(latest);

        let change = latest.close - previous.close;
        let change_pct = if previous.close != 0.0 {
            change / previous.close * 100.0
        } else {
            0.0
        };
        let max_high = series
            .points
            .iter()
            .map(|p| p.high)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            latest_close: latest.close,
            latest_open: latest.open,
            latest_high: latest.high,
            latest_volume: latest.volume,
            change,
            change_pct,
            max_high,
            records: series.len(),
        })
    }
}

/// Everything the finance views derive from one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesAnalysis {
    pub ma_short: Vec<Option<f64>>,
    pub ma_long: Vec<Option<f64>>,
    pub returns: Vec<Option<f64>>,
    pub return_stats: Option<ReturnStats>,
    pub summary: Option<PriceSummary>,
}

impl SeriesAnalysis {
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let returns = daily_returns(&closes);
        Self {
            ma_short: moving_average(&closes, SHORT_MA_WINDOW),
            ma_long: moving_average(&closes, LONG_MA_WINDOW),
            return_stats: ReturnStats::from_returns(&returns),
            returns,
            summary: PriceSummary::from_series(series),
        }
    }
}

/// Formats a share volume for display ("12.35M" or "987,654")
pub fn format_volume(volume: u64) -> String {
    if volume > 1_000_000 {
        return format!("{:.2}M", volume as f64 / 1e6);
    }

    let digits = volume.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bucket, PricePoint};

    fn series(closes: &[f64]) -> PriceSeries {
        let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                symbol: "IBM".to_string(),
                timestamp: Bucket::Date(base + chrono::Duration::days(i as i64)),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: 1000 * (i as u64 + 1),
            })
            .collect();
        PriceSeries::new("IBM", points)
    }

    #[test]
    fn test_moving_average_short_series_is_all_none() {
        let ma = moving_average(&[1.0, 2.0, 3.0], 7);
        assert_eq!(ma.len(), 3);
        assert!(ma.iter().all(Option::is_none));
    }

    #[test]
    fn test_moving_average_defined_count() {
        let values: Vec<f64> = (1..=25).map(f64::from).collect();
        for window in [1, 7, 20, 25] {
            let ma = moving_average(&values, window);
            assert_eq!(ma.len(), values.len());
            assert_eq!(
                ma.iter().filter(|v| v.is_some()).count(),
                values.len() - window + 1
            );
            assert!(ma[..window - 1].iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_moving_average_values() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_moving_average_zero_window() {
        assert_eq!(moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_daily_returns_length_and_first_value() {
        let closes = [100.0, 110.0, 99.0, 99.0];
        let returns = daily_returns(&closes);

        assert_eq!(returns.len(), closes.len() - 1);
        let first = returns[0].unwrap();
        assert!((first - (110.0 - 100.0) / 100.0 * 100.0).abs() < 1e-12);
        assert!((returns[1].unwrap() - (-10.0)).abs() < 1e-12);
        assert_eq!(returns[2], Some(0.0));
    }

    #[test]
    fn test_daily_returns_guard_zero_previous_close() {
        let returns = daily_returns(&[0.0, 5.0, 10.0]);
        assert_eq!(returns[0], None);
        assert_eq!(returns[1], Some(100.0));
    }

    #[test]
    fn test_daily_returns_short_input() {
        assert!(daily_returns(&[]).is_empty());
        assert!(daily_returns(&[42.0]).is_empty());
    }

    #[test]
    fn test_return_stats_sample_std_dev() {
        let returns = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
        let stats = ReturnStats::from_returns(&returns).unwrap();

        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        // Sample variance of 1..=4 is 5/3
        assert!((stats.std_dev.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.min, 1.0);
    }

    #[test]
    fn test_return_stats_single_value_has_no_std_dev() {
        let stats = ReturnStats::from_returns(&[Some(-2.0)]).unwrap();
        assert_eq!(stats.mean, -2.0);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn test_return_stats_empty() {
        assert!(ReturnStats::from_returns(&[]).is_none());
        assert!(ReturnStats::from_returns(&[None, None]).is_none());
    }

    #[test]
    fn test_price_summary_change() {
        let summary = PriceSummary::from_series(&series(&[100.0, 104.0, 102.0])).unwrap();

        assert_eq!(summary.latest_close, 102.0);
        assert_eq!(summary.latest_open, 101.0);
        assert_eq!(summary.latest_high, 103.0);
        assert_eq!(summary.latest_volume, 3000);
        assert!((summary.change - (-2.0)).abs() < 1e-12);
        assert!((summary.change_pct - (-2.0 / 104.0 * 100.0)).abs() < 1e-12);
        assert_eq!(summary.max_high, 105.0);
        assert_eq!(summary.records, 3);
    }

    #[test]
    fn test_price_summary_single_point_and_zero_previous() {
        let single = PriceSummary::from_series(&series(&[50.0])).unwrap();
        assert_eq!(single.change, 0.0);
        assert_eq!(single.change_pct, 0.0);

        let from_zero = PriceSummary::from_series(&series(&[0.0, 5.0])).unwrap();
        assert_eq!(from_zero.change, 5.0);
        assert_eq!(from_zero.change_pct, 0.0);

        assert!(PriceSummary::from_series(&series(&[])).is_none());
    }

    #[test]
    fn test_series_analysis_lengths() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let analysis = SeriesAnalysis::compute(&series(&closes));

        assert_eq!(analysis.ma_short.len(), 30);
        assert_eq!(analysis.ma_long.iter().flatten().count(), 11);
        assert_eq!(analysis.returns.len(), 29);
        assert_eq!(analysis.return_stats.map(|s| s.count), Some(29));
        assert_eq!(analysis.summary.map(|s| s.latest_close), Some(30.0));
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(0), "0");
        assert_eq!(format_volume(999), "999");
        assert_eq!(format_volume(1000), "1,000");
        assert_eq!(format_volume(987_654), "987,654");
        assert_eq!(format_volume(1_000_000), "1,000,000");
        assert_eq!(format_volume(12_345_678), "12.35M");
    }
}
