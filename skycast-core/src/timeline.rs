//! Forecast aggregation: day bucketing of the flat 3-hourly sample series
//! and the bounded near-term window used by the hourly view.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

use crate::model::{Condition, DaySummary, ForecastSample};

/// Near-term window length used by callers for the hourly view:
/// 8 samples at the source's 3-hour interval is roughly 24 hours. The
/// interval is a property of the data source, so the coupling lives with
/// the caller, not inside `next_window`.
pub const DEFAULT_HOURLY_WINDOW: usize = 8;

/// Maps epoch timestamps to local calendar-day keys.
///
/// The UTC offset is captured once at construction, so keys are stable for
/// the lifetime of the bucketer. Two timestamps share a key iff they fall
/// on the same calendar date in that offset.
#[derive(Debug, Clone, Copy)]
pub struct DayBucketer {
    offset: FixedOffset,
}

impl DayBucketer {
    /// Bucketer for the process-local timezone.
    pub fn local() -> Self {
        Self {
            offset: *Local::now().offset(),
        }
    }

    /// Bucketer for an explicit offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// `YYYY-MM-DD` key of the calendar day `epoch_seconds` falls on.
    ///
    /// Any `i64` is accepted: epochs outside chrono's representable range
    /// clamp to the minimum/maximum representable date instead of panicking.
    pub fn day_key(&self, epoch_seconds: i64) -> String {
        let date = DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
            .map(|utc| utc.with_timezone(&self.offset).date_naive())
            .unwrap_or(if epoch_seconds < 0 {
                NaiveDate::MIN
            } else {
                NaiveDate::MAX
            });

        date.format("%Y-%m-%d").to_string()
    }

    /// Rolls the chronological sample sequence up into one summary per
    /// local calendar day, in first-seen day order.
    ///
    /// Per day: min/max temperature across the group (rounded to one
    /// decimal on the aggregated value only) and the condition of the
    /// chronologically first sample, which represents the day.
    pub fn aggregate_daily(&self, samples: &[ForecastSample]) -> Vec<DaySummary> {
        let mut days: Vec<(String, DayAccumulator)> = Vec::new();

        for sample in samples {
            let key = self.day_key(sample.timestamp);
            match days.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, acc)) => acc.fold(sample),
                None => days.push((key, DayAccumulator::seed(sample))),
            }
        }

        days.into_iter()
            .map(|(day_key, acc)| acc.into_summary(day_key))
            .collect()
    }
}

/// Running min/max over one day bucket. The condition is pinned by the
/// first sample seen for the day.
#[derive(Debug)]
struct DayAccumulator {
    min: f64,
    max: f64,
    condition: Condition,
    count: usize,
}

impl DayAccumulator {
    fn seed(sample: &ForecastSample) -> Self {
        Self {
            min: sample.temperature,
            max: sample.temperature,
            condition: sample.condition.clone(),
            count: 1,
        }
    }

    fn fold(&mut self, sample: &ForecastSample) {
        self.min = self.min.min(sample.temperature);
        self.max = self.max.max(sample.temperature);
        self.count += 1;
    }

    fn into_summary(self, day_key: String) -> DaySummary {
        DaySummary {
            day_key,
            min_temperature: round_tenths(self.min),
            max_temperature: round_tenths(self.max),
            condition: self.condition,
            sample_count: self.count,
        }
    }
}

/// First `min(max_count, len)` samples of the sequence, unchanged and in
/// order. The input is already chronological.
pub fn next_window(samples: &[ForecastSample], max_count: usize) -> &[ForecastSample] {
    &samples[..samples.len().min(max_count)]
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
