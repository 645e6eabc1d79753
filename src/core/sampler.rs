use crate::core::period::DAYS_PER_YEAR;
use crate::core::EphemerisSource;
use crate::domain::model::{EphemerisSample, OrbitalPeriod, TimeWindow};
use crate::utils::error::{OrbitError, Result};
use chrono::{DateTime, Duration, Timelike, Utc};

pub const HORIZONS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian Date of a UTC instant.
pub fn julian_date(at: DateTime<Utc>) -> f64 {
    let millis = at.timestamp_millis() as f64;
    UNIX_EPOCH_JD + millis / MILLIS_PER_DAY
}

impl TimeWindow {
    /// Window covering one orbital period starting at `start`.
    pub fn for_period(start: DateTime<Utc>, period_years: f64, steps: u32) -> Result<Self> {
        if !period_years.is_finite() || period_years <= 0.0 {
            return Err(OrbitError::TimeWindowError {
                message: format!("period must be positive, got {} yr", period_years),
            });
        }
        if steps == 0 {
            return Err(OrbitError::TimeWindowError {
                message: "step count must be at least 1".to_string(),
            });
        }

        // Horizons 只接受到秒的時間
        let start = start
            .with_nanosecond(0)
            .ok_or_else(|| OrbitError::TimeWindowError {
                message: format!("cannot truncate start time {}", start),
            })?;

        let span_millis = period_years * DAYS_PER_YEAR * MILLIS_PER_DAY;
        let span = Duration::try_milliseconds(span_millis.round() as i64).ok_or_else(|| {
            OrbitError::TimeWindowError {
                message: format!("period of {} yr is out of range", period_years),
            }
        })?;
        let stop = start
            .checked_add_signed(span)
            .ok_or_else(|| OrbitError::TimeWindowError {
                message: format!("{} + {} yr overflows the calendar", start, period_years),
            })?;

        Ok(Self { start, stop, steps })
    }

    pub fn start_str(&self) -> String {
        self.start.format(HORIZONS_DATE_FORMAT).to_string()
    }

    pub fn stop_str(&self) -> String {
        self.stop.format(HORIZONS_DATE_FORMAT).to_string()
    }
}

pub struct TrajectorySampler<'a, E: EphemerisSource> {
    source: &'a E,
    steps: u32,
}

impl<'a, E: EphemerisSource> TrajectorySampler<'a, E> {
    pub fn new(source: &'a E, steps: u32) -> Self {
        Self { source, steps }
    }

    /// Position vectors over one revolution, in the order the service returns them.
    pub async fn sample(
        &self,
        obj_id: &str,
        start: DateTime<Utc>,
        period: &OrbitalPeriod,
    ) -> Result<Vec<EphemerisSample>> {
        let window = TimeWindow::for_period(start, period.years, self.steps)?;

        tracing::debug!(
            "{}: sampling {} -> {} ({:.1} days, {} steps)",
            obj_id,
            window.start_str(),
            window.stop_str(),
            period.days(),
            window.steps
        );

        let samples = self.source.vectors(obj_id, &window).await?;
        tracing::debug!("{}: received {} samples", obj_id, samples.len());

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OrbitalElements, Position};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records the window it was asked for and answers with `steps` samples.
    struct RecordingSource {
        seen: Mutex<Option<TimeWindow>>,
    }

    #[async_trait]
    impl EphemerisSource for RecordingSource {
        async fn elements(&self, _obj_id: &str, _epoch_jd: f64) -> Result<OrbitalElements> {
            unreachable!("sampler never asks for elements")
        }

        async fn vectors(
            &self,
            _obj_id: &str,
            window: &TimeWindow,
        ) -> Result<Vec<EphemerisSample>> {
            *self.seen.lock().unwrap() = Some(window.clone());
            Ok((0..window.steps)
                .map(|i| EphemerisSample {
                    jd_tdb: 2_461_000.5 + i as f64,
                    calendar: String::new(),
                    position: Position {
                        x: i as f64,
                        y: 0.0,
                        z: 0.0,
                    },
                })
                .collect())
        }
    }

    fn span_days(window: &TimeWindow) -> f64 {
        (window.stop - window.start).num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    #[test]
    fn test_julian_date_of_j2000() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_date(j2000) - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_spans_one_period() {
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let window = TimeWindow::for_period(start, 1.0, 100).unwrap();

        assert_eq!(window.start, start);
        assert_eq!(window.steps, 100);
        assert!((span_days(&window) - 365.25).abs() < 1e-6);
        assert_eq!(window.start_str(), "2026-10-16 08:30:00");
        assert_eq!(window.stop_str(), "2027-10-16 14:30:00");
    }

    #[test]
    fn test_window_truncates_subseconds() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
            + Duration::milliseconds(750);
        let window = TimeWindow::for_period(start, 4.6, 100).unwrap();
        assert_eq!(window.start_str(), "2026-01-01 00:00:00");
        assert_eq!(window.start.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_window_rejects_bad_periods() {
        let start = Utc::now();
        assert!(TimeWindow::for_period(start, 0.0, 100).is_err());
        assert!(TimeWindow::for_period(start, f64::NAN, 100).is_err());
        assert!(TimeWindow::for_period(start, 1.0, 0).is_err());
        assert!(TimeWindow::for_period(start, 1e12, 100).is_err());
    }

    #[tokio::test]
    async fn test_sample_requests_full_revolution() {
        let source = RecordingSource {
            seen: Mutex::new(None),
        };
        let sampler = TrajectorySampler::new(&source, 100);
        let period = OrbitalPeriod {
            obj_id: "1".to_string(),
            semi_major_axis: 2.7675,
            years: 4.604,
        };
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();

        let samples = sampler.sample("1", start, &period).await.unwrap();

        assert_eq!(samples.len(), 100);
        assert_eq!(samples[0].position.x, 0.0);
        assert_eq!(samples[99].position.x, 99.0);

        let window = source.seen.lock().unwrap().clone().unwrap();
        assert_eq!(window.start, start);
        assert!((span_days(&window) - 4.604 * 365.25).abs() < 1e-6);
    }
}
