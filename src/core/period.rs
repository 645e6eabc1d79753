use crate::core::sampler::julian_date;
use crate::core::EphemerisSource;
use crate::domain::model::OrbitalPeriod;
use crate::utils::error::{OrbitError, Result};
use chrono::{DateTime, Utc};

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Kepler's third law for a heliocentric two-body orbit: P[yr] = sqrt(a[AU]^3).
///
/// Returns `None` when `a` is not a positive finite number (hyperbolic or missing orbit).
pub fn orbital_period_years(semi_major_axis: f64) -> Option<f64> {
    if semi_major_axis.is_finite() && semi_major_axis > 0.0 {
        Some(semi_major_axis.powi(3).sqrt())
    } else {
        None
    }
}

pub struct PeriodCalculator<'a, E: EphemerisSource> {
    source: &'a E,
}

impl<'a, E: EphemerisSource> PeriodCalculator<'a, E> {
    pub fn new(source: &'a E) -> Self {
        Self { source }
    }

    /// 查詢軌道根數並以半長軸計算週期
    pub async fn calc_period(&self, obj_id: &str, at: DateTime<Utc>) -> Result<OrbitalPeriod> {
        let elements = self.source.elements(obj_id, julian_date(at)).await?;
        let a = elements.semi_major_axis;

        let years = orbital_period_years(a).ok_or_else(|| OrbitError::InvalidSemiMajorAxis {
            object_id: obj_id.to_string(),
            value: a,
        })?;

        tracing::debug!(
            "{}: a = {:.6} AU, e = {:?}, period = {:.4} yr",
            obj_id,
            a,
            elements.eccentricity,
            years
        );

        Ok(OrbitalPeriod {
            obj_id: obj_id.to_string(),
            semi_major_axis: a,
            years,
        })
    }
}
