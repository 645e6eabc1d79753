use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRecord {
    pub name: String,
    pub obj_id: String,
}

impl BodyRecord {
    pub fn new(name: impl Into<String>, obj_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            obj_id: obj_id.into(),
        }
    }
}

/// Osculating elements as reported by the ephemeris service. Only `a` is required.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalElements {
    pub epoch_jd_tdb: Option<f64>,
    pub eccentricity: Option<f64>,
    /// semi-major axis, AU
    pub semi_major_axis: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalPeriod {
    pub obj_id: String,
    pub semi_major_axis: f64,
    pub years: f64,
}

impl OrbitalPeriod {
    pub fn days(&self) -> f64 {
        self.years * crate::core::period::DAYS_PER_YEAR
    }
}

/// Cartesian position in AU, heliocentric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSample {
    pub jd_tdb: f64,
    pub calendar: String,
    pub position: Position,
}

/// Time grid for a vector query: `steps` equal intervals between `start` and `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub steps: u32,
}

/// One entry of the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyTrajectory {
    pub name: String,
    pub obj_id: String,
    pub coords_au: Vec<Position>,
}

/// Reference plane for vector queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RefPlane {
    /// Earth mean equator and equinox of the reference frame.
    #[default]
    Earth,
    Ecliptic,
    Body,
}

impl RefPlane {
    /// Value of the Horizons `REF_PLANE` parameter.
    pub fn horizons_code(&self) -> &'static str {
        match self {
            RefPlane::Earth => "FRAME",
            RefPlane::Ecliptic => "ECLIPTIC",
            RefPlane::Body => "BODY EQUATOR",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefPlane::Earth => "earth",
            RefPlane::Ecliptic => "ecliptic",
            RefPlane::Body => "body",
        }
    }
}

impl std::fmt::Display for RefPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RefPlane {
    type Err = crate::utils::error::OrbitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earth" | "frame" => Ok(RefPlane::Earth),
            "ecliptic" => Ok(RefPlane::Ecliptic),
            "body" | "body equator" => Ok(RefPlane::Body),
            other => Err(crate::utils::error::OrbitError::InvalidConfigValueError {
                field: "ref_plane".to_string(),
                value: other.to_string(),
                reason: "Valid reference planes: earth, ecliptic, body".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RefPlane {
    type Error = crate::utils::error::OrbitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RefPlane> for String {
    fn from(plane: RefPlane) -> Self {
        plane.as_str().to_string()
    }
}
