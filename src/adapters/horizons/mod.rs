mod parse;

use crate::core::{ConfigProvider, EphemerisSource};
use crate::domain::model::{EphemerisSample, OrbitalElements, RefPlane, TimeWindow};
use crate::utils::error::{OrbitError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";
/// Sun body center.
pub const DEFAULT_CENTER: &str = "500@Sun";
pub const DEFAULT_STEPS: u32 = 100;

/// Envelope of `format=json` responses.
#[derive(Debug, Deserialize)]
struct HorizonsResponse {
    result: Option<String>,
    error: Option<String>,
}

/// JPL Horizons HTTP API client.
#[derive(Debug, Clone)]
pub struct HorizonsClient {
    client: Client,
    endpoint: String,
    center: String,
    ref_plane: RefPlane,
    small_body: bool,
}

fn quoted(value: impl std::fmt::Display) -> String {
    format!("'{}'", value)
}

impl HorizonsClient {
    pub fn new(
        endpoint: impl Into<String>,
        center: impl Into<String>,
        ref_plane: RefPlane,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            center: center.into(),
            ref_plane,
            small_body: true,
        }
    }

    pub fn with_small_body_ids(mut self, small_body: bool) -> Self {
        self.small_body = small_body;
        self
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.api_endpoint().to_string(),
            center: config.center().to_string(),
            ref_plane: config.ref_plane(),
            small_body: config.small_body_ids(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `1` is Mercury's barycenter to Horizons, `1;` is Ceres.
    fn command(&self, obj_id: &str) -> String {
        let obj_id = obj_id.trim();
        if self.small_body && !obj_id.ends_with(';') {
            quoted(format!("{};", obj_id))
        } else {
            quoted(obj_id)
        }
    }

    fn common_query(&self, obj_id: &str, ephem_type: &str) -> Vec<(&'static str, String)> {
        vec![
            ("format", "json".to_string()),
            ("COMMAND", self.command(obj_id)),
            ("OBJ_DATA", "NO".to_string()),
            ("MAKE_EPHEM", "YES".to_string()),
            ("EPHEM_TYPE", ephem_type.to_string()),
            ("CENTER", quoted(&self.center)),
            ("REF_SYSTEM", "ICRF".to_string()),
            ("OUT_UNITS", "AU-D".to_string()),
            ("CSV_FORMAT", "YES".to_string()),
        ]
    }

    /// 軌道根數查詢參數 (單一時刻)
    pub fn elements_query(&self, obj_id: &str, epoch_jd: f64) -> Vec<(&'static str, String)> {
        let mut query = self.common_query(obj_id, "ELEMENTS");
        query.extend([
            ("REF_PLANE", "ECLIPTIC".to_string()),
            ("TP_TYPE", "ABSOLUTE".to_string()),
            ("ELEM_LABELS", "YES".to_string()),
            ("TLIST", quoted(format!("{:.9}", epoch_jd))),
        ]);
        query
    }

    /// 位置向量查詢參數 (時間網格)
    pub fn vectors_query(&self, obj_id: &str, window: &TimeWindow) -> Vec<(&'static str, String)> {
        let mut query = self.common_query(obj_id, "VECTORS");
        query.extend([
            ("REF_PLANE", quoted(self.ref_plane.horizons_code())),
            ("START_TIME", quoted(window.start_str())),
            ("STOP_TIME", quoted(window.stop_str())),
            ("STEP_SIZE", quoted(window.steps)),
            ("VEC_TABLE", "3".to_string()),
            ("VEC_CORR", quoted("NONE")),
            ("VEC_LABELS", "YES".to_string()),
            ("VEC_DELTA_T", "NO".to_string()),
        ]);
        query
    }

    async fn fetch(&self, query: &[(&'static str, String)]) -> Result<String> {
        tracing::debug!("Making Horizons request to: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Horizons response status: {} ({} bytes)", status, body.len());

        let parsed: Option<HorizonsResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(OrbitError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = parsed.ok_or_else(|| OrbitError::ParseError {
            message: "response is not a Horizons JSON envelope".to_string(),
        })?;

        if let Some(error) = parsed.error {
            return Err(OrbitError::ServiceError {
                status: status.as_u16(),
                message: error,
            });
        }

        parsed.result.ok_or_else(|| OrbitError::ParseError {
            message: "response has no 'result' field".to_string(),
        })
    }
}

#[async_trait]
impl EphemerisSource for HorizonsClient {
    async fn elements(&self, obj_id: &str, epoch_jd: f64) -> Result<OrbitalElements> {
        let text = self.fetch(&self.elements_query(obj_id, epoch_jd)).await?;
        parse::parse_elements(obj_id, &text)
    }

    async fn vectors(&self, obj_id: &str, window: &TimeWindow) -> Result<Vec<EphemerisSample>> {
        let text = self.fetch(&self.vectors_query(obj_id, window)).await?;
        parse::parse_vectors(obj_id, &text)
    }
}

#[cfg(test)]
pub(crate) use parse::fixtures;
