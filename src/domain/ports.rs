use crate::domain::model::{
    BodyRecord, BodyTrajectory, EphemerisSample, OrbitalElements, RefPlane, TimeWindow,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn center(&self) -> &str;
    fn ref_plane(&self) -> RefPlane;
    fn step_count(&self) -> u32;
    fn timeout(&self) -> Option<Duration>;

    /// Resolve ids against the small-body database (Horizons `;` suffix).
    fn small_body_ids(&self) -> bool {
        true
    }
}

/// The two queries the ephemeris service has to answer.
#[async_trait]
pub trait EphemerisSource: Send + Sync {
    async fn elements(&self, obj_id: &str, epoch_jd: f64) -> Result<OrbitalElements>;
    async fn vectors(&self, obj_id: &str, window: &TimeWindow) -> Result<Vec<EphemerisSample>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<BodyRecord>>;
    async fn transform(&self, data: Vec<BodyRecord>) -> Result<Vec<BodyTrajectory>>;
    async fn load(&self, result: Vec<BodyTrajectory>) -> Result<String>;
}
