pub mod etl;
pub mod period;
pub mod pipeline;
pub mod sampler;

pub use crate::domain::model::{BodyRecord, BodyTrajectory};
pub use crate::domain::ports::{ConfigProvider, EphemerisSource, Pipeline, Storage};
pub use crate::utils::error::Result;
