// Domain layer: models and ports. No network or filesystem code here.

pub mod model;
pub mod ports;
