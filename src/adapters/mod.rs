// Adapters layer: concrete implementations for external systems.

pub mod horizons;

pub use horizons::HorizonsClient;
