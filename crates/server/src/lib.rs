pub mod api;
pub mod metrics;
pub mod registry;
pub mod state;
