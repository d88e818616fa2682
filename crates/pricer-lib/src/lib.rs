//! Library crate for the vehicle price predictor
//!
//! This crate provides the core functionality for:
//! - Loading trained regression models behind a capability-probing adapter
//! - Discovering the model's expected input schema
//! - Reconciling form inputs into a model-compatible feature vector
//! - Price prediction and reporting
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod model;
pub mod models;
pub mod observability;
pub mod pricing;
pub mod reconcile;
pub mod report;

pub use error::PricerError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PricerMetrics, StructuredLogger};
pub use pricing::PriceEstimator;
pub use report::{GroupView, PriceOutcome, SchemaReport};
