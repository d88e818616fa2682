//! Health and readiness state for the price predictor
//!
//! The service only starts once a model has loaded, so liveness never reports
//! failure. What can vary is the quality of the discovered schema: when the
//! feature count had to be guessed, the `schema` component is degraded and
//! predictions may fail, but the form still serves.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Component names for health tracking
pub mod components {
    /// The loaded model artifact
    pub const MODEL: &str = "model";
    /// Input schema discovery; degraded when the feature count was guessed
    pub const SCHEMA: &str = "schema";
}

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Serving, with reduced confidence in predictions
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unix time of the last status change
    pub since: i64,
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            since: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Shared health state, cloned into the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component as healthy
    pub async fn register(&self, name: &str) {
        self.components.write().await.insert(
            name.to_string(),
            ComponentHealth::new(ComponentStatus::Healthy, None),
        );
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.components.write().await.insert(
            name.to_string(),
            ComponentHealth::new(ComponentStatus::Degraded, Some(message.into())),
        );
    }

    /// Mark startup (model load and schema discovery) as finished
    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = if components
            .values()
            .any(|c| c.status == ComponentStatus::Degraded)
        {
            ComponentStatus::Degraded
        } else {
            ComponentStatus::Healthy
        };
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        if *self.ready.read().await {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        } else {
            ReadinessResponse {
                ready: false,
                reason: Some("Model not yet loaded".to_string()),
            }
        }
    }
}
