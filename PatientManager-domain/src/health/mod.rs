//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use tracing::warn;

use patient_manager_data::repository::PatientRepositoryTrait;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build a report whose overall status is the worst component status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Probe the patient store.
    /// Returns a description of the store, or the reason it is unreachable.
    async fn check_database_status(&self) -> Result<String, String>;
}

/// Health service backed by the patient repository
pub struct HealthService<R: PatientRepositoryTrait> {
    repository: R,
}

impl<R: PatientRepositoryTrait> HealthService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: PatientRepositoryTrait> fmt::Debug for HealthService<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthService").finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: PatientRepositoryTrait> HealthServiceTrait for HealthService<R> {
    async fn get_system_health(&self) -> SystemHealth {
        let database = match self.check_database_status().await {
            Ok(info) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(info),
            },
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(e),
                }
            },
        };

        let api = HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        };

        SystemHealth::from_components(HashMap::from([
            ("database".to_string(), database),
            ("api".to_string(), api),
        ]))
    }

    async fn check_database_status(&self) -> Result<String, String> {
        self.repository
            .describe()
            .await
            .map_err(|e| format!("Database connection error: {}", e))
    }
}
