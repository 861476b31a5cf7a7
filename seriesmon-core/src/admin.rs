//! Enabling and disabling monitoring services.
//!
//! Each metric source is a named service. Its enabled flag exists twice: in
//! the persisted [`ServicesConfig`], which survives restarts, and as a live
//! flag the running collector checks every tick. A configuration request
//! always updates the persisted setting and, when `dynamic`, the live flag
//! as well.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AdminError;

/// Persisted settings for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Persisted per-service settings, keyed by service name.
///
/// Services without an entry are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServicesConfig {
    services: BTreeMap<String, ServiceSettings>,
}

impl ServicesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the named service is enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.services.get(name).map_or(true, |s| s.enabled)
    }

    /// Record the enabled setting for a service.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        self.services.entry(name.to_string()).or_default().enabled = enabled;
    }

    /// Iterate over services with explicit settings.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServiceSettings)> {
        self.services.iter()
    }
}

/// A request to enable or disable a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureService {
    pub service_name: String,
    pub enabled: bool,
    /// Also apply the change to the running service.
    #[serde(default)]
    pub dynamic: bool,
}

impl ConfigureService {
    pub fn new(service_name: impl Into<String>, enabled: bool) -> Self {
        Self {
            service_name: service_name.into(),
            enabled,
            dynamic: false,
        }
    }

    /// Apply the change to the running service as well.
    pub fn dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }
}

/// Result of a successful configuration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureReport {
    pub service_name: String,
    pub enabled: bool,
    /// Whether the running service was changed.
    pub applied_live: bool,
    /// Human-readable status, present when the running service was changed.
    pub message: Option<String>,
}

/// Persisted and live enabled state of every registered service.
#[derive(Debug, Default)]
pub struct ServiceControl {
    persisted: RwLock<ServicesConfig>,
    live: RwLock<BTreeMap<String, Arc<AtomicBool>>>,
}

impl ServiceControl {
    /// Create a control surface starting from persisted settings.
    pub fn new(persisted: ServicesConfig) -> Self {
        Self {
            persisted: RwLock::new(persisted),
            live: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a running service and get its live flag.
    ///
    /// The flag starts from the persisted setting. Registering a name twice
    /// returns the existing flag.
    pub fn register(&self, name: &str) -> Arc<AtomicBool> {
        // Fast path
        if let Some(flag) = self.live.read().get(name) {
            return flag.clone();
        }

        // Slow path
        let enabled = self.persisted.read().is_enabled(name);
        self.live
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicBool::new(enabled)))
            .clone()
    }

    /// Whether the running service is enabled.
    ///
    /// Returns `None` for unregistered names.
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.live
            .read()
            .get(name)
            .map(|flag| flag.load(Ordering::Acquire))
    }

    /// Names of all registered services, sorted.
    pub fn services(&self) -> Vec<String> {
        self.live.read().keys().cloned().collect()
    }

    /// A copy of the persisted settings.
    pub fn persisted(&self) -> ServicesConfig {
        self.persisted.read().clone()
    }

    /// Enable or disable a registered service.
    ///
    /// Disabling stops future sampling of the service; datasets it already
    /// produced stay until the registry evicts them.
    pub fn configure(&self, request: &ConfigureService) -> Result<ConfigureReport, AdminError> {
        let live = self.live.read();
        let Some(flag) = live.get(&request.service_name) else {
            return Err(AdminError::UnknownService(request.service_name.clone()));
        };

        self.persisted
            .write()
            .set_enabled(&request.service_name, request.enabled);

        let message = if request.dynamic {
            flag.store(request.enabled, Ordering::Release);
            info!(
                service = %request.service_name,
                enabled = request.enabled,
                "service status changed"
            );
            Some(format!(
                "Service status for {} is set to {}.",
                request.service_name, request.enabled
            ))
        } else {
            None
        };

        Ok(ConfigureReport {
            service_name: request.service_name.clone(),
            enabled: request.enabled,
            applied_live: request.dynamic,
            message,
        })
    }
}
