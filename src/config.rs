// src/config.rs

//! Defines the configuration structure for the display-output adapter.
//!
//! The tunable surface is deliberately small. The advertised timing and
//! the always-connected policy are part of the adapter's contract, not
//! configuration; what remains is the instance name used in logs and
//! the connector family reported to the host.
//!
//! Configuration is deserialized from a JSON file when one is present
//! and falls back to defaults otherwise, so an embedding host never has
//! to ship a config file just to get the adapter running.

use crate::sink::ConnectorKind;
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

/// Complete configuration for one adapter instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)] // Apply default values for any field missing in the file.
pub struct AdapterConfig {
    /// Instance name, used in log lines and as the default device identity.
    pub name: String,
    /// Connector family the output sink advertises to the host.
    pub connector: ConnectorKind,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig {
            name: "fixed-output".to_string(),
            connector: ConnectorKind::HdmiA,
        }
    }
}

impl AdapterConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file is the normal case and yields the defaults
    /// silently; an unreadable or malformed file is logged and also
    /// yields the defaults, so a bad config never stops the adapter
    /// from binding.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return AdapterConfig::default(),
            Err(e) => {
                warn!("ignoring unreadable config {}: {}", path.display(), e);
                return AdapterConfig::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring malformed config {}: {}", path.display(), e);
                AdapterConfig::default()
            }
        }
    }
}
