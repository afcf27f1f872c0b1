//! Entity lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Settings that shape the keys and paths the lifecycle manager derives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Leading key segment under which every owner's blobs live.
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
    /// Object name of the empty blob written when an entity is created.
    #[serde(default = "default_placeholder_name")]
    pub placeholder_name: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            key_namespace: default_key_namespace(),
            placeholder_name: default_placeholder_name(),
        }
    }
}

fn default_key_namespace() -> String {
    "users".to_string()
}

fn default_placeholder_name() -> String {
    ".folder".to_string()
}
