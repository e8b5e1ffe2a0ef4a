use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Per-feature enables and the global handle-wrapping switch, loaded from
/// `vk_layer_settings.toml`. Read once when an instance context is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSettings {
    /// Cross-thread access tracking of externally synchronized objects
    #[serde(default = "default_true")]
    pub thread_safety: bool,
    /// Stateless parameter checks
    #[serde(default = "default_true")]
    pub stateless: bool,
    /// Object lifetime tracking
    #[serde(default = "default_true")]
    pub object_lifetimes: bool,
    /// Core semantic validation
    #[serde(default = "default_true")]
    pub core: bool,
    #[serde(default)]
    pub best_practices: bool,
    #[serde(default)]
    pub gpu_assisted: bool,
    #[serde(default)]
    pub debug_printf: bool,
    #[serde(default)]
    pub sync_validation: bool,
    /// Replace non-dispatchable driver handles with layer-owned ids
    #[serde(default = "default_true")]
    pub wrap_handles: bool,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            thread_safety: true,
            stateless: true,
            object_lifetimes: true,
            core: true,
            best_practices: false,
            gpu_assisted: false,
            debug_printf: false,
            sync_validation: false,
            wrap_handles: true,
        }
    }
}

impl LayerSettings {
    /// Load settings from a TOML file.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let settings: LayerSettings = toml::from_str(content)?;
        if settings.debug_printf && settings.gpu_assisted {
            return Err(CoreError::Config(
                "gpu_assisted and debug_printf cannot be enabled together".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Load settings from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(CoreError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring settings file {}: {}", path, e);
                Self::default()
            }
        }
    }
}

/// Returns the settings file path.
/// Search order:
/// 1. `VKL_SETTINGS` environment variable
/// 2. Local fallback: `./vk_layer_settings.toml`
pub fn default_settings_path() -> String {
    std::env::var("VKL_SETTINGS").unwrap_or_else(|_| "vk_layer_settings.toml".to_string())
}

fn default_true() -> bool {
    true
}
