//! Device configuration (`drawstate.toml`)
//!
//! Describes what the extension negotiation and device-limits providers would
//! report for a device: which dynamic-state groups are enabled and how large
//! the init-time arrays are. Converted into a [`StateCatalog`] and
//! [`DeviceLimits`] before any snapshot is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceLimits, StateCatalog, StateGroups};
use crate::error::ConfigError;

/// Largest accepted value for any device limit
pub const MAX_LIMIT_VALUE: u32 = 4096;

/// Device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DrawStateConfig {
    /// Enabled dynamic-state extensions
    #[serde(default)]
    pub extensions: ExtensionConfig,
    /// Sizes of the init-time arrays
    #[serde(default)]
    pub limits: DeviceLimits,
}

/// Negotiated extension set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// EXTENDED_DYNAMIC_STATE group (default: true)
    #[serde(default = "default_true")]
    pub extended_dynamic_state: bool,
    /// EXTENDED_DYNAMIC_STATE_2 group (default: true)
    #[serde(default = "default_true")]
    pub extended_dynamic_state_2: bool,
    /// EXTENDED_DYNAMIC_STATE_3 group (default: false)
    #[serde(default)]
    pub extended_dynamic_state_3: bool,
    /// VERTEX_INPUT_DYNAMIC_STATE group (default: false)
    #[serde(default)]
    pub vertex_input_dynamic_state: bool,
    /// Unused attachment formats may be ignored when comparing (default: false)
    #[serde(default)]
    pub dynamic_rendering_unused_attachments: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            extended_dynamic_state: default_true(),
            extended_dynamic_state_2: default_true(),
            extended_dynamic_state_3: false,
            vertex_input_dynamic_state: false,
            dynamic_rendering_unused_attachments: false,
        }
    }
}

impl ExtensionConfig {
    /// Groups enabled by this extension set, MISC included
    pub fn active_groups(&self) -> StateGroups {
        let mut groups = StateGroups::MISC;
        groups.set(StateGroups::EXTENDED_DYNAMIC_STATE, self.extended_dynamic_state);
        groups.set(StateGroups::EXTENDED_DYNAMIC_STATE_2, self.extended_dynamic_state_2);
        groups.set(StateGroups::EXTENDED_DYNAMIC_STATE_3, self.extended_dynamic_state_3);
        groups.set(
            StateGroups::VERTEX_INPUT_DYNAMIC_STATE,
            self.vertex_input_dynamic_state,
        );
        groups
    }
}

impl DrawStateConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// carries a limit above [`MAX_LIMIT_VALUE`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            "Loaded draw-state config from {} ({} groups active)",
            path.display(),
            config.extensions.active_groups().bits().count_ones()
        );
        Ok(config)
    }

    /// Check every limit against [`MAX_LIMIT_VALUE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("max_color_attachments", self.limits.max_color_attachments),
            (
                "max_vertex_input_attributes",
                self.limits.max_vertex_input_attributes,
            ),
            (
                "max_vertex_input_bindings",
                self.limits.max_vertex_input_bindings,
            ),
            ("max_viewports", self.limits.max_viewports),
        ];
        for (name, value) in limits {
            if value > MAX_LIMIT_VALUE {
                return Err(ConfigError::LimitTooLarge {
                    name,
                    value,
                    max: MAX_LIMIT_VALUE,
                });
            }
        }

        if self.limits.max_color_attachments == 0 {
            tracing::warn!("max_color_attachments is 0; color attachment state will be empty");
        }
        if self.extensions.dynamic_rendering_unused_attachments
            && self.limits.max_color_attachments == 0
        {
            tracing::warn!("dynamic_rendering_unused_attachments has no effect without color attachments");
        }
        Ok(())
    }

    /// Build the catalog shared by every snapshot of this device.
    pub fn catalog(&self) -> StateCatalog {
        StateCatalog::new(
            self.extensions.active_groups(),
            self.extensions.dynamic_rendering_unused_attachments,
        )
    }

    pub fn limits(&self) -> DeviceLimits {
        self.limits
    }
}
