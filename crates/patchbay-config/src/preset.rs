//! Routing preset file format and operations.

use patchbay_core::PinConnector;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::state::{ConnectorState, RestoreReport};

/// A named, saved pin layout.
///
/// Presets are stored as TOML files holding a [`ConnectorState`]. They can be
/// loaded from files, captured from a live connector and saved to disk.
///
/// # TOML Format
///
/// ```toml
/// name = "Swap"
/// description = "Left and right exchanged"
///
/// [state]
/// track_channels = 2
///
/// [state.input]
/// channels = 2
/// pins = [[false, true], [true, false]]
///
/// [state.output]
/// channels = 2
/// pins = [[true, false], [false, true]]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Saved pins and channel counts.
    #[serde(default)]
    pub state: ConnectorState,
}

impl RoutingPreset {
    /// Create a preset holding `state`.
    pub fn new(name: impl Into<String>, state: ConnectorState) -> Self {
        Self {
            name: name.into(),
            description: None,
            state,
        }
    }

    /// Capture the current pins of `connector` as a preset.
    pub fn capture(name: impl Into<String>, connector: &PinConnector) -> Self {
        Self::new(name, ConnectorState::capture(connector))
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset = Self::from_toml(&content)?;
        tracing::debug!("loaded routing preset '{}' from {}", preset.name, path.display());
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the saved state for structural problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::validation::validate_preset(self)?;
        Ok(())
    }

    /// Validate, then apply the saved pins to `connector`.
    ///
    /// See [`ConnectorState::restore()`] for how mismatched channel counts
    /// are handled.
    pub fn apply(&self, connector: &mut PinConnector) -> Result<RestoreReport, ConfigError> {
        self.validate()?;
        self.state.restore(connector)
    }

    /// Validate, then build a connector holding exactly the saved pins.
    pub fn to_connector(&self) -> Result<PinConnector, ConfigError> {
        self.validate()?;
        self.state.to_connector()
    }
}

impl Default for RoutingPreset {
    fn default() -> Self {
        Self::new("Untitled", ConnectorState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchbay_core::{ChannelCount, Direction};

    fn stereo() -> PinConnector {
        PinConnector::with_default_track_channels(ChannelCount::Count(2), ChannelCount::Count(2))
    }

    #[test]
    fn test_preset_builder() {
        let preset = RoutingPreset::capture("Stereo", &stereo()).with_description("Default pins");
        assert_eq!(preset.name, "Stereo");
        assert_eq!(preset.description.as_deref(), Some("Default pins"));
        assert_eq!(preset.state.input.enabled_count(), 2);
    }

    #[test]
    fn test_preset_toml_roundtrip() {
        let mut pc = stereo();
        pc.set_pin(Direction::Input, 0, 1, true).unwrap();
        let preset = RoutingPreset::capture("Wide", &pc);

        let toml = preset.to_toml().unwrap();
        assert!(toml.contains("name = \"Wide\""));
        assert!(toml.contains("[state.input]"));
        assert!(!toml.contains("description"));

        let parsed = RoutingPreset::from_toml(&toml).unwrap();
        assert_eq!(parsed, preset);
    }

    #[test]
    fn test_preset_parse_minimal() {
        let preset = RoutingPreset::from_toml("name = \"Empty\"").unwrap();
        assert_eq!(preset.state, ConnectorState::default());
        assert!(preset.validate().is_ok());
    }

    #[test]
    fn test_preset_parse_error() {
        assert!(matches!(
            RoutingPreset::from_toml("name = "),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_apply_rejects_invalid() {
        let mut preset = RoutingPreset::capture("Bad", &stereo());
        preset.state.output.pins.push(vec![true, true]);
        let mut pc = stereo();
        assert!(matches!(
            preset.apply(&mut pc),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_to_connector() {
        let mut pc = stereo();
        pc.clear_pins(Direction::Output);
        pc.set_pin(Direction::Output, 1, 0, true).unwrap();
        let preset = RoutingPreset::capture("Left to right", &pc);

        let restored = preset.to_connector().unwrap();
        assert_eq!(restored.routed_channels(), [false, true]);
        assert!(restored.output().enabled(1, 0));
    }
}
