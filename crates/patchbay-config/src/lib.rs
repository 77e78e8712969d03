//! Persisted pin state and routing presets for patchbay.
//!
//! This crate saves and restores the connection matrices of a
//! [`PinConnector`](patchbay_core::PinConnector) as TOML.
//!
//! # Features
//!
//! - **Pin state**: [`ConnectorState`] captures both matrices and channel
//!   counts and restores them leniently when a plugin's layout changed
//! - **Presets**: Named [`RoutingPreset`] files with load/save
//! - **Validation**: Reject structurally broken state before applying it
//! - **Factory Presets**: Built-in stereo layouts (swap, mono sum, ...)
//!
//! # Example
//!
//! ```rust,no_run
//! use patchbay_config::{RoutingPreset, get_factory_preset};
//! use patchbay_core::{ChannelCount, PinConnector};
//!
//! let mut pc = PinConnector::with_default_track_channels(
//!     ChannelCount::Count(2),
//!     ChannelCount::Count(2),
//! );
//!
//! // Apply a built-in layout
//! let swap = get_factory_preset("swap").unwrap();
//! swap.apply(&mut pc).unwrap();
//!
//! // Save the current pins and load them back
//! RoutingPreset::capture("My Routing", &pc).save("my_routing.toml").unwrap();
//! let preset = RoutingPreset::load("my_routing.toml").unwrap();
//! preset.apply(&mut pc).unwrap();
//! ```

mod error;
mod preset;
mod state;

/// Structural validation of saved pin state.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use preset::RoutingPreset;
pub use state::{ConnectorState, MatrixState, RestoreOutcome, RestoreReport};
pub use validation::{ValidationError, ValidationResult, validate_preset, validate_state};
