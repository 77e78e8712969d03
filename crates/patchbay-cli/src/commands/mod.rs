//! CLI command implementations.

pub mod common;
pub mod defaults;
pub mod inspect;
pub mod presets;
pub mod route;
