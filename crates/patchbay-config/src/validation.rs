//! Structural validation of saved pin state.
//!
//! Restoring is lenient about channel counts that changed since the state was
//! saved, but a state that could never have been captured from a connector
//! (odd track widths, rows wider than the declared count, pins saved for an
//! unknown count) is rejected before it touches one.
//!
//! # Example
//!
//! ```rust
//! use patchbay_config::{ConnectorState, validate_state};
//!
//! let mut state = ConnectorState::default();
//! assert!(validate_state(&state).is_ok());
//!
//! state.track_channels = 3;
//! assert!(validate_state(&state).is_err());
//! ```

use patchbay_core::{Direction, MAX_PLUGIN_CHANNELS, MAX_TRACK_CHANNELS};
use thiserror::Error;

use crate::preset::RoutingPreset;
use crate::state::{ConnectorState, MatrixState};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Track channel count is odd or too large.
    #[error("track channel count {0} must be even and at most {MAX_TRACK_CHANNELS}")]
    TrackChannels(usize),

    /// Plugin channel count outside `-1..=MAX_PLUGIN_CHANNELS`.
    #[error("{direction} channel count {value} out of range [-1, {MAX_PLUGIN_CHANNELS}]")]
    ChannelCount {
        /// Direction of the matrix.
        direction: Direction,
        /// The saved raw count.
        value: i32,
    },

    /// More pin rows than host channels.
    #[error("{direction} pins have {rows} rows for {track_channels} track channels")]
    RowCount {
        /// Direction of the matrix.
        direction: Direction,
        /// Rows saved.
        rows: usize,
        /// Track channels saved.
        track_channels: usize,
    },

    /// A row wider than the plugin channel count.
    #[error("{direction} pin row {track} has {width} entries for {channels} channels")]
    RowWidth {
        /// Direction of the matrix.
        direction: Direction,
        /// Host channel of the row.
        track: usize,
        /// Entries in the row.
        width: usize,
        /// Saved plugin channel count.
        channels: usize,
    },

    /// Pins saved while the channel count is unknown.
    #[error("{0} pins saved without a channel count")]
    PinsWithoutCount(Direction),

    /// Preset without a name.
    #[error("preset name is empty")]
    EmptyName,

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn check_matrix(
    direction: Direction,
    matrix: &MatrixState,
    track_channels: usize,
    errors: &mut Vec<ValidationError>,
) {
    let channels = match usize::try_from(matrix.channels) {
        Ok(n) if n <= MAX_PLUGIN_CHANNELS => Some(n),
        Err(_) if matrix.channels == -1 => None,
        _ => {
            errors.push(ValidationError::ChannelCount {
                direction,
                value: matrix.channels,
            });
            return;
        }
    };

    if matrix.pins.len() > track_channels {
        errors.push(ValidationError::RowCount {
            direction,
            rows: matrix.pins.len(),
            track_channels,
        });
    }

    let Some(channels) = channels else {
        if matrix.pins.iter().any(|row| !row.is_empty()) {
            errors.push(ValidationError::PinsWithoutCount(direction));
        }
        return;
    };

    for (track, row) in matrix.pins.iter().enumerate() {
        if row.len() > channels {
            errors.push(ValidationError::RowWidth {
                direction,
                track,
                width: row.len(),
                channels,
            });
        }
    }
}

/// Validate a saved connector state.
///
/// Returns every problem found, wrapped in [`ValidationError::Multiple`]
/// when there is more than one.
pub fn validate_state(state: &ConnectorState) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if state.track_channels % 2 != 0 || state.track_channels > MAX_TRACK_CHANNELS {
        errors.push(ValidationError::TrackChannels(state.track_channels));
    }
    for direction in Direction::ALL {
        check_matrix(direction, state.matrix(direction), state.track_channels, &mut errors);
    }

    collect(errors)
}

/// Validate a routing preset: its name and its state.
pub fn validate_preset(preset: &RoutingPreset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if preset.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    match validate_state(&preset.state) {
        Ok(()) => {}
        Err(ValidationError::Multiple(inner)) => errors.extend(inner),
        Err(e) => errors.push(e),
    }

    collect(errors)
}
