//! Serializable pin state of a [`PinConnector`].
//!
//! A [`ConnectorState`] stores the host track width, both plugin channel
//! counts and one boolean per (track, plugin) pin per direction. Counts use
//! the raw persisted form where `-1` stands for a plugin that has not
//! declared its channels yet.
//!
//! Restoring is lenient. A plugin may come back with a different channel
//! layout than the one that was saved, so each direction is handled on its
//! own:
//!
//! - saved and current counts match: the saved pins are applied
//! - the current count is still unknown: the saved count is adopted, then
//!   the saved pins are applied
//! - the counts differ: the direction keeps default connections
//!
//! Pins outside the current shape are ignored.

use patchbay_core::{ChannelCount, DEFAULT_TRACK_CHANNELS, Direction, PinConnector};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Saved pins of one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixState {
    /// Plugin channel count in persisted form (`-1` = unknown).
    #[serde(default = "unknown_channels")]
    pub channels: i32,

    /// `pins[track][plugin]`.
    #[serde(default)]
    pub pins: Vec<Vec<bool>>,
}

fn unknown_channels() -> i32 {
    ChannelCount::Unknown.to_raw()
}

fn default_track_channels() -> usize {
    DEFAULT_TRACK_CHANNELS
}

impl Default for MatrixState {
    fn default() -> Self {
        Self {
            channels: unknown_channels(),
            pins: Vec::new(),
        }
    }
}

impl MatrixState {
    /// Creates a state with the given count and pin rows.
    pub fn new(channels: ChannelCount, pins: Vec<Vec<bool>>) -> Self {
        Self {
            channels: channels.to_raw(),
            pins,
        }
    }

    /// Decoded channel count.
    pub fn channel_count(&self) -> Result<ChannelCount, ConfigError> {
        Ok(ChannelCount::from_raw(self.channels)?)
    }

    /// Saved pin, `false` when outside the saved rows.
    pub fn pin(&self, track: usize, plugin: usize) -> bool {
        self.pins
            .get(track)
            .and_then(|row| row.get(plugin))
            .copied()
            .unwrap_or(false)
    }

    /// Number of enabled pins.
    pub fn enabled_count(&self) -> usize {
        self.pins.iter().flatten().filter(|&&p| p).count()
    }
}

/// Saved state of a whole connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorState {
    /// Host channels on the track.
    #[serde(default = "default_track_channels")]
    pub track_channels: usize,

    /// Host → plugin pins.
    #[serde(default)]
    pub input: MatrixState,

    /// Plugin → host pins.
    #[serde(default)]
    pub output: MatrixState,
}

impl Default for ConnectorState {
    fn default() -> Self {
        Self {
            track_channels: DEFAULT_TRACK_CHANNELS,
            input: MatrixState::default(),
            output: MatrixState::default(),
        }
    }
}

/// What [`ConnectorState::restore()`] did with one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Counts matched and the saved pins were applied.
    Restored,
    /// The plugin count was unknown; the saved count and pins were adopted.
    Adopted,
    /// Counts differed; default connections were kept.
    KeptDefaults,
    /// Nothing was saved for this direction.
    Unknown,
}

/// Per-direction result of a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    /// Input direction outcome.
    pub input: RestoreOutcome,
    /// Output direction outcome.
    pub output: RestoreOutcome,
}

impl ConnectorState {
    /// Captures the current pins of `connector`.
    pub fn capture(connector: &PinConnector) -> Self {
        let track_channels = connector.track_channel_count();
        let matrix_state = |direction| {
            let matrix = connector.matrix(direction);
            MatrixState {
                channels: matrix.channel_count().to_raw(),
                pins: (0..track_channels)
                    .map(|track| matrix.row(track).collect())
                    .collect(),
            }
        };
        Self {
            track_channels,
            input: matrix_state(Direction::Input),
            output: matrix_state(Direction::Output),
        }
    }

    /// State of a direction.
    pub fn matrix(&self, direction: Direction) -> &MatrixState {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// Builds a fresh connector from this state.
    ///
    /// Every saved count is adopted, so the pins come back exactly.
    pub fn to_connector(&self) -> Result<PinConnector, ConfigError> {
        let mut connector = PinConnector::try_new(
            self.track_channels,
            ChannelCount::Unknown,
            ChannelCount::Unknown,
        )?;
        self.restore(&mut connector)?;
        Ok(connector)
    }

    /// Applies this state to `connector`, direction by direction.
    ///
    /// The saved counts are decoded before anything changes, and the edits
    /// run on a copy that replaces `connector` only on success. Errors leave
    /// the connector as it was.
    pub fn restore(&self, connector: &mut PinConnector) -> Result<RestoreReport, ConfigError> {
        let saved_in = self.input.channel_count()?;
        let saved_out = self.output.channel_count()?;
        let current_in = connector.channel_count_in();
        let current_out = connector.channel_count_out();

        let mut staged = connector.clone();
        let report = self.restore_into(
            &mut staged,
            [current_in, current_out],
            [saved_in, saved_out],
        )?;
        *connector = staged;
        Ok(report)
    }

    fn restore_into(
        &self,
        connector: &mut PinConnector,
        [current_in, current_out]: [ChannelCount; 2],
        [saved_in, saved_out]: [ChannelCount; 2],
    ) -> Result<RestoreReport, ConfigError> {
        connector.set_track_channel_count(self.track_channels)?;

        let adopt = |current: ChannelCount, saved: ChannelCount| {
            if current.is_known() { current } else { saved }
        };
        connector.try_set_channel_counts(
            adopt(current_in, saved_in),
            adopt(current_out, saved_out),
        )?;

        let input = self.restore_direction(connector, Direction::Input, current_in, saved_in)?;
        let output = self.restore_direction(connector, Direction::Output, current_out, saved_out)?;

        tracing::debug!(
            "restored pin state {}: input {:?}, output {:?}",
            connector.channel_count_text(),
            input,
            output
        );
        Ok(RestoreReport { input, output })
    }

    fn restore_direction(
        &self,
        connector: &mut PinConnector,
        direction: Direction,
        current: ChannelCount,
        saved: ChannelCount,
    ) -> Result<RestoreOutcome, ConfigError> {
        let Some(saved_count) = saved.get() else {
            return Ok(RestoreOutcome::Unknown);
        };

        let outcome = match current.get() {
            None => RestoreOutcome::Adopted,
            Some(n) if n == saved_count => RestoreOutcome::Restored,
            Some(n) => {
                tracing::warn!(
                    "saved {direction} pins are for {saved_count} channels, plugin has {n}; \
                     keeping default connections"
                );
                connector.reset_default_connections(direction);
                return Ok(RestoreOutcome::KeptDefaults);
            }
        };

        let state = self.matrix(direction);
        let tracks = connector.track_channel_count();
        let pins = (0..tracks).flat_map(|track| {
            (0..saved_count).map(move |plugin| (track, plugin, state.pin(track, plugin)))
        });
        connector.set_pins(direction, pins)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: usize) -> ChannelCount {
        ChannelCount::Count(n)
    }

    #[test]
    fn capture_default_stereo() {
        let pc = PinConnector::with_default_track_channels(count(2), count(2));
        let state = ConnectorState::capture(&pc);
        assert_eq!(state.track_channels, 2);
        assert_eq!(state.input.channels, 2);
        assert_eq!(state.input.pins, vec![vec![true, false], vec![false, true]]);
        assert_eq!(state.output, state.input);
    }

    #[test]
    fn capture_unknown_counts() {
        let pc = PinConnector::with_default_track_channels(ChannelCount::Unknown, count(0));
        let state = ConnectorState::capture(&pc);
        assert_eq!(state.input.channels, -1);
        assert_eq!(state.input.pins, vec![Vec::<bool>::new(), Vec::new()]);
        assert_eq!(state.output.channels, 0);
    }

    #[test]
    fn restore_matching_counts_applies_pins() {
        let mut saved = PinConnector::with_default_track_channels(count(2), count(2));
        saved.set_pin(Direction::Output, 1, 1, false).unwrap();
        saved.set_pin(Direction::Input, 1, 0, true).unwrap();
        let state = ConnectorState::capture(&saved);

        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        let report = state.restore(&mut pc).unwrap();
        assert_eq!(report.input, RestoreOutcome::Restored);
        assert_eq!(report.output, RestoreOutcome::Restored);
        assert_eq!(ConnectorState::capture(&pc), state);
        assert_eq!(pc.routed_channels(), [true, false]);
    }

    #[test]
    fn restore_adopts_saved_count_when_unknown() {
        let mut saved = PinConnector::with_default_track_channels(count(1), count(4));
        saved.toggle_pin(Direction::Output, 0, 3).unwrap();
        let state = ConnectorState::capture(&saved);

        let mut pc =
            PinConnector::with_default_track_channels(ChannelCount::Unknown, ChannelCount::Unknown);
        let report = state.restore(&mut pc).unwrap();
        assert_eq!(report.input, RestoreOutcome::Adopted);
        assert_eq!(report.output, RestoreOutcome::Adopted);
        assert_eq!(pc.channel_count_text(), "1x4");
        assert_eq!(pc.output().enabled(0, 3), saved.output().enabled(0, 3));
        assert_eq!(ConnectorState::capture(&pc), state);
    }

    #[test]
    fn restore_mismatch_keeps_defaults() {
        let mut saved = PinConnector::with_default_track_channels(count(2), count(2));
        saved.clear_pins(Direction::Output);
        let state = ConnectorState::capture(&saved);

        let mut pc = PinConnector::with_default_track_channels(count(2), count(1));
        let report = state.restore(&mut pc).unwrap();
        assert_eq!(report.input, RestoreOutcome::Restored);
        assert_eq!(report.output, RestoreOutcome::KeptDefaults);
        assert!(pc.output().enabled(0, 0));
        assert!(pc.output().enabled(1, 0));
    }

    #[test]
    fn restore_ignores_pins_outside_shape() {
        let state = ConnectorState {
            track_channels: 2,
            input: MatrixState::new(count(1), vec![vec![true, true, true]; 5]),
            output: MatrixState::new(count(1), vec![vec![false]]),
        };
        let pc = state.to_connector().unwrap();
        assert!(pc.input().enabled(0, 0));
        assert!(pc.input().enabled(1, 0));
        assert!(!pc.output().enabled(0, 0));
        assert!(!pc.output().enabled(1, 0));
        assert_eq!(pc.routed_channels(), [false, false]);
    }

    #[test]
    fn restore_nothing_saved() {
        let state = ConnectorState::default();
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        let report = state.restore(&mut pc).unwrap();
        assert_eq!(report.input, RestoreOutcome::Unknown);
        assert_eq!(report.output, RestoreOutcome::Unknown);
        assert!(pc.input().enabled(0, 0));
    }

    #[test]
    fn restore_rejects_bad_counts() {
        let state = ConnectorState {
            track_channels: 3,
            ..ConnectorState::default()
        };
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        assert!(matches!(state.restore(&mut pc), Err(ConfigError::Pin(_))));

        let state = ConnectorState {
            input: MatrixState {
                channels: -7,
                pins: Vec::new(),
            },
            ..ConnectorState::default()
        };
        assert!(matches!(state.to_connector(), Err(ConfigError::Pin(_))));
    }

    #[test]
    fn failed_restore_leaves_connector_unchanged() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        pc.set_pin(Direction::Output, 1, 1, false).unwrap();
        let before = ConnectorState::capture(&pc);
        let generation = pc.topology().generation();

        // Undecodable count next to a track resize.
        let state = ConnectorState {
            track_channels: 4,
            input: MatrixState {
                channels: -7,
                pins: Vec::new(),
            },
            ..ConnectorState::default()
        };
        assert!(matches!(state.restore(&mut pc), Err(ConfigError::Pin(_))));
        assert_eq!(pc.track_channel_count(), 2);
        assert_eq!(ConnectorState::capture(&pc), before);
        assert_eq!(pc.topology().generation(), generation);

        // Oversized count adopted by an unknown direction, after the resize.
        let mut unknown = PinConnector::with_default_track_channels(
            ChannelCount::Unknown,
            ChannelCount::Unknown,
        );
        let state = ConnectorState {
            track_channels: 4,
            input: MatrixState {
                channels: 1000,
                pins: Vec::new(),
            },
            ..ConnectorState::default()
        };
        assert!(matches!(state.restore(&mut unknown), Err(ConfigError::Pin(_))));
        assert_eq!(unknown.track_channel_count(), 2);
        assert_eq!(unknown.channel_count_text(), "?x?");
    }

    #[test]
    fn saved_pin_lookup() {
        let m = MatrixState::new(count(2), vec![vec![true, false], vec![true]]);
        assert!(m.pin(0, 0));
        assert!(!m.pin(0, 1));
        assert!(m.pin(1, 0));
        assert!(!m.pin(1, 1));
        assert!(!m.pin(9, 0));
        assert_eq!(m.enabled_count(), 2);
    }
}
