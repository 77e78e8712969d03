//! The pin connector: both connection matrices of one plugin plus the state
//! derived from them.
//!
//! The connector lives on the control thread. Every mutation goes through it
//! so the cached routed-channel vector, the track channel upper bound and the
//! committed [`Topology`] can never drift from the matrices.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, sync::Arc, vec, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::channel::{
    ChannelCount, DEFAULT_TRACK_CHANNELS, Direction, MAX_PLUGIN_CHANNELS, MAX_TRACK_CHANNELS,
};
use crate::error::PinError;
use crate::matrix::ConnectionMatrix;
use crate::router::Router;
use crate::topology::Topology;

/// Maps host channels onto a plugin's input and output channels.
///
/// # Usage
///
/// 1. Create with [`new()`](Self::new) or
///    [`with_default_track_channels()`](Self::with_default_track_channels)
/// 2. Declare the plugin's counts: [`set_channel_counts()`](Self::set_channel_counts)
///    (default connections are generated for every direction whose count changed)
/// 3. Edit pins: [`set_pin()`](Self::set_pin), [`toggle_pin()`](Self::toggle_pin)
/// 4. Route with the committed [`topology()`](Self::topology) or [`router()`](Self::router)
///
/// # Panics
///
/// Invalid channel counts are programming errors. The panicking setters
/// document their preconditions; each has a `try_*` twin returning
/// [`PinError`] for input that has not been validated.
#[derive(Debug, Clone)]
pub struct PinConnector {
    input: ConnectionMatrix,
    output: ConnectionMatrix,
    track_channels: usize,
    track_channels_upper_bound: usize,
    routed_channels: Vec<bool>,
    topology: Arc<Topology>,
    generation: u64,
}

impl PinConnector {
    /// Creates a connector for `track_channels` host channels.
    ///
    /// # Panics
    ///
    /// Panics on an odd or oversized track count, or an oversized plugin count.
    #[must_use]
    pub fn new(track_channels: usize, inputs: ChannelCount, outputs: ChannelCount) -> Self {
        match Self::try_new(track_channels, inputs, outputs) {
            Ok(pc) => pc,
            Err(e) => panic!("invalid pin connector: {e:?}"),
        }
    }

    /// Fallible form of [`new()`](Self::new).
    pub fn try_new(
        track_channels: usize,
        inputs: ChannelCount,
        outputs: ChannelCount,
    ) -> Result<Self, PinError> {
        validate_track_channels(track_channels)?;
        validate_plugin_channels(inputs)?;
        validate_plugin_channels(outputs)?;

        let mut pc = Self {
            input: ConnectionMatrix::new(track_channels),
            output: ConnectionMatrix::new(track_channels),
            track_channels,
            track_channels_upper_bound: 0,
            routed_channels: vec![false; track_channels],
            topology: Arc::new(Topology::empty(track_channels)),
            generation: 0,
        };
        pc.apply_channel_count(Direction::Input, inputs);
        pc.apply_channel_count(Direction::Output, outputs);
        pc.commit();
        Ok(pc)
    }

    /// Creates a connector for a stereo host track.
    #[must_use]
    pub fn with_default_track_channels(inputs: ChannelCount, outputs: ChannelCount) -> Self {
        Self::new(DEFAULT_TRACK_CHANNELS, inputs, outputs)
    }

    /// Host → plugin matrix.
    #[must_use]
    pub fn input(&self) -> &ConnectionMatrix {
        &self.input
    }

    /// Plugin → host matrix.
    #[must_use]
    pub fn output(&self) -> &ConnectionMatrix {
        &self.output
    }

    /// Matrix for a direction.
    #[must_use]
    pub fn matrix(&self, direction: Direction) -> &ConnectionMatrix {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// Plugin input count.
    #[must_use]
    pub fn channel_count_in(&self) -> ChannelCount {
        self.input.channel_count()
    }

    /// Plugin output count.
    #[must_use]
    pub fn channel_count_out(&self) -> ChannelCount {
        self.output.channel_count()
    }

    /// Host channel count.
    #[must_use]
    pub fn track_channel_count(&self) -> usize {
        self.track_channels
    }

    /// One past the highest host channel with any pin, rounded up to a pair.
    #[must_use]
    pub fn track_channels_upper_bound(&self) -> usize {
        self.track_channels_upper_bound
    }

    /// Per host channel: is it fed by any plugin output?
    #[must_use]
    pub fn routed_channels(&self) -> &[bool] {
        &self.routed_channels
    }

    /// `true` once either direction has a known, non-zero count.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.input.plugin_channels() != 0 || self.output.plugin_channels() != 0
    }

    /// The committed snapshot the audio thread should route with.
    #[must_use]
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// A router bound to the committed snapshot.
    #[must_use]
    pub fn router(&self) -> Router<'_> {
        Router::new(&self.topology)
    }

    /// `"<in>x<out>"`, with `?` for unknown counts.
    #[must_use]
    pub fn channel_count_text(&self) -> String {
        format!(
            "{}x{}",
            self.input.channel_count(),
            self.output.channel_count()
        )
    }

    /// Declares both plugin channel counts.
    ///
    /// A direction whose count changes gets default connections; an unchanged
    /// direction keeps its pins.
    ///
    /// # Panics
    ///
    /// Panics if a count exceeds [`MAX_PLUGIN_CHANNELS`] or a known count is
    /// set back to [`ChannelCount::Unknown`].
    pub fn set_channel_counts(&mut self, inputs: ChannelCount, outputs: ChannelCount) {
        if let Err(e) = self.try_set_channel_counts(inputs, outputs) {
            panic!("invalid channel counts {inputs}x{outputs}: {e:?}");
        }
    }

    /// Fallible form of [`set_channel_counts()`](Self::set_channel_counts).
    /// Nothing changes when either count is rejected.
    pub fn try_set_channel_counts(
        &mut self,
        inputs: ChannelCount,
        outputs: ChannelCount,
    ) -> Result<(), PinError> {
        self.check_channel_count(Direction::Input, inputs)?;
        self.check_channel_count(Direction::Output, outputs)?;
        let changed_in = self.apply_channel_count(Direction::Input, inputs);
        let changed_out = self.apply_channel_count(Direction::Output, outputs);
        if changed_in || changed_out {
            self.commit();
        }
        Ok(())
    }

    /// Declares the plugin input count. See [`set_channel_counts()`](Self::set_channel_counts).
    pub fn set_channel_count_in(&mut self, inputs: ChannelCount) {
        self.set_channel_counts(inputs, self.channel_count_out());
    }

    /// Declares the plugin output count. See [`set_channel_counts()`](Self::set_channel_counts).
    pub fn set_channel_count_out(&mut self, outputs: ChannelCount) {
        self.set_channel_counts(self.channel_count_in(), outputs);
    }

    /// Resizes the host rows. Existing pins are kept; new rows start
    /// disconnected.
    pub fn set_track_channel_count(&mut self, track_channels: usize) -> Result<(), PinError> {
        validate_track_channels(track_channels)?;
        if track_channels == self.track_channels {
            return Ok(());
        }
        self.input.set_track_channel_count(track_channels);
        self.output.set_track_channel_count(track_channels);
        self.track_channels = track_channels;
        self.routed_channels.resize(track_channels, false);
        self.update_all_routed_channels();
        self.commit();
        Ok(())
    }

    /// Enables or disables one pin.
    ///
    /// Returns `true` if the pin changed.
    pub fn set_pin(
        &mut self,
        direction: Direction,
        track: usize,
        plugin: usize,
        enabled: bool,
    ) -> Result<bool, PinError> {
        self.check_pin(direction, track, plugin)?;
        if self.matrix(direction).enabled(track, plugin) == enabled {
            return Ok(false);
        }
        self.write_pin(direction, track, plugin, enabled);
        self.commit();
        Ok(true)
    }

    /// Flips one pin and returns its new state.
    pub fn toggle_pin(
        &mut self,
        direction: Direction,
        track: usize,
        plugin: usize,
    ) -> Result<bool, PinError> {
        self.check_pin(direction, track, plugin)?;
        let enabled = !self.matrix(direction).enabled(track, plugin);
        self.write_pin(direction, track, plugin, enabled);
        self.commit();
        Ok(enabled)
    }

    /// Applies many pin writes with a single commit.
    ///
    /// Every coordinate is checked before anything is written.
    pub fn set_pins<I>(&mut self, direction: Direction, pins: I) -> Result<(), PinError>
    where
        I: IntoIterator<Item = (usize, usize, bool)>,
    {
        let pins: Vec<_> = pins.into_iter().collect();
        for &(track, plugin, _) in &pins {
            self.check_pin(direction, track, plugin)?;
        }
        for (track, plugin, enabled) in pins {
            self.write_pin(direction, track, plugin, enabled);
        }
        self.commit();
        Ok(())
    }

    /// Regenerates default connections for one direction.
    pub fn reset_default_connections(&mut self, direction: Direction) {
        self.matrix_mut(direction).set_default_connections();
        if direction == Direction::Output {
            self.update_all_routed_channels();
        }
        self.commit();
    }

    /// Disconnects every pin of one direction.
    pub fn clear_pins(&mut self, direction: Direction) {
        self.matrix_mut(direction).clear();
        if direction == Direction::Output {
            self.update_all_routed_channels();
        }
        self.commit();
    }

    /// Recomputes `routed_channels[track]` from the output matrix row.
    pub fn update_routed_channels(&mut self, track: usize) {
        self.routed_channels[track] = self.output.any_enabled(track);
    }

    fn update_all_routed_channels(&mut self) {
        for track in 0..self.track_channels {
            self.update_routed_channels(track);
        }
    }

    fn write_pin(&mut self, direction: Direction, track: usize, plugin: usize, enabled: bool) {
        self.matrix_mut(direction).set_pin(track, plugin, enabled);
        if direction == Direction::Output {
            self.update_routed_channels(track);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "pin_connector: {direction} pin ({track}, {plugin}) -> {}",
            if enabled { "on" } else { "off" }
        );
    }

    fn matrix_mut(&mut self, direction: Direction) -> &mut ConnectionMatrix {
        match direction {
            Direction::Input => &mut self.input,
            Direction::Output => &mut self.output,
        }
    }

    fn check_pin(&self, direction: Direction, track: usize, plugin: usize) -> Result<(), PinError> {
        let m = self.matrix(direction);
        if track < m.track_channels() && plugin < m.plugin_channels() {
            Ok(())
        } else {
            Err(PinError::PinOutOfRange {
                direction,
                track,
                plugin,
            })
        }
    }

    fn check_channel_count(
        &self,
        direction: Direction,
        count: ChannelCount,
    ) -> Result<(), PinError> {
        validate_plugin_channels(count)?;
        if count == ChannelCount::Unknown && self.matrix(direction).channel_count().is_known() {
            return Err(PinError::RevertToUnknown(direction));
        }
        Ok(())
    }

    /// Resizes one direction and regenerates its defaults if the count
    /// changed. Returns whether it changed.
    fn apply_channel_count(&mut self, direction: Direction, count: ChannelCount) -> bool {
        if self.matrix(direction).channel_count() == count {
            return false;
        }
        let matrix = self.matrix_mut(direction);
        matrix.set_channel_count(count, direction.name_prefix());
        matrix.set_default_connections();
        if direction == Direction::Output {
            self.update_all_routed_channels();
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("pin_connector: {direction} channel count -> {count}");
        true
    }

    fn compute_upper_bound(&self) -> usize {
        let highest = (0..self.track_channels)
            .rev()
            .find(|&t| self.input.any_enabled(t) || self.output.any_enabled(t));
        highest.map_or(0, |t| (t / 2 + 1) * 2)
    }

    /// Rebuilds the derived state and publishes a new snapshot.
    fn commit(&mut self) {
        self.track_channels_upper_bound = self.compute_upper_bound();
        self.generation += 1;
        self.topology = Arc::new(Topology::build(
            &self.input,
            &self.output,
            &self.routed_channels,
            self.track_channels_upper_bound,
            self.generation,
        ));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "pin_connector: commit #{} ({}), upper bound {}",
            self.generation,
            self.channel_count_text(),
            self.track_channels_upper_bound
        );
    }
}

fn validate_track_channels(track_channels: usize) -> Result<(), PinError> {
    if track_channels > MAX_TRACK_CHANNELS {
        return Err(PinError::TooManyTrackChannels(track_channels));
    }
    if track_channels % 2 != 0 {
        return Err(PinError::OddTrackChannelCount(track_channels));
    }
    Ok(())
}

fn validate_plugin_channels(count: ChannelCount) -> Result<(), PinError> {
    match count {
        ChannelCount::Count(n) if n > MAX_PLUGIN_CHANNELS => {
            Err(PinError::TooManyPluginChannels(n))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: usize) -> ChannelCount {
        ChannelCount::Count(n)
    }

    fn pins(m: &ConnectionMatrix) -> Vec<Vec<bool>> {
        (0..m.track_channels()).map(|t| m.row(t).collect()).collect()
    }

    #[test]
    fn default_connections_table() {
        let pc = PinConnector::with_default_track_channels(count(2), count(2));
        assert_eq!(pins(pc.input()), [[true, false], [false, true]]);
        assert_eq!(pins(pc.output()), [[true, false], [false, true]]);

        let pc = PinConnector::with_default_track_channels(count(1), count(1));
        assert_eq!(pins(pc.input()), [[true], [true]]);
        assert_eq!(pins(pc.output()), [[true], [true]]);

        let pc = PinConnector::with_default_track_channels(count(1), count(4));
        assert_eq!(pins(pc.input()), [[true], [true]]);
        assert_eq!(
            pins(pc.output()),
            [[true, false, false, false], [false, true, false, false]]
        );

        let pc = PinConnector::with_default_track_channels(count(4), count(1));
        assert_eq!(
            pins(pc.input()),
            [[true, false, false, false], [false, true, false, false]]
        );
        assert_eq!(pins(pc.output()), [[true], [true]]);

        let pc = PinConnector::with_default_track_channels(count(0), count(2));
        assert_eq!(pc.input().enabled_count(), 0);
        assert_eq!(pins(pc.output()), [[true, false], [false, true]]);

        let pc = PinConnector::with_default_track_channels(count(2), count(0));
        assert_eq!(pins(pc.input()), [[true, false], [false, true]]);
        assert_eq!(pc.output().enabled_count(), 0);
        assert_eq!(pc.routed_channels(), [false, false]);
    }

    #[test]
    fn unknown_counts_are_empty() {
        let pc =
            PinConnector::with_default_track_channels(ChannelCount::Unknown, ChannelCount::Unknown);
        assert!(!pc.initialized());
        assert_eq!(pc.track_channels_upper_bound(), 0);
        assert_eq!(pc.channel_count_text(), "?x?");
        assert_eq!(pc.topology().pair_bound(), 0);
    }

    #[test]
    fn initialized_with_either_direction() {
        assert!(PinConnector::with_default_track_channels(count(0), count(2)).initialized());
        assert!(
            PinConnector::with_default_track_channels(count(2), ChannelCount::Unknown).initialized()
        );
        assert!(!PinConnector::with_default_track_channels(count(0), count(0)).initialized());
    }

    #[test]
    fn routed_channels_track_output_pins() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        assert_eq!(pc.routed_channels(), [true, true]);

        pc.set_pin(Direction::Output, 0, 0, false).unwrap();
        assert_eq!(pc.routed_channels(), [false, true]);
        pc.set_pin(Direction::Output, 0, 1, true).unwrap();
        assert_eq!(pc.routed_channels(), [true, true]);
        pc.set_pin(Direction::Output, 1, 1, false).unwrap();
        assert_eq!(pc.routed_channels(), [true, false]);
        pc.set_pin(Direction::Output, 0, 1, false).unwrap();
        assert_eq!(pc.routed_channels(), [false, false]);

        // Input pins never touch the routed cache.
        pc.set_pin(Direction::Input, 0, 0, false).unwrap();
        assert_eq!(pc.routed_channels(), [false, false]);
        assert_eq!(pc.topology().routed_channels(), [false, false]);
    }

    #[test]
    fn unchanged_count_keeps_pins() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        pc.set_pin(Direction::Input, 0, 1, true).unwrap();
        pc.set_pin(Direction::Output, 1, 1, false).unwrap();
        let generation = pc.topology().generation();

        pc.set_channel_counts(count(2), count(2));
        assert!(pc.input().enabled(0, 1));
        assert!(!pc.output().enabled(1, 1));
        assert_eq!(pc.topology().generation(), generation);

        pc.set_channel_count_out(count(1));
        assert!(pc.input().enabled(0, 1));
        assert_eq!(pins(pc.output()), [[true], [true]]);
    }

    #[test]
    fn unknown_adopts_later_count() {
        let mut pc =
            PinConnector::with_default_track_channels(ChannelCount::Unknown, ChannelCount::Unknown);
        pc.set_channel_counts(count(2), count(2));
        assert!(pc.initialized());
        assert_eq!(pc.channel_count_text(), "2x2");
        assert_eq!(pins(pc.input()), [[true, false], [false, true]]);
    }

    #[test]
    #[should_panic]
    fn reverting_to_unknown_panics() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        pc.set_channel_count_in(ChannelCount::Unknown);
    }

    #[test]
    fn try_set_rejects_without_changes() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        let err = pc
            .try_set_channel_counts(count(4), ChannelCount::Unknown)
            .unwrap_err();
        assert_eq!(err, PinError::RevertToUnknown(Direction::Output));
        assert_eq!(pc.channel_count_in(), count(2));

        assert_eq!(
            pc.try_set_channel_counts(count(MAX_PLUGIN_CHANNELS + 1), count(2)),
            Err(PinError::TooManyPluginChannels(MAX_PLUGIN_CHANNELS + 1))
        );
    }

    #[test]
    fn invalid_track_counts() {
        assert_eq!(
            PinConnector::try_new(3, count(2), count(2)).unwrap_err(),
            PinError::OddTrackChannelCount(3)
        );
        assert_eq!(
            PinConnector::try_new(258, count(2), count(2)).unwrap_err(),
            PinError::TooManyTrackChannels(258)
        );
    }

    #[test]
    fn pin_out_of_range() {
        let mut pc = PinConnector::with_default_track_channels(count(1), count(2));
        assert_eq!(
            pc.set_pin(Direction::Input, 0, 1, true),
            Err(PinError::PinOutOfRange {
                direction: Direction::Input,
                track: 0,
                plugin: 1,
            })
        );
        assert!(pc.toggle_pin(Direction::Output, 2, 0).is_err());
    }

    #[test]
    fn toggle_and_set_report_changes() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        assert_eq!(pc.set_pin(Direction::Input, 0, 0, true), Ok(false));
        assert_eq!(pc.toggle_pin(Direction::Input, 0, 0), Ok(false));
        assert_eq!(pc.toggle_pin(Direction::Input, 0, 0), Ok(true));
    }

    #[test]
    fn upper_bound_follows_highest_pin() {
        let mut pc = PinConnector::new(8, count(2), count(2));
        // Defaults: h -> h mod 2 on every row.
        assert_eq!(pc.track_channels_upper_bound(), 8);

        pc.clear_pins(Direction::Input);
        pc.clear_pins(Direction::Output);
        assert_eq!(pc.track_channels_upper_bound(), 0);

        pc.set_pin(Direction::Input, 2, 0, true).unwrap();
        assert_eq!(pc.track_channels_upper_bound(), 4);
        pc.set_pin(Direction::Output, 5, 1, true).unwrap();
        assert_eq!(pc.track_channels_upper_bound(), 6);
        assert_eq!(pc.topology().pair_bound(), 3);
    }

    #[test]
    fn batched_pins_commit_once() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        let generation = pc.topology().generation();
        pc.set_pins(Direction::Output, [(0, 0, false), (0, 1, true), (1, 0, true)])
            .unwrap();
        assert_eq!(pc.topology().generation(), generation + 1);
        assert_eq!(pins(pc.output()), [[false, true], [true, true]]);

        // One bad coordinate rejects the whole batch.
        assert!(pc.set_pins(Direction::Output, [(0, 0, true), (9, 0, true)]).is_err());
        assert!(!pc.output().enabled(0, 0));
    }

    #[test]
    fn track_channel_count_grows_disconnected() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        pc.set_track_channel_count(4).unwrap();
        assert_eq!(pc.track_channel_count(), 4);
        assert_eq!(pc.routed_channels(), [true, true, false, false]);
        assert_eq!(pc.track_channels_upper_bound(), 2);
        assert!(pc.set_track_channel_count(5).is_err());
    }

    #[test]
    fn reset_defaults_restores_identity() {
        let mut pc = PinConnector::with_default_track_channels(count(2), count(2));
        pc.clear_pins(Direction::Output);
        assert_eq!(pc.routed_channels(), [false, false]);
        pc.reset_default_connections(Direction::Output);
        assert_eq!(pc.routed_channels(), [true, true]);
    }
}
