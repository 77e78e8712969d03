//! Control-thread side of a plugin's pin connector.

use std::sync::Arc;

use patchbay_core::{
    ChannelCount, Direction, PinConnector, PinError, PluginConfig, Sample, Topology,
    WorkingBuffers,
};

use crate::plugin::{AudioPlugin, PluginKind};
use crate::processor::AudioProcessor;
use crate::shared::{PeriodBuffers, PortShared};

/// Sample rate a port starts at.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Owns a plugin's [`PinConnector`] and publishes every change to the audio
/// thread.
///
/// Every mutating call commits a new [`Topology`]. When the channel counts or
/// period size changed, matching [`WorkingBuffers`] are allocated here and
/// offered to the [`AudioProcessor`] before the topology is published, so the
/// processor never routes a topology its buffers cannot hold.
pub struct PluginPort<S: Sample = f32> {
    kind: PluginKind,
    connector: PinConnector,
    config: PluginConfig,
    frames: usize,
    sample_rate: u32,
    /// `(inputs, outputs, frames)` of the last offered buffers.
    buffer_shape: (usize, usize, usize),
    published_generation: u64,
    /// Published topologies the audio thread may still hold; freed here once
    /// nobody else does.
    retained: Vec<Arc<Topology>>,
    shared: PortShared<S>,
}

impl<S: Sample> PluginPort<S> {
    /// Port for a plugin of `kind` with buffers shaped by `config`.
    pub fn new(
        kind: PluginKind,
        config: PluginConfig,
        track_channels: usize,
        frames: usize,
    ) -> Result<Self, PinError> {
        config.validate()?;
        let connector = PinConnector::try_new(track_channels, config.inputs, config.outputs)?;
        let topology = Arc::clone(connector.topology());
        tracing::info!(
            "plugin port: {kind} {} ({}), {track_channels} track channels, {frames} frames",
            connector.channel_count_text(),
            config.layout,
        );
        Ok(Self {
            kind,
            config,
            frames,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_shape: (topology.inputs(), topology.outputs(), frames),
            published_generation: topology.generation(),
            retained: vec![Arc::clone(&topology)],
            shared: PortShared::new(topology),
            connector,
        })
    }

    /// Port matching what `plugin` declares.
    pub fn for_plugin<P>(plugin: &P, track_channels: usize, frames: usize) -> Result<Self, PinError>
    where
        P: AudioPlugin<Sample = S>,
    {
        Self::new(plugin.kind(), plugin.config(), track_channels, frames)
    }

    /// Creates the audio-side processor for `plugin`, with buffers for the
    /// current shape. Call on the control thread, then move the processor to
    /// the audio thread.
    pub fn processor<P>(&self, mut plugin: P) -> Result<AudioProcessor<P>, PinError>
    where
        P: AudioPlugin<Sample = S>,
    {
        let buffers = WorkingBuffers::new(self.config, self.frames)?;
        plugin.prepare(self.sample_rate, self.frames);
        Ok(AudioProcessor::new(
            plugin,
            self.kind,
            self.shared.clone(),
            self.shared.topology(),
            buffers,
        ))
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Instrument or effect.
    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    /// The connector, for UI queries.
    pub fn connector(&self) -> &PinConnector {
        &self.connector
    }

    /// Current buffer configuration.
    pub fn config(&self) -> PluginConfig {
        self.config
    }

    /// Frames per period.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// State shared with the processor.
    pub fn shared(&self) -> &PortShared<S> {
        &self.shared
    }

    /// Periods the processor bypassed because buffers were being reshaped.
    pub fn mismatched_periods(&self) -> u64 {
        self.shared.mismatched_periods()
    }

    /// Whether the effect is asleep.
    pub fn is_sleeping(&self) -> bool {
        self.shared.is_sleeping()
    }

    /// Wakes a sleeping effect at the next period.
    pub fn wake(&self) {
        self.shared.request_wake();
    }

    // ── Changes ─────────────────────────────────────────────────────────────

    /// Declares new plugin channel counts.
    ///
    /// Nothing changes if the counts are invalid for the connector or for the
    /// buffer layout.
    pub fn set_channel_counts(
        &mut self,
        inputs: ChannelCount,
        outputs: ChannelCount,
    ) -> Result<(), PinError> {
        PluginConfig {
            inputs,
            outputs,
            ..self.config
        }
        .validate()?;
        self.connector.try_set_channel_counts(inputs, outputs)?;
        self.publish()
    }

    /// Resizes the host track.
    pub fn set_track_channel_count(&mut self, track_channels: usize) -> Result<(), PinError> {
        self.connector.set_track_channel_count(track_channels)?;
        self.publish()
    }

    /// Enables or disables one pin. Returns `true` if it changed.
    pub fn set_pin(
        &mut self,
        direction: Direction,
        track: usize,
        plugin: usize,
        enabled: bool,
    ) -> Result<bool, PinError> {
        let changed = self.connector.set_pin(direction, track, plugin, enabled)?;
        if changed {
            self.publish()?;
        }
        Ok(changed)
    }

    /// Flips one pin and returns its new state.
    pub fn toggle_pin(
        &mut self,
        direction: Direction,
        track: usize,
        plugin: usize,
    ) -> Result<bool, PinError> {
        let enabled = self.connector.toggle_pin(direction, track, plugin)?;
        self.publish()?;
        Ok(enabled)
    }

    /// Runs `f` against the connector, then publishes whatever it committed.
    ///
    /// Used for batch edits such as restoring saved state. If `f` leaves
    /// channel counts the buffer layout cannot hold, the connector is rolled
    /// back to its state before `f` and nothing is published.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut PinConnector) -> R) -> Result<R, PinError> {
        let before = self.connector.clone();
        let result = f(&mut self.connector);
        let edited = PluginConfig {
            inputs: self.connector.channel_count_in(),
            outputs: self.connector.channel_count_out(),
            ..self.config
        };
        if let Err(e) = edited.validate() {
            tracing::warn!(
                "plugin port: rejecting edit to {} for {} layout: {e}",
                self.connector.channel_count_text(),
                self.config.layout
            );
            self.connector = before;
            return Err(e);
        }
        self.publish()?;
        Ok(result)
    }

    /// Handles a period size or sample rate change from the host.
    pub fn set_period(&mut self, frames: usize, sample_rate: u32) -> Result<(), PinError> {
        if frames == self.frames && sample_rate == self.sample_rate {
            return Ok(());
        }
        tracing::info!(
            "plugin port: period {} -> {frames} frames at {sample_rate} Hz",
            self.frames
        );
        self.frames = frames;
        self.sample_rate = sample_rate;
        self.offer_buffers()?;
        self.publish()
    }

    /// Offers buffers for any changed shape, then publishes the committed
    /// topology and frees what the audio thread no longer uses.
    pub fn publish(&mut self) -> Result<(), PinError> {
        let topology = Arc::clone(self.connector.topology());
        if (topology.inputs(), topology.outputs(), self.frames) != self.buffer_shape {
            self.offer_buffers()?;
        }

        if topology.generation() != self.published_generation {
            tracing::debug!(
                "plugin port: publishing topology generation {} ({})",
                topology.generation(),
                self.connector.channel_count_text()
            );
            self.published_generation = topology.generation();
            self.shared.publish_topology(Arc::clone(&topology));
            self.retained.push(topology);
        }

        self.collect_garbage();
        Ok(())
    }

    /// Frees replaced buffers and topologies no thread holds any more.
    pub fn collect_garbage(&mut self) {
        self.shared.collect_garbage();
        self.retained.retain(|t| Arc::strong_count(t) > 1);
    }

    fn offer_buffers(&mut self) -> Result<(), PinError> {
        let config = PluginConfig {
            inputs: self.connector.channel_count_in(),
            outputs: self.connector.channel_count_out(),
            ..self.config
        };
        let buffers = match WorkingBuffers::new(config, self.frames) {
            Ok(buffers) => buffers,
            Err(e) => {
                tracing::warn!("plugin port: cannot shape buffers for {config:?}: {e}");
                return Err(e);
            }
        };
        tracing::debug!(
            "plugin port: offering {}x{} buffers of {} frames",
            buffers.inputs(),
            buffers.outputs(),
            self.frames
        );
        self.buffer_shape = (buffers.inputs(), buffers.outputs(), self.frames);
        self.config = config;
        // Whatever the slot held is dropped here, off the audio thread.
        let _ = self.shared.offer_buffers(PeriodBuffers {
            buffers,
            sample_rate: self.sample_rate,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: usize) -> ChannelCount {
        ChannelCount::Count(n)
    }

    fn effect_port() -> PluginPort {
        PluginPort::new(PluginKind::Effect, PluginConfig::STEREO_EFFECT, 2, 64).unwrap()
    }

    #[test]
    fn pin_edits_publish_topology() {
        let mut port = effect_port();
        let before = port.shared().topology_generation();
        assert!(port.set_pin(Direction::Output, 1, 1, false).unwrap());
        assert!(port.shared().topology_generation() > before);
        assert_eq!(port.shared().topology().routed_channels(), [true, false]);

        let generation = port.shared().topology_generation();
        assert!(!port.set_pin(Direction::Output, 1, 1, false).unwrap());
        assert_eq!(port.shared().topology_generation(), generation);
        assert!(!port.shared().has_pending_buffers());
    }

    #[test]
    fn channel_count_change_offers_buffers() {
        let config = PluginConfig::split(count(2), count(2));
        let mut port = PluginPort::<f32>::new(PluginKind::Effect, config, 2, 64).unwrap();
        port.set_channel_counts(count(1), count(4)).unwrap();
        assert!(port.shared().has_pending_buffers());
        assert_eq!(port.config().outputs, count(4));
        assert_eq!(port.shared().topology().outputs(), 4);
    }

    #[test]
    fn interleaved_rejects_mono_without_change() {
        let mut port = effect_port();
        let generation = port.shared().topology_generation();
        assert!(matches!(
            port.set_channel_counts(count(1), count(2)),
            Err(PinError::InterleavedChannelCount { .. })
        ));
        assert_eq!(port.connector().channel_count_text(), "2x2");
        assert_eq!(port.shared().topology_generation(), generation);
    }

    #[test]
    fn edit_batches_into_one_publish() {
        let mut port = effect_port();
        let generation = port.shared().topology_generation();
        let changed = port
            .edit(|pc| {
                pc.set_pins(Direction::Input, [(0, 0, false), (0, 1, true)])
                    .map(|()| 2)
            })
            .unwrap()
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(port.shared().topology_generation(), generation + 1);
        assert!(port.shared().topology().channel_count_in().is_known());
    }

    #[test]
    fn edit_with_invalid_layout_counts_rolls_back() {
        let mut port = effect_port();
        port.set_pin(Direction::Output, 1, 1, false).unwrap();
        let generation = port.shared().topology_generation();

        let result = port.edit(|pc| {
            pc.set_pin(Direction::Output, 0, 0, false).unwrap();
            pc.set_channel_counts(count(1), count(2));
        });
        assert!(matches!(
            result,
            Err(PinError::InterleavedChannelCount { .. })
        ));
        assert_eq!(port.connector().channel_count_text(), "2x2");
        assert!(port.connector().output().enabled(0, 0));
        assert!(!port.connector().output().enabled(1, 1));
        assert_eq!(port.shared().topology_generation(), generation);
        assert!(!port.shared().has_pending_buffers());

        // Later pin edits publish normally.
        assert!(port.set_pin(Direction::Output, 1, 1, true).unwrap());
        assert!(port.shared().topology_generation() > generation);
        assert_eq!(port.shared().topology().routed_channels(), [true, true]);
    }

    #[test]
    fn period_change_offers_buffers() {
        let mut port = effect_port();
        port.set_period(64, DEFAULT_SAMPLE_RATE).unwrap();
        assert!(!port.shared().has_pending_buffers());
        port.set_period(128, 44_100).unwrap();
        assert!(port.shared().has_pending_buffers());
        assert_eq!(port.frames(), 128);
        assert_eq!(port.sample_rate(), 44_100);
    }

    #[test]
    fn unreferenced_topologies_are_freed() {
        let mut port = effect_port();
        for _ in 0..10 {
            port.toggle_pin(Direction::Input, 0, 1).unwrap();
        }
        // Only the published topology is still referenced elsewhere.
        assert_eq!(port.retained.len(), 1);

        let held = port.shared().topology();
        port.toggle_pin(Direction::Input, 0, 1).unwrap();
        assert_eq!(port.retained.len(), 2);
        drop(held);
        port.collect_garbage();
        assert_eq!(port.retained.len(), 1);
    }
}
