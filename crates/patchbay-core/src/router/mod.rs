//! Moves audio between host channel pairs and plugin buffers.
//!
//! A [`Router`] is a borrowed view of one committed [`Topology`]; it holds no
//! state of its own and never allocates. Callers load a topology once per
//! period and route that whole period with it.
//!
//! Two directions, two plugin layouts:
//!
//! | | split | interleaved |
//! |---|---|---|
//! | host → plugin | [`route_to_plugin`](Router::route_to_plugin) | [`route_to_plugin_interleaved`](Router::route_to_plugin_interleaved) |
//! | plugin → host | [`route_from_plugin`](Router::route_from_plugin) | [`route_from_plugin_interleaved`](Router::route_from_plugin_interleaved) |
//!
//! plus wet/dry variants of the plugin → host direction for effects. All
//! shape checks happen on entry, before any sample loop.
//!
//! # Normalization
//!
//! When `k > 1` sources feed one destination channel, the destination is the
//! sum divided by `k`. A host channel fed by nothing is left untouched
//! (bypass).

mod interleaved;
mod split;

use crate::audio::{AudioBus, SplitBuffer, SplitBufferMut};
use crate::sample::{Sample, SampleFrame};
use crate::topology::Topology;

/// Effect output gains applied when routing back to the host.
///
/// On every routed host channel: `host = host * dry + routed * wet`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WetDry {
    /// Gain on the plugin's (normalized) output.
    pub wet: f32,
    /// Gain on the host signal already in the buffer.
    pub dry: f32,
}

impl WetDry {
    /// Plugin output only; equivalent to plain routing.
    pub const FULL_WET: Self = Self::new(1.0, 0.0);

    /// Creates a gain pair.
    #[must_use]
    pub const fn new(wet: f32, dry: f32) -> Self {
        Self { wet, dry }
    }

    /// Equal-sum mix: `wet = mix`, `dry = 1 - mix`.
    #[must_use]
    pub fn from_mix(mix: f32) -> Self {
        let mix = mix.clamp(0.0, 1.0);
        Self::new(mix, 1.0 - mix)
    }
}

impl Default for WetDry {
    fn default() -> Self {
        Self::FULL_WET
    }
}

/// Stateless routing algorithms bound to one committed topology.
#[derive(Debug, Clone, Copy)]
pub struct Router<'t> {
    topology: &'t Topology,
}

impl<'t> Router<'t> {
    /// Binds a router to a topology.
    #[must_use]
    pub fn new(topology: &'t Topology) -> Self {
        Self { topology }
    }

    /// The topology this router reads.
    #[must_use]
    pub fn topology(&self) -> &'t Topology {
        self.topology
    }

    /// Host → split plugin input.
    ///
    /// Zeroes the plugin input, then sums every connected host channel into
    /// each plugin channel and normalizes. No-op for a plugin without inputs.
    ///
    /// # Panics
    ///
    /// Panics if `plugin_in` does not have the topology's input channel
    /// count and the bus's frame count, or the bus has fewer channel pairs
    /// than the topology routes.
    pub fn route_to_plugin<S: Sample>(
        &self,
        bus: &AudioBus<'_, '_>,
        plugin_in: SplitBufferMut<'_, S>,
    ) {
        if self.topology.inputs() == 0 {
            return;
        }
        self.check_bus(bus);
        assert_eq!(plugin_in.channels(), self.topology.inputs(), "plugin input channels");
        assert_eq!(plugin_in.frames(), bus.frames(), "plugin input frames");
        split::route_to_plugin(self.topology, bus, plugin_in);
    }

    /// Split plugin output → host, in place.
    ///
    /// Host channels no plugin output is routed to keep their contents.
    ///
    /// # Panics
    ///
    /// Same shape preconditions as [`route_to_plugin()`](Self::route_to_plugin),
    /// against the output side.
    pub fn route_from_plugin<S: Sample>(
        &self,
        plugin_out: SplitBuffer<'_, S>,
        bus: &mut AudioBus<'_, '_>,
    ) {
        if self.topology.outputs() == 0 {
            return;
        }
        self.check_split_out(&plugin_out, bus);
        split::route_from_plugin::<S, false>(
            self.topology,
            plugin_out,
            bus,
            &mut [],
            WetDry::FULL_WET,
        );
    }

    /// Split plugin output → host with wet/dry blending.
    ///
    /// `scratch` holds the wet signal while it is accumulated; it must have
    /// at least `bus.frames()` frames.
    pub fn route_from_plugin_wet_dry<S: Sample>(
        &self,
        plugin_out: SplitBuffer<'_, S>,
        bus: &mut AudioBus<'_, '_>,
        scratch: &mut [SampleFrame],
        mix: WetDry,
    ) {
        if self.topology.outputs() == 0 {
            return;
        }
        self.check_split_out(&plugin_out, bus);
        assert!(scratch.len() >= bus.frames(), "wet/dry scratch too short");
        split::route_from_plugin::<S, true>(self.topology, plugin_out, bus, scratch, mix);
    }

    /// Host → interleaved stereo plugin input.
    ///
    /// # Panics
    ///
    /// Panics if the topology's input count is neither 0 nor 2, or
    /// `plugin_in` is shorter than the bus's frame count.
    pub fn route_to_plugin_interleaved(
        &self,
        bus: &AudioBus<'_, '_>,
        plugin_in: &mut [SampleFrame],
    ) {
        if self.topology.inputs() == 0 {
            return;
        }
        assert_eq!(self.topology.inputs(), 2, "interleaved input needs 2 channels");
        self.check_bus(bus);
        assert!(plugin_in.len() >= bus.frames(), "plugin input frames");
        interleaved::route_to_plugin(self.topology, bus, &mut plugin_in[..bus.frames()]);
    }

    /// Interleaved stereo plugin output → host, in place.
    pub fn route_from_plugin_interleaved(
        &self,
        plugin_out: &[SampleFrame],
        bus: &mut AudioBus<'_, '_>,
    ) {
        if self.topology.outputs() == 0 {
            return;
        }
        self.check_interleaved_out(plugin_out, bus);
        let plugin_out = &plugin_out[..bus.frames()];
        interleaved::route_from_plugin::<false>(self.topology, plugin_out, bus, WetDry::FULL_WET);
    }

    /// Interleaved stereo plugin output → host with wet/dry blending.
    pub fn route_from_plugin_interleaved_wet_dry(
        &self,
        plugin_out: &[SampleFrame],
        bus: &mut AudioBus<'_, '_>,
        mix: WetDry,
    ) {
        if self.topology.outputs() == 0 {
            return;
        }
        self.check_interleaved_out(plugin_out, bus);
        let plugin_out = &plugin_out[..bus.frames()];
        interleaved::route_from_plugin::<true>(self.topology, plugin_out, bus, mix);
    }

    fn check_bus(&self, bus: &AudioBus<'_, '_>) {
        assert!(
            bus.channel_pairs() >= self.topology.pair_bound(),
            "bus has {} channel pairs, topology routes {}",
            bus.channel_pairs(),
            self.topology.pair_bound()
        );
    }

    fn check_split_out<S: Sample>(&self, plugin_out: &SplitBuffer<'_, S>, bus: &AudioBus<'_, '_>) {
        self.check_bus(bus);
        assert_eq!(plugin_out.channels(), self.topology.outputs(), "plugin output channels");
        assert_eq!(plugin_out.frames(), bus.frames(), "plugin output frames");
    }

    fn check_interleaved_out(&self, plugin_out: &[SampleFrame], bus: &AudioBus<'_, '_>) {
        assert_eq!(self.topology.outputs(), 2, "interleaved output needs 2 channels");
        self.check_bus(bus);
        assert!(plugin_out.len() >= bus.frames(), "plugin output frames");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelCount, Direction, PinConnector};

    fn stereo() -> PinConnector {
        PinConnector::with_default_track_channels(ChannelCount::Count(2), ChannelCount::Count(2))
    }

    #[test]
    fn wet_dry_from_mix_clamps() {
        assert_eq!(WetDry::from_mix(0.25), WetDry::new(0.25, 0.75));
        assert_eq!(WetDry::from_mix(2.0), WetDry::FULL_WET);
        assert_eq!(WetDry::default(), WetDry::FULL_WET);
    }

    #[test]
    fn zero_channel_directions_are_noops() {
        let pc =
            PinConnector::with_default_track_channels(ChannelCount::Count(0), ChannelCount::Count(0));
        let mut host = [SampleFrame::new(1.0, 2.0); 4];
        let mut pairs: [&mut [SampleFrame]; 1] = [&mut host];
        let mut bus = AudioBus::new(&mut pairs, 4);

        let mut empty: [f32; 0] = [];
        pc.router().route_to_plugin(&bus, SplitBufferMut::new(&mut empty, 0, 4));
        pc.router().route_from_plugin(SplitBuffer::new(&empty, 0, 4), &mut bus);
        pc.router().route_from_plugin_interleaved(&[], &mut bus);
        assert_eq!(host, [SampleFrame::new(1.0, 2.0); 4]);
    }

    #[test]
    #[should_panic]
    fn mismatched_plugin_buffer_panics_before_routing() {
        let pc = stereo();
        let host = [SampleFrame::SILENCE; 4];
        let mut host = host;
        let mut pairs: [&mut [SampleFrame]; 1] = [&mut host];
        let bus = AudioBus::new(&mut pairs, 4);
        let mut wrong = [0.0_f32; 4];
        pc.router().route_to_plugin(&bus, SplitBufferMut::new(&mut wrong, 1, 4));
    }

    #[test]
    fn pairs_beyond_upper_bound_are_not_required() {
        let mut pc = PinConnector::new(4, ChannelCount::Count(2), ChannelCount::Count(2));
        pc.clear_pins(Direction::Input);
        pc.clear_pins(Direction::Output);
        pc.set_pin(Direction::Input, 0, 0, true).unwrap();
        pc.set_pin(Direction::Output, 1, 1, true).unwrap();
        assert_eq!(pc.topology().pair_bound(), 1);

        // Only one pair supplied although the track has four channels.
        let mut host = [SampleFrame::new(1.0, 2.0); 2];
        let mut pairs: [&mut [SampleFrame]; 1] = [&mut host];
        let mut bus = AudioBus::new(&mut pairs, 2);
        let mut plugin = [SampleFrame::SILENCE; 2];
        pc.router().route_to_plugin_interleaved(&bus, &mut plugin);
        assert_eq!(plugin, [SampleFrame::new(1.0, 0.0); 2]);

        pc.router().route_from_plugin_interleaved(&[SampleFrame::new(5.0, 7.0); 2], &mut bus);
        assert_eq!(host, [SampleFrame::new(1.0, 7.0); 2]);
    }
}
