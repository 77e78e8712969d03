//! Audio-thread side of a plugin port.
//!
//! Each period the processor:
//!
//! 1. Adopts buffers the port offered (non-blocking) and loads the newest
//!    topology.
//! 2. Bypasses the period if the buffers do not fit the topology and the
//!    host bus, counting it as mismatched.
//! 3. Routes host → plugin, runs the plugin, routes plugin → host
//!    (effects blend with wet/dry).
//! 4. For effects, applies the [`ProcessStatus`] and the [`SleepGate`].
//!
//! Nothing here allocates, locks or logs. Replaced buffers and topologies
//! are freed by the port on the control thread.

use std::sync::Arc;

use patchbay_core::{AudioBus, Router, Topology, WetDry, WorkingBuffers};

use crate::gate::SleepGate;
use crate::plugin::{AudioPlugin, PluginKind, ProcessStatus};
use crate::shared::PortShared;

/// Runs a plugin behind its pin connector on the audio thread.
///
/// Created by [`PluginPort::processor()`](crate::PluginPort::processor).
pub struct AudioProcessor<P: AudioPlugin> {
    plugin: P,
    kind: PluginKind,
    shared: PortShared<P::Sample>,
    topology: Arc<Topology>,
    buffers: WorkingBuffers<P::Sample>,
    gate: SleepGate,
    sleeping: bool,
}

impl<P: AudioPlugin> AudioProcessor<P> {
    pub(crate) fn new(
        plugin: P,
        kind: PluginKind,
        shared: PortShared<P::Sample>,
        topology: Arc<Topology>,
        buffers: WorkingBuffers<P::Sample>,
    ) -> Self {
        Self {
            plugin,
            kind,
            shared,
            topology,
            buffers,
            gate: SleepGate::default(),
            sleeping: false,
        }
    }

    /// Replaces the auto-quit gate.
    pub fn with_gate(mut self, gate: SleepGate) -> Self {
        self.gate = gate;
        self
    }

    /// The wrapped plugin.
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Mutable access to the wrapped plugin.
    pub fn plugin_mut(&mut self) -> &mut P {
        &mut self.plugin
    }

    /// The topology the last period was routed with.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The auto-quit gate.
    pub fn gate(&self) -> &SleepGate {
        &self.gate
    }

    /// Whether the effect is asleep.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Resumes processing from the next period.
    pub fn wake(&mut self) {
        self.set_sleeping(false);
    }

    /// Processes one instrument period. Returns `true` while running.
    ///
    /// The plugin output replaces the routed host channels; there is no
    /// wet/dry and the gate never puts an instrument to sleep.
    pub fn process_instrument(&mut self, bus: &mut AudioBus<'_, '_>) -> bool {
        debug_assert_eq!(self.kind, PluginKind::Instrument);
        self.sync();
        if !self.check_fit(bus) {
            self.plugin.process_bypassed();
            return true;
        }
        self.run(bus, None);
        true
    }

    /// Processes one effect period, blending the routed channels with `mix`.
    /// Returns `true` while the effect keeps running.
    ///
    /// A sleeping effect leaves `bus` untouched. It wakes when the port
    /// asks it to or when the incoming track audio passes the gate.
    pub fn process_effect(&mut self, bus: &mut AudioBus<'_, '_>, mix: WetDry) -> bool {
        debug_assert_eq!(self.kind, PluginKind::Effect);
        self.sync();
        if self.shared.take_wake_request()
            || (self.sleeping && self.gate.is_audible(bus.mean_squared_amplitude()))
        {
            self.wake();
        }
        if self.sleeping {
            self.plugin.process_bypassed();
            return false;
        }
        if !self.check_fit(bus) {
            self.plugin.process_bypassed();
            return true;
        }

        match self.run(bus, Some(mix)) {
            ProcessStatus::Continue => {}
            ProcessStatus::ContinueIfNotQuiet => {
                if !self.gate.update(bus.mean_squared_amplitude()) {
                    self.set_sleeping(true);
                }
            }
            ProcessStatus::Sleep => self.set_sleeping(true),
        }
        !self.sleeping
    }

    /// Picks up new buffers and the newest topology.
    fn sync(&mut self) {
        if let Some(sample_rate) = self.shared.try_adopt_buffers(&mut self.buffers) {
            self.plugin.prepare(sample_rate, self.buffers.frames());
        }
        if self.shared.topology_generation() != self.topology.generation() {
            // The port keeps published topologies alive, so dropping ours
            // never frees here.
            self.topology = self.shared.topology();
        }
    }

    fn check_fit(&self, bus: &AudioBus<'_, '_>) -> bool {
        let fits = self.buffers.fits(&self.topology, bus.frames())
            && bus.channel_pairs() >= self.topology.pair_bound();
        if !fits {
            self.shared.record_mismatch();
        }
        fits
    }

    fn run(&mut self, bus: &mut AudioBus<'_, '_>, mix: Option<WetDry>) -> ProcessStatus {
        let router = Router::new(&self.topology);
        self.buffers.route_in(&router, bus);
        let status = self.plugin.process(self.buffers.plugin_buffers());
        self.buffers.route_out(&router, bus, mix);
        status
    }

    fn set_sleeping(&mut self, sleeping: bool) {
        self.sleeping = sleeping;
        self.gate.reset();
        self.shared.set_sleeping(sleeping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PluginPort;
    use patchbay_core::{ChannelCount, Direction, PluginBuffers, PluginConfig, SampleFrame};

    /// Interleaved stereo effect scaling by `gain`.
    struct Gain {
        gain: f32,
        status: ProcessStatus,
        bypassed: usize,
        prepared: Vec<(u32, usize)>,
    }

    impl Gain {
        fn new(gain: f32, status: ProcessStatus) -> Self {
            Self {
                gain,
                status,
                bypassed: 0,
                prepared: Vec::new(),
            }
        }
    }

    impl AudioPlugin for Gain {
        type Sample = f32;

        fn kind(&self) -> PluginKind {
            PluginKind::Effect
        }

        fn config(&self) -> PluginConfig {
            PluginConfig::STEREO_EFFECT
        }

        fn prepare(&mut self, sample_rate: u32, frames: usize) {
            self.prepared.push((sample_rate, frames));
        }

        fn process(&mut self, buffers: PluginBuffers<'_, f32>) -> ProcessStatus {
            if let PluginBuffers::InterleavedInplace(frames) = buffers {
                for f in frames.iter_mut() {
                    *f = f.scaled(self.gain);
                }
            }
            self.status
        }

        fn process_bypassed(&mut self) {
            self.bypassed += 1;
        }
    }

    fn period(
        processor: &mut AudioProcessor<Gain>,
        host: &mut [SampleFrame],
        mix: WetDry,
    ) -> bool {
        let frames = host.len();
        let mut pairs: [&mut [SampleFrame]; 1] = [host];
        let mut bus = AudioBus::new(&mut pairs, frames);
        processor.process_effect(&mut bus, mix)
    }

    fn setup(status: ProcessStatus) -> (PluginPort, AudioProcessor<Gain>) {
        let plugin = Gain::new(2.0, status);
        let port = PluginPort::for_plugin(&plugin, 2, 4).unwrap();
        let processor = port.processor(plugin).unwrap();
        (port, processor)
    }

    #[test]
    fn processes_with_wet_dry() {
        let (_port, mut processor) = setup(ProcessStatus::Continue);
        assert_eq!(processor.plugin().prepared, [(48_000, 4)]);

        let mut host = [SampleFrame::new(1.0, -1.0); 4];
        assert!(period(&mut processor, &mut host, WetDry::FULL_WET));
        assert_eq!(host[0], SampleFrame::new(2.0, -2.0));

        let mut host = [SampleFrame::new(1.0, -1.0); 4];
        assert!(period(&mut processor, &mut host, WetDry::from_mix(0.5)));
        assert_eq!(host[3], SampleFrame::new(1.5, -1.5));
    }

    #[test]
    fn picks_up_pin_changes_at_period_start() {
        let (mut port, mut processor) = setup(ProcessStatus::Continue);
        port.set_pin(Direction::Output, 1, 1, false).unwrap();

        let mut host = [SampleFrame::new(1.0, 1.0); 4];
        period(&mut processor, &mut host, WetDry::FULL_WET);
        assert_eq!(host[0], SampleFrame::new(2.0, 1.0));
        assert_eq!(processor.topology().routed_channels(), [true, false]);
    }

    #[test]
    fn period_size_change_is_adopted() {
        let (mut port, mut processor) = setup(ProcessStatus::Continue);
        port.set_period(8, 44_100).unwrap();

        let mut host = [SampleFrame::new(1.0, 1.0); 8];
        period(&mut processor, &mut host, WetDry::FULL_WET);
        assert_eq!(host[7], SampleFrame::new(2.0, 2.0));
        assert_eq!(processor.plugin().prepared.last(), Some(&(44_100, 8)));
        assert_eq!(port.mismatched_periods(), 0);

        port.collect_garbage();
        assert!(!port.shared().has_pending_buffers());
    }

    #[test]
    fn mismatched_period_is_bypassed() {
        let (port, mut processor) = setup(ProcessStatus::Continue);
        // Host runs 6 frames while the buffers hold 4.
        let mut host = [SampleFrame::new(1.0, 1.0); 6];
        assert!(period(&mut processor, &mut host, WetDry::FULL_WET));
        assert_eq!(host, [SampleFrame::new(1.0, 1.0); 6]);
        assert_eq!(port.mismatched_periods(), 1);
        assert_eq!(processor.plugin().bypassed, 1);
    }

    #[test]
    fn unknown_counts_leave_host_untouched_until_declared() {
        let plugin = Gain::new(2.0, ProcessStatus::Continue);
        let config = PluginConfig {
            inputs: ChannelCount::Unknown,
            outputs: ChannelCount::Unknown,
            ..plugin.config()
        };
        let mut port = PluginPort::new(PluginKind::Effect, config, 2, 4).unwrap();
        let mut processor = port.processor(plugin).unwrap();

        let mut host = [SampleFrame::new(1.0, 1.0); 4];
        period(&mut processor, &mut host, WetDry::FULL_WET);
        assert_eq!(host[0], SampleFrame::new(1.0, 1.0));

        port.set_channel_counts(ChannelCount::Count(2), ChannelCount::Count(2))
            .unwrap();
        period(&mut processor, &mut host, WetDry::FULL_WET);
        assert_eq!(host[0], SampleFrame::new(2.0, 2.0));
    }

    #[test]
    fn quiet_effect_goes_to_sleep_and_wakes() {
        let (port, processor) = setup(ProcessStatus::ContinueIfNotQuiet);
        let mut processor = processor.with_gate(SleepGate::new(0.0, 2));

        let mut silence = [SampleFrame::SILENCE; 4];
        assert!(period(&mut processor, &mut silence, WetDry::FULL_WET));
        assert!(period(&mut processor, &mut silence, WetDry::FULL_WET));
        assert!(!period(&mut processor, &mut silence, WetDry::FULL_WET));
        assert!(processor.is_sleeping());
        assert!(port.is_sleeping());

        // Asleep: bypassed while the input stays silent.
        assert!(!period(&mut processor, &mut silence, WetDry::FULL_WET));
        assert_eq!(processor.plugin().bypassed, 1);

        // Audible input wakes it within the same period.
        let mut host = [SampleFrame::new(0.5, 0.5); 4];
        assert!(period(&mut processor, &mut host, WetDry::FULL_WET));
        assert_eq!(host[0], SampleFrame::new(1.0, 1.0));
        assert!(!port.is_sleeping());
    }

    #[test]
    fn sleep_status_and_wake_request() {
        let (port, mut processor) = setup(ProcessStatus::Sleep);
        let mut silence = [SampleFrame::SILENCE; 4];
        assert!(!period(&mut processor, &mut silence, WetDry::FULL_WET));
        assert!(processor.is_sleeping());

        processor.plugin_mut().status = ProcessStatus::Continue;
        port.wake();
        assert!(period(&mut processor, &mut silence, WetDry::FULL_WET));
        assert!(!processor.is_sleeping());
    }
}
