//! The plugin side of the port: what a wrapped instrument or effect
//! implements.

use patchbay_core::{PluginBuffers, PluginConfig, Sample};

/// What a plugin wants to happen after a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessStatus {
    /// Keep processing.
    Continue,
    /// Keep processing while the output is above the gate threshold.
    #[default]
    ContinueIfNotQuiet,
    /// Stop processing until woken.
    Sleep,
}

/// Instruments generate audio; effects transform the track's audio and are
/// blended back with wet/dry gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// Sound source. Never blended, never put to sleep by the gate.
    Instrument,
    /// Track effect.
    Effect,
}

impl core::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Instrument => f.write_str("instrument"),
            Self::Effect => f.write_str("effect"),
        }
    }
}

/// An audio plugin behind a pin connector.
///
/// `process()` sees only its own channels in the layout it asked for through
/// [`config()`](Self::config); routing to and from the host track happens
/// around it.
pub trait AudioPlugin: Send {
    /// Sample type of split buffers. Interleaved buffers are always `f32`
    /// stereo frames.
    type Sample: Sample;

    /// Instrument or effect.
    fn kind(&self) -> PluginKind;

    /// Buffer layout and initial channel counts.
    fn config(&self) -> PluginConfig;

    /// Called before the first period and whenever the period size or
    /// sample rate changes.
    fn prepare(&mut self, sample_rate: u32, frames: usize) {
        let _ = (sample_rate, frames);
    }

    /// Processes one period.
    fn process(&mut self, buffers: PluginBuffers<'_, Self::Sample>) -> ProcessStatus;

    /// Called instead of [`process()`](Self::process) for periods that are
    /// skipped: while asleep, or while buffers are being reshaped.
    fn process_bypassed(&mut self) {}
}
