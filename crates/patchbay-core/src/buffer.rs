//! Plugin-side working buffers.
//!
//! [`WorkingBuffers`] owns the scratch memory a plugin reads its input from
//! and writes its output to, shaped by a [`PluginConfig`]. It is sized on the
//! control thread (construction and [`resize()`](WorkingBuffers::resize))
//! and only borrowed during processing.
//!
//! | layout | not in-place | in-place |
//! |---|---|---|
//! | split | two channel-major arrays | one `frames × max(in, out)` array |
//! | interleaved | two stereo-frame arrays | one stereo-frame array |

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::audio::{AudioBus, AudioLayout, SplitBuffer, SplitBufferMut};
use crate::channel::{ChannelCount, Direction, MAX_PLUGIN_CHANNELS};
use crate::error::PinError;
use crate::router::{Router, WetDry};
use crate::sample::{Sample, SampleFrame};
use crate::topology::Topology;

/// How a plugin wants its audio buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginConfig {
    /// Channel layout of both plugin buffers.
    pub layout: AudioLayout,
    /// Declared input count.
    pub inputs: ChannelCount,
    /// Declared output count.
    pub outputs: ChannelCount,
    /// Input and output share one buffer.
    pub inplace: bool,
}

impl PluginConfig {
    /// Stereo effect with interleaved in-place buffers.
    pub const STEREO_EFFECT: Self = Self {
        layout: AudioLayout::Interleaved,
        inputs: ChannelCount::Count(2),
        outputs: ChannelCount::Count(2),
        inplace: true,
    };

    /// Stereo instrument: no inputs, interleaved output.
    pub const STEREO_INSTRUMENT: Self = Self {
        layout: AudioLayout::Interleaved,
        inputs: ChannelCount::Count(0),
        outputs: ChannelCount::Count(2),
        inplace: true,
    };

    /// Split, not in-place.
    #[must_use]
    pub const fn split(inputs: ChannelCount, outputs: ChannelCount) -> Self {
        Self {
            layout: AudioLayout::Split,
            inputs,
            outputs,
            inplace: false,
        }
    }

    /// Interleaved, not in-place.
    #[must_use]
    pub const fn interleaved(inputs: ChannelCount, outputs: ChannelCount) -> Self {
        Self {
            layout: AudioLayout::Interleaved,
            inputs,
            outputs,
            inplace: false,
        }
    }

    /// Sets whether input and output share storage.
    #[must_use]
    pub const fn with_inplace(mut self, inplace: bool) -> Self {
        self.inplace = inplace;
        self
    }

    /// Checks the counts against the layout.
    pub fn validate(&self) -> Result<(), PinError> {
        validate_counts(
            self.layout,
            self.inputs.or_zero(),
            self.outputs.or_zero(),
        )
    }
}

fn validate_counts(layout: AudioLayout, inputs: usize, outputs: usize) -> Result<(), PinError> {
    for (direction, count) in [(Direction::Input, inputs), (Direction::Output, outputs)] {
        if count > MAX_PLUGIN_CHANNELS {
            return Err(PinError::TooManyPluginChannels(count));
        }
        if layout == AudioLayout::Interleaved && count != 0 && count != 2 {
            return Err(PinError::InterleavedChannelCount { direction, count });
        }
    }
    Ok(())
}

/// The plugin's view of its buffers for one period.
pub enum PluginBuffers<'a, S: Sample> {
    /// Separate channel-major input and output.
    Split {
        /// Routed host audio.
        input: SplitBuffer<'a, S>,
        /// Where the plugin writes.
        output: SplitBufferMut<'a, S>,
    },
    /// One channel-major buffer holding the routed input, overwritten with
    /// the output. Has `max(inputs, outputs)` channels.
    SplitInplace(SplitBufferMut<'a, S>),
    /// Separate stereo-frame input and output.
    Interleaved {
        /// Routed host audio.
        input: &'a [SampleFrame],
        /// Where the plugin writes.
        output: &'a mut [SampleFrame],
    },
    /// One stereo-frame buffer, input overwritten with output.
    InterleavedInplace(&'a mut [SampleFrame]),
}

/// Scratch buffers between host routing and plugin processing.
#[derive(Debug, Clone)]
pub struct WorkingBuffers<S: Sample = f32> {
    layout: AudioLayout,
    inplace: bool,
    inputs: usize,
    outputs: usize,
    frames: usize,
    split_in: Vec<S>,
    split_out: Vec<S>,
    frames_in: Vec<SampleFrame>,
    frames_out: Vec<SampleFrame>,
    wet_dry: Vec<SampleFrame>,
}

impl<S: Sample> WorkingBuffers<S> {
    /// Allocates buffers for `config` at `frames` per period.
    pub fn new(config: PluginConfig, frames: usize) -> Result<Self, PinError> {
        let mut buffers = Self {
            layout: config.layout,
            inplace: config.inplace,
            inputs: 0,
            outputs: 0,
            frames: 0,
            split_in: Vec::new(),
            split_out: Vec::new(),
            frames_in: Vec::new(),
            frames_out: Vec::new(),
            wet_dry: Vec::new(),
        };
        buffers.resize(config.inputs.or_zero(), config.outputs.or_zero(), frames)?;
        Ok(buffers)
    }

    /// Reallocates for new channel counts or a new period size. Contents are
    /// zeroed.
    pub fn resize(&mut self, inputs: usize, outputs: usize, frames: usize) -> Result<(), PinError> {
        validate_counts(self.layout, inputs, outputs)?;
        self.inputs = inputs;
        self.outputs = outputs;
        self.frames = frames;

        let (len_in, len_out) = match (self.layout, self.inplace) {
            (AudioLayout::Split, false) => (inputs * frames, outputs * frames),
            (AudioLayout::Split, true) => (inputs.max(outputs) * frames, 0),
            (AudioLayout::Interleaved, false) => {
                (frames_if(inputs, frames), frames_if(outputs, frames))
            }
            (AudioLayout::Interleaved, true) => (frames_if(inputs.max(outputs), frames), 0),
        };
        match self.layout {
            AudioLayout::Split => {
                refill(&mut self.split_in, len_in, S::ZERO);
                refill(&mut self.split_out, len_out, S::ZERO);
            }
            AudioLayout::Interleaved => {
                refill(&mut self.frames_in, len_in, SampleFrame::SILENCE);
                refill(&mut self.frames_out, len_out, SampleFrame::SILENCE);
            }
        }
        refill(&mut self.wet_dry, frames, SampleFrame::SILENCE);
        Ok(())
    }

    /// Channel layout.
    pub fn layout(&self) -> AudioLayout {
        self.layout
    }

    /// Whether input and output alias.
    pub fn is_inplace(&self) -> bool {
        self.inplace
    }

    /// Plugin input channels the buffers are sized for.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Plugin output channels the buffers are sized for.
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Frames per period.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// `true` if these buffers can route `topology` for a period of `frames`.
    pub fn fits(&self, topology: &Topology, frames: usize) -> bool {
        self.inputs == topology.inputs()
            && self.outputs == topology.outputs()
            && self.frames == frames
    }

    /// Split input view.
    ///
    /// # Panics
    ///
    /// Panics for interleaved buffers.
    pub fn input_split(&mut self) -> SplitBufferMut<'_, S> {
        assert_eq!(self.layout, AudioLayout::Split, "not a split buffer");
        SplitBufferMut::new(&mut self.split_in, self.inputs, self.frames)
    }

    /// Split output view; the same storage as the input when in-place.
    ///
    /// # Panics
    ///
    /// Panics for interleaved buffers.
    pub fn output_split(&mut self) -> SplitBufferMut<'_, S> {
        assert_eq!(self.layout, AudioLayout::Split, "not a split buffer");
        let data = if self.inplace {
            &mut self.split_in
        } else {
            &mut self.split_out
        };
        SplitBufferMut::new(data, self.outputs, self.frames)
    }

    /// Interleaved input view.
    ///
    /// # Panics
    ///
    /// Panics for split buffers.
    pub fn input_interleaved(&mut self) -> &mut [SampleFrame] {
        assert_eq!(self.layout, AudioLayout::Interleaved, "not an interleaved buffer");
        &mut self.frames_in
    }

    /// Interleaved output view; the same storage as the input when in-place.
    ///
    /// # Panics
    ///
    /// Panics for split buffers.
    pub fn output_interleaved(&mut self) -> &mut [SampleFrame] {
        assert_eq!(self.layout, AudioLayout::Interleaved, "not an interleaved buffer");
        if self.inplace {
            &mut self.frames_in
        } else {
            &mut self.frames_out
        }
    }

    /// Stereo-frame scratch of `frames` length for wet/dry blending.
    pub fn wet_dry_scratch(&mut self) -> &mut [SampleFrame] {
        &mut self.wet_dry
    }

    /// Buffers handed to the plugin's process call.
    pub fn plugin_buffers(&mut self) -> PluginBuffers<'_, S> {
        let frames = self.frames;
        match (self.layout, self.inplace) {
            (AudioLayout::Split, false) => PluginBuffers::Split {
                input: SplitBuffer::new(&self.split_in, self.inputs, frames),
                output: SplitBufferMut::new(&mut self.split_out, self.outputs, frames),
            },
            (AudioLayout::Split, true) => PluginBuffers::SplitInplace(SplitBufferMut::new(
                &mut self.split_in,
                self.inputs.max(self.outputs),
                frames,
            )),
            (AudioLayout::Interleaved, false) => PluginBuffers::Interleaved {
                input: &self.frames_in,
                output: &mut self.frames_out,
            },
            (AudioLayout::Interleaved, true) => {
                PluginBuffers::InterleavedInplace(&mut self.frames_in)
            }
        }
    }

    /// Routes host audio into the plugin input for this layout.
    pub fn route_in(&mut self, router: &Router<'_>, bus: &AudioBus<'_, '_>) {
        match self.layout {
            AudioLayout::Split => router.route_to_plugin(bus, self.input_split()),
            AudioLayout::Interleaved => {
                router.route_to_plugin_interleaved(bus, self.input_interleaved());
            }
        }
    }

    /// Routes the plugin output back to the host for this layout, blending
    /// with `mix` when given.
    pub fn route_out(
        &mut self,
        router: &Router<'_>,
        bus: &mut AudioBus<'_, '_>,
        mix: Option<WetDry>,
    ) {
        let frames = self.frames;
        match self.layout {
            AudioLayout::Split => {
                let data: &[S] = if self.inplace {
                    &self.split_in
                } else {
                    &self.split_out
                };
                let output = SplitBuffer::new(data, self.outputs, frames);
                match mix {
                    Some(mix) => {
                        router.route_from_plugin_wet_dry(output, bus, &mut self.wet_dry, mix);
                    }
                    None => router.route_from_plugin(output, bus),
                }
            }
            AudioLayout::Interleaved => {
                let output: &[SampleFrame] = if self.inplace {
                    &self.frames_in
                } else {
                    &self.frames_out
                };
                match mix {
                    Some(mix) => router.route_from_plugin_interleaved_wet_dry(output, bus, mix),
                    None => router.route_from_plugin_interleaved(output, bus),
                }
            }
        }
    }
}

fn frames_if(channels: usize, frames: usize) -> usize {
    if channels == 0 { 0 } else { frames }
}

fn refill<T: Copy>(buf: &mut Vec<T>, len: usize, value: T) {
    buf.clear();
    buf.resize(len, value);
}
