//! Buffer views the router reads and writes.
//!
//! The host side is always an [`AudioBus`]: one stereo-frame slice per host
//! channel pair. The plugin side is either split (channel-major, one
//! contiguous run of samples per channel) or interleaved (a single
//! stereo-frame slice).

use crate::sample::{Sample, SampleFrame};

/// How a plugin wants its channels laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioLayout {
    /// One contiguous buffer per channel.
    Split,
    /// Stereo frames, zero or two channels only.
    #[default]
    Interleaved,
}

impl core::fmt::Display for AudioLayout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Split => "split",
            Self::Interleaved => "interleaved",
        })
    }
}

/// Host audio for one period: a stereo-frame buffer per channel pair.
///
/// Pair `i` carries host channels `2i` (left) and `2i + 1` (right). Every
/// pair buffer holds at least `frames` frames; only the first `frames` are
/// read or written.
pub struct AudioBus<'a, 'b> {
    pairs: &'a mut [&'b mut [SampleFrame]],
    frames: usize,
}

impl<'a, 'b> AudioBus<'a, 'b> {
    /// Wraps host pair buffers.
    ///
    /// # Panics
    ///
    /// Panics if any pair buffer is shorter than `frames`.
    pub fn new(pairs: &'a mut [&'b mut [SampleFrame]], frames: usize) -> Self {
        assert!(
            pairs.iter().all(|p| p.len() >= frames),
            "every host channel pair must hold {frames} frames"
        );
        Self { pairs, frames }
    }

    /// Frames in this period.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Host channel pairs available.
    #[inline]
    pub fn channel_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Frames of one channel pair.
    #[inline]
    pub fn pair(&self, pair: usize) -> &[SampleFrame] {
        &self.pairs[pair][..self.frames]
    }

    /// Mutable frames of one channel pair.
    #[inline]
    pub fn pair_mut(&mut self, pair: usize) -> &mut [SampleFrame] {
        &mut self.pairs[pair][..self.frames]
    }

    /// Mean of `left² + right²` over every frame of every pair.
    pub fn mean_squared_amplitude(&self) -> f32 {
        if self.frames == 0 {
            return 0.0;
        }
        let sum: f32 = (0..self.channel_pairs())
            .flat_map(|pair| self.pair(pair).iter())
            .map(SampleFrame::sum_of_squared_amplitudes)
            .sum();
        sum / self.frames as f32
    }
}

/// Read-only channel-major plugin buffer.
#[derive(Debug, Clone, Copy)]
pub struct SplitBuffer<'a, S> {
    data: &'a [S],
    channels: usize,
    frames: usize,
}

impl<'a, S: Sample> SplitBuffer<'a, S> {
    /// Views `data` as `channels` runs of `frames` samples.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than `channels * frames`.
    pub fn new(data: &'a [S], channels: usize, frames: usize) -> Self {
        assert!(data.len() >= channels * frames, "split buffer too short");
        Self {
            data,
            channels,
            frames,
        }
    }

    /// Channel count.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// One channel's samples.
    #[inline]
    pub fn channel(&self, channel: usize) -> &'a [S] {
        let start = channel * self.frames;
        &self.data[start..start + self.frames]
    }
}

/// Mutable channel-major plugin buffer.
#[derive(Debug)]
pub struct SplitBufferMut<'a, S> {
    data: &'a mut [S],
    channels: usize,
    frames: usize,
}

impl<'a, S: Sample> SplitBufferMut<'a, S> {
    /// Views `data` as `channels` runs of `frames` samples.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than `channels * frames`.
    pub fn new(data: &'a mut [S], channels: usize, frames: usize) -> Self {
        assert!(data.len() >= channels * frames, "split buffer too short");
        Self {
            data,
            channels,
            frames,
        }
    }

    /// Channel count.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// One channel's samples.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[S] {
        let start = channel * self.frames;
        &self.data[start..start + self.frames]
    }

    /// One channel's samples, mutably.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [S] {
        let start = channel * self.frames;
        &mut self.data[start..start + self.frames]
    }

    /// Sets every sample of every channel.
    pub fn fill(&mut self, value: S) {
        self.data[..self.channels * self.frames].fill(value);
    }

    /// Read-only view of the same storage.
    pub fn as_split(&self) -> SplitBuffer<'_, S> {
        SplitBuffer::new(&*self.data, self.channels, self.frames)
    }

    /// Shorter-lived mutable view of the same storage.
    pub fn reborrow(&mut self) -> SplitBufferMut<'_, S> {
        SplitBufferMut::new(&mut *self.data, self.channels, self.frames)
    }
}
