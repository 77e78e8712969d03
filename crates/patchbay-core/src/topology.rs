//! Committed routing snapshot.
//!
//! A [`Topology`] is an immutable, pre-digested copy of a connector's pin
//! state, laid out for the per-period routing loops. It is built on the
//! control thread after every mutation and shared with the audio thread via
//! `Arc`; the audio thread never observes a half-updated matrix.
//!
//! Selector encoding, per channel pair (`L` = even host channel, `R` = odd):
//!
//! - split selectors: 2 bits per (pair, plugin channel), `L << 1 | R`;
//! - interleaved input pattern (plugin has 2 inputs):
//!   `L→0 << 3 | R→0 << 2 | L→1 << 1 | R→1`;
//! - interleaved output pattern (plugin has 2 outputs):
//!   `L←0 << 3 | L←1 << 2 | R←0 << 1 | R←1`.
//!
//! In both interleaved patterns the high two bits drive the left plugin/host
//! side and the low two bits the right side.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::channel::ChannelCount;
use crate::matrix::ConnectionMatrix;

/// Immutable routing snapshot consumed by the [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    inputs: ChannelCount,
    outputs: ChannelCount,
    track_channels: usize,
    pair_bound: usize,
    in_selectors: Vec<u8>,
    out_selectors: Vec<u8>,
    routed_pairs: Vec<u8>,
    routed_channels: Vec<bool>,
    in_patterns: Vec<u8>,
    out_patterns: Vec<u8>,
    interleaved_in_routed: [u32; 2],
    generation: u64,
}

impl Topology {
    /// A snapshot that routes nothing.
    #[must_use]
    pub fn empty(track_channels: usize) -> Self {
        Self {
            inputs: ChannelCount::Unknown,
            outputs: ChannelCount::Unknown,
            track_channels,
            pair_bound: 0,
            in_selectors: Vec::new(),
            out_selectors: Vec::new(),
            routed_pairs: Vec::new(),
            routed_channels: vec![false; track_channels],
            in_patterns: Vec::new(),
            out_patterns: Vec::new(),
            interleaved_in_routed: [0; 2],
            generation: 0,
        }
    }

    pub(crate) fn build(
        input: &ConnectionMatrix,
        output: &ConnectionMatrix,
        routed_channels: &[bool],
        upper_bound: usize,
        generation: u64,
    ) -> Self {
        let pair_bound = upper_bound / 2;
        let inputs = input.plugin_channels();
        let outputs = output.plugin_channels();

        let mut in_selectors = Vec::with_capacity(pair_bound * inputs);
        let mut out_selectors = Vec::with_capacity(pair_bound * outputs);
        let mut routed_pairs = Vec::with_capacity(pair_bound);
        for pair in 0..pair_bound {
            let (l, r) = (pair * 2, pair * 2 + 1);
            in_selectors
                .extend((0..inputs).map(|p| pair_bits(input.enabled(l, p), input.enabled(r, p))));
            out_selectors.extend(
                (0..outputs).map(|p| pair_bits(output.enabled(l, p), output.enabled(r, p))),
            );
            routed_pairs.push(pair_bits(routed_channels[l], routed_channels[r]));
        }

        let mut in_patterns = Vec::new();
        let mut interleaved_in_routed = [0u32; 2];
        if inputs == 2 {
            in_patterns.reserve(pair_bound);
            for pair in 0..pair_bound {
                let (l, r) = (pair * 2, pair * 2 + 1);
                let pattern = u8::from(input.enabled(l, 0)) << 3
                    | u8::from(input.enabled(r, 0)) << 2
                    | u8::from(input.enabled(l, 1)) << 1
                    | u8::from(input.enabled(r, 1));
                interleaved_in_routed[0] += (pattern >> 2).count_ones();
                interleaved_in_routed[1] += (pattern & 0b11).count_ones();
                in_patterns.push(pattern);
            }
        }

        let mut out_patterns = Vec::new();
        if outputs == 2 {
            out_patterns.reserve(pair_bound);
            for pair in 0..pair_bound {
                let (l, r) = (pair * 2, pair * 2 + 1);
                out_patterns.push(
                    u8::from(output.enabled(l, 0)) << 3
                        | u8::from(output.enabled(l, 1)) << 2
                        | u8::from(output.enabled(r, 0)) << 1
                        | u8::from(output.enabled(r, 1)),
                );
            }
        }

        Self {
            inputs: input.channel_count(),
            outputs: output.channel_count(),
            track_channels: input.track_channels(),
            pair_bound,
            in_selectors,
            out_selectors,
            routed_pairs,
            routed_channels: routed_channels.to_vec(),
            in_patterns,
            out_patterns,
            interleaved_in_routed,
            generation,
        }
    }

    /// Plugin input count.
    #[must_use]
    pub fn channel_count_in(&self) -> ChannelCount {
        self.inputs
    }

    /// Plugin output count.
    #[must_use]
    pub fn channel_count_out(&self) -> ChannelCount {
        self.outputs
    }

    /// Plugin input channels routing works with.
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> usize {
        self.inputs.or_zero()
    }

    /// Plugin output channels routing works with.
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> usize {
        self.outputs.or_zero()
    }

    /// Host channels the connector was built for.
    #[must_use]
    pub fn track_channels(&self) -> usize {
        self.track_channels
    }

    /// Channel pairs the routing loops visit; pairs at or beyond this carry
    /// no pins in either direction.
    #[inline]
    #[must_use]
    pub fn pair_bound(&self) -> usize {
        self.pair_bound
    }

    /// Per host channel: does any plugin output feed it?
    #[must_use]
    pub fn routed_channels(&self) -> &[bool] {
        &self.routed_channels
    }

    /// Monotonic counter, bumped by the owning connector on every commit.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub(crate) fn input_selector(&self, pair: usize, plugin: usize) -> u8 {
        self.in_selectors[pair * self.inputs() + plugin]
    }

    #[inline]
    pub(crate) fn output_selector(&self, pair: usize, plugin: usize) -> u8 {
        self.out_selectors[pair * self.outputs() + plugin]
    }

    #[inline]
    pub(crate) fn routed_pair(&self, pair: usize) -> u8 {
        self.routed_pairs[pair]
    }

    /// Interleaved input patterns, one per pair; empty unless 2 inputs.
    #[inline]
    pub(crate) fn input_patterns(&self) -> &[u8] {
        &self.in_patterns
    }

    /// Interleaved output patterns, one per pair; empty unless 2 outputs.
    #[inline]
    pub(crate) fn output_patterns(&self) -> &[u8] {
        &self.out_patterns
    }

    /// Host channels summed into the left and right interleaved plugin input.
    #[inline]
    pub(crate) fn interleaved_input_routed(&self) -> [u32; 2] {
        self.interleaved_in_routed
    }
}

#[inline]
fn pair_bits(left: bool, right: bool) -> u8 {
    u8::from(left) << 1 | u8::from(right)
}
