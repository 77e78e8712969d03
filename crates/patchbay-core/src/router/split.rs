//! Split (channel-major) plugin layout.
//!
//! The 2-bit selector of each (pair, plugin channel) is read once per period
//! and dispatched to a loop specialized for it; no pin is looked up per
//! sample.

use super::WetDry;
use crate::audio::{AudioBus, SplitBuffer, SplitBufferMut};
use crate::sample::{Sample, SampleFrame};
use crate::topology::Topology;

const LEFT: u8 = 0b10;
const RIGHT: u8 = 0b01;
const BOTH: u8 = 0b11;

pub(super) fn route_to_plugin<S: Sample>(
    topology: &Topology,
    bus: &AudioBus<'_, '_>,
    mut plugin_in: SplitBufferMut<'_, S>,
) {
    plugin_in.fill(S::ZERO);

    for channel in 0..topology.inputs() {
        let dst = plugin_in.channel_mut(channel);
        let mut routed = 0u32;

        for pair in 0..topology.pair_bound() {
            let src = bus.pair(pair);
            match topology.input_selector(pair, channel) {
                RIGHT => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d += S::from_f32(s.right);
                    }
                    routed += 1;
                }
                LEFT => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d += S::from_f32(s.left);
                    }
                    routed += 1;
                }
                BOTH => {
                    for (d, s) in dst.iter_mut().zip(src) {
                        *d += S::from_f32(s.left) + S::from_f32(s.right);
                    }
                    routed += 2;
                }
                _ => {}
            }
        }

        if routed > 1 {
            let divisor = S::from_count(routed);
            for d in dst.iter_mut() {
                *d /= divisor;
            }
        }
    }
}

pub(super) fn route_from_plugin<S: Sample, const WET_DRY: bool>(
    topology: &Topology,
    plugin_out: SplitBuffer<'_, S>,
    bus: &mut AudioBus<'_, '_>,
    scratch: &mut [SampleFrame],
    mix: WetDry,
) {
    for pair in 0..topology.pair_bound() {
        let host = bus.pair_mut(pair);
        match topology.routed_pair(pair) {
            RIGHT => {
                route_pair::<S, RIGHT, WET_DRY>(topology, pair, plugin_out, host, scratch, mix);
            }
            LEFT => route_pair::<S, LEFT, WET_DRY>(topology, pair, plugin_out, host, scratch, mix),
            BOTH => route_pair::<S, BOTH, WET_DRY>(topology, pair, plugin_out, host, scratch, mix),
            _ => {}
        }
    }
}

/// Routes one host channel pair whose routed halves are `ROUTED`.
#[inline]
fn route_pair<S: Sample, const ROUTED: u8, const WET_DRY: bool>(
    topology: &Topology,
    pair: usize,
    plugin_out: SplitBuffer<'_, S>,
    host: &mut [SampleFrame],
    scratch: &mut [SampleFrame],
    mix: WetDry,
) {
    if WET_DRY {
        let wet = &mut scratch[..host.len()];
        let counts = accumulate::<S, ROUTED>(topology, pair, plugin_out, wet);
        blend::<ROUTED>(host, wet, counts, mix);
    } else {
        let counts = accumulate::<S, ROUTED>(topology, pair, plugin_out, host);
        normalize::<ROUTED>(host, counts);
    }
}

/// Zeroes the routed halves of `dst` and sums every enabled plugin output
/// into them. Returns the number of sources per half.
#[inline]
fn accumulate<S: Sample, const ROUTED: u8>(
    topology: &Topology,
    pair: usize,
    plugin_out: SplitBuffer<'_, S>,
    dst: &mut [SampleFrame],
) -> (u32, u32) {
    if ROUTED == BOTH {
        dst.fill(SampleFrame::SILENCE);
    } else {
        for d in dst.iter_mut() {
            if ROUTED & LEFT != 0 {
                d.left = 0.0;
            }
            if ROUTED & RIGHT != 0 {
                d.right = 0.0;
            }
        }
    }

    let (mut left, mut right) = (0u32, 0u32);
    for channel in 0..topology.outputs() {
        let src = plugin_out.channel(channel);
        match topology.output_selector(pair, channel) & ROUTED {
            BOTH => {
                for (d, s) in dst.iter_mut().zip(src) {
                    let s = s.to_f32();
                    d.left += s;
                    d.right += s;
                }
                left += 1;
                right += 1;
            }
            LEFT => {
                for (d, s) in dst.iter_mut().zip(src) {
                    d.left += s.to_f32();
                }
                left += 1;
            }
            RIGHT => {
                for (d, s) in dst.iter_mut().zip(src) {
                    d.right += s.to_f32();
                }
                right += 1;
            }
            _ => {}
        }
    }
    (left, right)
}

#[inline]
fn normalize<const ROUTED: u8>(host: &mut [SampleFrame], (left, right): (u32, u32)) {
    let divide_left = ROUTED & LEFT != 0 && left > 1;
    let divide_right = ROUTED & RIGHT != 0 && right > 1;
    if !divide_left && !divide_right {
        return;
    }
    let (dl, dr) = (left as f32, right as f32);
    for h in host.iter_mut() {
        if divide_left {
            h.left /= dl;
        }
        if divide_right {
            h.right /= dr;
        }
    }
}

/// `host = host * dry + (wet / count) * wet_gain` on the routed halves.
#[inline]
fn blend<const ROUTED: u8>(
    host: &mut [SampleFrame],
    wet: &[SampleFrame],
    (left, right): (u32, u32),
    mix: WetDry,
) {
    let dl = left.max(1) as f32;
    let dr = right.max(1) as f32;
    for (h, w) in host.iter_mut().zip(wet) {
        if ROUTED & LEFT != 0 {
            h.left = h.left * mix.dry + (w.left / dl) * mix.wet;
        }
        if ROUTED & RIGHT != 0 {
            h.right = h.right * mix.dry + (w.right / dr) * mix.wet;
        }
    }
}
