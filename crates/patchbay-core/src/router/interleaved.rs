//! Interleaved stereo plugin layout.
//!
//! With exactly two plugin channels per direction, the pins of one host pair
//! fit a 4-bit pattern. Each of the 16 patterns has its own monomorphized
//! kernel; the pattern picks a kernel from a table once per pair per period.

use super::WetDry;
use crate::audio::AudioBus;
use crate::sample::SampleFrame;
use crate::topology::Topology;

type ToPluginKernel = fn(&[SampleFrame], &mut [SampleFrame]);
type FromPluginKernel = fn(&[SampleFrame], &mut [SampleFrame], WetDry);

/// Indexed by `L→0 << 3 | R→0 << 2 | L→1 << 1 | R→1`.
const TO_PLUGIN: [ToPluginKernel; 16] = [
    to_plugin::<0>,
    to_plugin::<1>,
    to_plugin::<2>,
    to_plugin::<3>,
    to_plugin::<4>,
    to_plugin::<5>,
    to_plugin::<6>,
    to_plugin::<7>,
    to_plugin::<8>,
    to_plugin::<9>,
    to_plugin::<10>,
    to_plugin::<11>,
    to_plugin::<12>,
    to_plugin::<13>,
    to_plugin::<14>,
    to_plugin::<15>,
];

/// Indexed by `L←0 << 3 | L←1 << 2 | R←0 << 1 | R←1`.
const FROM_PLUGIN: [FromPluginKernel; 16] = [
    from_plugin::<0, false>,
    from_plugin::<1, false>,
    from_plugin::<2, false>,
    from_plugin::<3, false>,
    from_plugin::<4, false>,
    from_plugin::<5, false>,
    from_plugin::<6, false>,
    from_plugin::<7, false>,
    from_plugin::<8, false>,
    from_plugin::<9, false>,
    from_plugin::<10, false>,
    from_plugin::<11, false>,
    from_plugin::<12, false>,
    from_plugin::<13, false>,
    from_plugin::<14, false>,
    from_plugin::<15, false>,
];

const FROM_PLUGIN_WET_DRY: [FromPluginKernel; 16] = [
    from_plugin::<0, true>,
    from_plugin::<1, true>,
    from_plugin::<2, true>,
    from_plugin::<3, true>,
    from_plugin::<4, true>,
    from_plugin::<5, true>,
    from_plugin::<6, true>,
    from_plugin::<7, true>,
    from_plugin::<8, true>,
    from_plugin::<9, true>,
    from_plugin::<10, true>,
    from_plugin::<11, true>,
    from_plugin::<12, true>,
    from_plugin::<13, true>,
    from_plugin::<14, true>,
    from_plugin::<15, true>,
];

pub(super) fn route_to_plugin(
    topology: &Topology,
    bus: &AudioBus<'_, '_>,
    plugin_in: &mut [SampleFrame],
) {
    plugin_in.fill(SampleFrame::SILENCE);

    for (pair, &pattern) in topology.input_patterns().iter().enumerate() {
        TO_PLUGIN[usize::from(pattern)](bus.pair(pair), plugin_in);
    }

    let [left, right] = topology.interleaved_input_routed();
    if left > 1 || right > 1 {
        let (dl, dr) = (left as f32, right as f32);
        for f in plugin_in.iter_mut() {
            if left > 1 {
                f.left /= dl;
            }
            if right > 1 {
                f.right /= dr;
            }
        }
    }
}

pub(super) fn route_from_plugin<const WET_DRY: bool>(
    topology: &Topology,
    plugin_out: &[SampleFrame],
    bus: &mut AudioBus<'_, '_>,
    mix: WetDry,
) {
    let table = if WET_DRY {
        &FROM_PLUGIN_WET_DRY
    } else {
        &FROM_PLUGIN
    };
    for (pair, &pattern) in topology.output_patterns().iter().enumerate() {
        table[usize::from(pattern)](plugin_out, bus.pair_mut(pair), mix);
    }
}

/// Accumulates one host pair into the stereo plugin input.
///
/// High bits of `PINS` feed plugin channel 0, low bits plugin channel 1;
/// within each, `0b10` is the host left channel and `0b01` the host right.
fn to_plugin<const PINS: u8>(host: &[SampleFrame], plugin_in: &mut [SampleFrame]) {
    let to_left = PINS >> 2;
    let to_right = PINS & 0b11;
    if PINS == 0 {
        return;
    }
    for (d, s) in plugin_in.iter_mut().zip(host) {
        match to_left {
            0b11 => d.left += s.left + s.right,
            0b10 => d.left += s.left,
            0b01 => d.left += s.right,
            _ => {}
        }
        match to_right {
            0b11 => d.right += s.left + s.right,
            0b10 => d.right += s.left,
            0b01 => d.right += s.right,
            _ => {}
        }
    }
}

/// Writes one host pair from the stereo plugin output.
///
/// High bits of `PINS` drive the host left channel, low bits the host right;
/// within each, `0b10` is plugin channel 0 and `0b01` plugin channel 1. A
/// host channel with no pins keeps its contents.
fn from_plugin<const PINS: u8, const WET_DRY: bool>(
    plugin_out: &[SampleFrame],
    host: &mut [SampleFrame],
    mix: WetDry,
) {
    let from_left = PINS >> 2;
    let from_right = PINS & 0b11;
    if PINS == 0 {
        return;
    }
    for (d, s) in host.iter_mut().zip(plugin_out) {
        if from_left != 0 {
            d.left = mixed::<WET_DRY>(d.left, pick(from_left, s), mix);
        }
        if from_right != 0 {
            d.right = mixed::<WET_DRY>(d.right, pick(from_right, s), mix);
        }
    }
}

#[inline]
fn pick(pins: u8, s: &SampleFrame) -> f32 {
    match pins {
        0b11 => (s.left + s.right) / 2.0,
        0b10 => s.left,
        _ => s.right,
    }
}

#[inline]
fn mixed<const WET_DRY: bool>(host: f32, wet: f32, mix: WetDry) -> f32 {
    if WET_DRY {
        host * mix.dry + wet * mix.wet
    } else {
        wet
    }
}
