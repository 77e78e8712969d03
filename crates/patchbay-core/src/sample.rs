//! Sample types.
//!
//! Host buffers are always stereo frames of `f32`. Plugins may work in `f32`
//! or `f64`; split-layout routing converts at the boundary.

use core::ops::{Add, AddAssign, Div, DivAssign, Mul};

/// A plugin sample type the router can accumulate and normalize in.
pub trait Sample:
    Copy
    + Default
    + PartialEq
    + core::fmt::Debug
    + Add<Output = Self>
    + AddAssign
    + Mul<Output = Self>
    + Div<Output = Self>
    + DivAssign
    + Send
    + Sync
    + 'static
{
    /// Silence.
    const ZERO: Self;

    /// Converts a host sample.
    fn from_f32(value: f32) -> Self;

    /// Converts back to a host sample.
    fn to_f32(self) -> f32;

    /// A channel count as a divisor.
    fn from_count(count: u32) -> Self;
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_count(count: u32) -> Self {
        count as f32
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f32(value: f32) -> Self {
        f64::from(value)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_count(count: u32) -> Self {
        f64::from(count)
    }
}

/// One stereo frame of a host channel pair, or of an interleaved plugin buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct SampleFrame {
    /// Left (even) channel.
    pub left: f32,
    /// Right (odd) channel.
    pub right: f32,
}

impl SampleFrame {
    /// Both channels at zero.
    pub const SILENCE: Self = Self::new(0.0, 0.0);

    /// Creates a frame.
    #[must_use]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// `left² + right²`, the per-frame term of the auto-quit level.
    #[inline]
    #[must_use]
    pub fn sum_of_squared_amplitudes(&self) -> f32 {
        self.left * self.left + self.right * self.right
    }

    /// Multiplies both channels by `gain`.
    #[inline]
    #[must_use]
    pub fn scaled(self, gain: f32) -> Self {
        Self::new(self.left * gain, self.right * gain)
    }
}

impl From<(f32, f32)> for SampleFrame {
    fn from((left, right): (f32, f32)) -> Self {
        Self::new(left, right)
    }
}
