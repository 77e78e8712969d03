//! Auto-quit gate for effects.
//!
//! An effect that reports [`ProcessStatus::ContinueIfNotQuiet`](crate::ProcessStatus)
//! is put to sleep once its output has stayed at or below the gate threshold
//! for more than `timeout` consecutive periods. Any louder period restarts
//! the count.

/// Levels within this distance of the threshold count as quiet.
const LEVEL_EPSILON: f32 = 1.0e-10;

/// Quiet-period counter deciding when an effect may stop processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepGate {
    threshold: f32,
    timeout: u32,
    quiet_periods: u32,
    enabled: bool,
}

impl Default for SleepGate {
    /// Silence threshold, ten quiet periods.
    fn default() -> Self {
        Self::new(0.0, 10)
    }
}

impl SleepGate {
    /// Gate sleeping after more than `timeout` periods at or below
    /// `threshold` (a mean of squared amplitudes, not dB).
    pub fn new(threshold: f32, timeout: u32) -> Self {
        Self {
            threshold,
            timeout,
            quiet_periods: 0,
            enabled: true,
        }
    }

    /// Gate that never puts the effect to sleep.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Gate whose timeout covers `decay_ms` of audio at the given period size.
    ///
    /// ```rust
    /// use patchbay_plugin::SleepGate;
    ///
    /// // 500 ms at 48 kHz in 256-frame periods: 93.75 -> 94 periods
    /// assert_eq!(SleepGate::from_decay(0.0, 500.0, 48_000, 256).timeout(), 94);
    /// ```
    pub fn from_decay(threshold: f32, decay_ms: f32, sample_rate: u32, frames: usize) -> Self {
        let periods = if frames == 0 {
            0.0
        } else {
            (decay_ms.max(0.0) / 1000.0 * sample_rate as f32 / frames as f32).ceil()
        };
        Self::new(threshold, periods as u32)
    }

    /// Level at or below which a period counts as quiet.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Quiet periods tolerated before sleeping.
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    /// Consecutive quiet periods so far.
    pub fn quiet_periods(&self) -> u32 {
        self.quiet_periods
    }

    /// Whether the gate can put the effect to sleep at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `true` if `level` is loud enough to keep (or start) an effect running.
    pub fn is_audible(&self, level: f32) -> bool {
        level - self.threshold > LEVEL_EPSILON
    }

    /// Feeds one period's output level. Returns `false` when the effect
    /// should go to sleep; the counter restarts at that point.
    pub fn update(&mut self, level: f32) -> bool {
        if !self.enabled {
            return true;
        }
        if self.is_audible(level) {
            self.quiet_periods = 0;
            return true;
        }
        self.quiet_periods += 1;
        if self.quiet_periods > self.timeout {
            self.quiet_periods = 0;
            return false;
        }
        true
    }

    /// Restarts the quiet-period count.
    pub fn reset(&mut self) {
        self.quiet_periods = 0;
    }
}
