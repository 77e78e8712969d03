//! Error type for pin-connector configuration.
//!
//! Routing itself never fails: every shape check happens when the connector
//! is configured. [`PinError`] is what the fallible `try_*` constructors and
//! pin setters return when they are fed external, unvalidated input.

use crate::channel::Direction;

/// Errors from configuring a [`PinConnector`](crate::PinConnector) or
/// [`WorkingBuffers`](crate::WorkingBuffers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    /// A raw channel count below `-1` (the persisted form of "unknown").
    InvalidRawChannelCount(i32),
    /// Host channel count above [`MAX_TRACK_CHANNELS`](crate::MAX_TRACK_CHANNELS).
    TooManyTrackChannels(usize),
    /// Host channels come in stereo pairs; the count must be even.
    OddTrackChannelCount(usize),
    /// Plugin channel count above [`MAX_PLUGIN_CHANNELS`](crate::MAX_PLUGIN_CHANNELS).
    TooManyPluginChannels(usize),
    /// Interleaved plugin buffers carry exactly zero or two channels.
    InterleavedChannelCount {
        /// Which side of the plugin declared the count.
        direction: Direction,
        /// The rejected count.
        count: usize,
    },
    /// A known channel count cannot go back to unknown.
    RevertToUnknown(Direction),
    /// A pin coordinate outside the matrix shape.
    PinOutOfRange {
        /// Matrix the pin was addressed in.
        direction: Direction,
        /// Host channel index.
        track: usize,
        /// Plugin channel index.
        plugin: usize,
    },
}

#[cfg(feature = "std")]
impl std::fmt::Display for PinError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidRawChannelCount(n) => write!(f, "invalid raw channel count {n}"),
            Self::TooManyTrackChannels(n) => {
                write!(
                    f,
                    "{n} track channels exceeds the maximum of {}",
                    crate::MAX_TRACK_CHANNELS
                )
            }
            Self::OddTrackChannelCount(n) => {
                write!(f, "track channel count must be even, got {n}")
            }
            Self::TooManyPluginChannels(n) => {
                write!(
                    f,
                    "{n} plugin channels exceeds the maximum of {}",
                    crate::MAX_PLUGIN_CHANNELS
                )
            }
            Self::InterleavedChannelCount { direction, count } => write!(
                f,
                "interleaved {direction} buffers need 0 or 2 channels, got {count}"
            ),
            Self::RevertToUnknown(direction) => {
                write!(f, "{direction} channel count cannot revert to unknown")
            }
            Self::PinOutOfRange {
                direction,
                track,
                plugin,
            } => write!(
                f,
                "{direction} pin (track {track}, plugin {plugin}) is outside the matrix"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PinError {}
