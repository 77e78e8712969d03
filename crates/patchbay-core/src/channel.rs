//! Channel counts and routing directions.

use crate::error::PinError;

/// Host channel count a connector gets when none is specified.
pub const DEFAULT_TRACK_CHANNELS: usize = 2;

/// Upper limit on host (track) channels.
pub const MAX_TRACK_CHANNELS: usize = 256;

/// Upper limit on the channels a plugin may declare per direction.
pub const MAX_PLUGIN_CHANNELS: usize = 256;

/// Number of channels on one side of a plugin.
///
/// Plugins whose channel layout is only known after they are loaded start
/// out [`Unknown`](Self::Unknown). Routing treats an unknown count like zero
/// channels, so an uninitialized plugin is never fed or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelCount {
    /// Not yet declared by the plugin.
    #[default]
    Unknown,
    /// A declared count (may be zero).
    Count(usize),
}

impl ChannelCount {
    /// The declared count, if any.
    #[must_use]
    pub const fn get(self) -> Option<usize> {
        match self {
            Self::Unknown => None,
            Self::Count(n) => Some(n),
        }
    }

    /// `true` once the plugin has declared a count.
    #[must_use]
    pub const fn is_known(self) -> bool {
        matches!(self, Self::Count(_))
    }

    /// The count routing works with: unknown behaves as zero channels.
    #[must_use]
    pub const fn or_zero(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Count(n) => n,
        }
    }

    /// Decodes the persisted form, where `-1` stands for unknown.
    ///
    /// # Errors
    ///
    /// [`PinError::InvalidRawChannelCount`] for anything below `-1`.
    pub fn from_raw(raw: i32) -> Result<Self, PinError> {
        match raw {
            -1 => Ok(Self::Unknown),
            n if n >= 0 => Ok(Self::Count(n.unsigned_abs() as usize)),
            n => Err(PinError::InvalidRawChannelCount(n)),
        }
    }

    /// Encodes to the persisted form (`-1` for unknown).
    ///
    /// Counts are bounded by [`MAX_PLUGIN_CHANNELS`], so they always fit.
    #[must_use]
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Count(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }
}

impl From<usize> for ChannelCount {
    fn from(n: usize) -> Self {
        Self::Count(n)
    }
}

impl core::fmt::Display for ChannelCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unknown => f.write_str("?"),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

/// Which matrix of a connector: host → plugin or plugin → host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host channels feeding plugin inputs.
    Input,
    /// Plugin outputs feeding host channels.
    Output,
}

impl Direction {
    /// Both directions, input first.
    pub const ALL: [Self; 2] = [Self::Input, Self::Output];

    /// Prefix used to generate channel names for this side.
    #[must_use]
    pub const fn name_prefix(self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}
