//! Bit-packed connection grid for one routing direction.
//!
//! Rows are host (track) channels, columns are plugin channels. Each row is
//! stored as a run of `u64` words so a row OR-reduction (is this host channel
//! fed by anything?) touches one word for any plugin with up to 64 channels.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use crate::channel::ChannelCount;

const WORD_BITS: usize = u64::BITS as usize;

#[inline]
const fn words_for(columns: usize) -> usize {
    columns.div_ceil(WORD_BITS)
}

/// Boolean grid `[track_channel][plugin_channel]` plus plugin channel names.
///
/// A `true` pin means audio flows between that host channel and that plugin
/// channel. Matrices are owned by a [`PinConnector`](crate::PinConnector),
/// which is the only mutation path; this type exposes queries publicly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMatrix {
    channel_count: ChannelCount,
    track_channels: usize,
    words_per_row: usize,
    bits: Vec<u64>,
    channel_names: Vec<String>,
}

impl ConnectionMatrix {
    pub(crate) fn new(track_channels: usize) -> Self {
        Self {
            channel_count: ChannelCount::Unknown,
            track_channels,
            words_per_row: 0,
            bits: Vec::new(),
            channel_names: Vec::new(),
        }
    }

    /// Plugin channel count for this side.
    #[must_use]
    pub fn channel_count(&self) -> ChannelCount {
        self.channel_count
    }

    /// Plugin channel columns (zero while the count is unknown).
    #[must_use]
    pub fn plugin_channels(&self) -> usize {
        self.channel_count.or_zero()
    }

    /// Host channel rows.
    #[must_use]
    pub fn track_channels(&self) -> usize {
        self.track_channels
    }

    /// Whether audio flows between `track` and `plugin`.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the matrix.
    #[inline]
    #[must_use]
    pub fn enabled(&self, track: usize, plugin: usize) -> bool {
        assert!(
            track < self.track_channels && plugin < self.plugin_channels(),
            "pin ({track}, {plugin}) outside {}x{} matrix",
            self.track_channels,
            self.plugin_channels()
        );
        let word = self.bits[track * self.words_per_row + plugin / WORD_BITS];
        (word >> (plugin % WORD_BITS)) & 1 != 0
    }

    /// Iterates one host channel's pins in plugin channel order.
    pub fn row(&self, track: usize) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.plugin_channels()).map(move |plugin| self.enabled(track, plugin))
    }

    /// `true` if any pin on the host channel's row is enabled.
    #[must_use]
    pub fn any_enabled(&self, track: usize) -> bool {
        let start = track * self.words_per_row;
        self.bits[start..start + self.words_per_row]
            .iter()
            .any(|&w| w != 0)
    }

    /// Number of enabled pins in the whole matrix.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Display name of a plugin channel (`"in 1"`, `"out 2"`, ...).
    #[must_use]
    pub fn channel_name(&self, plugin: usize) -> Option<&str> {
        self.channel_names.get(plugin).map(String::as_str)
    }

    /// All plugin channel names.
    #[must_use]
    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    /// Resizes the plugin columns, keeping pins that are still in range.
    pub(crate) fn set_channel_count(&mut self, count: ChannelCount, name_prefix: &str) {
        let columns = count.or_zero();
        let old_columns = self.plugin_channels();
        let words = words_for(columns);

        if words != self.words_per_row {
            let mut bits = vec![0u64; self.track_channels * words];
            let keep = words.min(self.words_per_row);
            for track in 0..self.track_channels {
                let src = track * self.words_per_row;
                bits[track * words..track * words + keep]
                    .copy_from_slice(&self.bits[src..src + keep]);
            }
            self.bits = bits;
            self.words_per_row = words;
        }

        if columns < old_columns {
            self.mask_tail(columns);
        }

        self.channel_count = count;
        self.channel_names.truncate(columns);
        for i in self.channel_names.len()..columns {
            self.channel_names.push(format!("{name_prefix} {}", i + 1));
        }
    }

    /// Resizes the host rows; new rows start disconnected.
    pub(crate) fn set_track_channel_count(&mut self, track_channels: usize) {
        self.bits.resize(track_channels * self.words_per_row, 0);
        self.track_channels = track_channels;
    }

    pub(crate) fn set_pin(&mut self, track: usize, plugin: usize, enabled: bool) {
        debug_assert!(track < self.track_channels && plugin < self.plugin_channels());
        let word = &mut self.bits[track * self.words_per_row + plugin / WORD_BITS];
        let mask = 1u64 << (plugin % WORD_BITS);
        if enabled {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Host channel `h` connects to plugin channel `h mod N`.
    ///
    /// One plugin channel fans out to every host channel, equal counts give
    /// the identity, and extra plugin channels beyond the host count stay
    /// unconnected.
    pub(crate) fn set_default_connections(&mut self) {
        self.clear();
        let columns = self.plugin_channels();
        if columns == 0 {
            return;
        }
        for track in 0..self.track_channels {
            self.set_pin(track, track % columns, true);
        }
    }

    /// Clears bits at column `columns` and above in every row.
    fn mask_tail(&mut self, columns: usize) {
        if self.words_per_row == 0 {
            return;
        }
        let last = self.words_per_row - 1;
        let used = columns - last * WORD_BITS;
        let mask = if used == WORD_BITS {
            u64::MAX
        } else {
            (1u64 << used) - 1
        };
        for track in 0..self.track_channels {
            self.bits[track * self.words_per_row + last] &= mask;
        }
    }
}
