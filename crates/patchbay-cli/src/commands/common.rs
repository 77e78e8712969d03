//! Shared CLI helpers used across multiple commands.

use patchbay_config::{RoutingPreset, get_factory_preset};
use patchbay_core::{ChannelCount, ConnectionMatrix, Direction, PinConnector};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Parse a channel count for clap's `value_parser`: a number, or `?`/`-1`
/// for unknown.
pub fn parse_channel_count(s: &str) -> Result<ChannelCount, String> {
    if s == "?" {
        return Ok(ChannelCount::Unknown);
    }
    let raw: i32 = s
        .parse()
        .map_err(|_| format!("Invalid channel count: '{s}' (expected a number or '?')"))?;
    ChannelCount::from_raw(raw).map_err(|e| e.to_string())
}

/// Load a preset by name or path.
///
/// Searches in this order:
/// 1. Factory presets (by identifier or display name)
/// 2. File path (if it's a path to a .toml file)
pub fn load_preset(name: &str) -> anyhow::Result<RoutingPreset> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }

    let path = PathBuf::from(name);
    if path.exists() {
        return RoutingPreset::load(&path).map_err(|e| anyhow::anyhow!("{}", e));
    }

    anyhow::bail!(
        "Preset '{}' not found. Use 'patchbay presets' to see available presets.",
        name
    )
}

/// Renders one connection matrix as a pin grid, tracks down, plugin
/// channels across.
///
/// ```text
/// input (2 channels)
///            in 1  in 2
///   track 1    ●     ·
///   track 2    ·     ●
/// ```
pub fn render_matrix(direction: Direction, matrix: &ConnectionMatrix) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{direction} ({} channels)", matrix.channel_count());
    if matrix.plugin_channels() == 0 {
        let _ = writeln!(out, "  (no plugin channels)");
        return out;
    }

    let width = matrix
        .channel_names()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(1);
    let _ = write!(out, "{:11}", "");
    for name in matrix.channel_names() {
        let _ = write!(out, " {name:>width$}");
    }
    out.push('\n');

    for track in 0..matrix.track_channels() {
        let _ = write!(out, "  track {:<3}", track + 1);
        for enabled in matrix.row(track) {
            let pin = if enabled { "●" } else { "·" };
            let _ = write!(out, " {pin:>width$}");
        }
        out.push('\n');
    }
    out
}

/// Renders both matrices and the routed host channels.
pub fn render_connector(connector: &PinConnector) -> String {
    let mut out = String::new();
    for direction in Direction::ALL {
        out.push_str(&render_matrix(direction, connector.matrix(direction)));
        out.push('\n');
    }
    let routed: Vec<String> = connector
        .routed_channels()
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r)
        .map(|(t, _)| (t + 1).to_string())
        .collect();
    let _ = writeln!(
        out,
        "routed tracks: {}",
        if routed.is_empty() {
            "none".to_string()
        } else {
            routed.join(", ")
        }
    );
    let _ = writeln!(
        out,
        "track channel upper bound: {}",
        connector.track_channels_upper_bound()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counts() {
        assert_eq!(parse_channel_count("2"), Ok(ChannelCount::Count(2)));
        assert_eq!(parse_channel_count("0"), Ok(ChannelCount::Count(0)));
        assert_eq!(parse_channel_count("?"), Ok(ChannelCount::Unknown));
        assert_eq!(parse_channel_count("-1"), Ok(ChannelCount::Unknown));
        assert!(parse_channel_count("-2").is_err());
        assert!(parse_channel_count("two").is_err());
    }

    #[test]
    fn grid_marks_pins() {
        let pc =
            PinConnector::with_default_track_channels(ChannelCount::Count(2), ChannelCount::Count(1));
        let grid = render_matrix(Direction::Output, pc.output());
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "output (1 channels)");
        assert!(lines[1].ends_with("out 1"));
        assert!(lines[2].starts_with("  track 1") && lines[2].ends_with('●'));
        assert!(lines[3].starts_with("  track 2") && lines[3].ends_with('●'));
    }

    #[test]
    fn grid_without_channels() {
        let pc =
            PinConnector::with_default_track_channels(ChannelCount::Count(0), ChannelCount::Count(2));
        assert!(render_matrix(Direction::Input, pc.input()).contains("(no plugin channels)"));
        assert!(render_connector(&pc).contains("routed tracks: 1, 2"));
    }

    #[test]
    fn load_factory_and_missing() {
        assert_eq!(load_preset("Swap").unwrap().name, "Swap");
        assert!(load_preset("/definitely/not/here.toml").is_err());
    }
}
