//! Factory routing presets bundled with patchbay.
//!
//! Built-in pin layouts for a stereo plugin on a stereo track, always
//! available without external files.

use crate::RoutingPreset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "stereo",
    "mono_sum",
    "swap",
    "left_only",
    "right_only",
    "fan_out_mono",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("stereo", STEREO_PRESET),
    ("mono_sum", MONO_SUM_PRESET),
    ("swap", SWAP_PRESET),
    ("left_only", LEFT_ONLY_PRESET),
    ("right_only", RIGHT_ONLY_PRESET),
    ("fan_out_mono", FAN_OUT_MONO_PRESET),
];

const STEREO_PRESET: &str = r#"
name = "Stereo"
description = "Default connections: left to left, right to right"

[state]
track_channels = 2

[state.input]
channels = 2
pins = [[true, false], [false, true]]

[state.output]
channels = 2
pins = [[true, false], [false, true]]
"#;

const MONO_SUM_PRESET: &str = r#"
name = "Mono Sum"
description = "Both plugin inputs receive the mean of left and right"

[state]
track_channels = 2

[state.input]
channels = 2
pins = [[true, true], [true, true]]

[state.output]
channels = 2
pins = [[true, false], [false, true]]
"#;

const SWAP_PRESET: &str = r#"
name = "Swap"
description = "Host left feeds plugin right and host right feeds plugin left"

[state]
track_channels = 2

[state.input]
channels = 2
pins = [[false, true], [true, false]]

[state.output]
channels = 2
pins = [[true, false], [false, true]]
"#;

const LEFT_ONLY_PRESET: &str = r#"
name = "Left Only"
description = "Host left feeds both plugin inputs"

[state]
track_channels = 2

[state.input]
channels = 2
pins = [[true, true], [false, false]]

[state.output]
channels = 2
pins = [[true, false], [false, true]]
"#;

const RIGHT_ONLY_PRESET: &str = r#"
name = "Right Only"
description = "Host right feeds both plugin inputs"

[state]
track_channels = 2

[state.input]
channels = 2
pins = [[false, false], [true, true]]

[state.output]
channels = 2
pins = [[true, false], [false, true]]
"#;

const FAN_OUT_MONO_PRESET: &str = r#"
name = "Fan Out Mono"
description = "Plugin left output replaces both host channels"

[state]
track_channels = 2

[state.input]
channels = 2
pins = [[true, false], [false, true]]

[state.output]
channels = 2
pins = [[true, false], [true, false]]
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use patchbay_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("  - {}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<RoutingPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| RoutingPreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by identifier or display name, case-insensitive.
///
/// # Example
///
/// ```rust
/// use patchbay_config::get_factory_preset;
///
/// let swap = get_factory_preset("Swap").unwrap();
/// assert!(swap.state.input.pin(0, 1));
/// ```
pub fn get_factory_preset(name: &str) -> Option<RoutingPreset> {
    let name_lower = name.to_lowercase();

    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.to_lowercase() == name_lower {
            return RoutingPreset::from_toml(toml).ok();
        }
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Get the identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset (case-insensitive).
///
/// ```rust
/// use patchbay_config::is_factory_preset;
///
/// assert!(is_factory_preset("mono_sum"));
/// assert!(is_factory_preset("Mono Sum"));
/// assert!(!is_factory_preset("my_routing"));
/// ```
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
