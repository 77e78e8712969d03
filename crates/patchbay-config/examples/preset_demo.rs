//! Routing preset demo: factory presets, capture, and restore onto a plugin
//! whose channel counts changed.
//!
//! Run with: cargo run -p patchbay-config --example preset_demo

use patchbay_config::{RoutingPreset, factory_preset_names, get_factory_preset, is_factory_preset};
use patchbay_core::{ChannelCount, Direction, PinConnector};

fn print_matrix(pc: &PinConnector, direction: Direction) {
    let matrix = pc.matrix(direction);
    println!("  {direction}: {}", matrix.channel_names().join(" "));
    for track in 0..matrix.track_channels() {
        let row: Vec<&str> = matrix.row(track).map(|on| if on { "x" } else { "." }).collect();
        println!("    track {}: {}", track + 1, row.join(" "));
    }
}

fn main() {
    println!("=== Factory Presets ===\n");
    for id in factory_preset_names() {
        if let Some(preset) = get_factory_preset(id) {
            println!(
                "  {:14} {}",
                id,
                preset.description.as_deref().unwrap_or(&preset.name)
            );
        }
    }
    println!();
    println!("is_factory_preset(\"Swap\") = {}", is_factory_preset("Swap"));
    println!("is_factory_preset(\"custom\") = {}\n", is_factory_preset("custom"));

    println!("=== Capture ===\n");
    let mut pc =
        PinConnector::with_default_track_channels(ChannelCount::Count(2), ChannelCount::Count(2));
    pc.set_pin(Direction::Output, 1, 1, false).expect("pin in range");
    let preset = RoutingPreset::capture("Left Wet", &pc)
        .with_description("Plugin only feeds the left channel");
    println!("{}", preset.to_toml().expect("serializes"));

    println!("=== Restore onto a 2-in/2-out plugin ===\n");
    let mut same =
        PinConnector::with_default_track_channels(ChannelCount::Count(2), ChannelCount::Count(2));
    let report = preset.apply(&mut same).expect("valid preset");
    println!("  {report:?}");
    print_matrix(&same, Direction::Output);

    println!("\n=== Restore onto a mono plugin ===\n");
    let mut mono =
        PinConnector::with_default_track_channels(ChannelCount::Count(1), ChannelCount::Count(1));
    let report = preset.apply(&mut mono).expect("valid preset");
    println!("  {report:?}");
    print_matrix(&mono, Direction::Output);
}
