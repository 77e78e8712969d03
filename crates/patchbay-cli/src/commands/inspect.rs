//! Render a routing preset.

use super::common::{load_preset, render_connector};
use clap::Args;
use patchbay_core::{Direction, PinConnector};
use serde::Serialize;

#[derive(Args)]
pub struct InspectArgs {
    /// Factory preset name or path to a preset file
    #[arg(value_name = "PRESET")]
    preset: String,

    /// Print a JSON summary instead of pin grids
    #[arg(long)]
    json: bool,
}

/// Machine-readable summary printed by `--json`.
#[derive(Serialize)]
struct Summary {
    name: String,
    description: Option<String>,
    track_channels: usize,
    inputs: i32,
    outputs: i32,
    input_pins: Vec<Vec<bool>>,
    output_pins: Vec<Vec<bool>>,
    routed_channels: Vec<bool>,
    track_channels_upper_bound: usize,
}

fn pins(connector: &PinConnector, direction: Direction) -> Vec<Vec<bool>> {
    let matrix = connector.matrix(direction);
    (0..matrix.track_channels())
        .map(|t| matrix.row(t).collect())
        .collect()
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let preset = load_preset(&args.preset)?;
    let connector = preset.to_connector()?;

    if args.json {
        let summary = Summary {
            name: preset.name.clone(),
            description: preset.description.clone(),
            track_channels: connector.track_channel_count(),
            inputs: connector.channel_count_in().to_raw(),
            outputs: connector.channel_count_out().to_raw(),
            input_pins: pins(&connector, Direction::Input),
            output_pins: pins(&connector, Direction::Output),
            routed_channels: connector.routed_channels().to_vec(),
            track_channels_upper_bound: connector.track_channels_upper_bound(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", preset.name);
    if let Some(desc) = &preset.description {
        println!("  {desc}");
    }
    println!("Channels: {}", connector.channel_count_text());
    println!("Track channels: {}\n", connector.track_channel_count());
    print!("{}", render_connector(&connector));

    Ok(())
}
