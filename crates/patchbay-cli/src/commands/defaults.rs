//! Default connections for a pair of channel counts.

use super::common::{parse_channel_count, render_connector};
use clap::Args;
use patchbay_config::RoutingPreset;
use patchbay_core::{ChannelCount, DEFAULT_TRACK_CHANNELS, PinConnector};
use std::path::PathBuf;

#[derive(Args)]
pub struct DefaultsArgs {
    /// Plugin input channels (a number, or '?' for unknown)
    #[arg(short, long, value_parser = parse_channel_count, default_value = "2")]
    inputs: ChannelCount,

    /// Plugin output channels (a number, or '?' for unknown)
    #[arg(short, long, value_parser = parse_channel_count, default_value = "2")]
    outputs: ChannelCount,

    /// Host channels on the track
    #[arg(short, long, default_value_t = DEFAULT_TRACK_CHANNELS)]
    track_channels: usize,

    /// Save the routing as a preset file
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Name for the saved preset
    #[arg(long, default_value = "Default Routing")]
    name: String,
}

pub fn run(args: DefaultsArgs) -> anyhow::Result<()> {
    let connector = PinConnector::try_new(args.track_channels, args.inputs, args.outputs)?;

    println!("Default routing for {}", connector.channel_count_text());
    println!("Track channels: {}\n", connector.track_channel_count());
    print!("{}", render_connector(&connector));

    if let Some(path) = &args.save {
        let preset = RoutingPreset::capture(&args.name, &connector).with_description(format!(
            "Default connections for {} on {} track channels",
            connector.channel_count_text(),
            connector.track_channel_count()
        ));
        preset.save(path)?;
        println!("\nSaved preset '{}' to {}", preset.name, path.display());
    }

    Ok(())
}
