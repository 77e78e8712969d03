//! Factory preset listing.

use super::common::render_connector;
use clap::Args;
use patchbay_config::{FACTORY_PRESET_NAMES, get_factory_preset};

#[derive(Args)]
pub struct PresetsArgs {
    /// Also print each preset's pin grids
    #[arg(short, long)]
    verbose: bool,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");

    for id in FACTORY_PRESET_NAMES {
        let Some(preset) = get_factory_preset(id) else {
            tracing::warn!(preset = id, "factory preset failed to parse");
            continue;
        };
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:14} {:14} - {}", id, preset.name, desc);

        if args.verbose {
            let connector = preset.to_connector()?;
            for line in render_connector(&connector).lines() {
                println!("      {line}");
            }
            println!();
        }
    }

    println!("\nUse 'patchbay inspect <PRESET>' for details.");
    Ok(())
}
