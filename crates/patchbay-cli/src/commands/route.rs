//! Offline routing of a stereo WAV file through a preset and a gain plugin.

use super::common::load_preset;
use crate::wav::{read_wav_frames, write_wav_frames};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use patchbay_core::{AudioBus, ChannelCount, PluginBuffers, PluginConfig, SampleFrame, WetDry};
use patchbay_plugin::{AudioPlugin, PluginKind, PluginPort, ProcessStatus};
use std::path::PathBuf;

/// Buffer layout the gain plugin asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// One buffer per channel
    Split,
    /// Stereo frames
    Interleaved,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Routing preset (factory name or file path)
    #[arg(short, long, default_value = "stereo")]
    preset: String,

    /// Linear gain applied by the plugin
    #[arg(short, long, default_value = "1.0")]
    gain: f32,

    /// Wet/dry mix (0 = dry, 1 = wet)
    #[arg(short, long, default_value = "1.0")]
    mix: f32,

    /// Plugin buffer layout
    #[arg(long, value_enum, default_value = "split")]
    layout: Layout,

    /// Process in place (plugin input and output share one buffer)
    #[arg(long)]
    inplace: bool,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Stereo effect multiplying every sample by a fixed gain.
struct GainPlugin {
    gain: f32,
    config: PluginConfig,
}

impl GainPlugin {
    fn new(gain: f32, layout: Layout, inplace: bool) -> Self {
        let stereo = ChannelCount::Count(2);
        let config = match layout {
            Layout::Split => PluginConfig::split(stereo, stereo),
            Layout::Interleaved => PluginConfig::interleaved(stereo, stereo),
        };
        Self {
            gain,
            config: config.with_inplace(inplace),
        }
    }
}

impl AudioPlugin for GainPlugin {
    type Sample = f32;

    fn kind(&self) -> PluginKind {
        PluginKind::Effect
    }

    fn config(&self) -> PluginConfig {
        self.config
    }

    fn process(&mut self, buffers: PluginBuffers<'_, f32>) -> ProcessStatus {
        let gain = self.gain;
        match buffers {
            PluginBuffers::Split { input, mut output } => {
                for ch in 0..output.channels().min(input.channels()) {
                    for (o, i) in output.channel_mut(ch).iter_mut().zip(input.channel(ch)) {
                        *o = i * gain;
                    }
                }
            }
            PluginBuffers::SplitInplace(mut buf) => {
                for ch in 0..buf.channels() {
                    for s in buf.channel_mut(ch) {
                        *s *= gain;
                    }
                }
            }
            PluginBuffers::Interleaved { input, output } => {
                for (o, i) in output.iter_mut().zip(input) {
                    *o = i.scaled(gain);
                }
            }
            PluginBuffers::InterleavedInplace(buf) => {
                for f in buf.iter_mut() {
                    *f = f.scaled(gain);
                }
            }
        }
        ProcessStatus::Continue
    }
}

pub fn run(args: RouteArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }
    if !(0.0..=1.0).contains(&args.mix) {
        anyhow::bail!("Mix must be between 0 and 1, got {}", args.mix);
    }

    println!("Reading {}...", args.input.display());
    let (input, sample_rate) = read_wav_frames(&args.input)?;
    println!(
        "  {} frames, {} Hz, {:.2}s",
        input.len(),
        sample_rate,
        input.len() as f32 / sample_rate as f32
    );

    let preset = load_preset(&args.preset)?;
    if preset.state.track_channels != 2 {
        anyhow::bail!(
            "Preset '{}' is for {} track channels; route processes stereo files",
            preset.name,
            preset.state.track_channels
        );
    }

    let plugin = GainPlugin::new(args.gain, args.layout, args.inplace);
    let mut port = PluginPort::for_plugin(&plugin, 2, args.block_size)?;
    port.set_period(args.block_size, sample_rate)?;
    let report = port.edit(|pc| preset.apply(pc))??;
    tracing::debug!(?report, preset = %preset.name, "preset applied");

    println!("Routing with preset: {}", preset.name);
    println!(
        "  {} plugin ({}), gain {}, mix {}",
        port.config().layout,
        if port.config().inplace { "in place" } else { "separate buffers" },
        args.gain,
        args.mix
    );

    let mut processor = port.processor(plugin)?;
    let mix = WetDry::from_mix(args.mix);

    let pb = ProgressBar::new(input.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut output = Vec::with_capacity(input.len());
    let mut block = vec![SampleFrame::SILENCE; args.block_size];

    for chunk in input.chunks(args.block_size) {
        // Short final block is padded with silence to keep the period size.
        block[..chunk.len()].copy_from_slice(chunk);
        block[chunk.len()..].fill(SampleFrame::SILENCE);
        {
            let mut pairs: [&mut [SampleFrame]; 1] = [&mut block[..]];
            let mut bus = AudioBus::new(&mut pairs, args.block_size);
            processor.process_effect(&mut bus, mix);
        }
        output.extend_from_slice(&block[..chunk.len()]);
        pb.inc(chunk.len() as u64);
    }

    pb.finish_with_message("done");
    port.collect_garbage();

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&input)),
        linear_to_db(peak(&input))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&output)),
        linear_to_db(peak(&output))
    );
    let bypassed = port.mismatched_periods();
    if bypassed > 0 {
        println!("  Bypassed periods: {bypassed}");
    }

    println!("\nWriting {}...", args.output.display());
    write_wav_frames(&args.output, &output, sample_rate, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

fn rms(frames: &[SampleFrame]) -> f32 {
    if frames.is_empty() {
        return 0.0;
    }
    let sum: f32 = frames
        .iter()
        .map(|f| f.left * f.left + f.right * f.right)
        .sum();
    (sum / (2 * frames.len()) as f32).sqrt()
}

fn peak(frames: &[SampleFrame]) -> f32 {
    frames
        .iter()
        .map(|f| f.left.abs().max(f.right.abs()))
        .fold(0.0, f32::max)
}

fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.max(1e-10).log10()
}
