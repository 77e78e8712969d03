//! Stereo WAV file I/O on [`SampleFrame`]s.

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavWriter};
use patchbay_core::SampleFrame;
use std::path::Path;

/// Read a WAV file as stereo frames, returning the frames and sample rate.
///
/// Mono files are duplicated to both channels. Files with more than two
/// channels keep only the first two.
pub fn read_wav_frames(path: &Path) -> anyhow::Result<(Vec<SampleFrame>, u32)> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 {
        anyhow::bail!("{} has no channels", path.display());
    }

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let frames = samples
        .chunks_exact(channels)
        .map(|chunk| match chunk {
            [mono] => SampleFrame::new(*mono, *mono),
            [left, right, ..] => SampleFrame::new(*left, *right),
            [] => SampleFrame::SILENCE,
        })
        .collect();

    Ok((frames, spec.sample_rate))
}

/// Write stereo frames to a WAV file.
///
/// A bit depth of 32 writes float samples; 16 and 24 write clamped integers.
pub fn write_wav_frames(
    path: &Path,
    frames: &[SampleFrame],
    sample_rate: u32,
    bits_per_sample: u16,
) -> anyhow::Result<()> {
    let sample_format = match bits_per_sample {
        32 => SampleFormat::Float,
        16 | 24 => SampleFormat::Int,
        other => anyhow::bail!("Unsupported bit depth: {other} (expected 16, 24 or 32)"),
    };
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample,
        sample_format,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if sample_format == SampleFormat::Float {
        for frame in frames {
            writer.write_sample(frame.left)?;
            writer.write_sample(frame.right)?;
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for frame in frames {
            for s in [frame.left, frame.right] {
                writer.write_sample((s * max_val).clamp(-max_val, max_val - 1.0) as i32)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
