//! Thread-safe plugin port for patchbay pin connectors.
//!
//! This crate puts a [`PinConnector`](patchbay_core::PinConnector) between a
//! host track and an [`AudioPlugin`], split across the two threads a plugin
//! host runs:
//!
//! | Thread | Type | Does |
//! |--------|------|------|
//! | control | [`PluginPort`] | pin edits, channel counts, period changes, freeing |
//! | audio | [`AudioProcessor`] | routing, processing, auto-quit |
//! | both | [`PortShared`] | topology snapshot, buffer handoff, counters |
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{AudioBus, PluginBuffers, PluginConfig, SampleFrame, WetDry};
//! use patchbay_plugin::{AudioPlugin, PluginKind, PluginPort, ProcessStatus};
//!
//! struct Invert;
//!
//! impl AudioPlugin for Invert {
//!     type Sample = f32;
//!     fn kind(&self) -> PluginKind { PluginKind::Effect }
//!     fn config(&self) -> PluginConfig { PluginConfig::STEREO_EFFECT }
//!     fn process(&mut self, buffers: PluginBuffers<'_, f32>) -> ProcessStatus {
//!         if let PluginBuffers::InterleavedInplace(frames) = buffers {
//!             for f in frames.iter_mut() {
//!                 *f = f.scaled(-1.0);
//!             }
//!         }
//!         ProcessStatus::Continue
//!     }
//! }
//!
//! let port = PluginPort::for_plugin(&Invert, 2, 128).unwrap();
//! let mut processor = port.processor(Invert).unwrap();
//!
//! let mut host = [SampleFrame::new(0.5, 0.25); 128];
//! let mut pairs: [&mut [SampleFrame]; 1] = [&mut host];
//! let mut bus = AudioBus::new(&mut pairs, 128);
//! processor.process_effect(&mut bus, WetDry::FULL_WET);
//!
//! assert_eq!(host[0], SampleFrame::new(-0.5, -0.25));
//! ```

pub mod gate;
pub mod plugin;
pub mod port;
pub mod processor;
pub mod shared;

pub use gate::SleepGate;
pub use plugin::{AudioPlugin, PluginKind, ProcessStatus};
pub use port::{DEFAULT_SAMPLE_RATE, PluginPort};
pub use processor::AudioProcessor;
pub use shared::PortShared;
