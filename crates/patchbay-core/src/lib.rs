//! Patchbay Core - plugin pin-connector routing
//!
//! This crate maps a host track's audio channels onto the input and output
//! channels of an audio plugin, mixes and normalizes overlapping routes, and
//! leaves unrouted host channels untouched. Routing runs inside the real-time
//! audio callback with zero allocation.
//!
//! # Core Abstractions
//!
//! ## Configuration (control thread)
//!
//! - [`PinConnector`] - Both [`ConnectionMatrix`]es of a plugin, channel-count
//!   negotiation and default connections
//! - [`ChannelCount`] - Declared plugin channel count, or [`ChannelCount::Unknown`]
//! - [`Topology`] - Immutable snapshot committed after every connector change
//!
//! ## Routing (audio thread)
//!
//! - [`Router`] - Host ↔ plugin routing for split and interleaved layouts,
//!   with optional [`WetDry`] blending
//! - [`WorkingBuffers`] - Plugin-side scratch buffers shaped by a [`PluginConfig`]
//! - [`AudioBus`] - Host channel pairs for one period
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! patchbay-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{AudioBus, ChannelCount, PinConnector, SampleFrame, SplitBuffer, SplitBufferMut};
//!
//! let pc = PinConnector::with_default_track_channels(ChannelCount::Count(2), ChannelCount::Count(2));
//! let router = pc.router();
//!
//! let mut host = [SampleFrame::new(0.25, -0.5); 64];
//! let mut pairs: [&mut [SampleFrame]; 1] = [&mut host];
//! let mut bus = AudioBus::new(&mut pairs, 64);
//!
//! let mut plugin = vec![0.0_f32; 2 * 64];
//! router.route_to_plugin(&bus, SplitBufferMut::new(&mut plugin, 2, 64));
//! for s in plugin.iter_mut() {
//!     *s *= 2.0;
//! }
//! router.route_from_plugin(SplitBuffer::new(&plugin, 2, 64), &mut bus);
//!
//! assert_eq!(host[0], SampleFrame::new(0.5, -1.0));
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations, locks or logging in routing paths
//! - **Snapshot handoff**: The audio thread only ever sees a whole [`Topology`]
//! - **Dispatch once per pair**: Pin patterns select monomorphized kernels
//!   per period, never per sample

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod audio;
pub mod buffer;
pub mod channel;
pub mod connector;
pub mod error;
pub mod matrix;
pub mod router;
pub mod sample;
pub mod topology;

pub use audio::{AudioBus, AudioLayout, SplitBuffer, SplitBufferMut};
pub use buffer::{PluginBuffers, PluginConfig, WorkingBuffers};
pub use channel::{
    ChannelCount, DEFAULT_TRACK_CHANNELS, Direction, MAX_PLUGIN_CHANNELS, MAX_TRACK_CHANNELS,
};
pub use connector::PinConnector;
pub use error::PinError;
pub use matrix::ConnectionMatrix;
pub use router::{Router, WetDry};
pub use sample::{Sample, SampleFrame};
pub use topology::Topology;
