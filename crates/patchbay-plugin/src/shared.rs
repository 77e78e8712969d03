//! Thread-safe state shared by a [`PluginPort`](crate::PluginPort) and its
//! [`AudioProcessor`](crate::AudioProcessor).
//!
//! The committed [`Topology`] is published via `ArcSwap` for wait-free reads
//! from the audio thread. Reshaped working buffers travel through a
//! `Mutex`-guarded handoff slot: the control thread locks to offer them, the
//! audio thread `try_lock`s at period start and swaps them in, leaving its
//! old buffers in the same slot so they are freed on the control thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use patchbay_core::{Sample, Topology, WorkingBuffers};

/// Buffers for a new period shape, with the sample rate they were made for.
pub(crate) struct PeriodBuffers<S: Sample> {
    pub(crate) buffers: WorkingBuffers<S>,
    pub(crate) sample_rate: u32,
}

struct Handoff<S: Sample> {
    /// Offered by the control thread, not yet adopted.
    incoming: Option<PeriodBuffers<S>>,
    /// Replaced by the audio thread, not yet freed.
    retired: Option<WorkingBuffers<S>>,
}

struct PortSharedData<S: Sample> {
    topology: ArcSwap<Topology>,
    handoff: Mutex<Handoff<S>>,
    /// Periods skipped because buffers and topology disagreed.
    mismatched_periods: AtomicU64,
    /// Set by the audio thread while the effect is asleep.
    sleeping: AtomicBool,
    /// Set by the control thread to wake a sleeping effect.
    wake_requested: AtomicBool,
}

/// Shared state accessible from the control and audio threads.
///
/// # Thread Safety
///
/// - **Topology**: `ArcSwap::load()` is wait-free.
/// - **Buffers**: `Mutex`. The control thread locks, the audio thread only
///   `try_lock`s and retries next period when contended.
/// - **Counters and flags**: atomics.
pub struct PortShared<S: Sample = f32> {
    inner: Arc<PortSharedData<S>>,
}

impl<S: Sample> Clone for PortShared<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Sample> PortShared<S> {
    /// Shared state starting at `topology`.
    pub fn new(topology: Arc<Topology>) -> Self {
        Self {
            inner: Arc::new(PortSharedData {
                topology: ArcSwap::new(topology),
                handoff: Mutex::new(Handoff {
                    incoming: None,
                    retired: None,
                }),
                mismatched_periods: AtomicU64::new(0),
                sleeping: AtomicBool::new(false),
                wake_requested: AtomicBool::new(false),
            }),
        }
    }

    // ── Topology ────────────────────────────────────────────────────────────

    /// The most recently published topology.
    pub fn topology(&self) -> Arc<Topology> {
        self.inner.topology.load_full()
    }

    /// Generation of the published topology, without touching reference
    /// counts.
    pub fn topology_generation(&self) -> u64 {
        self.inner.topology.load().generation()
    }

    pub(crate) fn publish_topology(&self, topology: Arc<Topology>) {
        self.inner.topology.store(topology);
    }

    // ── Buffers ─────────────────────────────────────────────────────────────

    /// Offers buffers for adoption (control thread). Returns whatever the
    /// slot held before so the caller drops it here.
    pub(crate) fn offer_buffers(
        &self,
        period: PeriodBuffers<S>,
    ) -> (Option<PeriodBuffers<S>>, Option<WorkingBuffers<S>>) {
        let mut handoff = self.inner.handoff.lock();
        let stale = handoff.incoming.replace(period);
        (stale, handoff.retired.take())
    }

    /// Swaps offered buffers into `current` (audio thread, non-blocking).
    ///
    /// Returns the sample rate of the adopted buffers, or `None` when nothing
    /// was adopted: no offer, lock contended, or the previous buffers have
    /// not been collected yet.
    pub(crate) fn try_adopt_buffers(&self, current: &mut WorkingBuffers<S>) -> Option<u32> {
        let mut handoff = self.inner.handoff.try_lock()?;
        if handoff.retired.is_some() {
            return None;
        }
        let period = handoff.incoming.take()?;
        handoff.retired = Some(std::mem::replace(current, period.buffers));
        Some(period.sample_rate)
    }

    /// Frees buffers the audio thread has replaced (control thread).
    ///
    /// Returns `true` if anything was freed.
    pub fn collect_garbage(&self) -> bool {
        let retired = self.inner.handoff.lock().retired.take();
        retired.is_some()
    }

    /// `true` while offered buffers wait to be adopted.
    pub fn has_pending_buffers(&self) -> bool {
        self.inner.handoff.lock().incoming.is_some()
    }

    // ── Counters and flags ──────────────────────────────────────────────────

    /// Periods bypassed because buffers did not fit the topology.
    pub fn mismatched_periods(&self) -> u64 {
        self.inner.mismatched_periods.load(Ordering::Relaxed)
    }

    pub(crate) fn record_mismatch(&self) {
        self.inner.mismatched_periods.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether the effect is currently asleep.
    pub fn is_sleeping(&self) -> bool {
        self.inner.sleeping.load(Ordering::Acquire)
    }

    pub(crate) fn set_sleeping(&self, sleeping: bool) {
        self.inner.sleeping.store(sleeping, Ordering::Release);
    }

    /// Asks a sleeping effect to resume next period.
    pub fn request_wake(&self) {
        self.inner.wake_requested.store(true, Ordering::Release);
    }

    pub(crate) fn take_wake_request(&self) -> bool {
        self.inner.wake_requested.swap(false, Ordering::AcqRel)
    }
}
