//! # Double-Buffered Parameter Store
//!
//! ```text
//!                 ┌──────────────────────────────────┐
//!                 │          ParameterStore          │
//!                 │                                  │
//!                 │  ┌──────────────┐  ┌──────────┐  │
//!                 │  │CloudSettings │  │Arc<Param │  │
//!                 │  │ (write side) │  │   Set>   │  │
//!                 │  └──────┬───────┘  └────┬─────┘  │
//!                 │         └── publish() ──┘        │
//!                 └──────────────────────────────────┘
//!                       ▲                   │
//!                 edit()/replace()     snapshot()
//!                    (UI)          (render, once/frame)
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::params::{CloudSettings, ParameterSet};

/// A frame's view of the parameters.
///
/// Holding a snapshot keeps its `ParameterSet` alive even if the UI publishes
/// again mid-frame.
#[derive(Clone, Debug)]
pub struct ParameterSnapshot {
    /// Publication counter at the time of the snapshot.
    pub generation: u64,
    /// The immutable parameters for this frame.
    pub params: Arc<ParameterSet>,
}

/// Double-buffered parameter hand-off between the UI and render work.
#[derive(Debug)]
pub struct ParameterStore {
    /// Settings as currently edited (write side).
    pending: Mutex<CloudSettings>,
    /// Last published parameters (read side).
    published: RwLock<Arc<ParameterSet>>,
    /// Number of publications so far.
    generation: AtomicU64,
    /// Edits made since the last publication.
    dirty: AtomicBool,
}

impl ParameterStore {
    /// Creates a store whose first snapshot reflects `settings`.
    #[must_use]
    pub fn new(settings: CloudSettings) -> Self {
        Self {
            published: RwLock::new(Arc::new(ParameterSet::from_settings(&settings))),
            pending: Mutex::new(settings),
            generation: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    /// Edits the pending settings in place.
    ///
    /// Edits are invisible to render work until [`publish`](Self::publish).
    pub fn edit<F>(&self, f: F)
    where
        F: FnOnce(&mut CloudSettings),
    {
        let mut pending = self.pending.lock();
        f(&mut pending);
        self.dirty.store(true, Ordering::Release);
    }

    /// Replaces the pending settings wholesale.
    pub fn replace(&self, settings: CloudSettings) {
        self.edit(|pending| *pending = settings);
    }

    /// Copy of the pending (possibly unpublished) settings.
    #[must_use]
    pub fn pending(&self) -> CloudSettings {
        *self.pending.lock()
    }

    /// True when edits have been made since the last publication.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Number of publications so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Derives a new `ParameterSet` from the pending settings and makes it the
    /// read side. Returns the new generation.
    pub fn publish(&self) -> u64 {
        let settings = self.pending.lock();
        let params = Arc::new(ParameterSet::from_settings(&settings));

        let mut published = self.published.write();
        *published = params;
        self.dirty.store(false, Ordering::Release);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(published);
        drop(settings);

        tracing::debug!("Published cloud parameters (generation {generation})");
        generation
    }

    /// Publishes only when there are unpublished edits.
    ///
    /// Returns the generation now visible to render work.
    pub fn publish_if_dirty(&self) -> u64 {
        if self.is_dirty() {
            self.publish()
        } else {
            self.generation()
        }
    }

    /// Takes the read side for one frame.
    #[must_use]
    pub fn snapshot(&self) -> ParameterSnapshot {
        let published = self.published.read();
        ParameterSnapshot {
            generation: self.generation.load(Ordering::Acquire),
            params: Arc::clone(&published),
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(CloudSettings::default())
    }
}
