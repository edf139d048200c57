//! Background work advanced by idle ticks.
//!
//! Edits that the real editor finishes asynchronously are queued here and
//! complete after a configured number of ticks. Each tick:
//! 1. Advances asset registrations and level loads
//! 2. Starts a pending propagation cycle
//! 3. Ends the cycle once its ticks ran out and no asset is still processing

use std::collections::VecDeque;

use stagehand_foundation::EntityId;

// =============================================================================
// Jobs
// =============================================================================

/// A template whose other instances must be rebuilt when propagation ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rebuild {
    /// Template path.
    pub template: String,
    /// The instance the template was saved from; left as is.
    pub source: EntityId,
}

/// A queued unit of background work.
#[derive(Clone, Debug)]
pub enum Job {
    /// A propagation cycle.
    Propagation {
        /// Whether `propagation_begin` was already emitted.
        started: bool,
        /// Ticks left before the cycle may end.
        remaining: u32,
        /// Templates to push to their instances at the end.
        rebuild: Vec<Rebuild>,
    },
    /// A written template becoming visible in the asset catalog.
    AssetRegistration {
        /// Template path.
        path: String,
        /// Ticks left.
        remaining: u32,
    },
    /// The current level finishing its load.
    LevelLoad {
        /// Ticks left.
        remaining: u32,
    },
}

/// Something that happened during a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkEvent {
    /// A propagation cycle started.
    PropagationBegan,
    /// A propagation cycle ended.
    PropagationEnded {
        /// Templates to push to their instances.
        rebuild: Vec<Rebuild>,
    },
    /// A path is now registered in the asset catalog.
    AssetReady(String),
    /// The level finished loading.
    LevelLoaded,
}

// =============================================================================
// Work Queue
// =============================================================================

/// Queue of background jobs.
#[derive(Clone, Debug, Default)]
pub struct WorkQueue {
    jobs: VecDeque<Job>,
}

impl WorkQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Returns true while a propagation cycle is queued or running.
    #[must_use]
    pub fn is_propagating(&self) -> bool {
        self.jobs
            .iter()
            .any(|j| matches!(j, Job::Propagation { .. }))
    }

    /// Returns true while a level load is queued.
    #[must_use]
    pub fn is_loading_level(&self) -> bool {
        self.jobs.iter().any(|j| matches!(j, Job::LevelLoad { .. }))
    }

    /// Queues a propagation cycle, folding into one that has not ended yet.
    pub fn queue_propagation(&mut self, ticks: u32, rebuild: Option<Rebuild>) {
        let ticks = ticks.max(1);
        for job in &mut self.jobs {
            if let Job::Propagation {
                remaining,
                rebuild: pending,
                ..
            } = job
            {
                *remaining = (*remaining).max(ticks);
                pending.extend(rebuild);
                return;
            }
        }
        self.jobs.push_back(Job::Propagation {
            started: false,
            remaining: ticks,
            rebuild: rebuild.into_iter().collect(),
        });
    }

    /// Queues registration of a written asset.
    pub fn queue_asset(&mut self, path: impl Into<String>, ticks: u32) {
        self.jobs.push_back(Job::AssetRegistration {
            path: path.into(),
            remaining: ticks.max(1),
        });
    }

    /// Queues the end of a level load, replacing any load already queued.
    pub fn queue_level_load(&mut self, ticks: u32) {
        self.jobs.retain(|j| !matches!(j, Job::LevelLoad { .. }));
        self.jobs.push_back(Job::LevelLoad {
            remaining: ticks.max(1),
        });
    }

    /// Drops work tied to the open scene. Asset registrations survive.
    pub fn clear_scene_work(&mut self) {
        self.jobs
            .retain(|j| matches!(j, Job::AssetRegistration { .. }));
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Advances every job by one tick and returns what completed, in order.
    pub fn advance(&mut self) -> Vec<WorkEvent> {
        let mut events = Vec::new();

        // Assets and level loads first, so a propagation ending on this tick
        // sees their results.
        self.jobs.retain_mut(|job| match job {
            Job::AssetRegistration { path, remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    events.push(WorkEvent::AssetReady(std::mem::take(path)));
                    false
                } else {
                    true
                }
            }
            Job::LevelLoad { remaining } => {
                *remaining -= 1;
                if *remaining == 0 {
                    events.push(WorkEvent::LevelLoaded);
                    false
                } else {
                    true
                }
            }
            Job::Propagation { .. } => true,
        });

        let assets_pending = self
            .jobs
            .iter()
            .any(|j| matches!(j, Job::AssetRegistration { .. }));

        self.jobs.retain_mut(|job| {
            let Job::Propagation {
                started,
                remaining,
                rebuild,
            } = job
            else {
                return true;
            };
            if !*started {
                *started = true;
                events.push(WorkEvent::PropagationBegan);
            }
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 && !assets_pending {
                events.push(WorkEvent::PropagationEnded {
                    rebuild: std::mem::take(rebuild),
                });
                false
            } else {
                true
            }
        });

        events
    }
}
