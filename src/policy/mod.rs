//! Scheduling policies.
//!
//! A policy maps the current episode to the next action. Two baselines ship
//! with the crate; learned agents plug in through the same trait.
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | [`RandomPolicy`] | Uniform over the known entity indices (or the whole action space) |
//! | [`FirstFitPolicy`] | First legal teacher/room/slot for the cursor student, slot-major |
//!
//! # Usage
//!
//! ```
//! use lesson_env::config::EnvConfig;
//! use lesson_env::env::EpisodeController;
//! use lesson_env::models::{Room, Student, Teacher};
//! use lesson_env::policy::{run_episode, FirstFitPolicy};
//!
//! let teachers = vec![Teacher::new("T1").with_instrument("Guitar")];
//! let students = vec![Student::new("S1", "Guitar").with_lessons_per_week(2)];
//! let rooms = vec![Room::new("R1").with_equipment("Guitar")];
//! let mut env =
//!     EpisodeController::from_tables(&teachers, &students, &rooms, EnvConfig::small()).unwrap();
//!
//! let summary = run_episode(&mut env, &mut FirstFitPolicy, Some(1)).unwrap();
//! assert_eq!(summary.commits, 2);
//! ```

mod rollout;

pub use rollout::{run_episode, EpisodeSummary, SummaryStats};

use std::fmt::Debug;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::env::EpisodeController;
use crate::models::Action;

/// Chooses the next action for a running episode.
pub trait SchedulingPolicy: Debug {
    /// Policy name (e.g., "random", "first-fit").
    fn name(&self) -> &'static str;

    /// Selects an action given the controller and its latest observation.
    fn select(&mut self, env: &EpisodeController, observation: &[f32]) -> Action;
}

/// Uniformly random actions from a seeded stream.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: ChaCha8Rng,
    full_action_space: bool,
}

impl RandomPolicy {
    /// Samples within the registry's entity counts.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            full_action_space: false,
        }
    }

    /// Samples within the configured action-space bounds instead, so
    /// indices past the registry (and the out-of-bounds path) are reachable.
    pub fn over_action_space(mut self) -> Self {
        self.full_action_space = true;
        self
    }
}

impl SchedulingPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select(&mut self, env: &EpisodeController, _observation: &[f32]) -> Action {
        let [teachers, rooms, slots] = if self.full_action_space {
            env.action_bounds()
        } else {
            let reg = env.registry();
            [reg.teacher_count(), reg.room_count(), reg.limits().time_slots]
        };
        Action::new(
            self.rng.random_range(0..teachers.max(1)),
            self.rng.random_range(0..rooms.max(1)),
            self.rng.random_range(0..slots.max(1)),
        )
    }
}

/// Greedy baseline: the first legal candidate for the cursor student.
///
/// When the cursor student has no legal placement the policy falls back to
/// `(0, 0, 0)`, which the controller rejects and penalizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitPolicy;

impl SchedulingPolicy for FirstFitPolicy {
    fn name(&self) -> &'static str {
        "first-fit"
    }

    fn select(&mut self, env: &EpisodeController, _observation: &[f32]) -> Action {
        env.legal_actions().first().copied().unwrap_or_default()
    }
}
