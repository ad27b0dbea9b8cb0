//! Episode controller.
//!
//! Drives one scheduling episode as a step-wise decision process:
//! `reset` → repeated `step(action)` until `done`.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --reset--> Running --step (done)--> Terminated --reset--> Running
//! ```
//!
//! Each step decodes the action against the cursor student, validates and
//! commits the candidate, advances the cursor past students who reached
//! their weekly target, shapes the reward and encodes the next observation.
//!
//! # Determinism
//!
//! The only randomness is the sampled observation context, drawn from a
//! `ChaCha8Rng` owned by the controller and seeded from [`EnvConfig::seed`].
//! Two controllers with the same seed, registry and action sequence produce
//! identical trajectories.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EnvConfig;
use crate::constraints::{self, EntityKind, Rejection};
use crate::error::{EpisodeError, Error};
use crate::models::{Action, Lesson, Room, ScheduledLesson, Student, Teacher};
use crate::observation::{Observation, ObservationEncoder, SampledContext};
use crate::registry::{EntityRegistry, StudentRecord};
use crate::reward::{EventTag, RewardShaper, StepOutcome};
use crate::schedule::{CommitOutcome, ScheduleState};

/// `StepInfo::error` text for caller index errors.
pub const INDEX_OUT_OF_BOUNDS: &str = "index out of bounds";

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeState {
    /// Constructed, never reset.
    Idle,
    /// Accepting steps.
    Running,
    /// Done or truncated; `reset` required.
    Terminated,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every student reached their weekly target.
    Completed,
    /// The step budget ran out.
    Truncated,
    /// An action addressed an index outside the registry.
    CallerError,
}

/// An action index that does not address a registry entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("index out of bounds: {kind:?} {index} (known: {bound})")]
pub struct IndexOutOfBounds {
    pub kind: EntityKind,
    pub index: usize,
    pub bound: usize,
}

/// Diagnostics returned with every observation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepInfo {
    /// Steps taken this episode.
    pub step: usize,
    /// Student index under consideration after the step.
    pub cursor: usize,
    /// Fraction of students with at least one lesson.
    pub coverage: f64,
    /// Students at or above their weekly target.
    pub fulfilled: usize,
    /// The lesson committed by this step, if any.
    pub new_lesson: Option<ScheduledLesson>,
    /// Why the candidate was not committed, if it was not.
    pub rejection: Option<Rejection>,
    /// Caller error text.
    pub error: Option<String>,
    /// Reward components.
    pub tags: Vec<EventTag>,
    /// Set on the final step of an episode.
    pub termination: Option<Termination>,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

/// The scheduling episode state machine.
///
/// # Example
///
/// ```
/// use lesson_env::config::EnvConfig;
/// use lesson_env::env::EpisodeController;
/// use lesson_env::models::{Action, Room, Student, Teacher};
///
/// let teachers = vec![Teacher::new("T1").with_instrument("Piano")];
/// let students = vec![Student::new("S1", "Piano")];
/// let rooms = vec![Room::new("R1").with_equipment("Piano")];
///
/// let mut env =
///     EpisodeController::from_tables(&teachers, &students, &rooms, EnvConfig::small()).unwrap();
/// let (_obs, _info) = env.reset(None);
/// let t = env.step(Action::new(0, 0, 0)).unwrap();
/// assert!(t.done);
/// assert_eq!(t.info.coverage, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct EpisodeController {
    registry: Arc<EntityRegistry>,
    config: EnvConfig,
    schedule: ScheduleState,
    encoder: ObservationEncoder,
    shaper: RewardShaper,
    rng: ChaCha8Rng,
    state: EpisodeState,
    cursor: usize,
    steps: usize,
}

impl EpisodeController {
    /// Creates a controller over a shared registry.
    ///
    /// # Errors
    /// `InvalidConfig` if the config fails validation or its limits differ
    /// from the ones the registry was built with.
    pub fn new(registry: Arc<EntityRegistry>, config: EnvConfig) -> Result<Self, Error> {
        config.validate()?;
        if registry.limits() != &config.limits {
            return Err(Error::InvalidConfig(
                "config limits differ from the registry's limits".into(),
            ));
        }
        Ok(Self {
            schedule: ScheduleState::new(&registry),
            encoder: ObservationEncoder::new(config.layout, &config.limits),
            shaper: RewardShaper::new(config.rewards.clone()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            state: EpisodeState::Idle,
            cursor: 0,
            steps: 0,
            registry,
            config,
        })
    }

    /// Builds a registry from entity tables with `config.limits`, then a controller.
    pub fn from_tables(
        teachers: &[Teacher],
        students: &[Student],
        rooms: &[Room],
        config: EnvConfig,
    ) -> Result<Self, Error> {
        let registry =
            EntityRegistry::load_with(teachers, students, rooms, config.limits.clone())?;
        Self::new(Arc::new(registry), config)
    }

    /// Starts a new episode.
    ///
    /// `seed` reseeds the controller RNG; `None` continues the current stream.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        self.schedule.clear();
        self.steps = 0;
        self.cursor = 0;
        self.advance_cursor();
        self.state = EpisodeState::Running;
        info!(
            students = self.registry.student_count(),
            max_steps = self.config.max_steps,
            "episode reset"
        );
        (self.observe(), self.info())
    }

    /// Applies one action.
    ///
    /// # Errors
    /// `NotRunning` before the first `reset` or after the episode ended.
    /// Every other failure is reported through the transition's reward and info.
    pub fn step(&mut self, action: Action) -> Result<Transition, EpisodeError> {
        if self.state != EpisodeState::Running {
            return Err(EpisodeError::NotRunning(self.state));
        }
        self.steps += 1;

        let mut info_error = None;
        let mut new_lesson = None;
        let outcome = match self.decode_action(action) {
            Err(e) => {
                warn!(step = self.steps, error = %e, "action rejected");
                info_error = Some(INDEX_OUT_OF_BOUNDS.to_string());
                StepOutcome::OutOfBounds
            }
            Ok(candidate) => match self.schedule.try_commit(candidate, &self.registry) {
                CommitOutcome::Committed(receipt) => {
                    debug!(step = self.steps, lesson = ?candidate, "lesson committed");
                    new_lesson = self.registry.describe(&candidate);
                    self.advance_cursor();
                    StepOutcome::Committed(receipt)
                }
                CommitOutcome::Rejected(rejection) => {
                    debug!(
                        step = self.steps,
                        lesson = ?candidate,
                        %rejection,
                        "candidate rejected"
                    );
                    StepOutcome::Rejected(rejection)
                }
            },
        };

        let shaped = self.shaper.shape(&outcome);
        let budget_spent = self.steps >= self.config.max_steps;
        let completed = self.schedule.all_fulfilled();
        let caller_error = matches!(outcome, StepOutcome::OutOfBounds);

        let termination = if caller_error {
            Some(Termination::CallerError)
        } else if completed {
            Some(Termination::Completed)
        } else if budget_spent {
            Some(Termination::Truncated)
        } else {
            None
        };
        let done = termination.is_some();
        let truncated = budget_spent;

        if let Some(reason) = termination {
            self.state = EpisodeState::Terminated;
            info!(
                steps = self.steps,
                lessons = self.schedule.len(),
                coverage = self.schedule.coverage(),
                ?reason,
                "episode ended"
            );
        }

        let mut info = self.info();
        info.new_lesson = new_lesson;
        info.rejection = match outcome {
            StepOutcome::Rejected(r) => Some(r),
            _ => None,
        };
        info.error = info_error;
        info.tags = shaped.tags;
        info.termination = termination;

        Ok(Transition {
            observation: self.observe(),
            reward: shaped.reward,
            done,
            truncated,
            info,
        })
    }

    /// Decodes an action into a candidate lesson for the cursor student.
    ///
    /// Pure: neither the cursor nor the RNG is touched.
    pub fn decode_action(&self, action: Action) -> Result<Lesson, IndexOutOfBounds> {
        let checks = [
            (EntityKind::Teacher, action.teacher, self.registry.teacher_count()),
            (EntityKind::Room, action.room, self.registry.room_count()),
            (
                EntityKind::TimeSlot,
                action.time_slot,
                self.registry.limits().time_slots,
            ),
            (EntityKind::Student, self.cursor, self.registry.student_count()),
        ];
        for (kind, index, bound) in checks {
            if index >= bound {
                return Err(IndexOutOfBounds { kind, index, bound });
            }
        }
        Ok(Lesson::new(
            action.teacher,
            self.cursor,
            action.room,
            action.time_slot,
        ))
    }

    /// Legal actions for the cursor student, slot-major.
    pub fn legal_actions(&self) -> Vec<Action> {
        constraints::legal_candidates(self.cursor, &self.registry, &self.schedule)
            .map(|l| Action::new(l.teacher, l.room, l.time_slot))
            .collect()
    }

    /// Action-space bounds `[max_teachers, max_rooms, time_slots]`.
    pub fn action_bounds(&self) -> [usize; 3] {
        let limits = self.registry.limits();
        [limits.max_teachers, limits.max_rooms, limits.time_slots]
    }

    /// Observation length.
    pub fn observation_len(&self) -> usize {
        self.encoder.len()
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn schedule(&self) -> &ScheduleState {
        &self.schedule
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The student under consideration, if any remain.
    pub fn current_student(&self) -> Option<&StudentRecord> {
        self.registry.student(self.cursor)
    }

    /// Committed lessons with entity ids, in commit order.
    pub fn scheduled_lessons(&self) -> Vec<ScheduledLesson> {
        self.schedule.export(&self.registry)
    }

    fn advance_cursor(&mut self) {
        while self.cursor < self.registry.student_count()
            && self.schedule.student_lesson_count(self.cursor)
                >= self.registry.target_for(self.cursor)
        {
            self.cursor += 1;
        }
    }

    fn observe(&mut self) -> Observation {
        let context = self
            .encoder
            .wants_context()
            .then(|| SampledContext::sample(&self.registry, &mut self.rng));
        self.encoder
            .encode(self.cursor, &self.registry, &self.schedule, context)
    }

    fn info(&self) -> StepInfo {
        StepInfo {
            step: self.steps,
            cursor: self.cursor,
            coverage: self.schedule.coverage(),
            fulfilled: self.schedule.fulfilled_students(),
            ..StepInfo::default()
        }
    }
}
