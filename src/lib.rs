//! Music-lesson scheduling environment for reinforcement learning.
//!
//! Models the weekly assignment of students to teachers, practice rooms and
//! discrete time slots as an episodic decision process. A decision-maker
//! picks a teacher/room/slot for the student under the cursor; the
//! environment validates the candidate against hard constraints, commits it
//! if legal, and returns a shaped reward with a fixed-shape observation.
//!
//! # Modules
//!
//! - **`models`**: Input rows (`Teacher`, `Student`, `Room`), instrument and
//!   skill vocabularies, `Lesson`, `Action`
//! - **`validation`**: Input integrity checks (duplicate IDs, vocabulary, caps)
//! - **`registry`**: Immutable, indexed entity tables shared across episodes
//! - **`schedule`**: Committed lessons with per-teacher/student/room/slot indices
//! - **`constraints`**: Hard-constraint checks for a candidate lesson
//! - **`observation`**: Fixed-length feature vector encoding
//! - **`reward`**: Step outcome to scalar reward
//! - **`env`**: `EpisodeController`, the reset/step state machine
//! - **`policy`**: Baseline policies and rollouts
//! - **`tables`**: CSV entity tables and schedule export
//! - **`config`**: Limits, layout, reward scheme, step budget
//!
//! # Hard constraints
//!
//! | Constraint | Rule |
//! |------------|------|
//! | Instrument | Teacher teaches the student's instrument |
//! | Equipment | Room is equipped for the student's instrument |
//! | Double booking | One lesson per teacher, student and room per slot |
//! | Student cap | At most `lessons_per_week` lessons per student |
//! | Teacher cap | Scheduled hours within `max_hours_per_week` |
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction", Ch. 3

pub mod config;
pub mod constraints;
pub mod env;
pub mod error;
pub mod models;
pub mod observation;
pub mod policy;
pub mod registry;
pub mod reward;
pub mod schedule;
pub mod tables;
pub mod validation;

pub use config::{EnvConfig, Limits, ObservationLayout, RewardScheme};
pub use env::{EpisodeController, EpisodeState, StepInfo, Termination, Transition};
pub use error::{ConfigurationError, EpisodeError, Error};
pub use registry::EntityRegistry;
pub use schedule::ScheduleState;
