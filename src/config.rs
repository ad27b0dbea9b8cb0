//! Environment configuration.
//!
//! [`EnvConfig`] bundles everything fixed at construction time: action-space
//! bounds ([`Limits`]), the step budget, the observation feature layout, and
//! the reward scheme. All parts deserialize from JSON with defaults for
//! omitted fields.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Action-space bounds and scheduling constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Teacher index bound of the action space.
    pub max_teachers: usize,
    /// Student capacity of the observation masks.
    pub max_students: usize,
    /// Room index bound of the action space.
    pub max_rooms: usize,
    /// Number of discrete time slots in the horizon.
    pub time_slots: usize,
    /// Hours consumed from a teacher's weekly cap by one lesson.
    pub lesson_hours: f64,
    /// Replaces every student's `lessons_per_week` when set.
    pub target_lessons: Option<u32>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_teachers: 25,
            max_students: 1000,
            max_rooms: 25,
            time_slots: 48,
            lesson_hours: 1.0,
            target_lessons: None,
        }
    }
}

impl Limits {
    /// Sets the entity count bounds.
    pub fn with_capacity(mut self, teachers: usize, students: usize, rooms: usize) -> Self {
        self.max_teachers = teachers;
        self.max_students = students;
        self.max_rooms = rooms;
        self
    }

    /// Sets the number of time slots.
    pub fn with_time_slots(mut self, time_slots: usize) -> Self {
        self.time_slots = time_slots;
        self
    }

    /// Sets the per-lesson duration in hours.
    pub fn with_lesson_hours(mut self, hours: f64) -> Self {
        self.lesson_hours = hours;
        self
    }

    /// Overrides every student's weekly target.
    pub fn with_target_lessons(mut self, target: u32) -> Self {
        self.target_lessons = Some(target);
        self
    }
}

/// Observation feature layout. The base student block is always present;
/// the other blocks are optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationLayout {
    /// Per-teacher flag: teaches the cursor student's instrument.
    pub teacher_mask: bool,
    /// Per-room flag: equipped for the cursor student's instrument.
    pub room_mask: bool,
    /// Per-student flag: has at least one committed lesson.
    pub scheduled_mask: bool,
    /// Randomly sampled teacher/room/slot context drawn from the controller RNG.
    pub sampled_context: bool,
    /// Lesson target that maps to 1.0; larger targets saturate.
    pub target_ceiling: u32,
    /// Weekly hours that map to 1.0; larger caps saturate.
    pub hours_ceiling: f64,
}

impl Default for ObservationLayout {
    fn default() -> Self {
        Self {
            teacher_mask: true,
            room_mask: true,
            scheduled_mask: false,
            sampled_context: false,
            target_ceiling: 3,
            hours_ceiling: 15.0,
        }
    }
}

impl ObservationLayout {
    /// Width of the always-present student block.
    pub const STUDENT_FEATURES: usize = 4;
    /// Width of the sampled context block.
    pub const CONTEXT_FEATURES: usize = 6;

    /// Only the student block.
    pub fn minimal() -> Self {
        Self {
            teacher_mask: false,
            room_mask: false,
            ..Self::default()
        }
    }

    /// Every block enabled.
    pub fn full() -> Self {
        Self {
            scheduled_mask: true,
            sampled_context: true,
            ..Self::default()
        }
    }

    /// Observation length under `limits`.
    pub fn len(&self, limits: &Limits) -> usize {
        let mut n = Self::STUDENT_FEATURES;
        if self.teacher_mask {
            n += limits.max_teachers;
        }
        if self.room_mask {
            n += limits.max_rooms;
        }
        if self.scheduled_mask {
            n += limits.max_students;
        }
        if self.sampled_context {
            n += Self::CONTEXT_FEATURES;
        }
        n
    }
}

/// Reward magnitudes.
///
/// The defaults are the values existing trained policies were shaped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardScheme {
    /// Any novel commit.
    pub commit: f64,
    /// First committed lesson of the student this episode.
    pub first_lesson: f64,
    /// Student was below target before the commit.
    pub progress: f64,
    /// First lesson between this teacher and student.
    pub new_pair: f64,
    /// Every student at or above target after the step.
    pub full_coverage: f64,
    /// Resubmission of an already committed lesson.
    pub duplicate: f64,
    /// Candidate rejected by the constraint validator.
    pub violation: f64,
    /// Action index outside the registry.
    pub out_of_bounds: f64,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            commit: 1.0,
            first_lesson: 2.0,
            progress: 1.0,
            new_pair: 0.5,
            full_coverage: 5.0,
            duplicate: -1.0,
            violation: -10.0,
            out_of_bounds: -1.0,
        }
    }
}

/// Complete environment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Action-space bounds and scheduling constants.
    pub limits: Limits,
    /// Step budget per episode.
    pub max_steps: usize,
    /// Seed for the controller RNG.
    pub seed: u64,
    /// Observation feature layout.
    pub layout: ObservationLayout,
    /// Reward magnitudes.
    pub rewards: RewardScheme,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            max_steps: 1000,
            seed: 42,
            layout: ObservationLayout::default(),
            rewards: RewardScheme::default(),
        }
    }
}

impl EnvConfig {
    /// Small bounds for unit tests and toy problems.
    pub fn small() -> Self {
        Self {
            limits: Limits::default().with_capacity(4, 8, 4).with_time_slots(8),
            max_steps: 50,
            ..Self::default()
        }
    }

    /// Parses a JSON document; omitted fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the step budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the observation layout.
    pub fn with_layout(mut self, layout: ObservationLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the reward scheme.
    pub fn with_rewards(mut self, rewards: RewardScheme) -> Self {
        self.rewards = rewards;
        self
    }

    /// Checks controller-level settings.
    ///
    /// Entity-dependent limits are checked when the registry is built.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_steps == 0 {
            return Err(Error::InvalidConfig("max_steps must be positive".into()));
        }
        if self.layout.target_ceiling == 0 {
            return Err(Error::InvalidConfig(
                "target_ceiling must be positive".into(),
            ));
        }
        if !(self.layout.hours_ceiling > 0.0) {
            return Err(Error::InvalidConfig("hours_ceiling must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_len() {
        let limits = Limits::default().with_capacity(3, 10, 2);
        assert_eq!(ObservationLayout::minimal().len(&limits), 4);
        assert_eq!(ObservationLayout::default().len(&limits), 4 + 3 + 2);
        assert_eq!(ObservationLayout::full().len(&limits), 4 + 3 + 2 + 10 + 6);
    }

    #[test]
    fn test_reward_defaults() {
        let r = RewardScheme::default();
        assert!((r.commit - 1.0).abs() < 1e-10);
        assert!((r.violation + 10.0).abs() < 1e-10);
        assert!((r.full_coverage - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            EnvConfig::from_json_str(r#"{"max_steps": 20, "limits": {"time_slots": 12}}"#)
                .unwrap();
        assert_eq!(config.max_steps, 20);
        assert_eq!(config.limits.time_slots, 12);
        assert_eq!(config.limits.max_teachers, 25);
        assert_eq!(config.rewards, RewardScheme::default());
    }

    #[test]
    fn test_from_json_rejects_zero_budget() {
        let err = EnvConfig::from_json_str(r#"{"max_steps": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_malformed() {
        let err = EnvConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
