//! Observation encoding.
//!
//! Maps the decision context (cursor student, schedule, optional sampled
//! teacher/room/slot) to a flat `Vec<f32>` whose length is fixed by the
//! [`ObservationLayout`] and [`Limits`] at construction:
//!
//! ```text
//! [cursor, skill, target, fulfilled]            always
//! ++ [teacher_0 .. teacher_{max_teachers-1}]    teacher_mask
//! ++ [room_0 .. room_{max_rooms-1}]             room_mask
//! ++ [student_0 .. student_{max_students-1}]    scheduled_mask
//! ++ [teacher, room, slot, hours, inst, equip]  sampled_context
//! ```
//!
//! Every value lies in `[0, 1]`; counts above their ceiling saturate.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{Limits, ObservationLayout};
use crate::models::Instrument;
use crate::registry::EntityRegistry;
use crate::schedule::ScheduleState;

/// Feature vector handed to the decision-maker.
pub type Observation = Vec<f32>;

/// A teacher/room/slot triple drawn to describe one point of the action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledContext {
    pub teacher: usize,
    pub room: usize,
    pub time_slot: usize,
}

impl SampledContext {
    /// Draws a known teacher, known room and slot uniformly.
    pub fn sample<R: Rng>(registry: &EntityRegistry, rng: &mut R) -> Self {
        Self {
            teacher: rng.random_range(0..registry.teacher_count().max(1)),
            room: rng.random_range(0..registry.room_count().max(1)),
            time_slot: rng.random_range(0..registry.limits().time_slots.max(1)),
        }
    }
}

/// Builds fixed-shape observations.
#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    layout: ObservationLayout,
    limits: Limits,
    len: usize,
}

impl ObservationEncoder {
    /// Creates an encoder; the output length is fixed from here on.
    pub fn new(layout: ObservationLayout, limits: &Limits) -> Self {
        Self {
            layout,
            limits: limits.clone(),
            len: layout.len(limits),
        }
    }

    /// Observation length.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn layout(&self) -> &ObservationLayout {
        &self.layout
    }

    /// Whether a sampled context is part of the layout.
    pub fn wants_context(&self) -> bool {
        self.layout.sampled_context
    }

    /// Encodes the decision context for the student at `cursor`.
    ///
    /// A cursor past the last student yields zeros for every
    /// student-dependent feature; the vector length is unchanged.
    pub fn encode(
        &self,
        cursor: usize,
        registry: &EntityRegistry,
        state: &ScheduleState,
        context: Option<SampledContext>,
    ) -> Observation {
        let mut obs = Vec::with_capacity(self.len);
        let student = registry.student(cursor);

        match student {
            Some(s) => {
                let count = state.student_lesson_count(cursor);
                let last = registry.student_count().saturating_sub(1).max(1);
                obs.push(unit(cursor as f64 / last as f64));
                obs.push(s.skill.normalized());
                obs.push(unit(
                    f64::from(s.target) / f64::from(self.layout.target_ceiling.max(1)),
                ));
                obs.push(unit(f64::from(count) / f64::from(s.target.max(1))));
            }
            None => obs.extend([0.0; ObservationLayout::STUDENT_FEATURES]),
        }

        let instrument = student.map(|s| s.instrument);

        if self.layout.teacher_mask {
            obs.extend((0..self.limits.max_teachers).map(|t| {
                let teaches = registry
                    .teacher(t)
                    .zip(instrument)
                    .is_some_and(|(t, i)| t.instruments.contains(i));
                flag(teaches)
            }));
        }

        if self.layout.room_mask {
            obs.extend((0..self.limits.max_rooms).map(|r| {
                let equipped = registry
                    .room(r)
                    .zip(instrument)
                    .is_some_and(|(r, i)| r.equipment.contains(i));
                flag(equipped)
            }));
        }

        if self.layout.scheduled_mask {
            obs.extend((0..self.limits.max_students).map(|s| flag(state.is_scheduled(s))));
        }

        if self.layout.sampled_context {
            obs.extend(self.context_features(registry, instrument, context));
        }

        debug_assert_eq!(obs.len(), self.len);
        obs
    }

    fn context_features(
        &self,
        registry: &EntityRegistry,
        instrument: Option<Instrument>,
        context: Option<SampledContext>,
    ) -> [f32; ObservationLayout::CONTEXT_FEATURES] {
        let Some(ctx) = context else {
            return [0.0; ObservationLayout::CONTEXT_FEATURES];
        };
        let teacher = registry.teacher(ctx.teacher);
        let room = registry.room(ctx.room);
        let hours = teacher.map_or(0.0, |t| t.max_hours);
        let teaches = teacher
            .zip(instrument)
            .is_some_and(|(t, i)| t.instruments.contains(i));
        let equipped = room
            .zip(instrument)
            .is_some_and(|(r, i)| r.equipment.contains(i));

        [
            scaled(ctx.teacher, self.limits.max_teachers),
            scaled(ctx.room, self.limits.max_rooms),
            scaled(ctx.time_slot, self.limits.time_slots),
            unit(hours / self.layout.hours_ceiling),
            flag(teaches),
            flag(equipped),
        ]
    }
}

/// Clamps into `[0, 1]`; NaN maps to 0.
fn unit(x: f64) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0) as f32
    }
}

/// Index scaled by the last valid index of a dimension of size `n`.
fn scaled(idx: usize, n: usize) -> f32 {
    unit(idx as f64 / n.saturating_sub(1).max(1) as f64)
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lesson, Room, Student, Teacher};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn limits() -> Limits {
        Limits::default().with_capacity(3, 4, 2).with_time_slots(5)
    }

    fn registry() -> EntityRegistry {
        let teachers = vec![
            Teacher::new("T1").with_instrument("Piano").with_max_hours(30.0),
            Teacher::new("T2").with_instrument("Guitar").with_max_hours(6.0),
        ];
        let students = vec![
            Student::new("S1", "Piano")
                .with_skill("Intermediate")
                .with_lessons_per_week(2),
            Student::new("S2", "Guitar").with_lessons_per_week(9),
            Student::new("S3", "Piano"),
        ];
        let rooms = vec![Room::new("R1").with_equipment("Guitar")];
        EntityRegistry::load_with(&teachers, &students, &rooms, limits()).unwrap()
    }

    #[test]
    fn test_student_block() {
        let reg = registry();
        let mut state = ScheduleState::new(&reg);
        let encoder = ObservationEncoder::new(ObservationLayout::minimal(), &limits());

        let obs = encoder.encode(0, &reg, &state, None);
        assert_eq!(obs.len(), 4);
        assert!((obs[0] - 0.0).abs() < 1e-6);
        assert!((obs[1] - 2.0 / 3.0).abs() < 1e-6);
        assert!((obs[2] - 2.0 / 3.0).abs() < 1e-6);
        assert!((obs[3] - 0.0).abs() < 1e-6);

        // Guitar student S2 with T2 in R1.
        assert!(state.try_commit(Lesson::new(1, 1, 0, 0), &reg).is_committed());
        let obs = encoder.encode(1, &reg, &state, None);
        assert!((obs[0] - 0.5).abs() < 1e-6);
        // Target 9 saturates against the ceiling of 3.
        assert!((obs[2] - 1.0).abs() < 1e-6);
        assert!((obs[3] - 1.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_masks() {
        let reg = registry();
        let mut state = ScheduleState::new(&reg);
        let layout = ObservationLayout {
            scheduled_mask: true,
            ..ObservationLayout::default()
        };
        let encoder = ObservationEncoder::new(layout, &limits());
        assert!(state.try_commit(Lesson::new(1, 1, 0, 0), &reg).is_committed());

        let obs = encoder.encode(1, &reg, &state, None);
        assert_eq!(obs.len(), 4 + 3 + 2 + 4);
        // Teacher mask: only T2 teaches Guitar; slot 2 is padding.
        assert_eq!(&obs[4..7], &[0.0, 1.0, 0.0]);
        // Room mask: R1 has Guitar; slot 1 is padding.
        assert_eq!(&obs[7..9], &[1.0, 0.0]);
        // Scheduled mask.
        assert_eq!(&obs[9..13], &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shape_stable_past_last_student() {
        let reg = registry();
        let state = ScheduleState::new(&reg);
        let encoder = ObservationEncoder::new(ObservationLayout::full(), &limits());

        let obs = encoder.encode(3, &reg, &state, None);
        assert_eq!(obs.len(), encoder.len());
        assert!(obs.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_sampled_context() {
        let reg = registry();
        let state = ScheduleState::new(&reg);
        let encoder = ObservationEncoder::new(ObservationLayout::full(), &limits());
        let ctx = SampledContext {
            teacher: 0,
            room: 0,
            time_slot: 4,
        };

        let obs = encoder.encode(0, &reg, &state, Some(ctx));
        let tail = &obs[obs.len() - 6..];
        assert!((tail[0] - 0.0).abs() < 1e-6);
        assert!((tail[2] - 1.0).abs() < 1e-6);
        // 30 hours saturates against the 15 hour ceiling.
        assert!((tail[3] - 1.0).abs() < 1e-6);
        assert_eq!(tail[4], 1.0);
        assert_eq!(tail[5], 0.0);
        assert!(obs.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_sample_is_seeded() {
        let reg = registry();
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10 {
            let ca = SampledContext::sample(&reg, &mut a);
            assert_eq!(ca, SampledContext::sample(&reg, &mut b));
            assert!(ca.teacher < reg.teacher_count());
            assert!(ca.room < reg.room_count());
            assert!(ca.time_slot < 5);
        }
    }
}
