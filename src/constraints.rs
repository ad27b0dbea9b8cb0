//! Lesson legality rules.
//!
//! A candidate is checked against the committed schedule in a fixed order,
//! stopping at the first failure:
//!
//! 1. every index refers to a known entity and slot
//! 2. the exact tuple is not already committed
//! 3. the teacher teaches the student's instrument
//! 4. the room is equipped for the student's instrument
//! 5. no teacher, student or room is already booked in the slot
//! 6. the student stays within their weekly target
//! 7. the teacher stays within their weekly hours
//!
//! The order only decides which tag is reported; legality itself does not
//! depend on it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Lesson;
use crate::registry::EntityRegistry;
use crate::schedule::ScheduleState;

/// Hours tolerance for the teacher cap comparison.
const HOURS_EPSILON: f64 = 1e-9;

/// Entity classes a candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Teacher,
    Student,
    Room,
    TimeSlot,
}

/// Why a candidate was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// An index is outside the registry. A caller error, not a legality failure.
    UnknownEntity(EntityKind),
    /// The exact lesson is already committed.
    Duplicate,
    /// The teacher does not teach the student's instrument.
    InstrumentMismatch,
    /// The room lacks equipment for the student's instrument.
    EquipmentMismatch,
    /// The teacher, student or room already has a lesson in the slot.
    DoubleBooking(EntityKind),
    /// The student already has their weekly target of lessons.
    StudentCapExceeded,
    /// The teacher would exceed their weekly hours.
    TeacherCapExceeded,
}

impl Rejection {
    /// Whether this is a breach of a scheduling invariant, as opposed to a
    /// caller error or a resubmission.
    pub fn is_violation(self) -> bool {
        !matches!(self, Rejection::UnknownEntity(_) | Rejection::Duplicate)
    }

    /// Short stable tag.
    pub fn tag(self) -> &'static str {
        match self {
            Rejection::UnknownEntity(_) => "unknown_entity",
            Rejection::Duplicate => "duplicate",
            Rejection::InstrumentMismatch => "instrument_mismatch",
            Rejection::EquipmentMismatch => "equipment_mismatch",
            Rejection::DoubleBooking(_) => "double_booking",
            Rejection::StudentCapExceeded => "student_cap_exceeded",
            Rejection::TeacherCapExceeded => "teacher_cap_exceeded",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownEntity(kind) => write!(f, "unknown {kind:?} index"),
            Rejection::DoubleBooking(kind) => write!(f, "{kind:?} already booked in slot"),
            other => f.write_str(other.tag()),
        }
    }
}

/// Checks a candidate lesson; `Err` carries the first failed rule.
pub fn check(
    candidate: &Lesson,
    registry: &EntityRegistry,
    state: &ScheduleState,
) -> Result<(), Rejection> {
    let teacher = registry
        .teacher(candidate.teacher)
        .ok_or(Rejection::UnknownEntity(EntityKind::Teacher))?;
    let student = registry
        .student(candidate.student)
        .ok_or(Rejection::UnknownEntity(EntityKind::Student))?;
    let room = registry
        .room(candidate.room)
        .ok_or(Rejection::UnknownEntity(EntityKind::Room))?;
    if candidate.time_slot >= registry.limits().time_slots {
        return Err(Rejection::UnknownEntity(EntityKind::TimeSlot));
    }

    if state.contains(candidate) {
        return Err(Rejection::Duplicate);
    }

    if !teacher.instruments.contains(student.instrument) {
        return Err(Rejection::InstrumentMismatch);
    }
    if !room.equipment.contains(student.instrument) {
        return Err(Rejection::EquipmentMismatch);
    }

    for booked in state.lessons_in_slot(candidate.time_slot) {
        if booked.teacher == candidate.teacher {
            return Err(Rejection::DoubleBooking(EntityKind::Teacher));
        }
        if booked.student == candidate.student {
            return Err(Rejection::DoubleBooking(EntityKind::Student));
        }
        if booked.room == candidate.room {
            return Err(Rejection::DoubleBooking(EntityKind::Room));
        }
    }

    if state.student_lesson_count(candidate.student) >= student.target {
        return Err(Rejection::StudentCapExceeded);
    }

    let hours_after =
        state.teacher_hours(candidate.teacher, registry) + registry.limits().lesson_hours;
    if hours_after > teacher.max_hours + HOURS_EPSILON {
        return Err(Rejection::TeacherCapExceeded);
    }

    Ok(())
}

/// Whether `candidate` may be committed.
pub fn is_legal(candidate: &Lesson, registry: &EntityRegistry, state: &ScheduleState) -> bool {
    check(candidate, registry, state).is_ok()
}

/// Legal lessons for `student`, slot-major, then teacher, then room index.
///
/// Only compatible teachers and rooms are visited.
pub fn legal_candidates<'a>(
    student: usize,
    registry: &'a EntityRegistry,
    state: &'a ScheduleState,
) -> impl Iterator<Item = Lesson> + 'a {
    let (teachers, rooms): (&[usize], &[usize]) = match registry.student(student) {
        Some(s) => (
            registry.teachers_for(s.instrument),
            registry.rooms_for(s.instrument),
        ),
        None => (&[], &[]),
    };
    (0..registry.limits().time_slots)
        .flat_map(move |slot| {
            teachers.iter().flat_map(move |&t| {
                rooms.iter().map(move |&r| Lesson::new(t, student, r, slot))
            })
        })
        .filter(move |lesson| is_legal(lesson, registry, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::models::{Room, Student, Teacher};

    fn registry() -> EntityRegistry {
        let teachers = vec![
            Teacher::new("T1").with_instrument("Piano").with_max_hours(1.5),
            Teacher::new("T2").with_instrument("Guitar"),
        ];
        let students = vec![
            Student::new("S1", "Piano").with_lessons_per_week(3),
            Student::new("S2", "Piano"),
            Student::new("S3", "Guitar"),
        ];
        let rooms = vec![
            Room::new("R1").with_equipment("Piano"),
            Room::new("R2").with_equipment("Guitar").with_equipment("Piano"),
        ];
        EntityRegistry::load_with(
            &teachers,
            &students,
            &rooms,
            Limits::default().with_time_slots(6),
        )
        .unwrap()
    }

    fn committed(reg: &EntityRegistry, lessons: &[Lesson]) -> ScheduleState {
        let mut state = ScheduleState::new(reg);
        for &l in lessons {
            assert!(state.try_commit(l, reg).is_committed(), "setup lesson {l:?}");
        }
        state
    }

    #[test]
    fn test_legal_candidate() {
        let reg = registry();
        let state = ScheduleState::new(&reg);
        assert!(is_legal(&Lesson::new(0, 0, 0, 0), &reg, &state));
        assert!(is_legal(&Lesson::new(1, 2, 1, 5), &reg, &state));
    }

    #[test]
    fn test_unknown_entities() {
        let reg = registry();
        let state = ScheduleState::new(&reg);
        assert_eq!(
            check(&Lesson::new(5, 0, 0, 0), &reg, &state),
            Err(Rejection::UnknownEntity(EntityKind::Teacher))
        );
        assert_eq!(
            check(&Lesson::new(0, 9, 0, 0), &reg, &state),
            Err(Rejection::UnknownEntity(EntityKind::Student))
        );
        assert_eq!(
            check(&Lesson::new(0, 0, 2, 0), &reg, &state),
            Err(Rejection::UnknownEntity(EntityKind::Room))
        );
        assert_eq!(
            check(&Lesson::new(0, 0, 0, 6), &reg, &state),
            Err(Rejection::UnknownEntity(EntityKind::TimeSlot))
        );
    }

    #[test]
    fn test_compatibility() {
        let reg = registry();
        let state = ScheduleState::new(&reg);
        assert_eq!(
            check(&Lesson::new(1, 0, 1, 0), &reg, &state),
            Err(Rejection::InstrumentMismatch)
        );
        assert_eq!(
            check(&Lesson::new(1, 2, 0, 0), &reg, &state),
            Err(Rejection::EquipmentMismatch)
        );
    }

    #[test]
    fn test_duplicate_reported_before_double_booking() {
        let reg = registry();
        let state = committed(&reg, &[Lesson::new(0, 0, 0, 0)]);
        assert_eq!(
            check(&Lesson::new(0, 0, 0, 0), &reg, &state),
            Err(Rejection::Duplicate)
        );
    }

    #[test]
    fn test_double_booking() {
        let reg = registry();
        let state = committed(&reg, &[Lesson::new(0, 0, 0, 2)]);
        assert_eq!(
            check(&Lesson::new(0, 1, 1, 2), &reg, &state),
            Err(Rejection::DoubleBooking(EntityKind::Teacher))
        );
        assert_eq!(
            check(&Lesson::new(1, 2, 0, 2), &reg, &state),
            Err(Rejection::EquipmentMismatch)
        );

        let state = committed(&reg, &[Lesson::new(1, 2, 1, 2)]);
        assert_eq!(
            check(&Lesson::new(0, 0, 1, 2), &reg, &state),
            Err(Rejection::DoubleBooking(EntityKind::Room))
        );
        // Different slot is fine.
        assert!(is_legal(&Lesson::new(0, 0, 1, 3), &reg, &state));
    }

    #[test]
    fn test_student_double_booked() {
        let reg = registry();
        let teachers = vec![
            Teacher::new("T1").with_instrument("Piano"),
            Teacher::new("T2").with_instrument("Piano"),
        ];
        let students = vec![Student::new("S1", "Piano").with_lessons_per_week(2)];
        let rooms = vec![
            Room::new("R1").with_equipment("Piano"),
            Room::new("R2").with_equipment("Piano"),
        ];
        let reg2 = EntityRegistry::load_with(
            &teachers,
            &students,
            &rooms,
            reg.limits().clone(),
        )
        .unwrap();
        let state = committed(&reg2, &[Lesson::new(0, 0, 0, 1)]);
        assert_eq!(
            check(&Lesson::new(1, 0, 1, 1), &reg2, &state),
            Err(Rejection::DoubleBooking(EntityKind::Student))
        );
    }

    #[test]
    fn test_student_cap() {
        let reg = registry();
        let state = committed(&reg, &[Lesson::new(0, 1, 0, 0)]);
        assert_eq!(
            check(&Lesson::new(0, 1, 0, 1), &reg, &state),
            Err(Rejection::StudentCapExceeded)
        );
    }

    #[test]
    fn test_teacher_cap() {
        let reg = registry();
        // T1 has 1.5 hours: one lesson fits, a second does not.
        let state = committed(&reg, &[Lesson::new(0, 0, 0, 0)]);
        assert_eq!(
            check(&Lesson::new(0, 0, 0, 1), &reg, &state),
            Err(Rejection::TeacherCapExceeded)
        );
    }

    #[test]
    fn test_rejection_classification() {
        assert!(!Rejection::Duplicate.is_violation());
        assert!(!Rejection::UnknownEntity(EntityKind::Room).is_violation());
        assert!(Rejection::StudentCapExceeded.is_violation());
        assert_eq!(Rejection::DoubleBooking(EntityKind::Room).tag(), "double_booking");
    }

    #[test]
    fn test_legal_candidates() {
        let reg = registry();
        let state = ScheduleState::new(&reg);

        // S1 plays Piano: only T1 teaches it, both rooms have a piano.
        let all: Vec<_> = legal_candidates(0, &reg, &state).collect();
        assert_eq!(all.len(), 6 * 2);
        assert_eq!(all[0], Lesson::new(0, 0, 0, 0));
        assert_eq!(all[1], Lesson::new(0, 0, 1, 0));
        assert!(all.iter().all(|l| l.teacher == 0));

        // One lesson for S2 uses up T1's hours.
        let state = committed(&reg, &[Lesson::new(0, 1, 0, 0)]);
        assert_eq!(legal_candidates(0, &reg, &state).count(), 0);
        assert_eq!(legal_candidates(2, &reg, &state).count(), 6);

        assert_eq!(legal_candidates(42, &reg, &state).count(), 0);
    }
}
