//! Schedule state for one episode.
//!
//! An append-only list of committed lessons plus derived indices from each
//! teacher, student, room and time slot to the lessons touching it. Conflict
//! checks read only the candidate slot's list, so their cost is bounded by
//! the number of entities rather than the length of the schedule.

use std::collections::HashSet;

use serde::Serialize;

use crate::constraints::{self, EntityKind, Rejection};
use crate::models::{Lesson, ScheduledLesson};
use crate::registry::EntityRegistry;

/// Facts about a successful commit, taken before and after the append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    /// The committed lesson.
    pub lesson: Lesson,
    /// Position in commit order.
    pub position: usize,
    /// The student had no lesson before this one.
    pub first_for_student: bool,
    /// The teacher and student had never been paired before.
    pub first_for_pair: bool,
    /// Student lesson count before the commit.
    pub count_before: u32,
    /// Student lesson count after the commit.
    pub count_after: u32,
    /// Student's effective weekly target.
    pub target: u32,
    /// Every student has reached their target after the commit.
    pub all_fulfilled: bool,
}

impl CommitReceipt {
    /// The student reached their target with this commit.
    pub fn student_fulfilled(&self) -> bool {
        self.count_after >= self.target
    }
}

/// Result of [`ScheduleState::try_commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommitOutcome {
    Committed(CommitReceipt),
    Rejected(Rejection),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }
}

/// Committed lessons and occupancy indices.
///
/// Sized for one registry at construction. Lessons addressing entities
/// beyond those sizes are rejected as unknown.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    lessons: Vec<Lesson>,
    by_teacher: Vec<Vec<usize>>,
    by_student: Vec<Vec<usize>>,
    by_room: Vec<Vec<usize>>,
    by_slot: Vec<Vec<usize>>,
    committed: HashSet<Lesson>,
    pairs: HashSet<(usize, usize)>,
    students_started: usize,
    students_fulfilled: usize,
}

impl ScheduleState {
    /// Creates an empty schedule sized for `registry`.
    pub fn new(registry: &EntityRegistry) -> Self {
        Self {
            lessons: Vec::new(),
            by_teacher: vec![Vec::new(); registry.teacher_count()],
            by_student: vec![Vec::new(); registry.student_count()],
            by_room: vec![Vec::new(); registry.room_count()],
            by_slot: vec![Vec::new(); registry.limits().time_slots],
            committed: HashSet::new(),
            pairs: HashSet::new(),
            students_started: 0,
            students_fulfilled: 0,
        }
    }

    /// Removes every lesson, keeping index capacity.
    pub fn clear(&mut self) {
        self.lessons.clear();
        for list in self
            .by_teacher
            .iter_mut()
            .chain(self.by_student.iter_mut())
            .chain(self.by_room.iter_mut())
            .chain(self.by_slot.iter_mut())
        {
            list.clear();
        }
        self.committed.clear();
        self.pairs.clear();
        self.students_started = 0;
        self.students_fulfilled = 0;
    }

    /// Validates `lesson` and, if legal, appends it and updates every index.
    ///
    /// A rejected candidate leaves the state untouched.
    pub fn try_commit(&mut self, lesson: Lesson, registry: &EntityRegistry) -> CommitOutcome {
        if let Some(kind) = self.untracked(&lesson) {
            return CommitOutcome::Rejected(Rejection::UnknownEntity(kind));
        }
        if let Err(rejection) = constraints::check(&lesson, registry, self) {
            return CommitOutcome::Rejected(rejection);
        }

        let position = self.lessons.len();
        let count_before = self.student_lesson_count(lesson.student);
        let target = registry.target_for(lesson.student);
        let first_for_pair = self.pairs.insert((lesson.teacher, lesson.student));

        self.lessons.push(lesson);
        self.committed.insert(lesson);
        self.by_teacher[lesson.teacher].push(position);
        self.by_student[lesson.student].push(position);
        self.by_room[lesson.room].push(position);
        self.by_slot[lesson.time_slot].push(position);

        let count_after = count_before + 1;
        if count_before == 0 {
            self.students_started += 1;
        }
        if count_before < target && count_after >= target {
            self.students_fulfilled += 1;
        }

        CommitOutcome::Committed(CommitReceipt {
            lesson,
            position,
            first_for_student: count_before == 0,
            first_for_pair,
            count_before,
            count_after,
            target,
            all_fulfilled: self.all_fulfilled(),
        })
    }

    /// First index of `lesson` that has no slot in the occupancy indices.
    fn untracked(&self, lesson: &Lesson) -> Option<EntityKind> {
        if lesson.teacher >= self.by_teacher.len() {
            Some(EntityKind::Teacher)
        } else if lesson.student >= self.by_student.len() {
            Some(EntityKind::Student)
        } else if lesson.room >= self.by_room.len() {
            Some(EntityKind::Room)
        } else if lesson.time_slot >= self.by_slot.len() {
            Some(EntityKind::TimeSlot)
        } else {
            None
        }
    }

    /// Committed lessons in commit order.
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Number of committed lessons.
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Whether this exact tuple is already committed.
    pub fn contains(&self, lesson: &Lesson) -> bool {
        self.committed.contains(lesson)
    }

    /// Whether the pair has shared any lesson.
    pub fn has_pair(&self, teacher: usize, student: usize) -> bool {
        self.pairs.contains(&(teacher, student))
    }

    pub fn lessons_for_student(&self, student: usize) -> impl Iterator<Item = &Lesson> + '_ {
        self.lessons_at(&self.by_student, student)
    }

    pub fn lessons_for_teacher(&self, teacher: usize) -> impl Iterator<Item = &Lesson> + '_ {
        self.lessons_at(&self.by_teacher, teacher)
    }

    pub fn lessons_for_room(&self, room: usize) -> impl Iterator<Item = &Lesson> + '_ {
        self.lessons_at(&self.by_room, room)
    }

    pub fn lessons_in_slot(&self, time_slot: usize) -> impl Iterator<Item = &Lesson> + '_ {
        self.lessons_at(&self.by_slot, time_slot)
    }

    fn lessons_at<'a>(
        &'a self,
        index: &'a [Vec<usize>],
        key: usize,
    ) -> impl Iterator<Item = &'a Lesson> + 'a {
        index
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.lessons[pos])
    }

    /// Lessons committed for a student.
    pub fn student_lesson_count(&self, student: usize) -> u32 {
        self.by_student.get(student).map_or(0, |l| l.len() as u32)
    }

    /// Lessons committed for a teacher.
    pub fn teacher_lesson_count(&self, teacher: usize) -> u32 {
        self.by_teacher.get(teacher).map_or(0, |l| l.len() as u32)
    }

    /// Teaching hours consumed by a teacher.
    pub fn teacher_hours(&self, teacher: usize, registry: &EntityRegistry) -> f64 {
        f64::from(self.teacher_lesson_count(teacher)) * registry.limits().lesson_hours
    }

    /// Whether the student has at least one lesson.
    pub fn is_scheduled(&self, student: usize) -> bool {
        self.student_lesson_count(student) > 0
    }

    /// Fraction of students with at least one committed lesson.
    pub fn coverage(&self) -> f64 {
        if self.by_student.is_empty() {
            return 0.0;
        }
        self.students_started as f64 / self.by_student.len() as f64
    }

    /// Number of students at or above their weekly target.
    pub fn fulfilled_students(&self) -> usize {
        self.students_fulfilled
    }

    /// Fraction of students at or above their weekly target.
    pub fn fulfilled_fraction(&self) -> f64 {
        if self.by_student.is_empty() {
            return 0.0;
        }
        self.students_fulfilled as f64 / self.by_student.len() as f64
    }

    /// Every student has reached their weekly target.
    pub fn all_fulfilled(&self) -> bool {
        !self.by_student.is_empty() && self.students_fulfilled == self.by_student.len()
    }

    /// The schedule rendered with entity ids, in commit order.
    pub fn export(&self, registry: &EntityRegistry) -> Vec<ScheduledLesson> {
        self.lessons
            .iter()
            .filter_map(|l| registry.describe(l))
            .collect()
    }
}
