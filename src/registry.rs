//! Entity registry.
//!
//! Immutable catalogs of teachers, students and rooms, addressed by dense
//! index. Built once from validated tables; holds bidirectional id↔index
//! tables and, per instrument, the teachers teaching it and the rooms
//! equipped for it.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::Limits;
use crate::error::ConfigurationError;
use crate::models::{
    Instrument, InstrumentSet, Lesson, Room, ScheduledLesson, SkillLevel, Student, Teacher,
};
use crate::validation::validate_tables;

/// A validated teacher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherRecord {
    pub id: String,
    pub name: String,
    pub instruments: InstrumentSet,
    pub max_hours: f64,
}

/// A validated student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub instrument: Instrument,
    pub skill: SkillLevel,
    /// Weekly target as supplied.
    pub lessons_per_week: u32,
    /// Weekly target in effect (after any override).
    pub target: u32,
}

/// A validated room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomRecord {
    pub id: String,
    pub equipment: InstrumentSet,
}

/// Read-only entity catalogs plus lookup indices.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    limits: Limits,
    teachers: Vec<TeacherRecord>,
    students: Vec<StudentRecord>,
    rooms: Vec<RoomRecord>,
    teacher_index: HashMap<String, usize>,
    student_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,
    teachers_by_instrument: [Vec<usize>; Instrument::COUNT],
    rooms_by_instrument: [Vec<usize>; Instrument::COUNT],
}

impl EntityRegistry {
    /// Builds a registry with default [`Limits`].
    pub fn load(
        teachers: &[Teacher],
        students: &[Student],
        rooms: &[Room],
    ) -> Result<Self, ConfigurationError> {
        Self::load_with(teachers, students, rooms, Limits::default())
    }

    /// Builds a registry, validating the tables against `limits`.
    ///
    /// # Errors
    /// Returns every validation issue found (duplicate ids, unknown
    /// instrument/skill values, non-positive fields, oversized tables).
    pub fn load_with(
        teachers: &[Teacher],
        students: &[Student],
        rooms: &[Room],
        limits: Limits,
    ) -> Result<Self, ConfigurationError> {
        let tables = validate_tables(teachers, students, rooms, &limits)
            .map_err(|issues| ConfigurationError { issues })?;

        let teacher_index = index_ids(tables.teachers.iter().map(|t| t.id.as_str()));
        let student_index = index_ids(tables.students.iter().map(|s| s.id.as_str()));
        let room_index = index_ids(tables.rooms.iter().map(|r| r.id.as_str()));

        let mut teachers_by_instrument: [Vec<usize>; Instrument::COUNT] = Default::default();
        for (idx, t) in tables.teachers.iter().enumerate() {
            for instrument in t.instruments.iter() {
                teachers_by_instrument[instrument.index()].push(idx);
            }
        }
        let mut rooms_by_instrument: [Vec<usize>; Instrument::COUNT] = Default::default();
        for (idx, r) in tables.rooms.iter().enumerate() {
            for instrument in r.equipment.iter() {
                rooms_by_instrument[instrument.index()].push(idx);
            }
        }

        tracing::debug!(
            teachers = tables.teachers.len(),
            students = tables.students.len(),
            rooms = tables.rooms.len(),
            "entity registry built"
        );

        Ok(Self {
            limits,
            teachers: tables.teachers,
            students: tables.students,
            rooms: tables.rooms,
            teacher_index,
            student_index,
            room_index,
            teachers_by_instrument,
            rooms_by_instrument,
        })
    }

    /// Limits the registry was validated against.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn teacher(&self, idx: usize) -> Option<&TeacherRecord> {
        self.teachers.get(idx)
    }

    pub fn student(&self, idx: usize) -> Option<&StudentRecord> {
        self.students.get(idx)
    }

    pub fn room(&self, idx: usize) -> Option<&RoomRecord> {
        self.rooms.get(idx)
    }

    pub fn teachers(&self) -> &[TeacherRecord] {
        &self.teachers
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn rooms(&self) -> &[RoomRecord] {
        &self.rooms
    }

    /// Index of a teacher id.
    pub fn teacher_idx(&self, id: &str) -> Option<usize> {
        self.teacher_index.get(id).copied()
    }

    /// Index of a student id.
    pub fn student_idx(&self, id: &str) -> Option<usize> {
        self.student_index.get(id).copied()
    }

    /// Index of a room id.
    pub fn room_idx(&self, id: &str) -> Option<usize> {
        self.room_index.get(id).copied()
    }

    /// Teachers who teach `instrument`, ascending by index.
    pub fn teachers_for(&self, instrument: Instrument) -> &[usize] {
        &self.teachers_by_instrument[instrument.index()]
    }

    /// Rooms equipped for `instrument`, ascending by index.
    pub fn rooms_for(&self, instrument: Instrument) -> &[usize] {
        &self.rooms_by_instrument[instrument.index()]
    }

    /// Effective weekly target of a student (0 for an unknown index).
    pub fn target_for(&self, student: usize) -> u32 {
        self.students.get(student).map_or(0, |s| s.target)
    }

    /// Renders a lesson with entity ids; `None` if any index is unknown.
    pub fn describe(&self, lesson: &Lesson) -> Option<ScheduledLesson> {
        Some(ScheduledLesson {
            teacher_id: self.teachers.get(lesson.teacher)?.id.clone(),
            student_id: self.students.get(lesson.student)?.id.clone(),
            room_id: self.rooms.get(lesson.room)?.id.clone(),
            time_slot: lesson.time_slot,
        })
    }
}

fn index_ids<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    ids.enumerate().map(|(idx, id)| (id.to_string(), idx)).collect()
}
