//! Lessons and actions.
//!
//! A [`Lesson`] addresses entities by dense registry index. A
//! [`ScheduledLesson`] is the same lesson rendered with entity ids, which is
//! what leaves the crate (step info, exported schedules).

use serde::{Deserialize, Serialize};

/// A (teacher, student, room, slot) tuple addressed by registry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lesson {
    /// Teacher index.
    pub teacher: usize,
    /// Student index.
    pub student: usize,
    /// Room index.
    pub room: usize,
    /// Time slot in `0..time_slots`.
    pub time_slot: usize,
}

impl Lesson {
    /// Creates a lesson.
    pub fn new(teacher: usize, student: usize, room: usize, time_slot: usize) -> Self {
        Self {
            teacher,
            student,
            room,
            time_slot,
        }
    }
}

/// A committed lesson identified by entity ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledLesson {
    #[serde(rename = "Teacher_ID")]
    pub teacher_id: String,
    #[serde(rename = "Student_ID")]
    pub student_id: String,
    #[serde(rename = "Room_ID")]
    pub room_id: String,
    #[serde(rename = "Time_Slot")]
    pub time_slot: usize,
}

/// A decision supplied by the external decision-maker.
///
/// The student is not part of the action: it is taken from the controller's
/// cursor when the action is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Action {
    /// Teacher index in `0..max_teachers`.
    pub teacher: usize,
    /// Room index in `0..max_rooms`.
    pub room: usize,
    /// Time slot in `0..time_slots`.
    pub time_slot: usize,
}

impl Action {
    /// Creates an action.
    pub fn new(teacher: usize, room: usize, time_slot: usize) -> Self {
        Self {
            teacher,
            room,
            time_slot,
        }
    }
}

impl From<[usize; 3]> for Action {
    /// Converts a `[teacher, room, slot]` multi-discrete sample.
    fn from(v: [usize; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}
