//! Entity input records: teachers, students, rooms.
//!
//! These are the rows an external loader supplies. Categorical fields are
//! kept as raw text so that the registry can report every out-of-vocabulary
//! value instead of failing on the first one.

use serde::{Deserialize, Serialize};

/// A teacher who can give lessons for one or more instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Instruments this teacher teaches.
    pub instruments: Vec<String>,
    /// Weekly teaching capacity in hours (must be positive).
    pub max_hours_per_week: f64,
}

/// A student learning a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Instrument being learned.
    pub instrument: String,
    /// Proficiency ("Beginner", "Intermediate", "Advanced").
    pub skill_level: String,
    /// Weekly lesson target (must be positive).
    pub lessons_per_week: i64,
}

/// A practice room with instrument equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Instruments the room is equipped for.
    pub equipment: Vec<String>,
}

impl Teacher {
    /// Creates a teacher with no instruments and 10 weekly hours.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            instruments: Vec::new(),
            max_hours_per_week: 10.0,
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a taught instrument.
    pub fn with_instrument(mut self, instrument: impl Into<String>) -> Self {
        self.instruments.push(instrument.into());
        self
    }

    /// Sets the weekly hour cap.
    pub fn with_max_hours(mut self, hours: f64) -> Self {
        self.max_hours_per_week = hours;
        self
    }
}

impl Student {
    /// Creates a beginner student with one lesson per week.
    pub fn new(id: impl Into<String>, instrument: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            instrument: instrument.into(),
            skill_level: "Beginner".to_string(),
            lessons_per_week: 1,
        }
    }

    /// Sets the student name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the skill level.
    pub fn with_skill(mut self, skill_level: impl Into<String>) -> Self {
        self.skill_level = skill_level.into();
        self
    }

    /// Sets the weekly lesson target.
    pub fn with_lessons_per_week(mut self, lessons: i64) -> Self {
        self.lessons_per_week = lessons;
        self
    }
}

impl Room {
    /// Creates an unequipped room.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            equipment: Vec::new(),
        }
    }

    /// Adds equipment for an instrument.
    pub fn with_equipment(mut self, instrument: impl Into<String>) -> Self {
        self.equipment.push(instrument.into());
        self
    }
}
