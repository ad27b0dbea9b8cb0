//! Input validation for entity tables.
//!
//! Checks structural integrity of the teacher, student and room tables
//! before a registry is built, and converts raw rows into typed records.
//! Detects:
//! - Duplicate IDs (within each entity class)
//! - Instrument, equipment and skill values outside the fixed vocabularies
//! - Non-positive hours and lesson targets
//! - Tables larger than the configured action-space bounds
//! - Empty tables and unusable limits
//!
//! Every problem is reported; validation does not stop at the first one.

use std::collections::HashSet;

use crate::config::Limits;
use crate::models::{Instrument, InstrumentSet, Room, SkillLevel, Student, Teacher};
use crate::registry::{RoomRecord, StudentRecord, TeacherRecord};

/// Validation result.
pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same class share an ID.
    DuplicateId,
    /// An instrument or equipment value is outside the vocabulary.
    UnknownInstrument,
    /// A skill level is outside the vocabulary.
    UnknownSkillLevel,
    /// A numeric field is non-positive or not representable.
    InvalidValue,
    /// A table has more rows than the action space can address.
    CapacityExceeded,
    /// A table has no rows.
    EmptyTable,
    /// The limits themselves are unusable.
    InvalidLimits,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Typed, validated entity records in input order.
#[derive(Debug, Clone)]
pub struct ValidatedTables {
    pub teachers: Vec<TeacherRecord>,
    pub students: Vec<StudentRecord>,
    pub rooms: Vec<RoomRecord>,
}

/// Validates the three entity tables against `limits`.
///
/// Checks:
/// 1. Limits: positive time slots and lesson hours, positive target override
/// 2. Each table non-empty and within its `max_*` bound
/// 3. No duplicate IDs within a class
/// 4. Every instrument/equipment/skill value parses
/// 5. Positive `max_hours_per_week` and `lessons_per_week`
///
/// # Returns
/// The typed records if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tables(
    teachers: &[Teacher],
    students: &[Student],
    rooms: &[Room],
    limits: &Limits,
) -> ValidationResult<ValidatedTables> {
    let mut errors = Vec::new();

    check_limits(limits, &mut errors);
    check_size("teacher", teachers.len(), limits.max_teachers, &mut errors);
    check_size("student", students.len(), limits.max_students, &mut errors);
    check_size("room", rooms.len(), limits.max_rooms, &mut errors);

    let mut teacher_ids = HashSet::new();
    let mut teacher_records = Vec::with_capacity(teachers.len());
    for t in teachers {
        if !teacher_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
        let instruments = parse_instruments(&t.id, "instrument", &t.instruments, &mut errors);
        if !(t.max_hours_per_week > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!(
                    "Teacher '{}' has non-positive max_hours_per_week {}",
                    t.id, t.max_hours_per_week
                ),
            ));
        }
        teacher_records.push(TeacherRecord {
            id: t.id.clone(),
            name: t.name.clone(),
            instruments,
            max_hours: t.max_hours_per_week,
        });
    }

    let mut student_ids = HashSet::new();
    let mut student_records = Vec::with_capacity(students.len());
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
        let instrument = match s.instrument.parse::<Instrument>() {
            Ok(i) => Some(i),
            Err(e) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownInstrument,
                    format!("Student '{}': {e}", s.id),
                ));
                None
            }
        };
        let skill = match s.skill_level.parse::<SkillLevel>() {
            Ok(l) => Some(l),
            Err(e) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSkillLevel,
                    format!("Student '{}': {e}", s.id),
                ));
                None
            }
        };
        let lessons = match u32::try_from(s.lessons_per_week) {
            Ok(n) if n > 0 => Some(n),
            _ => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    format!(
                        "Student '{}' has invalid lessons_per_week {}",
                        s.id, s.lessons_per_week
                    ),
                ));
                None
            }
        };
        if let (Some(instrument), Some(skill), Some(lessons_per_week)) =
            (instrument, skill, lessons)
        {
            student_records.push(StudentRecord {
                id: s.id.clone(),
                name: s.name.clone(),
                instrument,
                skill,
                lessons_per_week,
                target: limits.target_lessons.unwrap_or(lessons_per_week),
            });
        }
    }

    let mut room_ids = HashSet::new();
    let mut room_records = Vec::with_capacity(rooms.len());
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        let equipment = parse_instruments(&r.id, "equipment", &r.equipment, &mut errors);
        room_records.push(RoomRecord {
            id: r.id.clone(),
            equipment,
        });
    }

    if errors.is_empty() {
        Ok(ValidatedTables {
            teachers: teacher_records,
            students: student_records,
            rooms: room_records,
        })
    } else {
        Err(errors)
    }
}

fn check_limits(limits: &Limits, errors: &mut Vec<ValidationError>) {
    if limits.time_slots == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidLimits,
            "time_slots must be positive",
        ));
    }
    if !(limits.lesson_hours > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidLimits,
            format!("lesson_hours must be positive, got {}", limits.lesson_hours),
        ));
    }
    if limits.target_lessons == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidLimits,
            "target_lessons override must be positive",
        ));
    }
}

fn check_size(class: &str, len: usize, max: usize, errors: &mut Vec<ValidationError>) {
    if len == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyTable,
            format!("No {class} rows supplied"),
        ));
    } else if len > max {
        errors.push(ValidationError::new(
            ValidationErrorKind::CapacityExceeded,
            format!("{len} {class} rows exceed the configured maximum of {max}"),
        ));
    }
}

fn parse_instruments(
    owner: &str,
    field: &str,
    values: &[String],
    errors: &mut Vec<ValidationError>,
) -> InstrumentSet {
    let mut set = InstrumentSet::EMPTY;
    for value in values {
        match value.parse::<Instrument>() {
            Ok(i) => set.insert(i),
            Err(e) => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownInstrument,
                format!("'{owner}' {field}: {e}"),
            )),
        }
    }
    set
}
