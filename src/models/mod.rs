//! Lesson scheduling domain models.
//!
//! Input records for the three entity classes, the closed instrument and
//! skill vocabularies, and the lesson/action tuples exchanged with the
//! decision-maker.
//!
//! # Domain Mappings
//!
//! | lesson-env | Generic scheduling |
//! |------------|--------------------|
//! | Teacher | Skilled human resource with a weekly capacity |
//! | Student | Task with a repeat count |
//! | Room | Equipped primary resource |
//! | Lesson | Assignment to a discrete time slot |

mod entity;
mod instrument;
mod lesson;

pub use entity::{Room, Student, Teacher};
pub use instrument::{Instrument, InstrumentSet, SkillLevel, UnknownName};
pub use lesson::{Action, Lesson, ScheduledLesson};
