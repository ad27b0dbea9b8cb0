//! CSV entity tables.
//!
//! Reads the three input tables and writes a committed schedule.
//!
//! | Table | Columns |
//! |-------|---------|
//! | teachers | `Teacher_ID`, `Instruments`, `Max_Hours_Per_Week` (optional `Name`) |
//! | students | `Student_ID`, `Instrument`, `Skill_Level`, `Lessons_Per_Week` (optional `Name`) |
//! | rooms | `Room_ID`, `Equipment` |
//! | schedule (output) | `Teacher_ID`, `Student_ID`, `Room_ID`, `Time_Slot` |
//!
//! Extra columns are ignored. Multi-valued cells accept a bracketed list
//! (`['Piano', 'Guitar']`) or a plain `;`/`,` separated list.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Limits;
use crate::error::Error;
use crate::models::{Room, ScheduledLesson, Student, Teacher};
use crate::registry::EntityRegistry;

#[derive(Debug, Deserialize)]
struct TeacherRow {
    #[serde(rename = "Teacher_ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Instruments")]
    instruments: String,
    #[serde(rename = "Max_Hours_Per_Week")]
    max_hours: f64,
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    #[serde(rename = "Student_ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Instrument")]
    instrument: String,
    #[serde(rename = "Skill_Level")]
    skill_level: String,
    #[serde(rename = "Lessons_Per_Week")]
    lessons_per_week: i64,
}

#[derive(Debug, Deserialize)]
struct RoomRow {
    #[serde(rename = "Room_ID")]
    id: String,
    #[serde(rename = "Equipment")]
    equipment: String,
}

/// Reads a teacher table.
pub fn read_teachers<R: io::Read>(reader: R) -> Result<Vec<Teacher>, Error> {
    read_rows(reader, |row: TeacherRow| Teacher {
        id: row.id,
        name: row.name,
        instruments: split_list(&row.instruments),
        max_hours_per_week: row.max_hours,
    })
}

/// Reads a student table.
pub fn read_students<R: io::Read>(reader: R) -> Result<Vec<Student>, Error> {
    read_rows(reader, |row: StudentRow| Student {
        id: row.id,
        name: row.name,
        instrument: row.instrument,
        skill_level: row.skill_level,
        lessons_per_week: row.lessons_per_week,
    })
}

/// Reads a room table.
pub fn read_rooms<R: io::Read>(reader: R) -> Result<Vec<Room>, Error> {
    read_rows(reader, |row: RoomRow| Room {
        id: row.id,
        equipment: split_list(&row.equipment),
    })
}

/// Reads the three tables from disk and builds a registry.
pub fn load_registry(
    teachers: impl AsRef<Path>,
    students: impl AsRef<Path>,
    rooms: impl AsRef<Path>,
    limits: Limits,
) -> Result<EntityRegistry, Error> {
    let teachers = read_teachers(File::open(teachers)?)?;
    let students = read_students(File::open(students)?)?;
    let rooms = read_rooms(File::open(rooms)?)?;
    Ok(EntityRegistry::load_with(&teachers, &students, &rooms, limits)?)
}

/// Writes committed lessons with a header row.
pub fn write_schedule<W: io::Write>(lessons: &[ScheduledLesson], writer: W) -> Result<(), Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["Teacher_ID", "Student_ID", "Room_ID", "Time_Slot"])?;
    for lesson in lessons {
        wtr.serialize(lesson)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_rows<R, Row, T>(reader: R, convert: impl Fn(Row) -> T) -> Result<Vec<T>, Error>
where
    R: io::Read,
    Row: DeserializeOwned + HasId,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (i, result) in rdr.deserialize::<Row>().enumerate() {
        let row = result?;
        // Header is line 1.
        let line = i + 2;
        if row.id().is_empty() {
            return Err(Error::Table {
                row: line,
                message: "empty identifier".into(),
            });
        }
        out.push(convert(row));
    }
    debug!(rows = out.len(), "table read");
    Ok(out)
}

trait HasId {
    fn id(&self) -> &str;
}

impl HasId for TeacherRow {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for StudentRow {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for RoomRow {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Splits a multi-valued cell: `['Piano', 'Guitar']`, `Piano;Guitar`, `Piano, Guitar`.
fn split_list(cell: &str) -> Vec<String> {
    let inner = cell.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split([',', ';'])
        .map(|item| item.trim().trim_matches(['\'', '"']).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEACHERS: &str = "\
Teacher_ID,Name,Instruments,Max_Hours_Per_Week
T001,Ada,\"['Piano', 'Violin']\",12
T002,Ben,Guitar;Drums,8
";

    const STUDENTS: &str = "\
Student_ID,Name,Instrument,Skill_Level,Lessons_Per_Week,Notes
S001,Cy,Piano,Beginner,2,likes jazz
S002,Di,Drums,Advanced,1,
";

    const ROOMS: &str = "\
Room_ID,Equipment
R01,\"['Piano', 'Drums']\"
R02,Guitar
";

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("['Piano', 'Guitar']"), vec!["Piano", "Guitar"]);
        assert_eq!(split_list("Piano;Drums"), vec!["Piano", "Drums"]);
        assert_eq!(split_list(" Violin "), vec!["Violin"]);
        assert!(split_list("[]").is_empty());
    }

    #[test]
    fn test_read_tables() {
        let teachers = read_teachers(TEACHERS.as_bytes()).unwrap();
        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers[0].name, "Ada");
        assert_eq!(teachers[0].instruments, vec!["Piano", "Violin"]);
        assert_eq!(teachers[1].instruments, vec!["Guitar", "Drums"]);
        assert!((teachers[1].max_hours_per_week - 8.0).abs() < 1e-10);

        let students = read_students(STUDENTS.as_bytes()).unwrap();
        assert_eq!(students[0].lessons_per_week, 2);
        assert_eq!(students[1].skill_level, "Advanced");

        let rooms = read_rooms(ROOMS.as_bytes()).unwrap();
        assert_eq!(rooms[0].equipment, vec!["Piano", "Drums"]);

        let reg = EntityRegistry::load(&teachers, &students, &rooms).unwrap();
        assert_eq!(reg.teacher_count(), 2);
        assert_eq!(reg.student_idx("S002"), Some(1));
    }

    #[test]
    fn test_name_column_optional() {
        let csv = "Teacher_ID,Instruments,Max_Hours_Per_Week\nT1,Piano,5\n";
        let teachers = read_teachers(csv.as_bytes()).unwrap();
        assert_eq!(teachers[0].name, "");
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = read_rooms("Room_ID,Equipment\nR1,Piano\n,Guitar\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Table { row: 3, .. }));
    }

    #[test]
    fn test_bad_number_is_csv_error() {
        let csv = "Student_ID,Instrument,Skill_Level,Lessons_Per_Week\nS1,Piano,Beginner,two\n";
        let err = read_students(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_load_registry_from_files() {
        let dir = std::env::temp_dir().join(format!("lesson-env-tables-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let [teachers, students, rooms] = [
            ("teachers.csv", TEACHERS),
            ("students.csv", STUDENTS),
            ("rooms.csv", ROOMS),
        ]
        .map(|(name, body)| {
            let path = dir.join(name);
            std::fs::write(&path, body).unwrap();
            path
        });

        let reg = load_registry(&teachers, &students, &rooms, Limits::default()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(reg.teacher_count(), 2);
        assert_eq!(reg.student_count(), 2);
        assert_eq!(reg.room_count(), 2);
        assert_eq!(reg.teacher_idx("T002"), Some(1));
        assert_eq!(reg.target_for(0), 2);
    }

    #[test]
    fn test_load_registry_missing_file() {
        let dir = std::env::temp_dir().join(format!("lesson-env-missing-{}", std::process::id()));
        let err = load_registry(
            dir.join("teachers.csv"),
            dir.join("students.csv"),
            dir.join("rooms.csv"),
            Limits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_write_schedule() {
        let lessons = vec![ScheduledLesson {
            teacher_id: "T001".into(),
            student_id: "S001".into(),
            room_id: "R01".into(),
            time_slot: 3,
        }];
        let mut buf = Vec::new();
        write_schedule(&lessons, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Teacher_ID,Student_ID,Room_ID,Time_Slot\nT001,S001,R01,3\n");
    }

    #[test]
    fn test_write_empty_schedule_has_header() {
        let mut buf = Vec::new();
        write_schedule(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Teacher_ID,Student_ID,Room_ID,Time_Slot\n");
    }
}
