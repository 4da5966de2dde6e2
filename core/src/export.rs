//! CSV export of the cached student list.
//!
//! Text columns are always quoted (embedded quotes doubled); id, GPA,
//! status and enrollment date are written bare. Rows keep cache order and
//! lines are joined with `\n`.

use crate::types::Student;

pub const EXPORT_FILE_NAME: &str = "students.csv";

pub const HEADERS: [&str; 9] = [
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Major",
    "GPA",
    "Status",
    "Enrollment Date",
];

pub fn to_csv(students: &[Student]) -> String {
    let mut lines = Vec::with_capacity(students.len() + 1);
    lines.push(HEADERS.join(","));
    lines.extend(students.iter().map(row));
    lines.join("\n")
}

fn row(student: &Student) -> String {
    [
        student.id.to_string(),
        quoted(&student.first_name),
        quoted(&student.last_name),
        quoted(&student.email),
        quoted(student.phone.as_deref().unwrap_or_default()),
        quoted(student.major.as_deref().unwrap_or_default()),
        student.gpa.map(|g| g.to_string()).unwrap_or_default(),
        student.status.to_string(),
        student
            .enrollment_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    ]
    .join(",")
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
