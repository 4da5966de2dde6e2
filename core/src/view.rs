//! Plain-data view models handed from the session to the renderer.
//!
//! Nothing here knows how it will be drawn. The session pushes
//! `ViewUpdate`s in the order they happen and the host drains them.

use std::time::{Duration, Instant};

use crate::form::{FormMode, StudentForm};
use crate::types::{Statistics, Student, StudentId};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

const PLACEHOLDER: &str = "-";

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub major: String,
    pub gpa: String,
    pub status: String,
    /// Lowercase status, for styling hooks.
    pub status_class: String,
}

impl From<&Student> for RowView {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.full_name(),
            email: student.email.clone(),
            phone: or_placeholder(student.phone.as_deref()),
            major: or_placeholder(student.major.as_deref()),
            gpa: student
                .gpa
                .map(|gpa| format!("{gpa:.2}"))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            status: student.status.to_string(),
            status_class: student.status.as_str().to_lowercase(),
        }
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub rows: Vec<RowView>,
}

impl TableView {
    pub fn new<'a>(students: impl IntoIterator<Item = &'a Student>) -> Self {
        Self {
            rows: students.into_iter().map(RowView::from).collect(),
        }
    }

    /// The "no students found" state.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsView {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub graduated: u64,
}

impl From<Statistics> for StatsView {
    fn from(stats: Statistics) -> Self {
        Self {
            total: stats.total_students,
            active: stats.active_students,
            inactive: stats.inactive_students,
            graduated: stats.graduated_students,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub title: &'static str,
    pub mode: FormMode,
    pub form: StudentForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A short-lived message for the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub raised_at: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < NOTIFICATION_TTL
    }
}

/// Something the renderer should change on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Loading(bool),
    Table(TableView),
    Statistics(StatsView),
    OpenForm(FormView),
    CloseForm,
    OpenDeleteConfirm { id: StudentId, name: String },
    CloseDeleteConfirm,
    Notify(Notification),
    Download { file_name: String, content: String },
}
