//! Terminal renderer for session view updates.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use student_core::form::Field;
use student_core::view::{FormView, RowView, StatsView, TableView};
use student_core::{NotificationKind, ViewUpdate};
use tracing::warn;

pub struct Renderer<W: Write> {
    out: W,
    /// Where downloads land; the suggested file name in the working
    /// directory when unset.
    export_path: Option<PathBuf>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            export_path: None,
        }
    }

    pub fn with_export_path(mut self, path: Option<PathBuf>) -> Self {
        self.export_path = path;
        self
    }

    /// Plain text that is not a view update (help, command errors).
    pub fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn draw_all(&mut self, updates: Vec<ViewUpdate>) -> io::Result<()> {
        for update in &updates {
            self.draw(update)?;
        }
        self.out.flush()
    }

    pub fn draw(&mut self, update: &ViewUpdate) -> io::Result<()> {
        match update {
            ViewUpdate::Loading(true) => writeln!(self.out, "Loading students..."),
            ViewUpdate::Loading(false) => Ok(()),
            ViewUpdate::Table(table) => self.table(table),
            ViewUpdate::Statistics(stats) => self.statistics(stats),
            ViewUpdate::OpenForm(form) => self.form(form),
            ViewUpdate::CloseForm => writeln!(self.out, "(form closed)"),
            ViewUpdate::OpenDeleteConfirm { id, name } => writeln!(
                self.out,
                "Are you sure you want to delete {name} (#{id})? Type `confirm` to proceed or `esc` to cancel."
            ),
            ViewUpdate::CloseDeleteConfirm => writeln!(self.out, "(confirmation closed)"),
            ViewUpdate::Notify(notification) => {
                let tag = match notification.kind {
                    NotificationKind::Success => "ok",
                    NotificationKind::Error => "error",
                    NotificationKind::Info => "info",
                };
                writeln!(self.out, "[{tag}] {}", notification.message)
            }
            ViewUpdate::Download { file_name, content } => {
                let path = self
                    .export_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(file_name));
                // A failed export is reported like any other error; the
                // session keeps going.
                match fs::write(&path, content) {
                    Ok(()) => writeln!(self.out, "Wrote {}", path.display()),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "export write failed");
                        writeln!(self.out, "[error] could not write {}: {err}", path.display())
                    }
                }
            }
        }
    }

    fn table(&mut self, table: &TableView) -> io::Result<()> {
        if table.is_empty() {
            return writeln!(self.out, "No students found.");
        }

        let headers = ["ID", "Name", "Email", "Phone", "Major", "GPA", "Status"];
        let cells: Vec<[String; 7]> = table.rows.iter().map(row_cells).collect();
        let mut widths = headers.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_cells = headers.map(str::to_string);
        self.line(&header_cells, &widths)?;
        for row in &cells {
            self.line(row, &widths)?;
        }
        writeln!(self.out, "{} student(s)", cells.len())
    }

    fn line(&mut self, cells: &[String; 7], widths: &[usize; 7]) -> io::Result<()> {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        writeln!(self.out, "{}", padded.join("  ").trim_end())
    }

    fn statistics(&mut self, stats: &StatsView) -> io::Result<()> {
        writeln!(
            self.out,
            "Total: {}  Active: {}  Inactive: {}  Graduated: {}",
            stats.total, stats.active, stats.inactive, stats.graduated
        )
    }

    fn form(&mut self, view: &FormView) -> io::Result<()> {
        writeln!(self.out, "== {} ==", view.title)?;
        for field in Field::ALL {
            writeln!(self.out, "  {:<15} {}", field.name(), view.form.get(field))?;
        }
        Ok(())
    }
}

fn row_cells(row: &RowView) -> [String; 7] {
    [
        row.id.to_string(),
        row.name.clone(),
        row.email.clone(),
        row.phone.clone(),
        row.major.clone(),
        row.gpa.clone(),
        row.status.clone(),
    ]
}
