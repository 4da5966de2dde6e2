//! Line-oriented interactive shell over a `StudentSession`.
//!
//! Each input line is one intent. `^n` and `esc` stand in for the panel's
//! keyboard shortcuts.

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context};
use student_core::{Field, KeyPress, StudentFilter, StudentId, StudentSession, Transport};

use crate::render::Renderer;

pub const HELP: &str = "\
commands:
  list                       reload all students
  search [term]              search cached students by name or email
  filter [status=S] [major=M] [gpa=G]
                             filter cached students (blank clears)
  stats                      load statistics
  majors                     list majors present in the cache
  new | ^n                   open an empty add form
  edit <id>                  open the edit form for a student
  set <field> <value>        change a form field (empty value clears it)
  save                       submit the open form
  delete <id>                ask to delete a student
  confirm                    confirm the pending delete
  esc                        close any open form or confirmation
  export                     write the cached students to CSV
  help                       show this text
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Reload,
    Search(String),
    Filter(StudentFilter),
    Stats,
    Majors,
    Key(KeyPress),
    Edit(StudentId),
    Set(Field, String),
    Save,
    Delete(StudentId),
    Confirm,
    Export,
    Help,
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "list" | "reload" => ShellCommand::Reload,
        "search" => ShellCommand::Search(rest.to_string()),
        "filter" => ShellCommand::Filter(parse_filter(rest)?),
        "stats" => ShellCommand::Stats,
        "majors" => ShellCommand::Majors,
        "new" | "^n" | "ctrl+n" => ShellCommand::Key(KeyPress::ctrl("n")),
        "esc" | "escape" => ShellCommand::Key(KeyPress::plain("Escape")),
        "edit" => ShellCommand::Edit(parse_id(rest)?),
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                bail!("usage: set <field> <value>");
            }
            ShellCommand::Set(name.parse()?, value.trim().to_string())
        }
        "save" => ShellCommand::Save,
        "delete" => ShellCommand::Delete(parse_id(rest)?),
        "confirm" => ShellCommand::Confirm,
        "export" => ShellCommand::Export,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => bail!("unknown command {other:?}; type `help`"),
    };
    Ok(Some(command))
}

fn parse_id(text: &str) -> anyhow::Result<StudentId> {
    text.parse()
        .with_context(|| format!("expected a numeric student id, got {text:?}"))
}

/// `key=value` pairs; a bare word continues the previous value so majors
/// with spaces work (`major=Computer Science`).
fn parse_filter(text: &str) -> anyhow::Result<StudentFilter> {
    let mut status = String::new();
    let mut major = String::new();
    let mut gpa = String::new();
    let mut current: Option<&mut String> = None;

    for token in text.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            let slot = match key.to_ascii_lowercase().as_str() {
                "status" => &mut status,
                "major" => &mut major,
                "gpa" | "mingpa" => &mut gpa,
                other => bail!("unknown filter {other:?}"),
            };
            slot.clear();
            slot.push_str(value);
            current = Some(slot);
        } else {
            let slot = current
                .as_mut()
                .ok_or_else(|| anyhow!("expected key=value, got {token:?}"))?;
            slot.push(' ');
            slot.push_str(token);
        }
    }

    Ok(StudentFilter::parse(&status, &major, &gpa)?)
}

pub async fn run<T, R, W>(
    session: &mut StudentSession,
    transport: &T,
    renderer: &mut Renderer<W>,
    input: R,
) -> anyhow::Result<()>
where
    T: Transport + ?Sized,
    R: BufRead,
    W: Write,
{
    session.load_all(transport).await;
    renderer.draw_all(session.take_updates())?;

    for line in input.lines() {
        let line = line.context("reading shell input")?;
        match parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Some(reply) = execute(session, transport, command).await {
                    renderer.message(&reply)?;
                }
            }
            Err(err) => renderer.message(&format!("{err:#}"))?,
        }
        renderer.draw_all(session.take_updates())?;
    }
    Ok(())
}

/// Run one command. Anything the session does not report through view
/// updates comes back as a plain reply.
async fn execute<T: Transport + ?Sized>(
    session: &mut StudentSession,
    transport: &T,
    command: ShellCommand,
) -> Option<String> {
    match command {
        ShellCommand::Reload => {
            session.load_all(transport).await;
        }
        ShellCommand::Search(term) => {
            session.search(&term);
        }
        ShellCommand::Filter(filter) => {
            session.filter(&filter);
        }
        ShellCommand::Stats => {
            session.load_statistics(transport).await;
        }
        ShellCommand::Majors => return Some(session.majors().join("\n")),
        ShellCommand::Key(press) => {
            session.handle_key(&press);
        }
        ShellCommand::Edit(id) => {
            session.begin_edit(transport, id).await;
        }
        ShellCommand::Set(field, value) => {
            if !session.set_field(field, value) {
                return Some("no form is open; use `new` or `edit <id>`".to_string());
            }
        }
        ShellCommand::Save => {
            session.save(transport).await;
        }
        ShellCommand::Delete(id) => session.request_delete(id),
        ShellCommand::Confirm => {
            session.confirm_delete(transport).await;
        }
        ShellCommand::Export => {
            session.export();
        }
        ShellCommand::Help => return Some(HELP.to_string()),
        ShellCommand::Quit => {}
    }
    None
}
