//! `students`: terminal front end for the student-records panel.
//!
//! One-shot subcommands run a single intent against a fresh session;
//! `shell` keeps a session alive and reads intents line by line.

mod render;
mod shell;
mod transport;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use student_core::{Field, StudentClient, StudentFilter, StudentId, StudentSession};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::render::Renderer;
use crate::transport::UreqTransport;

#[derive(Parser)]
#[command(name = "students", version, about = "Student records administration console")]
struct Cli {
    /// Base URL of the student records API.
    #[arg(long, env = "STUDENTS_API_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every student.
    List,
    /// Search by first name, last name or email.
    Search { term: String },
    /// Filter by status, major and minimum GPA.
    Filter {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        min_gpa: Option<String>,
    },
    /// Show counts by status.
    Stats,
    /// Show one student's details.
    Show { id: StudentId },
    /// Create a student.
    Add(StudentArgs),
    /// Change fields of an existing student.
    Edit {
        id: StudentId,
        #[command(flatten)]
        fields: StudentArgs,
    },
    /// Delete a student.
    Delete {
        id: StudentId,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Export every student to CSV.
    Export {
        /// Output path (defaults to students.csv).
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Interactive session.
    Shell,
}

#[derive(Args, Default)]
struct StudentArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date_of_birth: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    enrollment_date: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    major: Option<String>,
    #[arg(long)]
    gpa: Option<String>,
    /// ACTIVE, INACTIVE or GRADUATED
    #[arg(long)]
    status: Option<String>,
}

impl StudentArgs {
    /// The fields given on the command line, in form order.
    fn assignments(&self) -> Vec<(Field, &str)> {
        [
            (Field::FirstName, &self.first_name),
            (Field::LastName, &self.last_name),
            (Field::Email, &self.email),
            (Field::Phone, &self.phone),
            (Field::DateOfBirth, &self.date_of_birth),
            (Field::EnrollmentDate, &self.enrollment_date),
            (Field::Address, &self.address),
            (Field::Major, &self.major),
            (Field::Gpa, &self.gpa),
            (Field::Status, &self.status),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    fn apply(&self, session: &mut StudentSession) {
        for (field, value) in self.assignments() {
            session.set_field(field, value);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(base_url = %cli.base_url, "starting console");

    let transport = UreqTransport::new();
    let mut session = StudentSession::new(StudentClient::new(&cli.base_url));
    let export_path = match &cli.command {
        Command::Export { out } => out.clone(),
        _ => None,
    };
    let mut renderer = Renderer::new(io::stdout()).with_export_path(export_path);

    let ok = match cli.command {
        Command::List => session.load_all(&transport).await,
        Command::Search { term } => {
            let loaded = session.load_all(&transport).await;
            session.take_updates();
            loaded && session.search(&term) > 0
        }
        Command::Filter {
            status,
            major,
            min_gpa,
        } => {
            let filter = StudentFilter::parse(
                status.as_deref().unwrap_or_default(),
                major.as_deref().unwrap_or_default(),
                min_gpa.as_deref().unwrap_or_default(),
            )?;
            let loaded = session.load_all(&transport).await;
            session.take_updates();
            loaded && session.filter(&filter) > 0
        }
        Command::Stats => session.load_statistics(&transport).await.is_some(),
        Command::Show { id } => session.begin_edit(&transport, id).await,
        Command::Add(fields) => {
            session.begin_create();
            fields.apply(&mut session);
            session.save(&transport).await
        }
        Command::Edit { id, fields } => {
            if session.begin_edit(&transport, id).await {
                fields.apply(&mut session);
                session.save(&transport).await
            } else {
                false
            }
        }
        Command::Delete { id, yes } => {
            session.load_all(&transport).await;
            session.take_updates();
            session.request_delete(id);
            renderer.draw_all(session.take_updates())?;
            if yes || confirm(io::stdin().lock())? {
                session.confirm_delete(&transport).await
            } else {
                session.close_delete_confirm();
                false
            }
        }
        Command::Export { .. } => {
            let loaded = session.load_all(&transport).await;
            session.take_updates();
            if loaded {
                session.export();
            }
            loaded
        }
        Command::Shell => {
            let stdin = io::stdin();
            shell::run(&mut session, &transport, &mut renderer, stdin.lock()).await?;
            true
        }
    };

    renderer.draw_all(session.take_updates())?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Read a yes/no answer; anything but `y`/`yes` declines.
fn confirm(mut input: impl BufRead) -> io::Result<bool> {
    print!("Delete? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
