//! The add/edit form as text fields, and its conversion to a payload.

use std::str::FromStr;

use chrono::NaiveDate;
use email_address::EmailAddress;

use crate::error::FormError;
use crate::types::{Student, StudentId, StudentPayload, StudentStatus};

const GPA_RANGE: std::ops::RangeInclusive<f64> = 0.0..=4.0;

/// Which record the open form targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(StudentId),
}

impl FormMode {
    pub fn target(self) -> Option<StudentId> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormMode::Create => "Add New Student",
            FormMode::Edit(_) => "Edit Student",
        }
    }
}

/// Form inputs, keyed by the names the backend uses for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    EnrollmentDate,
    Address,
    Major,
    Gpa,
    Status,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::DateOfBirth,
        Field::EnrollmentDate,
        Field::Address,
        Field::Major,
        Field::Gpa,
        Field::Status,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::DateOfBirth => "dateOfBirth",
            Field::EnrollmentDate => "enrollmentDate",
            Field::Address => "address",
            Field::Major => "major",
            Field::Gpa => "gpa",
            Field::Status => "status",
        }
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// Text content of every input on the student form.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub enrollment_date: String,
    pub address: String,
    pub major: String,
    pub gpa: String,
    pub status: String,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            date_of_birth: String::new(),
            enrollment_date: String::new(),
            address: String::new(),
            major: String::new(),
            gpa: String::new(),
            status: StudentStatus::default().as_str().to_string(),
        }
    }
}

impl StudentForm {
    /// Populate the form from a fetched record; absent values become blank.
    pub fn from_student(student: &Student) -> Self {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }
        fn date(value: Option<NaiveDate>) -> String {
            value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        }

        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            phone: text(&student.phone),
            date_of_birth: date(student.date_of_birth),
            enrollment_date: date(student.enrollment_date),
            address: text(&student.address),
            major: text(&student.major),
            gpa: student.gpa.map(|g| g.to_string()).unwrap_or_default(),
            status: student.status.as_str().to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::DateOfBirth => &self.date_of_birth,
            Field::EnrollmentDate => &self.enrollment_date,
            Field::Address => &self.address,
            Field::Major => &self.major,
            Field::Gpa => &self.gpa,
            Field::Status => &self.status,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::EnrollmentDate => &mut self.enrollment_date,
            Field::Address => &mut self.address,
            Field::Major => &mut self.major,
            Field::Gpa => &mut self.gpa,
            Field::Status => &mut self.status,
        };
        *slot = value.into();
    }

    /// Validate the inputs and build the request payload. Blank optional
    /// inputs become `None`, never empty strings.
    pub fn to_payload(&self) -> Result<StudentPayload, FormError> {
        let first_name = required(&self.first_name, Field::FirstName)?;
        let last_name = required(&self.last_name, Field::LastName)?;
        let email = required(&self.email, Field::Email)?;
        if !EmailAddress::is_valid(&email) {
            return Err(FormError::InvalidEmail(email));
        }

        Ok(StudentPayload {
            first_name,
            last_name,
            email,
            phone: optional(&self.phone),
            date_of_birth: parse_date(&self.date_of_birth, Field::DateOfBirth)?,
            enrollment_date: parse_date(&self.enrollment_date, Field::EnrollmentDate)?,
            address: optional(&self.address),
            major: optional(&self.major),
            gpa: parse_gpa(&self.gpa)?,
            status: match self.status.trim() {
                "" => StudentStatus::default(),
                text => text.parse()?,
            },
        })
    }
}

fn required(value: &str, field: Field) -> Result<String, FormError> {
    optional(value).ok_or(FormError::MissingField(field.name()))
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_date(value: &str, field: Field) -> Result<Option<NaiveDate>, FormError> {
    optional(value)
        .map(|text| {
            NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| FormError::InvalidDate {
                field: field.name(),
                value: text,
            })
        })
        .transpose()
}

fn parse_gpa(value: &str) -> Result<Option<f64>, FormError> {
    optional(value)
        .map(|text| match text.parse::<f64>() {
            Ok(gpa) if GPA_RANGE.contains(&gpa) => Ok(gpa),
            _ => Err(FormError::InvalidGpa(text)),
        })
        .transpose()
}
