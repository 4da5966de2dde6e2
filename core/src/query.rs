//! Search and filter projections over the cached student list.
//!
//! Both functions read the slice they are given and return borrowed
//! references; the cache itself is never reordered or trimmed. Filters are
//! not composed with earlier results: callers always pass the full cache.

use std::collections::BTreeSet;

use crate::error::FormError;
use crate::types::{Student, StudentStatus};

/// Case-insensitive substring match on first name, last name or email.
/// An empty term matches everything.
pub fn search<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let needle = term.to_lowercase();
    students
        .iter()
        .filter(|student| matches_term(student, &needle))
        .collect()
}

fn matches_term(student: &Student, needle: &str) -> bool {
    [&student.first_name, &student.last_name, &student.email]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Conjunctive filter on status, major and minimum GPA. Unset criteria
/// match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub status: Option<StudentStatus>,
    pub major: Option<String>,
    pub min_gpa: Option<f64>,
}

impl StudentFilter {
    /// Build a filter from the raw text of the three filter inputs. Blank
    /// inputs leave the criterion unset.
    pub fn parse(status: &str, major: &str, min_gpa: &str) -> Result<Self, FormError> {
        let status = match status.trim() {
            "" => None,
            text => Some(text.parse()?),
        };
        let major = match major.trim() {
            "" => None,
            text => Some(text.to_string()),
        };
        let min_gpa = match min_gpa.trim() {
            "" => None,
            text => Some(
                text.parse::<f64>()
                    .ok()
                    .filter(|gpa| gpa.is_finite())
                    .ok_or_else(|| FormError::InvalidGpa(text.to_string()))?,
            ),
        };
        Ok(Self {
            status,
            major,
            min_gpa,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.major.is_none() && self.min_gpa.is_none()
    }

    pub fn matches(&self, student: &Student) -> bool {
        if let Some(status) = self.status {
            if student.status != status {
                return false;
            }
        }
        if let Some(major) = &self.major {
            if student.major.as_deref() != Some(major.as_str()) {
                return false;
            }
        }
        if let Some(min_gpa) = self.min_gpa {
            // No GPA on record never satisfies a GPA threshold.
            match student.gpa {
                Some(gpa) if gpa >= min_gpa => {}
                _ => return false,
            }
        }
        true
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Distinct majors present in `students`, sorted.
pub fn majors(students: &[Student]) -> Vec<String> {
    students
        .iter()
        .filter_map(|s| s.major.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
