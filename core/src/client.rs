//! Stateless HTTP request builder and response parser for the student API.
//!
//! # Design
//! `StudentClient` holds only a `base_url` and carries no mutable state
//! between calls. Each backend operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{encode_component, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Statistics, Student, StudentId, StudentPayload, StudentStatus};

const STUDENTS_PATH: &str = "/api/students";

/// Synchronous, stateless client for the student API.
#[derive(Debug, Clone)]
pub struct StudentClient {
    base_url: String,
}

impl StudentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{STUDENTS_PATH}{suffix}", self.base_url)
    }

    fn get(&self, suffix: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(suffix),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json(
        &self,
        method: HttpMethod,
        suffix: &str,
        payload: &StudentPayload,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(suffix),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_students(&self) -> HttpRequest {
        self.get("")
    }

    pub fn build_get_student(&self, id: StudentId) -> HttpRequest {
        self.get(&format!("/{id}"))
    }

    pub fn build_statistics(&self) -> HttpRequest {
        self.get("/statistics")
    }

    pub fn build_create_student(&self, input: &StudentPayload) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "", input)
    }

    pub fn build_update_student(
        &self,
        id: StudentId,
        input: &StudentPayload,
    ) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, &format!("/{id}"), input)
    }

    pub fn build_delete_student(&self, id: StudentId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(&format!("/{id}")),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_find_by_email(&self, email: &str) -> HttpRequest {
        self.get(&format!("/email/{}", encode_component(email)))
    }

    pub fn build_list_by_status(&self, status: StudentStatus) -> HttpRequest {
        self.get(&format!("/status/{status}"))
    }

    pub fn build_list_by_major(&self, major: &str) -> HttpRequest {
        self.get(&format!("/major/{}", encode_component(major)))
    }

    pub fn build_search_by_name(&self, name: &str) -> HttpRequest {
        self.get(&format!("/search?name={}", encode_component(name)))
    }

    pub fn build_list_by_min_gpa(&self, min_gpa: f64) -> HttpRequest {
        self.get(&format!("/gpa?minGpa={min_gpa}"))
    }

    pub fn build_list_active_high_gpa(&self, min_gpa: f64) -> HttpRequest {
        self.get(&format!("/active/high-gpa?minGpa={min_gpa}"))
    }

    pub fn build_health(&self) -> HttpRequest {
        self.get("/health")
    }

    pub fn parse_list_students(&self, response: HttpResponse) -> Result<Vec<Student>, ApiError> {
        decode(response)
    }

    pub fn parse_get_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode(response)
    }

    pub fn parse_statistics(&self, response: HttpResponse) -> Result<Statistics, ApiError> {
        decode(response)
    }

    pub fn parse_create_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode(response)
    }

    pub fn parse_update_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode(response)
    }

    pub fn parse_delete_student(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Parses the response of any of the query helpers (`by status`,
    /// `by major`, `search`, `gpa`, `active/high-gpa`).
    pub fn parse_student_list(&self, response: HttpResponse) -> Result<Vec<Student>, ApiError> {
        decode(response)
    }

    pub fn parse_find_by_email(&self, response: HttpResponse) -> Result<Student, ApiError> {
        decode(response)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        Ok(response.body)
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        400 => Err(ApiError::Validation {
            body: response.body.clone(),
        }),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StudentClient {
        StudentClient::new("http://localhost:8080")
    }

    fn payload() -> StudentPayload {
        StudentPayload {
            first_name: "Ana".to_string(),
            last_name: "Li".to_string(),
            email: "ana@x.com".to_string(),
            phone: None,
            date_of_birth: None,
            enrollment_date: None,
            address: None,
            major: Some("Math".to_string()),
            gpa: Some(3.5),
            status: StudentStatus::Active,
        }
    }

    const ANA: &str = r#"{"id":1,"firstName":"Ana","lastName":"Li","email":"ana@x.com","major":"Math","gpa":3.5,"status":"ACTIVE"}"#;

    #[test]
    fn build_list_students_produces_correct_request() {
        let req = client().build_list_students();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/students");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_student_produces_correct_request() {
        let req = client().build_get_student(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/students/42");
    }

    #[test]
    fn build_statistics_targets_statistics_path() {
        let req = client().build_statistics();
        assert_eq!(req.path, "http://localhost:8080/api/students/statistics");
    }

    #[test]
    fn build_create_student_produces_correct_request() {
        let req = client().build_create_student(&payload()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/students");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["firstName"], "Ana");
        assert_eq!(body["gpa"], 3.5);
        assert!(body["phone"].is_null());
    }

    #[test]
    fn build_update_student_produces_correct_request() {
        let req = client().build_update_student(3, &payload()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8080/api/students/3");
        assert!(req.body.is_some());
    }

    #[test]
    fn build_delete_student_produces_correct_request() {
        let req = client().build_delete_student(3);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8080/api/students/3");
        assert!(req.body.is_none());
    }

    #[test]
    fn query_helpers_encode_their_arguments() {
        let c = client();
        assert_eq!(
            c.build_find_by_email("ana@x.com").path,
            "http://localhost:8080/api/students/email/ana%40x.com"
        );
        assert_eq!(
            c.build_list_by_major("Computer Science").path,
            "http://localhost:8080/api/students/major/Computer%20Science"
        );
        assert_eq!(
            c.build_list_by_status(StudentStatus::Graduated).path,
            "http://localhost:8080/api/students/status/GRADUATED"
        );
        assert_eq!(
            c.build_search_by_name("van der").path,
            "http://localhost:8080/api/students/search?name=van%20der"
        );
        assert_eq!(
            c.build_list_by_min_gpa(3.5).path,
            "http://localhost:8080/api/students/gpa?minGpa=3.5"
        );
        assert_eq!(
            c.build_list_active_high_gpa(3.0).path,
            "http://localhost:8080/api/students/active/high-gpa?minGpa=3"
        );
    }

    #[test]
    fn parse_list_students_success() {
        let response = HttpResponse::new(200, format!("[{ANA}]"));
        let students = client().parse_list_students(response).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].first_name, "Ana");
    }

    #[test]
    fn parse_get_student_not_found() {
        let err = client()
            .parse_get_student(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_student_accepts_201() {
        let student = client()
            .parse_create_student(HttpResponse::new(201, ANA))
            .unwrap();
        assert_eq!(student.id, 1);
    }

    #[test]
    fn parse_create_student_bad_request_is_validation() {
        let err = client()
            .parse_create_student(HttpResponse::new(400, ""))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn parse_update_student_wrong_status() {
        let err = client()
            .parse_update_student(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_delete_student_success() {
        assert!(client()
            .parse_delete_student(HttpResponse::new(204, ""))
            .is_ok());
    }

    #[test]
    fn parse_delete_student_not_found() {
        let err = client()
            .parse_delete_student(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_statistics_success() {
        let stats = client()
            .parse_statistics(HttpResponse::new(
                200,
                r#"{"totalStudents":3,"activeStudents":1,"inactiveStudents":1,"graduatedStudents":1}"#,
            ))
            .unwrap();
        assert_eq!(stats.total_students, 3);
    }

    #[test]
    fn parse_health_returns_body_text() {
        let text = client()
            .parse_health(HttpResponse::new(200, "Student Management API is running!"))
            .unwrap();
        assert_eq!(text, "Student Management API is running!");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = StudentClient::new("http://localhost:8080/");
        let req = client.build_list_students();
        assert_eq!(req.path, "http://localhost:8080/api/students");
    }

    #[test]
    fn parse_list_students_bad_json() {
        let err = client()
            .parse_list_students(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
