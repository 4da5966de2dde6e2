use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Inactive,
    Graduated,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub major: Option<String>,
    pub gpa: Option<f64>,
    pub status: Status,
}

/// Body of POST and PUT. Missing names or email deserialize as blank and
/// are then rejected with 400.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub major: Option<String>,
    pub gpa: Option<f64>,
    pub status: Option<Status>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_students: u64,
    pub active_students: u64,
    pub inactive_students: u64,
    pub graduated_students: u64,
}

#[derive(Debug, Default)]
pub struct Store {
    last_id: i64,
    students: BTreeMap<i64, Student>,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.students
            .values()
            .any(|s| s.email == email && Some(s.id) != except)
    }

    fn matching(&self, predicate: impl Fn(&Student) -> bool) -> Vec<Student> {
        self.students.values().filter(|s| predicate(s)).cloned().collect()
    }
}

pub type Db = Arc<RwLock<Store>>;

pub const HEALTH_MESSAGE: &str = "Student Management API is running!";

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/statistics", get(statistics))
        .route("/api/students/health", get(health))
        .route("/api/students/search", get(search_by_name))
        .route("/api/students/gpa", get(by_min_gpa))
        .route("/api/students/active/high-gpa", get(active_high_gpa))
        .route("/api/students/email/{email}", get(by_email))
        .route("/api/students/status/{status}", get(by_status))
        .route("/api/students/major/{major}", get(by_major))
        .route(
            "/api/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Unpack a JSON body. Any rejection (malformed JSON, unknown status,
/// mistyped field) is a 400 like the other validation failures.
fn body(input: Result<Json<StudentInput>, JsonRejection>) -> Result<StudentInput, StatusCode> {
    input.map(|Json(input)| input).map_err(|rejection| {
        debug!(%rejection, "rejecting unreadable student payload");
        StatusCode::BAD_REQUEST
    })
}

fn validate(input: &StudentInput) -> Result<(), StatusCode> {
    let blank = [&input.first_name, &input.last_name, &input.email]
        .into_iter()
        .any(|field| field.trim().is_empty());
    let bad_gpa = input.gpa.is_some_and(|gpa| !(0.0..=4.0).contains(&gpa));
    if blank || bad_gpa || !EmailAddress::is_valid(&input.email) {
        debug!(email = %input.email, "rejecting invalid student payload");
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn list_students(State(db): State<Db>) -> Json<Vec<Student>> {
    let store = db.read().await;
    Json(store.students.values().cloned().collect())
}

async fn create_student(
    State(db): State<Db>,
    input: Result<Json<StudentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), StatusCode> {
    let input = body(input)?;
    validate(&input)?;
    let mut store = db.write().await;
    if store.email_taken(&input.email, None) {
        debug!(email = %input.email, "duplicate email on create");
        return Err(StatusCode::BAD_REQUEST);
    }
    store.last_id += 1;
    let student = Student {
        id: store.last_id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone: input.phone,
        date_of_birth: input.date_of_birth,
        enrollment_date: input
            .enrollment_date
            .or_else(|| Some(Local::now().date_naive())),
        address: input.address,
        major: input.major,
        gpa: input.gpa,
        status: input.status.unwrap_or(Status::Active),
    };
    store.students.insert(student.id, student.clone());
    info!(id = student.id, "student created");
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, StatusCode> {
    let store = db.read().await;
    store.students.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Replaces every field except id and enrollment date, so status is
/// required here even though create defaults it.
async fn update_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
    input: Result<Json<StudentInput>, JsonRejection>,
) -> Result<Json<Student>, StatusCode> {
    let input = body(input)?;
    let mut store = db.write().await;
    if !store.students.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    validate(&input)?;
    let Some(status) = input.status else {
        debug!(id, "update without status");
        return Err(StatusCode::BAD_REQUEST);
    };
    if store.email_taken(&input.email, Some(id)) {
        debug!(id, email = %input.email, "email belongs to another student");
        return Err(StatusCode::BAD_REQUEST);
    }
    let student = store.students.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    student.first_name = input.first_name;
    student.last_name = input.last_name;
    student.email = input.email;
    student.phone = input.phone;
    student.date_of_birth = input.date_of_birth;
    student.address = input.address;
    student.major = input.major;
    student.gpa = input.gpa;
    student.status = status;
    info!(id, "student updated");
    Ok(Json(student.clone()))
}

async fn delete_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .students
        .remove(&id)
        .map(|_| {
            info!(id, "student deleted");
            StatusCode::NO_CONTENT
        })
        .ok_or(StatusCode::NOT_FOUND)
}

async fn statistics(State(db): State<Db>) -> Json<Statistics> {
    let store = db.read().await;
    let count = |status: Status| store.students.values().filter(|s| s.status == status).count() as u64;
    Json(Statistics {
        total_students: store.students.len() as u64,
        active_students: count(Status::Active),
        inactive_students: count(Status::Inactive),
        graduated_students: count(Status::Graduated),
    })
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

async fn by_email(
    State(db): State<Db>,
    Path(email): Path<String>,
) -> Result<Json<Student>, StatusCode> {
    let store = db.read().await;
    store
        .students
        .values()
        .find(|s| s.email == email)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn by_status(State(db): State<Db>, Path(status): Path<Status>) -> Json<Vec<Student>> {
    Json(db.read().await.matching(|s| s.status == status))
}

async fn by_major(State(db): State<Db>, Path(major): Path<String>) -> Json<Vec<Student>> {
    Json(db.read().await.matching(|s| s.major.as_deref() == Some(major.as_str())))
}

#[derive(Deserialize)]
pub struct NameQuery {
    pub name: String,
}

async fn search_by_name(State(db): State<Db>, Query(query): Query<NameQuery>) -> Json<Vec<Student>> {
    let needle = query.name.to_lowercase();
    Json(db.read().await.matching(|s| {
        s.first_name.to_lowercase().contains(&needle) || s.last_name.to_lowercase().contains(&needle)
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaQuery {
    pub min_gpa: f64,
}

async fn by_min_gpa(State(db): State<Db>, Query(query): Query<GpaQuery>) -> Json<Vec<Student>> {
    Json(db.read().await.matching(|s| s.gpa.is_some_and(|gpa| gpa >= query.min_gpa)))
}

async fn active_high_gpa(
    State(db): State<Db>,
    Query(query): Query<GpaQuery>,
) -> Json<Vec<Student>> {
    let mut students = db.read().await.matching(|s| {
        s.status == Status::Active && s.gpa.is_some_and(|gpa| gpa >= query.min_gpa)
    });
    students.sort_by(|a, b| b.gpa.partial_cmp(&a.gpa).unwrap_or(Ordering::Equal));
    Json(students)
}
