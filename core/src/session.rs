//! The client session: cached records, modal state, and the intents that
//! drive them.
//!
//! # Design
//! `StudentSession` is the only owner of the cache and the selection state.
//! Network intents are `async` and take a `&impl Transport`; every outcome,
//! good or bad, ends up as queued `ViewUpdate`s plus a `bool`/`Option`
//! return. Failures never escape as errors: they become a notification and
//! leave the cache as it was.
//!
//! Mutations never patch the cache. After a successful save or delete the
//! whole list is fetched again.
//!
//! Edit fetches are sequenced with `EditTicket`s. A response that arrives
//! after a newer edit request, or after the form was re-targeted or closed,
//! is dropped instead of overwriting the form.

use tracing::{debug, info, warn};

use crate::client::StudentClient;
use crate::error::ApiError;
use crate::export::{self, EXPORT_FILE_NAME};
use crate::form::{Field, FormMode, StudentForm};
use crate::http::{HttpRequest, HttpResponse};
use crate::keyboard::{KeyPress, Shortcut};
use crate::query::{self, StudentFilter};
use crate::transport::Transport;
use crate::types::{Statistics, Student, StudentId};
use crate::view::{
    FormView, Notification, NotificationKind, StatsView, TableView, ViewUpdate,
};

pub const LOAD_ERROR: &str = "Error loading students";
pub const STATISTICS_ERROR: &str = "Error loading statistics";
pub const DETAILS_ERROR: &str = "Error loading student details";
pub const DUPLICATE_OR_INVALID: &str = "Email already exists or invalid data";
pub const SAVE_ERROR: &str = "Error saving student";
pub const CREATED: &str = "Student added successfully!";
pub const UPDATED: &str = "Student updated successfully!";
pub const DELETED: &str = "Student deleted successfully!";
pub const DELETE_ERROR: &str = "Error deleting student";
pub const EXPORTED: &str = "Students exported to CSV successfully!";
pub const NO_FORM_OPEN: &str = "No student form is open";
pub const NOTHING_TO_DELETE: &str = "No student selected for deletion";

/// The record a delete confirmation is asking about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub id: StudentId,
    pub name: String,
}

/// Handle for one in-flight "begin edit" fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTicket {
    id: StudentId,
    sequence: u64,
}

impl EditTicket {
    pub fn id(&self) -> StudentId {
        self.id
    }
}

#[derive(Debug, Clone)]
struct OpenForm {
    mode: FormMode,
    fields: StudentForm,
}

#[derive(Debug)]
pub struct StudentSession {
    client: StudentClient,
    cache: Vec<Student>,
    form: Option<OpenForm>,
    pending_delete: Option<DeleteTarget>,
    edit_sequence: u64,
    loading: bool,
    notification: Option<Notification>,
    updates: Vec<ViewUpdate>,
}

impl StudentSession {
    pub fn new(client: StudentClient) -> Self {
        Self {
            client,
            cache: Vec::new(),
            form: None,
            pending_delete: None,
            edit_sequence: 0,
            loading: false,
            notification: None,
            updates: Vec::new(),
        }
    }

    pub fn client(&self) -> &StudentClient {
        &self.client
    }

    /// The cache, in the order the server returned it.
    pub fn students(&self) -> &[Student] {
        &self.cache
    }

    pub fn form_mode(&self) -> Option<FormMode> {
        self.form.as_ref().map(|open| open.mode)
    }

    pub fn form(&self) -> Option<&StudentForm> {
        self.form.as_ref().map(|open| &open.fields)
    }

    /// The record an open modal is targeting: the edit target, otherwise
    /// the pending delete.
    pub fn current_student_id(&self) -> Option<StudentId> {
        self.form_mode()
            .and_then(FormMode::target)
            .or_else(|| self.pending_delete.as_ref().map(|target| target.id))
    }

    pub fn pending_delete(&self) -> Option<&DeleteTarget> {
        self.pending_delete.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The most recent notification, whether or not it has expired.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Hand every queued view update to the renderer.
    pub fn take_updates(&mut self) -> Vec<ViewUpdate> {
        std::mem::take(&mut self.updates)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch the full list and replace the cache. On failure the cache is
    /// left alone.
    pub async fn load_all<T: Transport + ?Sized>(&mut self, transport: &T) -> bool {
        self.set_loading(true);
        let request = self.client.build_list_students();
        let result = round_trip(transport, request)
            .await
            .and_then(|response| self.client.parse_list_students(response));
        self.set_loading(false);

        match result {
            Ok(students) => {
                debug!(count = students.len(), "student list loaded");
                self.cache = students;
                let table = TableView::new(&self.cache);
                self.updates.push(ViewUpdate::Table(table));
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to load students");
                self.notify(NotificationKind::Error, LOAD_ERROR);
                false
            }
        }
    }

    /// Show the cached records matching `term`. Returns the row count.
    pub fn search(&mut self, term: &str) -> usize {
        let table = TableView::new(query::search(&self.cache, term));
        self.show_table(table)
    }

    /// Show the cached records passing `filter`. Always starts from the
    /// full cache. Returns the row count.
    pub fn filter(&mut self, filter: &StudentFilter) -> usize {
        let table = TableView::new(filter.apply(&self.cache));
        self.show_table(table)
    }

    /// Majors present in the cache, for the major filter choices.
    pub fn majors(&self) -> Vec<String> {
        query::majors(&self.cache)
    }

    pub async fn load_statistics<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Option<Statistics> {
        let request = self.client.build_statistics();
        let result = round_trip(transport, request)
            .await
            .and_then(|response| self.client.parse_statistics(response));

        match result {
            Ok(stats) => {
                self.updates
                    .push(ViewUpdate::Statistics(StatsView::from(stats)));
                Some(stats)
            }
            Err(err) => {
                warn!(error = %err, "failed to load statistics");
                self.notify(NotificationKind::Error, STATISTICS_ERROR);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Add / edit form
    // -----------------------------------------------------------------------

    /// Open an empty form in create mode, dropping any previous target.
    pub fn begin_create(&mut self) {
        self.edit_sequence += 1;
        self.open_form(FormMode::Create, StudentForm::default());
    }

    /// Fetch `id` and open the form in edit mode. The form stays closed if
    /// the fetch fails or is superseded.
    pub async fn begin_edit<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        id: StudentId,
    ) -> bool {
        let ticket = self.request_edit(id);
        let request = self.client.build_get_student(id);
        let result = round_trip(transport, request)
            .await
            .and_then(|response| self.client.parse_get_student(response));
        self.complete_edit(ticket, result)
    }

    /// First half of `begin_edit` for hosts that run the fetch themselves.
    /// Issuing a new ticket invalidates every older one.
    pub fn request_edit(&mut self, id: StudentId) -> EditTicket {
        self.edit_sequence += 1;
        EditTicket {
            id,
            sequence: self.edit_sequence,
        }
    }

    /// Second half of `begin_edit`. Returns whether the form was opened.
    pub fn complete_edit(&mut self, ticket: EditTicket, result: Result<Student, ApiError>) -> bool {
        if ticket.sequence != self.edit_sequence {
            debug!(id = ticket.id, "discarding superseded edit response");
            return false;
        }
        match result {
            Ok(student) => {
                self.open_form(FormMode::Edit(ticket.id), StudentForm::from_student(&student));
                true
            }
            Err(err) => {
                warn!(id = ticket.id, error = %err, "failed to load student details");
                self.notify(NotificationKind::Error, DETAILS_ERROR);
                false
            }
        }
    }

    /// Update one input of the open form. Returns `false` if no form is open.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        match self.form.as_mut() {
            Some(open) => {
                open.fields.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Submit the open form as a create or an update, then reload the list.
    pub async fn save<T: Transport + ?Sized>(&mut self, transport: &T) -> bool {
        let Some(open) = self.form.as_ref() else {
            self.notify(NotificationKind::Error, NO_FORM_OPEN);
            return false;
        };
        let mode = open.mode;
        let payload = match open.fields.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                debug!(error = %err, "form rejected before submit");
                self.notify(NotificationKind::Error, err.to_string());
                return false;
            }
        };

        let request = match mode {
            FormMode::Create => self.client.build_create_student(&payload),
            FormMode::Edit(id) => self.client.build_update_student(id, &payload),
        };
        let result = match request {
            Ok(request) => round_trip(transport, request).await.and_then(|response| match mode {
                FormMode::Create => self.client.parse_create_student(response),
                FormMode::Edit(_) => self.client.parse_update_student(response),
            }),
            Err(err) => Err(err),
        };

        match result {
            Ok(saved) => {
                info!(id = saved.id, ?mode, "student saved");
                let message = match mode {
                    FormMode::Create => CREATED,
                    FormMode::Edit(_) => UPDATED,
                };
                self.notify(NotificationKind::Success, message);
                self.close_form();
                self.load_all(transport).await;
                true
            }
            Err(err) if err.is_validation() => {
                warn!(?mode, error = %err, "save rejected by server");
                self.notify(NotificationKind::Error, DUPLICATE_OR_INVALID);
                false
            }
            Err(err) => {
                warn!(?mode, error = %err, "save failed");
                self.notify(NotificationKind::Error, SAVE_ERROR);
                false
            }
        }
    }

    /// Close the add/edit form and forget its target. No-op if closed.
    pub fn close_form(&mut self) {
        self.edit_sequence += 1;
        if self.form.take().is_some() {
            self.updates.push(ViewUpdate::CloseForm);
        }
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Ask for confirmation before deleting `id`. Nothing is sent yet.
    pub fn request_delete(&mut self, id: StudentId) {
        let name = self
            .cache
            .iter()
            .find(|student| student.id == id)
            .map(Student::full_name)
            .unwrap_or_else(|| format!("#{id}"));
        self.updates.push(ViewUpdate::OpenDeleteConfirm {
            id,
            name: name.clone(),
        });
        self.pending_delete = Some(DeleteTarget { id, name });
    }

    /// Delete the pending target. The confirmation closes only on success;
    /// after a failure it stays open so the operator can retry or cancel.
    pub async fn confirm_delete<T: Transport + ?Sized>(&mut self, transport: &T) -> bool {
        let Some(target) = self.pending_delete.clone() else {
            self.notify(NotificationKind::Info, NOTHING_TO_DELETE);
            return false;
        };
        let request = self.client.build_delete_student(target.id);
        let result = round_trip(transport, request)
            .await
            .and_then(|response| self.client.parse_delete_student(response));

        match result {
            Ok(()) => {
                info!(id = target.id, "student deleted");
                self.notify(NotificationKind::Success, DELETED);
                self.close_delete_confirm();
                self.load_all(transport).await;
                true
            }
            Err(err) => {
                warn!(id = target.id, error = %err, "delete failed");
                self.notify(NotificationKind::Error, DELETE_ERROR);
                false
            }
        }
    }

    /// Dismiss the delete confirmation. No-op if nothing is pending.
    pub fn close_delete_confirm(&mut self) {
        if self.pending_delete.take().is_some() {
            self.updates.push(ViewUpdate::CloseDeleteConfirm);
        }
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    /// Apply a keyboard shortcut. Returns the shortcut that fired, if any.
    pub fn handle_key(&mut self, press: &KeyPress) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(press)?;
        match shortcut {
            Shortcut::NewStudent => self.begin_create(),
            Shortcut::CloseAll => {
                self.close_form();
                self.close_delete_confirm();
            }
        }
        Some(shortcut)
    }

    /// Serialize the cache (not a fresh fetch) as CSV and offer it as a
    /// download.
    pub fn export(&mut self) -> String {
        let content = export::to_csv(&self.cache);
        self.updates.push(ViewUpdate::Download {
            file_name: EXPORT_FILE_NAME.to_string(),
            content: content.clone(),
        });
        self.notify(NotificationKind::Success, EXPORTED);
        content
    }

    fn open_form(&mut self, mode: FormMode, fields: StudentForm) {
        self.updates.push(ViewUpdate::OpenForm(FormView {
            title: mode.title(),
            mode,
            form: fields.clone(),
        }));
        self.form = Some(OpenForm { mode, fields });
    }

    fn show_table(&mut self, table: TableView) -> usize {
        let rows = table.rows.len();
        self.updates.push(ViewUpdate::Table(table));
        rows
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.updates.push(ViewUpdate::Loading(loading));
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification::new(kind, message);
        self.updates.push(ViewUpdate::Notify(notification.clone()));
        self.notification = Some(notification);
    }
}

async fn round_trip<T: Transport + ?Sized>(
    transport: &T,
    request: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    debug!(method = request.method.as_str(), path = %request.path, "sending request");
    let response = transport.send(request).await?;
    debug!(status = response.status, "received response");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;
    use crate::types::StudentStatus;

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(self) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(TransportError("connection refused".to_string())));
            self
        }

        fn sent(&self) -> Vec<(HttpMethod, String)> {
            self.requests
                .borrow()
                .iter()
                .map(|r| (r.method, r.path.trim_start_matches(BASE).to_string()))
                .collect()
        }
    }

    #[async_trait(?Send)]
    impl Transport for Scripted {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
        }
    }

    const BASE: &str = "http://test";
    const ANA: &str = r#"{"id":1,"firstName":"Ana","lastName":"Li","email":"ana@x.com","major":"Math","gpa":3.5,"status":"ACTIVE"}"#;
    const BOB: &str = r#"{"id":2,"firstName":"Bob","lastName":"Ng","email":"bob@y.org","status":"GRADUATED"}"#;

    fn two() -> String {
        format!("[{ANA},{BOB}]")
    }

    fn session() -> StudentSession {
        StudentSession::new(StudentClient::new(BASE))
    }

    async fn loaded() -> StudentSession {
        let mut s = session();
        assert!(s.load_all(&Scripted::default().reply(200, &two())).await);
        s.take_updates();
        s
    }

    fn last_message(s: &StudentSession) -> &str {
        &s.notification().unwrap().message
    }

    fn fill_ana(s: &mut StudentSession) {
        s.set_field(Field::FirstName, "Ana");
        s.set_field(Field::LastName, "Li");
        s.set_field(Field::Email, "ana@x.com");
        s.set_field(Field::Gpa, "3.5");
    }

    #[tokio::test]
    async fn load_all_replaces_cache_and_toggles_loading() {
        let mut s = session();
        let transport = Scripted::default().reply(200, &two());
        assert!(s.load_all(&transport).await);
        assert_eq!(s.students().len(), 2);
        assert!(!s.is_loading());

        let updates = s.take_updates();
        assert_eq!(updates[0], ViewUpdate::Loading(true));
        assert_eq!(updates[1], ViewUpdate::Loading(false));
        assert!(matches!(&updates[2], ViewUpdate::Table(t) if t.rows.len() == 2));
        assert_eq!(transport.sent(), vec![(HttpMethod::Get, "/api/students".to_string())]);
    }

    #[tokio::test]
    async fn load_failure_keeps_stale_cache() {
        let mut s = loaded().await;
        assert!(!s.load_all(&Scripted::default().reply(500, "boom")).await);
        assert_eq!(s.students().len(), 2);
        assert_eq!(last_message(&s), LOAD_ERROR);

        assert!(!s.load_all(&Scripted::default().fail()).await);
        assert_eq!(s.students().len(), 2);
        assert!(!s.is_loading());
    }

    #[tokio::test]
    async fn search_and_filter_never_touch_cache() {
        let mut s = loaded().await;
        assert_eq!(s.search("BOB"), 1);
        assert_eq!(s.search(""), 2);

        let graduated = StudentFilter {
            status: Some(StudentStatus::Graduated),
            ..StudentFilter::default()
        };
        assert_eq!(s.filter(&graduated), 1);
        // A second pass starts from the full cache, not the last result.
        let math = StudentFilter {
            major: Some("Math".to_string()),
            ..StudentFilter::default()
        };
        assert_eq!(s.filter(&math), 1);
        assert_eq!(s.students().len(), 2);
    }

    #[tokio::test]
    async fn statistics_success_and_failure() {
        let mut s = session();
        let body = r#"{"totalStudents":2,"activeStudents":1,"inactiveStudents":0,"graduatedStudents":1}"#;
        let stats = s
            .load_statistics(&Scripted::default().reply(200, body))
            .await
            .unwrap();
        assert_eq!(stats.total_students, 2);
        assert!(s
            .take_updates()
            .contains(&ViewUpdate::Statistics(StatsView::from(stats))));

        assert!(s.load_statistics(&Scripted::default().fail()).await.is_none());
        assert_eq!(last_message(&s), STATISTICS_ERROR);
    }

    #[tokio::test]
    async fn begin_edit_populates_form() {
        let mut s = session();
        assert!(s.begin_edit(&Scripted::default().reply(200, BOB), 2).await);
        assert_eq!(s.form_mode(), Some(FormMode::Edit(2)));
        assert_eq!(s.current_student_id(), Some(2));
        let form = s.form().unwrap();
        assert_eq!(form.first_name, "Bob");
        assert_eq!(form.gpa, "");
        assert_eq!(form.major, "");
    }

    #[tokio::test]
    async fn begin_edit_failure_leaves_form_closed() {
        let mut s = session();
        assert!(!s.begin_edit(&Scripted::default().reply(404, ""), 9).await);
        assert_eq!(s.form_mode(), None);
        assert_eq!(last_message(&s), DETAILS_ERROR);
    }

    #[tokio::test]
    async fn create_after_edit_clears_target() {
        let mut s = session();
        s.begin_edit(&Scripted::default().reply(200, ANA), 1).await;
        s.begin_create();
        assert_eq!(s.form_mode(), Some(FormMode::Create));
        assert_eq!(s.current_student_id(), None);
        assert_eq!(s.form().unwrap(), &StudentForm::default());
    }

    #[test]
    fn stale_edit_response_is_ignored() {
        let mut s = session();
        let first = s.request_edit(1);
        let second = s.request_edit(2);
        let bob: Student = serde_json::from_str(BOB).unwrap();
        let ana: Student = serde_json::from_str(ANA).unwrap();

        assert!(s.complete_edit(second, Ok(bob)));
        assert!(!s.complete_edit(first, Ok(ana)));
        assert_eq!(s.form_mode(), Some(FormMode::Edit(2)));
        assert_eq!(s.form().unwrap().first_name, "Bob");
    }

    #[test]
    fn edit_response_after_create_is_ignored() {
        let mut s = session();
        let ticket = s.request_edit(1);
        s.begin_create();
        let ana: Student = serde_json::from_str(ANA).unwrap();
        assert!(!s.complete_edit(ticket, Ok(ana)));
        assert_eq!(s.form_mode(), Some(FormMode::Create));
        assert_eq!(ticket.id(), 1);
    }

    #[tokio::test]
    async fn save_create_closes_form_and_reloads() {
        let mut s = session();
        s.begin_create();
        fill_ana(&mut s);
        let transport = Scripted::default()
            .reply(201, ANA)
            .reply(200, &format!("[{ANA}]"));

        assert!(s.save(&transport).await);
        assert_eq!(s.form_mode(), None);
        assert_eq!(s.current_student_id(), None);
        assert_eq!(s.students().len(), 1);
        assert_eq!(
            transport.sent(),
            vec![
                (HttpMethod::Post, "/api/students".to_string()),
                (HttpMethod::Get, "/api/students".to_string()),
            ]
        );

        let body: serde_json::Value =
            serde_json::from_str(transport.requests.borrow()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["gpa"], 3.5);
        assert!(body["phone"].is_null());
        assert!(s.take_updates().contains(&ViewUpdate::CloseForm));
    }

    #[tokio::test]
    async fn save_edit_issues_put_for_target() {
        let mut s = session();
        s.begin_edit(&Scripted::default().reply(200, BOB), 2).await;
        s.set_field(Field::Major, "History");
        let transport = Scripted::default()
            .reply(200, BOB)
            .reply(200, &format!("[{BOB}]"));

        assert!(s.save(&transport).await);
        assert_eq!(transport.sent()[0], (HttpMethod::Put, "/api/students/2".to_string()));
        assert_eq!(last_message(&s), UPDATED);
    }

    #[tokio::test]
    async fn save_bad_request_reports_duplicate() {
        let mut s = loaded().await;
        s.begin_create();
        fill_ana(&mut s);
        assert!(!s.save(&Scripted::default().reply(400, "")).await);
        assert_eq!(last_message(&s), DUPLICATE_OR_INVALID);
        assert_eq!(s.students().len(), 2);
        assert_eq!(s.form_mode(), Some(FormMode::Create));
    }

    #[tokio::test]
    async fn save_other_failures_are_generic() {
        let mut s = session();
        s.begin_create();
        fill_ana(&mut s);
        assert!(!s.save(&Scripted::default().reply(500, "")).await);
        assert_eq!(last_message(&s), SAVE_ERROR);
        assert!(!s.save(&Scripted::default().fail()).await);
        assert_eq!(last_message(&s), SAVE_ERROR);
    }

    #[tokio::test]
    async fn save_without_open_form_sends_nothing() {
        let mut s = session();
        let transport = Scripted::default();
        assert!(!s.save(&transport).await);
        assert_eq!(last_message(&s), NO_FORM_OPEN);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_locally() {
        let mut s = session();
        s.begin_create();
        fill_ana(&mut s);
        s.set_field(Field::Gpa, "five");
        let transport = Scripted::default();
        assert!(!s.save(&transport).await);
        assert!(transport.sent().is_empty());
        assert!(last_message(&s).contains("GPA"));
    }

    #[tokio::test]
    async fn delete_flow_confirms_then_reloads() {
        let mut s = loaded().await;
        s.request_delete(2);
        assert_eq!(
            s.pending_delete(),
            Some(&DeleteTarget {
                id: 2,
                name: "Bob Ng".to_string()
            })
        );
        assert_eq!(s.current_student_id(), Some(2));

        let transport = Scripted::default()
            .reply(204, "")
            .reply(200, &format!("[{ANA}]"));
        assert!(s.confirm_delete(&transport).await);
        assert_eq!(s.pending_delete(), None);
        assert_eq!(s.search("bob@y.org"), 0);
        assert_eq!(
            transport.sent()[0],
            (HttpMethod::Delete, "/api/students/2".to_string())
        );
    }

    #[tokio::test]
    async fn delete_failure_keeps_confirmation_open() {
        let mut s = loaded().await;
        s.request_delete(1);
        assert!(!s.confirm_delete(&Scripted::default().reply(500, "")).await);
        assert_eq!(last_message(&s), DELETE_ERROR);
        assert_eq!(s.pending_delete().map(|t| t.id), Some(1));
        assert_eq!(s.students().len(), 2);
    }

    #[tokio::test]
    async fn confirm_without_target_is_a_no_op() {
        let mut s = session();
        let transport = Scripted::default();
        assert!(!s.confirm_delete(&transport).await);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn unknown_delete_target_is_named_by_id() {
        let mut s = session();
        s.request_delete(77);
        assert_eq!(s.pending_delete().unwrap().name, "#77");
    }

    #[tokio::test]
    async fn escape_closes_everything_and_is_idempotent() {
        let mut s = loaded().await;
        assert_eq!(s.handle_key(&KeyPress::ctrl("n")), Some(Shortcut::NewStudent));
        s.request_delete(1);
        s.take_updates();

        assert_eq!(s.handle_key(&KeyPress::plain("Escape")), Some(Shortcut::CloseAll));
        assert_eq!(s.form_mode(), None);
        assert_eq!(s.pending_delete(), None);
        assert_eq!(
            s.take_updates(),
            vec![ViewUpdate::CloseForm, ViewUpdate::CloseDeleteConfirm]
        );

        s.handle_key(&KeyPress::plain("Escape"));
        assert!(s.take_updates().is_empty());
        assert_eq!(s.handle_key(&KeyPress::plain("x")), None);
    }

    #[tokio::test]
    async fn export_uses_cache_without_fetching() {
        let mut s = loaded().await;
        let csv = s.export();
        assert!(csv.starts_with("ID,First Name,Last Name,Email,Phone,Major,GPA,Status,Enrollment Date\n"));
        assert!(csv.contains(r#"1,"Ana","Li","ana@x.com","","Math",3.5,ACTIVE,"#));
        assert_eq!(last_message(&s), EXPORTED);
        assert!(s.take_updates().iter().any(|u| matches!(
            u,
            ViewUpdate::Download { file_name, .. } if file_name == "students.csv"
        )));
    }

    #[test]
    fn export_of_empty_cache_still_succeeds() {
        let mut s = session();
        assert_eq!(s.export().lines().count(), 1);
        assert_eq!(s.notification().unwrap().kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn majors_come_from_cache() {
        let s = loaded().await;
        assert_eq!(s.majors(), vec!["Math".to_string()]);
    }
}
