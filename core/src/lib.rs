//! Client core for the student-records administration panel.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of that sits
//! `StudentSession`, which owns the cached record list and the modal
//! selection state and turns user intents into backend calls through an
//! injected `Transport`.
//!
//! # Design
//! - `StudentClient` is stateless; it holds only `base_url`.
//! - Each backend operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Search, filter, form conversion and CSV export are pure functions over
//!   plain data and never see a renderer.
//! - The session reports what should change on screen as `ViewUpdate`
//!   values; the host drains and draws them.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod export;
pub mod form;
pub mod http;
pub mod keyboard;
pub mod query;
pub mod session;
pub mod transport;
pub mod types;
pub mod view;

pub use client::StudentClient;
pub use error::{ApiError, FormError, TransportError};
pub use form::{Field, FormMode, StudentForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use keyboard::{KeyPress, Shortcut};
pub use query::StudentFilter;
pub use session::{DeleteTarget, EditTicket, StudentSession};
pub use transport::Transport;
pub use types::{Statistics, Student, StudentId, StudentPayload, StudentStatus};
pub use view::{Notification, NotificationKind, ViewUpdate};
