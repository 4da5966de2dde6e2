//! The seam between the session and whatever actually performs HTTP.
//!
//! Hosts implement `Transport` over their HTTP stack of choice; tests
//! implement it over a queue of canned responses. Futures are not required
//! to be `Send`: a session lives on a single UI event loop.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[async_trait(?Send)]
pub trait Transport {
    /// Execute `request` and hand back whatever the server answered,
    /// including 4xx/5xx. Only failures with no response are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
