//! Remote API transport boundary.
//!
//! Everything above this module works with plain JSON values; the
//! backend owns the round trips that produce and consume them. The
//! library ships two implementations: [`HttpBackend`] for the real
//! service and [`MemBackend`] for tests, which serves canned payloads
//! and records every request it sees.

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

mod http;
mod mem;

pub use http::HttpBackend;
pub use mem::MemBackend;

/// Failure raised by a backend round trip.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced a response (network, DNS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Api error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response arrived but its body was not usable JSON
    #[error("Invalid response body: {0}")]
    Body(String),
}

/// Abstract interface for remote API round trips.
///
/// The backend handles the "how" of transport; callers decide what the
/// returned JSON means. All calls block until the response is in.
pub trait ApiBackend {
    /// Retrieve a database definition, including its property schema.
    fn retrieve_schema(&self, database_id: Uuid) -> Result<Value, BackendError>;

    /// Fetch one page batch from a database query. `start_cursor` is the
    /// resume token from the previous batch, absent on the first call.
    /// `filter` is a serialized filter expression, omitted entirely from
    /// the request when `None`.
    fn query(
        &self,
        database_id: Uuid,
        start_cursor: Option<&str>,
        filter: Option<&Value>,
    ) -> Result<Value, BackendError>;

    /// Update page properties. `properties` maps field ids to tagged
    /// payloads; the response echoes the page record with the new state.
    fn update(&self, page_id: Uuid, properties: &Value) -> Result<Value, BackendError>;
}
