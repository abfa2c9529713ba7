//! The database handle: identity, memoized schema, query entry points.

use log::debug;
use once_cell::unsync::OnceCell;
use uuid::Uuid;

use crate::backend::{ApiBackend, HttpBackend};
use crate::error::{Result, TabloError};
use crate::filter::{Filter, Filters};
use crate::query::Query;
use crate::schema::Schema;

/// Handle to one remote database.
///
/// Owns the backend and the memoized schema; pages, property
/// collections and filter builders all borrow from it.
#[derive(Debug)]
pub struct Database<B: ApiBackend> {
    id: Uuid,
    backend: B,
    schema: OnceCell<Schema>,
}

impl Database<HttpBackend> {
    /// Handle talking to the real service, authenticated from
    /// `NOTION_TOKEN` via the shared process-wide agent.
    pub fn from_env(id: Uuid) -> Result<Self> {
        Ok(Self::new(id, HttpBackend::shared()?.clone()))
    }
}

impl<B: ApiBackend> Database<B> {
    pub fn new(id: Uuid, backend: B) -> Self {
        Self {
            id,
            backend,
            schema: OnceCell::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The declared fields, fetched remotely at most once per handle.
    pub fn schema(&self) -> Result<&Schema> {
        self.schema.get_or_try_init(|| {
            debug!("fetching schema for {}", self.id);
            let payload = self
                .backend
                .retrieve_schema(self.id)
                .map_err(|source| TabloError::Remote {
                    context: format!("retrieve database {}", self.id),
                    source,
                })?;
            Schema::from_payload(self.id, &payload)
        })
    }

    /// Descriptor view of the declared fields; same cached fetch as
    /// [`schema`](Self::schema).
    pub fn properties(&self) -> Result<&Schema> {
        self.schema()
    }

    /// Filter builder view over the same cached schema.
    pub fn filters(&self) -> Result<Filters<'_>> {
        Ok(Filters::new(self.schema()?))
    }

    /// Iterate every page, in server order.
    pub fn pages(&self) -> Query<'_, B> {
        Query::new(self, None)
    }

    /// Iterate the pages matching a filter.
    pub fn query(&self, filter: &Filter) -> Query<'_, B> {
        Query::new(self, Some(filter))
    }
}
