//! Lazy paginated query iteration.

use std::collections::VecDeque;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::ApiBackend;
use crate::database::Database;
use crate::error::{Result, TabloError};
use crate::filter::Filter;
use crate::page::Page;

#[derive(Deserialize)]
struct QueryBatch {
    results: Vec<Value>,
    next_cursor: Option<String>,
    has_more: bool,
}

/// Lazy page sequence following the server's pagination cursor.
///
/// Holds at most one fetched batch of raw records at a time and yields
/// them in exactly the order the server returned them. Forward-only:
/// a spent iterator stays spent, re-iterating takes a new `Query`.
pub struct Query<'db, B: ApiBackend> {
    db: &'db Database<B>,
    filter: Option<Value>,
    buffer: VecDeque<Value>,
    cursor: Option<String>,
    exhausted: bool,
}

impl<'db, B: ApiBackend> Query<'db, B> {
    pub(crate) fn new(db: &'db Database<B>, filter: Option<&Filter>) -> Self {
        Self {
            db,
            filter: filter.map(Filter::to_json),
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
        }
    }

    /// One query round trip from the current cursor.
    fn fetch(&mut self) -> Result<()> {
        let response = self
            .db
            .backend()
            .query(self.db.id(), self.cursor.as_deref(), self.filter.as_ref())
            .map_err(|source| TabloError::Remote {
                context: match &self.filter {
                    Some(filter) => {
                        format!("query database {} with filter {}", self.db.id(), filter)
                    }
                    None => format!("query database {}", self.db.id()),
                },
                source,
            })?;
        let batch: QueryBatch = serde_json::from_value(response)?;
        debug!(
            "fetched {} records from {} (more: {})",
            batch.results.len(),
            self.db.id(),
            batch.has_more
        );
        self.buffer.extend(batch.results);
        self.cursor = batch.next_cursor;
        self.exhausted = !batch.has_more;
        Ok(())
    }
}

impl<'db, B: ApiBackend> Iterator for Query<'db, B> {
    type Item = Result<Page<'db, B>>;

    fn next(&mut self) -> Option<Self::Item> {
        // A server may legally answer an empty batch with has_more set,
        // so keep fetching until a record shows up or the cursor ends.
        while self.buffer.is_empty() {
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
        let record = self.buffer.pop_front()?;
        Some(Page::from_record(self.db, &record))
    }
}
