use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{ApiBackend, BackendError};

/// In-memory backend for testing.
///
/// Uses `RefCell` for interior mutability since the client is
/// single-threaded. Serves a canned schema and queued page batches, and
/// records every query and update request so tests can assert on what
/// went over the wire.
#[derive(Debug)]
pub struct MemBackend {
    schema: RefCell<Value>,
    batches: RefCell<VecDeque<Value>>,
    handed_out: RefCell<Option<String>>,
    served: RefCell<usize>,
    queries: RefCell<Vec<(Option<String>, Option<Value>)>>,
    updates: RefCell<Vec<(Uuid, Value)>>,
    update_response: RefCell<Option<Value>>,
    schema_fetches: RefCell<usize>,
    simulate_schema_error: RefCell<bool>,
    simulate_query_error: RefCell<bool>,
    simulate_update_error: RefCell<bool>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            schema: RefCell::new(json!({ "properties": {} })),
            batches: RefCell::new(VecDeque::new()),
            handed_out: RefCell::new(None),
            served: RefCell::new(0),
            queries: RefCell::new(Vec::new()),
            updates: RefCell::new(Vec::new()),
            update_response: RefCell::new(None),
            schema_fetches: RefCell::new(0),
            simulate_schema_error: RefCell::new(false),
            simulate_query_error: RefCell::new(false),
            simulate_update_error: RefCell::new(false),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the property schema served to retrieve calls. Takes the
    /// properties map, keyed by raw display name.
    pub fn set_schema(&self, properties: Value) {
        *self.schema.borrow_mut() = json!({ "properties": properties });
    }

    /// Queue one batch of page records. Each query call pops one batch;
    /// `has_more` and the resume cursor fall out of what remains queued.
    pub fn push_batch(&self, results: Value) {
        self.batches.borrow_mut().push_back(results);
    }

    /// Override the response to the next update calls. Without an
    /// override the backend echoes the request back as a page record.
    pub fn set_update_response(&self, response: Value) {
        *self.update_response.borrow_mut() = Some(response);
    }

    /// Enable schema error simulation for testing error handling.
    pub fn set_simulate_schema_error(&self, simulate: bool) {
        *self.simulate_schema_error.borrow_mut() = simulate;
    }

    /// Enable query error simulation for testing error handling.
    pub fn set_simulate_query_error(&self, simulate: bool) {
        *self.simulate_query_error.borrow_mut() = simulate;
    }

    /// Enable update error simulation for testing error handling.
    pub fn set_simulate_update_error(&self, simulate: bool) {
        *self.simulate_update_error.borrow_mut() = simulate;
    }

    /// How many times the schema was actually fetched.
    pub fn schema_fetches(&self) -> usize {
        *self.schema_fetches.borrow()
    }

    /// Every query served, as (start_cursor, filter) pairs.
    pub fn queries(&self) -> Vec<(Option<String>, Option<Value>)> {
        self.queries.borrow().clone()
    }

    /// Every update served, as (page id, properties request) pairs.
    pub fn updates(&self) -> Vec<(Uuid, Value)> {
        self.updates.borrow().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.borrow().len()
    }
}

impl ApiBackend for MemBackend {
    fn retrieve_schema(&self, _database_id: Uuid) -> Result<Value, BackendError> {
        if *self.simulate_schema_error.borrow() {
            return Err(BackendError::Transport("Simulated schema error".to_string()));
        }
        *self.schema_fetches.borrow_mut() += 1;
        Ok(self.schema.borrow().clone())
    }

    fn query(
        &self,
        _database_id: Uuid,
        start_cursor: Option<&str>,
        filter: Option<&Value>,
    ) -> Result<Value, BackendError> {
        if *self.simulate_query_error.borrow() {
            return Err(BackendError::Transport("Simulated query error".to_string()));
        }
        self.queries
            .borrow_mut()
            .push((start_cursor.map(str::to_string), filter.cloned()));

        // A real server rejects cursors it never handed out.
        let expected = self.handed_out.borrow().clone();
        if start_cursor.map(str::to_string) != expected {
            return Err(BackendError::Api {
                status: 400,
                message: format!("unexpected cursor {start_cursor:?}"),
            });
        }

        let mut batches = self.batches.borrow_mut();
        let results = batches.pop_front().unwrap_or_else(|| json!([]));
        let has_more = !batches.is_empty();
        let next_cursor = if has_more {
            let mut served = self.served.borrow_mut();
            *served += 1;
            Some(format!("cursor-{served}"))
        } else {
            None
        };
        *self.handed_out.borrow_mut() = next_cursor.clone();

        Ok(json!({
            "results": results,
            "next_cursor": next_cursor,
            "has_more": has_more,
        }))
    }

    fn update(&self, page_id: Uuid, properties: &Value) -> Result<Value, BackendError> {
        if *self.simulate_update_error.borrow() {
            return Err(BackendError::Api {
                status: 409,
                message: "Simulated update conflict".to_string(),
            });
        }
        self.updates.borrow_mut().push((page_id, properties.clone()));

        if let Some(response) = self.update_response.borrow().clone() {
            return Ok(response);
        }

        // Echo the request back the way the service does: the response
        // keys properties by display name, the request by field id.
        let schema = self.schema.borrow();
        let declared = schema.get("properties").and_then(Value::as_object);
        let mut echoed = Map::new();
        if let (Some(request), Some(declared)) = (properties.as_object(), declared) {
            for (field_id, payload) in request {
                let raw_name = declared
                    .iter()
                    .find(|(_, prop)| {
                        prop.get("id").and_then(Value::as_str) == Some(field_id.as_str())
                    })
                    .map(|(name, _)| name.clone())
                    .unwrap_or_else(|| field_id.clone());
                echoed.insert(raw_name, payload.clone());
            }
        }

        Ok(json!({
            "object": "page",
            "id": page_id,
            "properties": echoed,
        }))
    }
}
