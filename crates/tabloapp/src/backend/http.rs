//! Blocking HTTP backend for the hosted API.

use std::env;
use std::time::Duration;

use log::debug;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{ApiBackend, BackendError};
use crate::error::TabloError;

const BASE_URL: &str = "https://api.notion.com/v1";
const API_VERSION: &str = "2022-06-28";
const TOKEN_VAR: &str = "NOTION_TOKEN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

static SHARED: OnceCell<HttpBackend> = OnceCell::new();

/// Talks to the real service over HTTPS. Cheap to clone; clones share
/// the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    agent: ureq::Agent,
    token: String,
}

impl HttpBackend {
    /// Create a backend authenticating with the given integration token.
    pub fn new(token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            token: token.into(),
        }
    }

    /// Create a backend from the `NOTION_TOKEN` environment variable.
    pub fn from_env() -> crate::Result<Self> {
        match env::var(TOKEN_VAR) {
            Ok(token) if !token.is_empty() => Ok(Self::new(token)),
            _ => Err(TabloError::Config(format!("{TOKEN_VAR} is not set"))),
        }
    }

    /// Process-wide backend built lazily from the environment. Every
    /// caller after the first gets the same connection pool.
    pub fn shared() -> crate::Result<&'static Self> {
        SHARED.get_or_try_init(Self::from_env)
    }

    fn call(&self, request: ureq::Request, body: Option<&Value>) -> Result<Value, BackendError> {
        let request = request
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Notion-Version", API_VERSION);
        let response = match body {
            Some(json) => request.send_json(json),
            None => request.call(),
        };
        match response {
            Ok(response) => response
                .into_json()
                .map_err(|err| BackendError::Body(err.to_string())),
            Err(ureq::Error::Status(status, response)) => Err(BackendError::Api {
                status,
                message: response.into_string().unwrap_or_default(),
            }),
            Err(other) => Err(BackendError::Transport(other.to_string())),
        }
    }
}

impl ApiBackend for HttpBackend {
    fn retrieve_schema(&self, database_id: Uuid) -> Result<Value, BackendError> {
        debug!("GET /databases/{database_id}");
        let url = format!("{BASE_URL}/databases/{database_id}");
        self.call(self.agent.get(&url), None)
    }

    fn query(
        &self,
        database_id: Uuid,
        start_cursor: Option<&str>,
        filter: Option<&Value>,
    ) -> Result<Value, BackendError> {
        debug!("POST /databases/{database_id}/query");
        let url = format!("{BASE_URL}/databases/{database_id}/query");
        let mut body = Map::new();
        if let Some(cursor) = start_cursor {
            body.insert("start_cursor".to_string(), Value::String(cursor.to_string()));
        }
        if let Some(filter) = filter {
            body.insert("filter".to_string(), filter.clone());
        }
        self.call(self.agent.post(&url), Some(&Value::Object(body)))
    }

    fn update(&self, page_id: Uuid, properties: &Value) -> Result<Value, BackendError> {
        debug!("PATCH /pages/{page_id}");
        let url = format!("{BASE_URL}/pages/{page_id}");
        let mut body = Map::new();
        body.insert("properties".to_string(), properties.clone());
        self.call(self.agent.request("PATCH", &url), Some(&Value::Object(body)))
    }
}
