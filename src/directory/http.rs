use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use super::{DirectoryLookup, DirectoryRecord};
use crate::error::{CoursegraphError, Result};

/// HTTP directory client
///
/// Issues `GET {base_url}/{external_id}` and expects a JSON object of
/// attributes. Multi-valued attributes keep their first value.
pub struct HttpDirectory {
    client: Client,
    base_url: Url,
}

impl HttpDirectory {
    /// Create a new directory client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Collection URL that person ids are appended to
    /// * `timeout` - Per-request timeout; a timeout counts as a failed lookup
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CoursegraphError::Config(format!("invalid directory URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CoursegraphError::Config(format!(
                "directory URL cannot take path segments: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoursegraphError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn person_url(&self, external_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(external_id);
        }
        url
    }
}

#[async_trait]
impl DirectoryLookup for HttpDirectory {
    async fn lookup(&self, external_id: &str) -> Result<Option<DirectoryRecord>> {
        let response = self
            .client
            .get(self.person_url(external_id))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CoursegraphError::Directory(format!("Network error for {}: {}", external_id, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CoursegraphError::Directory(format!(
                "Directory returned {} for {}",
                status, external_id
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CoursegraphError::Directory(format!("Failed to parse response for {}: {}", external_id, e)))?;

        let record = record_from_json(&body);
        if record.is_empty() {
            Ok(None)
        } else {
            Ok(Some(record))
        }
    }
}

/// Flatten a JSON attribute object into string attributes.
fn record_from_json(body: &Value) -> DirectoryRecord {
    let mut record = DirectoryRecord::new();
    let Some(object) = body.as_object() else {
        return record;
    };

    for (key, value) in object {
        let flat = match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.first().and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            }),
            Value::Null => None,
            other => Some(other.to_string()),
        };
        if let Some(flat) = flat {
            record.insert(key.clone(), flat);
        }
    }

    record
}
