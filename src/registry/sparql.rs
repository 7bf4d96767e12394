use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{EntityRegistry, ShortIdIndex};
use crate::error::{CoursegraphError, Result};
use crate::graph::vocab::BLOCAL;

/// Registry backed by a SPARQL query API that takes form-encoded
/// credentials and answers in CSV.
pub struct SparqlRegistry {
    client: Client,
    query_url: String,
    email: String,
    password: String,
}

impl SparqlRegistry {
    pub fn new(query_url: String, email: String, password: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoursegraphError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            query_url,
            email,
            password,
        })
    }

    async fn post_query(&self, operation: &'static str, query: &str) -> Result<String> {
        let form = [
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("query", query),
        ];

        let response = self
            .client
            .post(&self.query_url)
            .header("Accept", "text/csv")
            .form(&form)
            .send()
            .await
            .map_err(|e| CoursegraphError::registry(operation, format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CoursegraphError::registry(
                operation,
                format!("query endpoint returned {}: {}", status, body.trim()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| CoursegraphError::registry(operation, format!("Failed to read response: {}", e)))
    }
}

/// No faculty-type filter: every entity carrying a short id is eligible.
fn short_id_query() -> String {
    format!(
        "PREFIX blocal: <{}>\n\nSELECT DISTINCT ?fac ?shortID\nWHERE\n{{\n  ?fac blocal:shortId ?shortID .\n}}",
        BLOCAL
    )
}

fn ask_query(reference: &str) -> String {
    format!("ASK {{<{}> ?p ?o}}", reference)
}

#[async_trait]
impl EntityRegistry for SparqlRegistry {
    async fn short_id_index(&self) -> Result<ShortIdIndex> {
        let body = self.post_query("short id lookup", &short_id_query()).await?;
        let index = parse_short_id_csv(&body);
        log::info!("Registry returned {} short ids", index.len());
        Ok(index)
    }

    async fn exists(&self, reference: &str) -> Result<bool> {
        let body = self.post_query("existence check", &ask_query(reference)).await?;
        parse_ask_response(&body).ok_or_else(|| {
            CoursegraphError::registry(
                "existence check",
                format!("unexpected ASK response for <{}>: {}", reference, body.trim()),
            )
        })
    }
}

/// Parse `fac,shortID` CSV results (header first). Rows with fewer than two
/// columns are ignored; a repeated short id keeps the last reference seen.
pub fn parse_short_id_csv(body: &str) -> ShortIdIndex {
    let mut index = ShortIdIndex::new();
    for line in body.lines().skip(1) {
        let fields = split_csv_line(line);
        if fields.len() < 2 {
            continue;
        }
        let (reference, short_id) = (fields[0].trim(), fields[1].trim());
        if reference.is_empty() || short_id.is_empty() {
            continue;
        }
        index.insert(short_id.to_string(), reference.to_string());
    }
    index
}

/// Read a boolean ASK answer from the tail of the response body.
pub fn parse_ask_response(body: &str) -> Option<bool> {
    let tail = body.trim().trim_matches('"').to_ascii_lowercase();
    if tail.ends_with("false") {
        Some(false)
    } else if tail.ends_with("true") {
        Some(true)
    } else {
        None
    }
}

/// Minimal RFC 4180 field splitter: quoted fields may contain commas and `""`.
fn split_csv_line(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    if !line.is_empty() {
        fields.push(current);
    }
    fields
}
