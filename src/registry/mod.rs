//! Identity registry: the knowledge-graph store's query endpoint.
//!
//! Two call shapes are used, both read-only: one bulk query returning every
//! known short code with its entity reference, and a per-reference existence
//! check used while minting new identifiers.

mod sparql;

pub use sparql::{parse_ask_response, parse_short_id_csv, SparqlRegistry};

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// Short code → canonical entity reference.
pub type ShortIdIndex = HashMap<String, String>;

#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Every short code the registry knows, with its entity reference.
    async fn short_id_index(&self) -> Result<ShortIdIndex>;

    /// Whether any statement already has `reference` as its subject.
    async fn exists(&self, reference: &str) -> Result<bool>;
}

#[cfg(test)]
pub(crate) mod stub {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::CoursegraphError;

    /// In-memory registry. Existence answers are scripted; once the script
    /// runs out every candidate is reported absent.
    #[derive(Default)]
    pub struct StubRegistry {
        pub index: ShortIdIndex,
        pub fail_index: bool,
        script: Mutex<VecDeque<bool>>,
        checked: Mutex<Vec<String>>,
        checks: AtomicUsize,
    }

    impl StubRegistry {
        pub fn with_index(pairs: &[(&str, &str)]) -> Self {
            Self {
                index: pairs
                    .iter()
                    .map(|(short, reference)| (short.to_string(), reference.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn script_exists(&self, answers: &[bool]) {
            self.script.lock().unwrap().extend(answers.iter().copied());
        }

        pub fn checks(&self) -> usize {
            self.checks.load(Ordering::SeqCst)
        }

        pub fn checked(&self) -> Vec<String> {
            self.checked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EntityRegistry for StubRegistry {
        async fn short_id_index(&self) -> Result<ShortIdIndex> {
            if self.fail_index {
                return Err(CoursegraphError::registry(
                    "short id lookup",
                    "query endpoint returned 500 Internal Server Error",
                ));
            }
            Ok(self.index.clone())
        }

        async fn exists(&self, reference: &str) -> Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.checked.lock().unwrap().push(reference.to_string());
            Ok(self.script.lock().unwrap().pop_front().unwrap_or(false))
        }
    }
}
