//! Collision-checked identifier minting.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{CoursegraphError, Result};
use crate::registry::EntityRegistry;

/// Attempts before minting gives up. Repeated collisions mean the existence
/// check itself is broken, so there is no unbounded retry.
pub const MAX_MINT_ATTEMPTS: usize = 10;

/// Source of 128-bit identifiers.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counter-based ids for reproducible runs: the seed fills the high 64 bits.
#[derive(Debug)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new(seed: u64) -> Self {
        Self {
            next: (seed as u128) << 64,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Mints `{namespace}{prefix}-{hex}` references the registry has never seen.
pub struct IdentifierMinter {
    registry: Arc<dyn EntityRegistry>,
    namespace: String,
    ids: Box<dyn IdGenerator>,
}

impl IdentifierMinter {
    pub fn new(
        registry: Arc<dyn EntityRegistry>,
        namespace: impl Into<String>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            registry,
            namespace: namespace.into(),
            ids,
        }
    }

    /// Mint a fresh reference. `context` names what the reference is for and
    /// only appears in the exhaustion error.
    pub async fn mint(&mut self, prefix: &str, context: &str) -> Result<String> {
        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let candidate = format!(
                "{}{}-{}",
                self.namespace,
                prefix,
                self.ids.next_id().simple()
            );
            if !self.registry.exists(&candidate).await? {
                return Ok(candidate);
            }
            log::warn!(
                "Minted reference {} already exists (attempt {}/{})",
                candidate,
                attempt,
                MAX_MINT_ATTEMPTS
            );
        }

        Err(CoursegraphError::IdentifierExhaustion {
            attempts: MAX_MINT_ATTEMPTS,
            context: context.to_string(),
        })
    }
}
