//! Generation of identifiers for observations submitted without one.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::types::CodeWithAuthority;

/// Code space marking identifiers minted by [`UuidGenerator`].
pub const UUID_CODE_SPACE: &str = "urn:ietf:rfc:4122";

/// Source of fresh observation identifiers. Must be safe to call concurrently.
pub trait IdentifierGenerator: Send + Sync {
    fn generate(&self) -> CodeWithAuthority;
}

/// Random version 4 UUIDs in canonical hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdentifierGenerator for UuidGenerator {
    fn generate(&self) -> CodeWithAuthority {
        CodeWithAuthority::new(Uuid::new_v4().to_string()).with_code_space(UUID_CODE_SPACE)
    }
}

/// Deterministic generator yielding `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    code_space: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>, code_space: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            code_space: code_space.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdentifierGenerator for SequentialIdGenerator {
    fn generate(&self) -> CodeWithAuthority {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        CodeWithAuthority::new(format!("{}-{}", self.prefix, n))
            .with_code_space(self.code_space.clone())
    }
}
