//! Identifiers and the generation allocator for playback runs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Host identifier of an animatable entity (a token id on the tabletop).
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque token identifying one playback run. Only ever compared for identity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Monotonic allocator for generations. A token is never issued twice.
#[derive(Debug, Default)]
pub struct GenerationAllocator {
    next: AtomicU64,
}

impl GenerationAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&self) -> Generation {
        Generation(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let alloc = GenerationAllocator::new();
        assert_eq!(alloc.alloc(), Generation(0));
        assert_eq!(alloc.alloc(), Generation(1));
        assert_ne!(alloc.alloc(), Generation(1));
    }

    #[test]
    fn entity_id_conversions() {
        let a = EntityId::from("tok-1");
        let b = EntityId::from(String::from("tok-1"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "tok-1");
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"tok-1\"");
    }
}
