//! In-memory config source for embedding and tests.
//!
//! Holds the raw document text and its format. [`MemorySource::replace`]
//! swaps the text so callers can drive reloads without touching disk.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{parse_document, version_of};
use crate::config::{ConfigSource, ConfigVersion, Snapshot};
use crate::error::StubError;

pub struct MemorySource {
    format: &'static str,
    content: RwLock<String>,
    reads: AtomicU64,
}

impl MemorySource {
    #[must_use]
    pub fn new(format: &'static str, content: impl Into<String>) -> Self {
        Self {
            format,
            content: RwLock::new(content.into()),
            reads: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self::new("json", content)
    }

    #[cfg(feature = "yaml")]
    #[must_use]
    pub fn yaml(content: impl Into<String>) -> Self {
        Self::new("yaml", content)
    }

    pub fn replace(&self, content: impl Into<String>) {
        let mut guard = self
            .content
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = content.into();
    }

    /// How many times [`ConfigSource::load`] has been called.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    fn snapshot(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ConfigSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn location(&self) -> String {
        format!("memory ({})", self.format)
    }

    async fn load(&self) -> Result<Snapshot, StubError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let content = self.snapshot();
        Ok(Snapshot {
            version: version_of(&content),
            document: parse_document(self.format, &content, &self.location()),
        })
    }

    async fn has_changed(&self, current: &ConfigVersion) -> Result<bool, StubError> {
        Ok(*current != version_of(&self.snapshot()))
    }
}
