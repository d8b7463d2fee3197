//! Configuration loading, validation, and caching.
//!
//! Defines the [`ConfigSource`] trait for pluggable document backends and
//! the [`ConfigVersion`] enum for change detection. Submodules provide the
//! document model, validation, concrete sources, and the [`store`] that
//! keeps one compiled generation of the configuration in memory.

pub mod model;
pub mod sources;
pub mod store;
pub mod validation;

use async_trait::async_trait;

use crate::error::StubError;
use model::ConfigDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

impl std::fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(hash) => f.write_str(hash.get(..12).unwrap_or(hash)),
        }
    }
}

/// One read of a source.
///
/// The version always describes the bytes that were read, so a document
/// that fails to parse still has one.
#[derive(Debug)]
pub struct Snapshot {
    pub version: ConfigVersion,
    /// `Ok(None)` when the document itself is null or blank.
    pub document: Result<Option<ConfigDocument>, StubError>,
}

// async_trait is required here because ConfigSource is used as Box<dyn ConfigSource>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Human-readable location of the document, used in logs and `/health`.
    fn location(&self) -> String;

    /// Read the document and parse it.
    ///
    /// `Err` means the source could not be read at all. A document that was
    /// read but failed to parse comes back inside the [`Snapshot`].
    async fn load(&self) -> Result<Snapshot, StubError>;

    async fn has_changed(&self, current: &ConfigVersion) -> Result<bool, StubError>;
}

#[async_trait]
impl<S: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn location(&self) -> String {
        (**self).location()
    }

    async fn load(&self) -> Result<Snapshot, StubError> {
        (**self).load().await
    }

    async fn has_changed(&self, current: &ConfigVersion) -> Result<bool, StubError> {
        (**self).has_changed(current).await
    }
}
