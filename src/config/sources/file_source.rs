//! Generic async file-based config source with SHA-256 change detection.
//!
//! [`FileSource`] implements [`ConfigSource`] for any file format by
//! accepting a deserialization function at construction time. It reads
//! the file asynchronously via Tokio and computes a SHA-256 hash of the
//! raw content for version tracking. Validation is left to the
//! [`ConfigStore`](crate::config::store::ConfigStore).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{decode_utf8, version_of};
use crate::config::model::ConfigDocument;
use crate::config::{ConfigSource, ConfigVersion, Snapshot};
use crate::error::StubError;

pub type Deserializer =
    fn(&str) -> Result<Option<ConfigDocument>, Box<dyn std::error::Error + Send + Sync>>;

pub struct FileSource {
    path: PathBuf,
    name: &'static str,
    deserialize: Deserializer,
}

impl FileSource {
    #[must_use]
    pub fn new(path: PathBuf, name: &'static str, deserialize: Deserializer) -> Self {
        Self {
            path,
            name,
            deserialize,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file bytes. Only I/O failures are load errors.
    async fn read_bytes(&self) -> Result<Vec<u8>, StubError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| StubError::ConfigLoad {
                path: self.path.clone(),
                source,
            })
    }

    fn parse(&self, bytes: Vec<u8>) -> Result<Option<ConfigDocument>, StubError> {
        let display = self.path.display().to_string();
        let content = decode_utf8(bytes, &display)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        (self.deserialize)(&content).map_err(|e| StubError::ConfigParse {
            path: display,
            source: e,
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Snapshot, StubError> {
        let bytes = self.read_bytes().await?;
        let version = version_of(&bytes);
        Ok(Snapshot {
            version,
            document: self.parse(bytes),
        })
    }

    async fn has_changed(&self, current: &ConfigVersion) -> Result<bool, StubError> {
        let bytes = self.read_bytes().await?;
        Ok(*current != version_of(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::sources::json;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn loads_document_and_hash() {
        let file = write_temp(r#"{"endpoints": [{"path": "a", "actions": []}]}"#);
        let source = json::new(file.path().to_path_buf());

        let snapshot = source.load().await.unwrap();
        let doc = snapshot.document.unwrap().unwrap();
        assert_eq!(doc.present_endpoints().count(), 1);
        assert!(!source.has_changed(&snapshot.version).await.unwrap());
        assert_eq!(source.name(), "json");
        assert_eq!(source.location(), file.path().display().to_string());
    }

    #[tokio::test]
    async fn detects_content_change() {
        let file = write_temp(r#"{"endpoints": []}"#);
        let source = json::new(file.path().to_path_buf());
        let version = source.load().await.unwrap().version;

        std::fs::write(file.path(), r#"{"endpoints": [null]}"#).unwrap();
        assert!(source.has_changed(&version).await.unwrap());
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = json::new(dir.path().join("absent.json"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, StubError::ConfigLoad { .. }));
        assert!(err.to_string().starts_with("Error loading configuration file:"));
    }

    #[tokio::test]
    async fn empty_file_is_a_null_document() {
        let file = write_temp("");
        let source = json::new(file.path().to_path_buf());
        let doc = source.load().await.unwrap().document.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error_with_a_version() {
        let file = write_temp("{ not json");
        let source = json::new(file.path().to_path_buf());
        let snapshot = source.load().await.unwrap();
        assert!(matches!(snapshot.document, Err(StubError::ConfigParse { .. })));
        assert!(!source.has_changed(&snapshot.version).await.unwrap());
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_parse_error() {
        let file = write_temp("");
        std::fs::write(file.path(), b"{\"endpoints\": [\xff\xfe]}").unwrap();
        let source = json::new(file.path().to_path_buf());

        let snapshot = source.load().await.unwrap();
        let err = snapshot.document.unwrap_err();
        assert!(matches!(err, StubError::ConfigParse { .. }));
        assert!(err.to_string().starts_with("Error reading configuration file:"), "{err}");
        assert!(!source.has_changed(&snapshot.version).await.unwrap());
    }
}
