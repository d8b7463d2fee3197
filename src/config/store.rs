//! Cached, concurrency-safe holder of the compiled configuration.
//!
//! [`ConfigStore`] owns a [`ConfigSource`] and keeps at most one
//! generation of [`EngineState`] in memory. The first access loads,
//! validates and compiles the document; later accesses share the same
//! `Arc` until the cache is invalidated or reloaded. Concurrent first
//! accesses wait on the same lock, so a generation is built exactly once.
//!
//! Every failure is captured as [`EngineState::Failed`] rather than
//! returned, so request handling never sees a partially built tree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use super::model::ConfigDocument;
use super::validation::{ConfigValidator, SectionName, SectionValidator};
use super::{ConfigSource, ConfigVersion, Snapshot};
use crate::engine::tree::EndpointTree;
use crate::engine::EngineState;
use crate::error::StubError;

/// Reported in place of errors that are not load, parse or validation failures.
pub const UNEXPECTED_FAILURE_MESSAGE: &str =
    "An unexpected error occurred attempting to read the configuration file.";

/// One loaded configuration and where it came from.
#[derive(Debug, Clone)]
pub struct Generation {
    pub state: Arc<EngineState>,
    /// `None` when the source could not be read at all. A document that was
    /// read but failed to parse keeps the version of what was read.
    pub version: Option<ConfigVersion>,
    pub loaded_at: Instant,
}

pub struct ConfigStore {
    source: Box<dyn ConfigSource>,
    validator: Box<dyn SectionValidator<ConfigDocument>>,
    cache: Mutex<Option<Generation>>,
    loads: AtomicU64,
}

impl ConfigStore {
    #[must_use]
    pub fn new(source: Box<dyn ConfigSource>) -> Self {
        Self::with_validator(source, Box::new(ConfigValidator::default()))
    }

    #[must_use]
    pub fn with_validator(
        source: Box<dyn ConfigSource>,
        validator: Box<dyn SectionValidator<ConfigDocument>>,
    ) -> Self {
        Self {
            source,
            validator,
            cache: Mutex::new(None),
            loads: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn source(&self) -> &dyn ConfigSource {
        &*self.source
    }

    /// Number of times a generation has been built.
    #[must_use]
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// The current engine state, loading it first if nothing is cached.
    pub async fn state(&self) -> Arc<EngineState> {
        self.generation().await.state
    }

    /// The current generation, loading it first if nothing is cached.
    pub async fn generation(&self) -> Generation {
        let mut cache = self.cache.lock().await;
        if let Some(generation) = cache.as_ref() {
            return generation.clone();
        }
        let generation = self.build().await;
        *cache = Some(generation.clone());
        generation
    }

    /// The cached generation, without triggering a load.
    pub async fn peek(&self) -> Option<Generation> {
        self.cache.lock().await.clone()
    }

    /// Drop the cached generation; the next access reloads.
    pub async fn invalidate(&self) {
        self.cache.lock().await.take();
        tracing::debug!(source = self.source.name(), "configuration cache invalidated");
    }

    /// Build a fresh generation now and swap it in.
    pub async fn reload(&self) -> Arc<EngineState> {
        let mut cache = self.cache.lock().await;
        let generation = self.build().await;
        let state = Arc::clone(&generation.state);
        *cache = Some(generation);
        state
    }

    /// Reload only if the source reports a different version.
    ///
    /// A generation whose source could not be read is always retried.
    /// The check and the reload happen under one lock. Returns whether a
    /// reload happened.
    pub async fn refresh_if_changed(&self) -> Result<bool, StubError> {
        let mut cache = self.cache.lock().await;
        let changed = match cache.as_ref().and_then(|g| g.version.as_ref()) {
            Some(current) => self.source.has_changed(current).await?,
            None => true,
        };
        if changed {
            *cache = Some(self.build().await);
        }
        Ok(changed)
    }

    async fn build(&self) -> Generation {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let (state, version) = match self.source.load().await {
            Ok(Snapshot {
                version,
                document: Ok(document),
            }) => (self.compile(document.as_ref()), Some(version)),
            Ok(Snapshot {
                version,
                document: Err(e),
            }) => (self.failed(&e), Some(version)),
            Err(e) => (self.failed(&e), None),
        };

        match &state {
            EngineState::Ready(tree) => tracing::info!(
                source = self.source.name(),
                endpoints = tree.total_endpoints(),
                version = %version.as_ref().map(ToString::to_string).unwrap_or_default(),
                "configuration loaded"
            ),
            EngineState::Failed(message) => tracing::warn!(
                source = self.source.name(),
                error = %message,
                "configuration unusable"
            ),
        }

        Generation {
            state: Arc::new(state),
            version,
            loaded_at: Instant::now(),
        }
    }

    fn failed(&self, error: &StubError) -> EngineState {
        if error.is_config_failure() {
            return EngineState::Failed(error.to_string());
        }
        tracing::error!(
            source = self.source.name(),
            location = %self.source.location(),
            error = %error,
            "unexpected error loading configuration"
        );
        EngineState::Failed(UNEXPECTED_FAILURE_MESSAGE.to_string())
    }

    fn compile(&self, document: Option<&ConfigDocument>) -> EngineState {
        let result = self.validator.validate(document, &SectionName::root());
        if result.has_errors() {
            let err = StubError::ConfigValidation {
                errors: result.into_errors(),
            };
            return EngineState::Failed(err.to_string());
        }
        EngineState::Ready(document.map(EndpointTree::compile).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::sources::memory::MemorySource;
    use crate::config::validation::ValidationResult;

    const VALID: &str = r#"{"endpoints": [{"path": "ping", "actions": [{"responses": [{"statusCode": 204}]}]}]}"#;

    fn store(source: &Arc<MemorySource>) -> ConfigStore {
        ConfigStore::new(Box::new(Arc::clone(source)))
    }

    /// A source that fails with an error outside the configuration classes.
    struct Broken;

    #[async_trait]
    impl ConfigSource for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn location(&self) -> String {
            "nowhere".into()
        }

        async fn load(&self) -> Result<Snapshot, StubError> {
            Err(StubError::Io(std::io::Error::other("disk on fire")))
        }

        async fn has_changed(&self, _current: &ConfigVersion) -> Result<bool, StubError> {
            Ok(false)
        }
    }

    /// Accepts everything.
    struct Permissive;

    impl SectionValidator<ConfigDocument> for Permissive {
        fn validate(&self, _section: Option<&ConfigDocument>, _name: &SectionName) -> ValidationResult {
            ValidationResult::new()
        }
    }

    #[tokio::test]
    async fn first_access_loads_and_later_accesses_share() {
        let source = Arc::new(MemorySource::json(VALID));
        let store = store(&source);
        assert!(store.peek().await.is_none());

        let first = store.state().await;
        let second = store.state().await;
        assert!(first.is_ready());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.load_count(), 1);
        assert_eq!(source.reads(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_loads_once() {
        let source = Arc::new(MemorySource::json(VALID));
        let store = Arc::new(store(&source));

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.state().await })
            })
            .collect();

        let mut states = Vec::new();
        for task in tasks {
            states.push(task.await.unwrap());
        }

        assert_eq!(store.load_count(), 1);
        assert_eq!(source.reads(), 1);
        assert!(states.iter().all(|s| Arc::ptr_eq(s, &states[0])));
    }

    #[tokio::test]
    async fn parse_failure_is_reported() {
        let source = Arc::new(MemorySource::json("{ nope"));
        let state = store(&source).state().await;
        let message = state.error_message().unwrap();
        assert!(message.starts_with("Error reading configuration file:"), "{message}");
    }

    #[tokio::test]
    async fn validation_failure_lists_every_error() {
        let source = Arc::new(MemorySource::json(
            r#"{"endpoints": [{"actions": [{"responses": [{}]}]}, null]}"#,
        ));
        let state = store(&source).state().await;
        assert_eq!(
            state.error_message().unwrap(),
            "Configuration file was read correctly but failed validation. Errors:\n  \
             - Error in $.endpoints[0].path: Endpoint must have a path\n  \
             - Error in $.endpoints[1]: Endpoint is null"
        );
    }

    #[tokio::test]
    async fn null_document_fails_validation() {
        let source = Arc::new(MemorySource::json("null"));
        let state = store(&source).state().await;
        assert!(state
            .error_message()
            .unwrap()
            .ends_with("- Error in $: Endpoints file is null"));
    }

    #[tokio::test]
    async fn unexpected_errors_use_generic_message() {
        let store = ConfigStore::new(Box::new(Broken));
        let state = store.state().await;
        assert_eq!(state.error_message(), Some(UNEXPECTED_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn failed_state_is_cached_until_reload() {
        let source = Arc::new(MemorySource::json("{"));
        let store = store(&source);
        assert!(!store.state().await.is_ready());

        source.replace(VALID);
        assert!(!store.state().await.is_ready());
        assert_eq!(store.load_count(), 1);

        assert!(store.reload().await.is_ready());
        assert!(store.state().await.is_ready());
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_defers_reload_to_next_access() {
        let source = Arc::new(MemorySource::json(VALID));
        let store = store(&source);
        let before = store.state().await;

        store.invalidate().await;
        assert!(store.peek().await.is_none());
        assert_eq!(store.load_count(), 1);

        let after = store.state().await;
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn refresh_only_reloads_on_change() {
        let source = Arc::new(MemorySource::json(VALID));
        let store = store(&source);
        store.state().await;

        assert!(!store.refresh_if_changed().await.unwrap());
        assert_eq!(store.load_count(), 1);

        source.replace(r#"{"endpoints": []}"#);
        assert!(store.refresh_if_changed().await.unwrap());
        assert_eq!(store.load_count(), 2);
        let state = store.state().await;
        assert_eq!(state.tree().unwrap().total_endpoints(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_refreshes_reload_once() {
        let source = Arc::new(MemorySource::json(VALID));
        let store = Arc::new(store(&source));
        store.state().await;
        source.replace(r#"{"endpoints": []}"#);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.refresh_if_changed().await.unwrap() })
            })
            .collect();

        let mut reloads = 0;
        for task in tasks {
            reloads += usize::from(task.await.unwrap());
        }

        assert_eq!(reloads, 1);
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn unchanged_unparsable_source_is_not_reloaded() {
        let source = Arc::new(MemorySource::json("{"));
        let store = store(&source);
        assert!(!store.state().await.is_ready());
        assert!(store.generation().await.version.is_some());

        for _ in 0..3 {
            assert!(!store.refresh_if_changed().await.unwrap());
        }
        assert_eq!(store.load_count(), 1);
        assert_eq!(source.reads(), 1);

        source.replace(VALID);
        assert!(store.refresh_if_changed().await.unwrap());
        assert!(store.state().await.is_ready());
    }

    #[tokio::test]
    async fn unreadable_source_is_always_retried() {
        let store = ConfigStore::new(Box::new(Broken));
        store.state().await;
        assert!(store.refresh_if_changed().await.unwrap());
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn substitute_validator_is_used() {
        let source = Arc::new(MemorySource::json(r#"{"endpoints": [null]}"#));
        let store = ConfigStore::with_validator(Box::new(Arc::clone(&source)), Box::new(Permissive));
        let state = store.state().await;
        assert!(state.is_ready());
        assert_eq!(state.tree().unwrap().total_endpoints(), 0);
    }
}
