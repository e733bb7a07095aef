//! Document loading from the data directory.
//!
//! Nothing is cached: every call reads and parses the file again, so an
//! out-of-band update is visible on the next request.

use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::fs;

use super::Resource;
use crate::error::{ApiError, LoadError};
use crate::logger;

/// Read-only view over the directory holding the served documents
#[derive(Debug, Clone)]
pub struct ContentStore {
    data_dir: PathBuf,
}

impl ContentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_of(&self, resource: Resource) -> PathBuf {
        self.data_dir.join(resource.file_name())
    }

    /// Read and parse one document.
    ///
    /// Failures are logged with the file name and cause here, so callers only
    /// decide how to surface them.
    pub async fn load(&self, resource: Resource) -> Result<Value, ApiError> {
        self.read_document(resource).await.map_err(|source| {
            logger::log_error(&format!(
                "Error loading {}: {source}",
                resource.file_name()
            ));
            ApiError::Load { resource, source }
        })
    }

    /// Vignettes for one domain, keyed verbatim (case-sensitive, no trimming).
    ///
    /// Returns `{"domain": .., "vignettes": ..}`. An unreadable collection is a
    /// load failure; a readable one without the key is `DomainNotFound`.
    pub async fn vignettes_for(&self, domain: &str) -> Result<Value, ApiError> {
        let collection = self.load(Resource::Vignettes).await?;
        let vignettes = collection
            .as_object()
            .and_then(|domains| domains.get(domain))
            .cloned()
            .ok_or_else(|| ApiError::DomainNotFound(domain.to_string()))?;

        let mut body = Map::with_capacity(2);
        body.insert("domain".to_string(), Value::String(domain.to_string()));
        body.insert("vignettes".to_string(), vignettes);
        Ok(Value::Object(body))
    }

    async fn read_document(&self, resource: Resource) -> Result<Value, LoadError> {
        let path = self.path_of(resource);
        let bytes = match fs::read(&path).await {
            Ok(b) => b,
            Err(source) => return Err(LoadError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse { path, source })
    }
}
