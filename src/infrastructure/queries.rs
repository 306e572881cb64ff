//! # Query Catalog
//!
//! Loads the on-disk SPARQL documents, one per request kind.

use std::path::PathBuf;

use crate::domain::error::{BotError, BotResult};
use crate::domain::types::RequestKind;

#[derive(Debug, Clone)]
pub struct QueryCatalog {
    dir: PathBuf,
}

impl QueryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: RequestKind) -> PathBuf {
        self.dir.join(kind.query_file())
    }

    /// Reads the query text for `kind`. Re-read on every call so edits apply without a restart.
    pub async fn load(&self, kind: RequestKind) -> BotResult<String> {
        let path = self.path_for(kind);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| BotError::Query { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("attractions.rq"), "# attractions").unwrap();
        std::fs::write(dir.path().join("events.rq"), "# events").unwrap();

        let catalog = QueryCatalog::new(dir.path());
        assert_eq!(catalog.load(RequestKind::Attractions).await.unwrap(), "# attractions");
        assert_eq!(catalog.load(RequestKind::Events).await.unwrap(), "# events");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = QueryCatalog::new(dir.path());
        let err = catalog.load(RequestKind::Events).await.unwrap_err();
        assert!(matches!(err, BotError::Query { ref path, .. } if path.ends_with("events.rq")));
    }

    #[tokio::test]
    async fn test_shipped_queries_exist() {
        let catalog = QueryCatalog::new(concat!(env!("CARGO_MANIFEST_DIR"), "/queries"));
        for kind in RequestKind::ALL {
            let query = catalog.load(kind).await.unwrap();
            assert!(query.contains("?imagesList"));
            assert!(query.contains(kind.link_field()));
        }
    }
}
