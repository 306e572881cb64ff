//! # SPARQL Client
//!
//! Issues GET requests against the configured SPARQL endpoint and decodes the
//! `application/sparql-results+json` document. Failures are returned as-is; nothing is retried.

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::SparqlSource;
use crate::domain::types::SparqlResults;

const RESULTS_FORMAT: &str = "application/sparql-results+json";

pub struct SparqlClient {
    http: Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn new(endpoint: impl Into<String>) -> BotResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("visitbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BotError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SparqlSource for SparqlClient {
    async fn fetch_raw(&self, query: &str) -> BotResult<SparqlResults> {
        tracing::debug!("Querying {} ({} bytes of SPARQL)", self.endpoint, query.len());

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("format", RESULTS_FORMAT), ("debug", "on"), ("query", query)])
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BotError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let doc: SparqlResults = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        tracing::debug!(
            "SPARQL returned {} bindings for {} vars",
            doc.results.bindings.len(),
            doc.head.vars.len()
        );
        Ok(doc)
    }
}
