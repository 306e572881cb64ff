//! # Data Service
//!
//! Picks the query for a request kind, runs it against the SPARQL source and
//! flattens the result. The card variant samples a few records and turns each
//! into a hero card with one of its own images.

use std::sync::Arc;

use crate::application::flatten::flatten;
use crate::domain::error::BotResult;
use crate::domain::traits::{Sampler, SparqlSource};
use crate::domain::types::{Card, FieldValue, Record, RequestKind};
use crate::infrastructure::queries::QueryCatalog;

const TITLE_FIELD: &str = "name";
const SUBTITLE_FIELD: &str = "description";
const IMAGES_FIELD: &str = "imagesList";

pub struct DataService {
    source: Arc<dyn SparqlSource>,
    queries: QueryCatalog,
    sampler: Arc<dyn Sampler>,
    language: String,
    cards_per_reply: usize,
}

impl DataService {
    pub fn new(
        source: Arc<dyn SparqlSource>,
        queries: QueryCatalog,
        sampler: Arc<dyn Sampler>,
        language: impl Into<String>,
        cards_per_reply: usize,
    ) -> Self {
        Self {
            source,
            queries,
            sampler,
            language: language.into(),
            cards_per_reply,
        }
    }

    pub async fn fetch(&self, kind: RequestKind) -> BotResult<Vec<Record>> {
        let query = self.queries.load(kind).await?;
        let doc = self.source.fetch_raw(&query).await?;
        let records = flatten(&doc, &self.language);
        tracing::debug!(
            "Fetched {} {} records ({} rows before language filter)",
            records.len(),
            kind,
            doc.results.bindings.len()
        );
        Ok(records)
    }

    /// Cards for the kind named by a button label. Unknown labels fail before any request is made.
    pub async fn fetch_cards(&self, label: &str) -> BotResult<Vec<Card>> {
        let kind: RequestKind = label.parse()?;
        let records = self.fetch(kind).await?;

        Ok(self
            .sampler
            .sample_indices(records.len(), self.cards_per_reply)
            .into_iter()
            .map(|i| self.build_card(&records[i], kind))
            .collect())
    }

    /// One record chosen uniformly at random, if any.
    pub async fn sample_record(&self, kind: RequestKind) -> BotResult<Option<Record>> {
        let mut records = self.fetch(kind).await?;
        Ok(self
            .sampler
            .pick_index(records.len())
            .map(|i| records.swap_remove(i)))
    }

    fn build_card(&self, record: &Record, kind: RequestKind) -> Card {
        let images = record
            .get(IMAGES_FIELD)
            .and_then(FieldValue::as_list)
            .unwrap_or_default();

        Card {
            title: text_field(record, TITLE_FIELD).unwrap_or_default(),
            image_url: self.sampler.pick_index(images.len()).map(|i| images[i].clone()),
            subtitle: text_field(record, SUBTITLE_FIELD),
            link: text_field(record, kind.link_field()),
        }
    }
}

pub fn text_field(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(FieldValue::as_text)
        .map(str::to_string)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::application::sampling::RandomSampler;
    use crate::domain::error::BotError;

    fn service(source: Arc<StubSource>, sampler: Arc<dyn Sampler>, dir: &tempfile::TempDir) -> DataService {
        DataService::new(source, QueryCatalog::new(dir.path()), sampler, "nl", 4)
    }

    #[tokio::test]
    async fn test_fetch_routes_to_distinct_queries() {
        let dir = query_dir();
        let source = Arc::new(StubSource::new(ATTRACTIONS));
        let data = service(source.clone(), Arc::new(FirstSampler), &dir);

        data.fetch(RequestKind::Attractions).await.unwrap();
        data.fetch(RequestKind::Events).await.unwrap();

        let queries = source.queries.lock().unwrap().clone();
        assert_eq!(queries, vec!["SELECT attractions", "SELECT events"]);
    }

    #[tokio::test]
    async fn test_fetch_filters_language() {
        let dir = query_dir();
        let source = Arc::new(StubSource::new(ATTRACTIONS));
        let data = service(source, Arc::new(FirstSampler), &dir);

        let records = data.fetch(RequestKind::Attractions).await.unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r["name"].as_text() != Some("Castle of the Counts")));
    }

    #[tokio::test]
    async fn test_unknown_label_makes_no_request() {
        let dir = query_dir();
        let source = Arc::new(StubSource::new(ATTRACTIONS));
        let data = service(source.clone(), Arc::new(FirstSampler), &dir);

        let err = data.fetch_cards("Restaurants").await.unwrap_err();
        assert!(matches!(err, BotError::InvalidRequest(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_cards_built_from_records() {
        let dir = query_dir();
        let source = Arc::new(StubSource::new(ATTRACTIONS));
        let data = service(source, Arc::new(FirstSampler), &dir);

        let cards = data.fetch_cards("Attractions").await.unwrap();
        assert_eq!(cards.len(), 4);
        assert_eq!(
            cards[0],
            Card {
                title: "Gravensteen".to_string(),
                image_url: Some("https://img/grav1.jpg".to_string()),
                subtitle: Some("Burcht".to_string()),
                link: Some("https://visit.gent.be/gravensteen".to_string()),
            }
        );
        assert_eq!(cards[2].subtitle, None);
    }

    #[tokio::test]
    async fn test_random_cards_use_own_images() {
        let dir = query_dir();
        let source = Arc::new(StubSource::new(ATTRACTIONS));
        let data = service(source, Arc::new(RandomSampler::new(Some(9))), &dir);
        let records = data.fetch(RequestKind::Attractions).await.unwrap();

        for _ in 0..20 {
            let cards = data.fetch_cards("Attractions").await.unwrap();
            assert!(cards.len() <= 4);
            for card in cards {
                let record = records
                    .iter()
                    .find(|r| r["name"].as_text() == Some(card.title.as_str()))
                    .expect("card comes from a fetched record");
                let images = record["imagesList"].as_list().unwrap();
                assert!(images.contains(card.image_url.as_ref().unwrap()));
            }
        }
    }

    #[tokio::test]
    async fn test_fewer_records_than_cards() {
        let dir = query_dir();
        let body = r#"{"head": {"vars": ["name"]}, "results": {"bindings": [
            {"name": {"value": "Lichtfestival", "xml:lang": "nl"}}
        ]}}"#;
        let source = Arc::new(StubSource::new(body));
        let data = service(source, Arc::new(RandomSampler::new(Some(3))), &dir);

        let cards = data.fetch_cards("Events").await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Lichtfestival");
        assert_eq!(cards[0].image_url, None);
        assert_eq!(cards[0].link, None);
    }

    #[tokio::test]
    async fn test_sample_record() {
        let dir = query_dir();
        let source = Arc::new(StubSource::new(ATTRACTIONS));
        let data = service(source, Arc::new(FirstSampler), &dir);

        let record = data.sample_record(RequestKind::Attractions).await.unwrap().unwrap();
        assert_eq!(text_field(&record, "name").as_deref(), Some("Gravensteen"));
    }
}
