//! The semantic search service: embed, filter, query, shape.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Brand, Category, Product};
use crate::error::{Error, Result};
use crate::search::{
    Embedder, ProductFilters, VectorIndex, DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K,
};

/// One search call's parameters.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text description of what the user wants
    pub query: String,
    /// Maximum number of results
    pub top_k: u64,
    /// Minimum similarity score for a result to be included
    pub score_threshold: f32,
    /// Optional structured constraints
    pub filters: Option<ProductFilters>,
}

impl SearchRequest {
    /// A request with default result bounds and no filters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            filters: None,
        }
    }

    /// Set the result count bound.
    pub fn with_top_k(mut self, top_k: u64) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score.
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Set structured filters.
    pub fn with_filters(mut self, filters: ProductFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// One ranked search result: the index's similarity score plus a snapshot
/// of the product's display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    pub score: f32,
    pub name: String,
    pub brand: Brand,
    pub price: f64,
    pub color: String,
    pub size: Vec<String>,
    pub description: String,
    pub category: Category,
    pub material: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProductMatch {
    fn new(score: f32, product: Product) -> Self {
        Self {
            score,
            name: product.name,
            brand: product.brand,
            price: product.price,
            color: product.color,
            size: product.size,
            description: product.description,
            category: product.category,
            material: product.material,
            url: product.url,
        }
    }
}

/// Orchestrates one search call end to end.
///
/// Owns shared handles to the embedding provider and the vector index,
/// injected once at startup. Stateless per call; concurrent calls share
/// nothing but the client handles.
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SearchService {
    /// Create a service around existing client handles.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Run one search: embed the query, apply filters at the index, and
    /// return ranked matches.
    ///
    /// Zero matches is a normal outcome and returns an empty vector. The
    /// index ordering is preserved as-is; every returned score is at least
    /// `score_threshold` and the result count never exceeds `top_k`.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<ProductMatch>> {
        if request.top_k == 0 {
            return Err(Error::InvalidRequest("top_k must be greater than 0".to_string()));
        }
        if !(0.0..=1.0).contains(&request.score_threshold) {
            return Err(Error::InvalidRequest(format!(
                "score_threshold must be in [0, 1], got {}",
                request.score_threshold
            )));
        }

        debug!(query = %request.query, top_k = request.top_k, "searching products");

        // The index query must not be issued when embedding fails.
        let vector = self.embedder.embed(&request.query).await?;
        let filter = request.filters.as_ref().and_then(ProductFilters::to_qdrant);

        let hits = self
            .index
            .query(vector, request.top_k, request.score_threshold, filter)
            .await?;

        debug!(hits = hits.len(), "index query returned");

        hits.into_iter()
            .map(|hit| {
                let product: Product = serde_json::from_value(hit.payload).map_err(|e| {
                    Error::MalformedPayload(format!(
                        "search hit is missing product attributes: {}",
                        e
                    ))
                })?;
                Ok(ProductMatch::new(hit.score, product))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ScoredPayload;
    use async_trait::async_trait;
    use qdrant_client::qdrant::Filter;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedEmbedder {
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.1, 0.2, 0.3])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3]).collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Embedding("connection refused".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Embedding("connection refused".to_string()))
        }
    }

    #[derive(Debug)]
    struct RecordedQuery {
        limit: u64,
        score_threshold: f32,
        filter_clauses: Option<usize>,
    }

    struct RecordingIndex {
        hits: Vec<ScoredPayload>,
        queries: Mutex<Vec<RecordedQuery>>,
    }

    impl RecordingIndex {
        fn returning(hits: Vec<ScoredPayload>) -> Self {
            Self {
                hits,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn recreate_collection(&self, _dimension: u64) -> Result<()> {
            Ok(())
        }

        async fn upsert(&self, _points: Vec<crate::search::IndexPoint>) -> Result<()> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: Vec<f32>,
            limit: u64,
            score_threshold: f32,
            filter: Option<Filter>,
        ) -> Result<Vec<ScoredPayload>> {
            self.queries.lock().unwrap().push(RecordedQuery {
                limit,
                score_threshold,
                filter_clauses: filter.map(|f| f.must.len()),
            });
            Ok(self.hits.clone())
        }
    }

    fn payload(name: &str, price: f64) -> serde_json::Value {
        json!({
            "id": format!("P-{}", name),
            "name": name,
            "category": "jackets",
            "brand": "Adidas",
            "price": price,
            "color": "black",
            "material": "polyester",
            "size": ["M", "L"],
            "description": "A jacket."
        })
    }

    fn hit(score: f32, name: &str) -> ScoredPayload {
        ScoredPayload {
            score,
            payload: payload(name, 99.0),
        }
    }

    fn service(
        embedder: Arc<dyn Embedder>,
        index: Arc<RecordingIndex>,
    ) -> (SearchService, Arc<RecordingIndex>) {
        (SearchService::new(embedder, index.clone()), index)
    }

    #[tokio::test]
    async fn test_plain_query_uses_defaults_and_no_filter() {
        // Scenario: "warm jacket" with defaults, no filters.
        let embedder = Arc::new(FixedEmbedder::new());
        let index = Arc::new(RecordingIndex::returning(vec![
            hit(0.91, "Alpine Parka"),
            hit(0.74, "City Windbreaker"),
        ]));
        let (service, index) = service(embedder.clone(), index);

        let results = service.search(&SearchRequest::new("warm jacket")).await.unwrap();

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.query_count(), 1);
        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].limit, DEFAULT_TOP_K);
        assert_eq!(queries[0].score_threshold, DEFAULT_SCORE_THRESHOLD);
        assert_eq!(queries[0].filter_clauses, None, "no filters means no predicate at all");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Alpine Parka");
        assert_eq!(results[0].score, 0.91);
    }

    #[tokio::test]
    async fn test_full_filters_reach_the_index_as_four_clauses() {
        let index = Arc::new(RecordingIndex::returning(vec![hit(0.8, "Track Jacket")]));
        let (service, index) = service(Arc::new(FixedEmbedder::new()), index);

        let filters = ProductFilters {
            brand: Some(Brand::Adidas),
            category: Some(Category::Jackets),
            price_min: Some(50.0),
            price_max: Some(150.0),
        };
        let request = SearchRequest::new("sporty jacket").with_filters(filters);
        service.search(&request).await.unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].filter_clauses, Some(4));
    }

    #[tokio::test]
    async fn test_empty_filters_behave_like_no_filters() {
        let index = Arc::new(RecordingIndex::returning(Vec::new()));
        let (service, index) = service(Arc::new(FixedEmbedder::new()), index);

        let request = SearchRequest::new("anything").with_filters(ProductFilters::default());
        service.search(&request).await.unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].filter_clauses, None);
    }

    #[tokio::test]
    async fn test_zero_matches_is_an_empty_result_not_an_error() {
        let index = Arc::new(RecordingIndex::returning(Vec::new()));
        let (service, _) = service(Arc::new(FixedEmbedder::new()), index);

        let results = service.search(&SearchRequest::new("unmatched")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_prevents_the_index_query() {
        let index = Arc::new(RecordingIndex::returning(vec![hit(0.9, "Never Returned")]));
        let (service, index) = service(Arc::new(FailingEmbedder), index);

        let err = service.search(&SearchRequest::new("warm jacket")).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert_eq!(index.query_count(), 0, "index must not be queried after embedding failure");
    }

    #[tokio::test]
    async fn test_index_ordering_is_preserved_without_resorting() {
        let index = Arc::new(RecordingIndex::returning(vec![
            hit(0.9, "First"),
            hit(0.7, "Second"),
            hit(0.4, "Third"),
        ]));
        let (service, _) = service(Arc::new(FixedEmbedder::new()), index);

        let results = service.search(&SearchRequest::new("jacket")).await.unwrap();
        let names: Vec<_> = results.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_same_request_twice_yields_the_same_results() {
        let index = Arc::new(RecordingIndex::returning(vec![hit(0.8, "Stable")]));
        let (service, _) = service(Arc::new(FixedEmbedder::new()), index);

        let request = SearchRequest::new("jacket");
        let first = service.search(&request).await.unwrap();
        let second = service.search(&request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_payload_missing_an_attribute_is_a_malformed_payload_error() {
        let mut bad = payload("Broken", 10.0);
        bad.as_object_mut().unwrap().remove("price");
        let index = Arc::new(RecordingIndex::returning(vec![ScoredPayload {
            score: 0.5,
            payload: bad,
        }]));
        let (service, _) = service(Arc::new(FixedEmbedder::new()), index);

        let err = service.search(&SearchRequest::new("jacket")).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_zero_top_k_is_rejected() {
        let index = Arc::new(RecordingIndex::returning(Vec::new()));
        let (service, index) = service(Arc::new(FixedEmbedder::new()), index);

        let request = SearchRequest::new("jacket").with_top_k(0);
        let err = service.search(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(index.query_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_is_rejected() {
        let index = Arc::new(RecordingIndex::returning(Vec::new()));
        let (service, _) = service(Arc::new(FixedEmbedder::new()), index);

        let request = SearchRequest::new("jacket").with_score_threshold(1.5);
        assert!(matches!(
            service.search(&request).await.unwrap_err(),
            Error::InvalidRequest(_)
        ));
    }
}
