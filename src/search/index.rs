//! Vector index abstraction and its Qdrant implementation.

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, Filter, PointStruct, Query, QueryPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::Value as JsonValue;

use crate::config::QdrantConfig;
use crate::error::{Error, Result};

/// A point to store: stable id, embedding vector, and the product payload.
#[derive(Debug, Clone)]
pub struct IndexPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: JsonValue,
}

/// A similarity hit: the index's score plus the stored payload.
#[derive(Debug, Clone)]
pub struct ScoredPayload {
    pub score: f32,
    pub payload: JsonValue,
}

/// Contract with the similarity-search backend.
///
/// `query` returns at most `limit` hits, all scoring at least
/// `score_threshold`, matching `filter` when one is given, ordered
/// descending by score. An absent filter matches everything.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Drop the collection if it exists and create it fresh with the given
    /// vector dimension. Used by ingestion only.
    async fn recreate_collection(&self, dimension: u64) -> Result<()>;

    /// Insert or overwrite points by id. Used by ingestion only.
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<()>;

    /// Similarity query with optional structured filter.
    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filter: Option<Filter>,
    ) -> Result<Vec<ScoredPayload>>;
}

/// Qdrant-backed vector index.
///
/// The client handle is created once at startup and shared; nothing in this
/// crate constructs a client per call.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantIndex {
    /// Connect to the configured Qdrant server.
    pub fn connect(config: &QdrantConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.resolve_api_key())
            .build()
            .map_err(|e| {
                Error::Index(format!("failed to connect to qdrant at {}: {}", config.url, e))
            })?;
        Ok(Self {
            client,
            collection: config.collection.clone(),
        })
    }

    /// The collection this index reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn recreate_collection(&self, dimension: u64) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            tracing::info!(collection = %self.collection, "deleting existing collection");
            self.client.delete_collection(&self.collection).await?;
        }
        tracing::info!(collection = %self.collection, dimension, "creating collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine)),
            )
            .await?;
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<()> {
        let points = points.into_iter().map(to_point).collect::<Result<Vec<_>>>()?;
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filter: Option<Filter>,
    ) -> Result<Vec<ScoredPayload>> {
        let mut request = QueryPointsBuilder::new(&self.collection)
            .query(Query::new_nearest(vector))
            .limit(limit)
            .score_threshold(score_threshold)
            .with_payload(true);
        if let Some(filter) = filter {
            request = request.filter(filter);
        }

        let response = self.client.query(request).await?;
        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPayload {
                score: point.score,
                payload: JsonValue::Object(
                    point
                        .payload
                        .into_iter()
                        .map(|(key, value)| (key, value_to_json(value)))
                        .collect(),
                ),
            })
            .collect())
    }
}

/// Convert a stored payload value back into plain JSON.
fn value_to_json(value: qdrant_client::qdrant::Value) -> JsonValue {
    use qdrant_client::qdrant::value::Kind;

    match value.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(b),
        Some(Kind::IntegerValue(i)) => JsonValue::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Some(Kind::StringValue(s)) => JsonValue::String(s),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(fields)) => JsonValue::Object(
            fields
                .fields
                .into_iter()
                .map(|(key, value)| (key, value_to_json(value)))
                .collect(),
        ),
    }
}

fn to_point(point: IndexPoint) -> Result<PointStruct> {
    let payload = Payload::try_from(point.payload)
        .map_err(|_| Error::Index("index payload must be a JSON object".to_string()))?;
    Ok(PointStruct::new(point.id, point.vector, payload))
}
