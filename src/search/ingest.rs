//! Offline catalog ingestion: embed every product and load the index.

use tracing::info;
use uuid::Uuid;

use crate::catalog::Product;
use crate::error::{Error, Result};
use crate::search::{Embedder, IndexPoint, VectorIndex};

/// Summary of a completed ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of products ingested
    pub products: usize,
    /// Embedding dimension the collection was created with
    pub dimension: usize,
}

/// The text a product is embedded from.
///
/// Name and description carry most of the semantics; material and color are
/// appended so queries like "soft wool sweater" land on the right items.
pub fn embedding_text(product: &Product) -> String {
    format!(
        "{}. {} Material: {}. Color: {}.",
        product.name, product.description, product.material, product.color
    )
}

/// Embed the whole catalog and rebuild the index collection from scratch.
///
/// The collection is dropped and recreated with the dimension reported by
/// the embedding provider, then one point per product is upserted. Each
/// point gets a fresh UUID; the product's own id travels in the payload so
/// it round-trips unchanged.
pub async fn ingest_catalog(
    embedder: &dyn Embedder,
    index: &dyn VectorIndex,
    products: &[Product],
) -> Result<IngestReport> {
    if products.is_empty() {
        return Err(Error::Catalog("catalog contains no products".to_string()));
    }

    let texts: Vec<String> = products.iter().map(embedding_text).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    if vectors.len() != products.len() {
        return Err(Error::Embedding(format!(
            "embedding provider returned {} vectors for {} products",
            vectors.len(),
            products.len()
        )));
    }

    let dimension = vectors[0].len();
    info!(products = products.len(), dimension, "ingesting catalog");

    index.recreate_collection(dimension as u64).await?;

    let points = products
        .iter()
        .zip(vectors)
        .map(|(product, vector)| {
            Ok(IndexPoint {
                id: Uuid::new_v4().to_string(),
                vector,
                payload: serde_json::to_value(product)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    index.upsert(points).await?;

    Ok(IngestReport {
        products: products.len(),
        dimension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Brand, Category};
    use crate::search::ScoredPayload;
    use async_trait::async_trait;
    use qdrant_client::qdrant::Filter;
    use std::sync::Mutex;

    struct StubEmbedder {
        dimension: usize,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; self.dimension])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.5; self.dimension]).collect())
        }
    }

    #[derive(Default)]
    struct CapturingIndex {
        recreated_with: Mutex<Option<u64>>,
        upserted: Mutex<Vec<IndexPoint>>,
    }

    #[async_trait]
    impl VectorIndex for CapturingIndex {
        async fn recreate_collection(&self, dimension: u64) -> Result<()> {
            *self.recreated_with.lock().unwrap() = Some(dimension);
            Ok(())
        }

        async fn upsert(&self, points: Vec<IndexPoint>) -> Result<()> {
            self.upserted.lock().unwrap().extend(points);
            Ok(())
        }

        async fn query(
            &self,
            _vector: Vec<f32>,
            _limit: u64,
            _score_threshold: f32,
            _filter: Option<Filter>,
        ) -> Result<Vec<ScoredPayload>> {
            Ok(Vec::new())
        }
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: Category::Sweaters,
            brand: Brand::Uniqlo,
            price: 39.99,
            color: "navy".to_string(),
            material: "wool".to_string(),
            size: vec!["M".to_string()],
            description: "A warm sweater.".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_embedding_text_folds_in_material_and_color() {
        let text = embedding_text(&product("P-1", "Crewneck Sweater"));
        assert_eq!(
            text,
            "Crewneck Sweater. A warm sweater. Material: wool. Color: navy."
        );
    }

    #[tokio::test]
    async fn test_ingest_recreates_collection_and_upserts_every_product() {
        let embedder = StubEmbedder { dimension: 8 };
        let index = CapturingIndex::default();
        let products = vec![product("P-1", "Sweater"), product("P-2", "Cardigan")];

        let report = ingest_catalog(&embedder, &index, &products).await.unwrap();

        assert_eq!(report, IngestReport { products: 2, dimension: 8 });
        assert_eq!(*index.recreated_with.lock().unwrap(), Some(8));

        let upserted = index.upserted.lock().unwrap();
        assert_eq!(upserted.len(), 2);
        // The catalog id must round-trip through the payload unchanged.
        assert_eq!(upserted[0].payload["id"], "P-1");
        assert_eq!(upserted[1].payload["id"], "P-2");
        // Point ids are fresh UUIDs, distinct per point.
        assert_ne!(upserted[0].id, upserted[1].id);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_rejected() {
        let embedder = StubEmbedder { dimension: 8 };
        let index = CapturingIndex::default();

        let err = ingest_catalog(&embedder, &index, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
        assert!(index.recreated_with.lock().unwrap().is_none());
    }
}
