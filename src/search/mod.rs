//! Semantic product search.
//!
//! Turns a free-text query into a ranked list of catalog products using:
//! - an OpenAI-compatible embedding provider for query vectors
//! - Qdrant for vector storage and similarity search
//! - an optional structured filter applied by the index alongside similarity
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ query text │────▶│   Embedder   │────▶│  query vector │
//! └────────────┘     │ (remote API) │     │  [f32; 1536]  │
//!                    └──────────────┘     └───────┬───────┘
//!                                                 │
//! ┌────────────────┐   filter predicate   ┌───────▼───────┐
//! │ ProductFilters │─────────────────────▶│  VectorIndex  │
//! │ (brand/price…) │                      │   (Qdrant)    │
//! └────────────────┘                      └───────┬───────┘
//!                                                 │
//!                                         ┌───────▼───────┐
//!                                         │ ProductMatch  │
//!                                         │   (ranked)    │
//!                                         └───────────────┘
//! ```
//!
//! The two remote calls are strictly sequential: the index is never queried
//! when embedding generation fails. The index is the sole source of ranking
//! truth; this module does no re-ranking of its own.

mod embedding;
mod filter;
mod index;
mod ingest;
mod service;

pub use embedding::{Embedder, OpenAiEmbedder};
pub use filter::ProductFilters;
pub use index::{IndexPoint, QdrantIndex, ScoredPayload, VectorIndex};
pub use ingest::{embedding_text, ingest_catalog, IngestReport};
pub use service::{ProductMatch, SearchRequest, SearchService};

/// Default embedding model (1536 dimensions).
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default chat model driving the agent.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default number of results per search.
pub const DEFAULT_TOP_K: u64 = 5;

/// Default minimum similarity score for a result to be included.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.2;
