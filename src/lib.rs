//! Wardrobe Agent
//!
//! A conversational product-search assistant for a clothing catalog. Users
//! describe what they want in natural language; a chat model decides when to
//! search, the search service embeds the query and runs a filtered
//! similarity lookup against Qdrant, and the model phrases the answer.
//!
//! The crate is organized as:
//! - [`catalog`]: the product data model and catalog file loading
//! - [`search`]: embedding, filtering, the vector index, and the search
//!   service itself
//! - [`agent`]: the tool contract and the conversational tool-use loop
//! - [`config`]: TOML configuration with environment fallbacks

pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod search;

pub use agent::{
    default_instructions, ChatClient, ProductSearchTool, ShoppingAgent, Tool, ToolSpec,
};
pub use catalog::{load_catalog, Brand, Category, Product};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use search::{
    ingest_catalog, Embedder, OpenAiEmbedder, ProductFilters, ProductMatch, QdrantIndex,
    SearchRequest, SearchService, VectorIndex,
};
