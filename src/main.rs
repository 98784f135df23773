//! Wardrobe Agent CLI
//!
//! Command-line interface for ingesting the catalog, running one-shot
//! searches, and chatting with the shopping assistant.

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wardrobe_agent::{
    default_instructions, load_catalog, AppConfig, Brand, Category, ChatClient, OpenAiEmbedder,
    ProductFilters, ProductSearchTool, QdrantIndex, Result, SearchRequest, SearchService,
    ShoppingAgent, Tool,
};
use wardrobe_agent::search::{ingest_catalog, DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K};

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(author, version, about = "Conversational clothing search assistant", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Embed the product catalog and load it into the vector index
    Ingest {
        /// Catalog JSON file (defaults to the configured path)
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Run a single search against the index
    Search {
        /// Free-text description of the item
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: u64,

        /// Minimum similarity score
        #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
        score_threshold: f32,

        /// Restrict to a brand
        #[arg(long)]
        brand: Option<Brand>,

        /// Restrict to a category
        #[arg(long)]
        category: Option<Category>,

        /// Inclusive lower price bound
        #[arg(long)]
        price_min: Option<f64>,

        /// Inclusive upper price bound
        #[arg(long)]
        price_max: Option<f64>,
    },

    /// Chat with the shopping assistant
    Chat,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        info!("Loading configuration from: {}", path);
        AppConfig::load(path)
    } else {
        info!("Using default configuration");
        Ok(AppConfig::default())
    }
}

/// Construct the shared client handles once and wire them into the service.
fn build_search_service(config: &AppConfig) -> Result<Arc<SearchService>> {
    let embedder = OpenAiEmbedder::new(&config.openai)?;
    let index = QdrantIndex::connect(&config.qdrant)?;
    Ok(Arc::new(SearchService::new(
        Arc::new(embedder),
        Arc::new(index),
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { output } => {
            info!("Writing default configuration to: {}", output);
            let config = AppConfig::default();
            config.save(&output)?;
            info!("Configuration saved successfully");
        }

        Commands::Ingest { catalog } => {
            let config = load_config(&cli.config)?;
            let catalog_path = catalog.unwrap_or_else(|| config.catalog.path.clone());

            info!("Loading catalog from: {}", catalog_path);
            let products = load_catalog(&catalog_path)?;

            let embedder = OpenAiEmbedder::new(&config.openai)?;
            let index = QdrantIndex::connect(&config.qdrant)?;
            let report = ingest_catalog(&embedder, &index, &products).await?;

            info!(
                "Ingested {} products into '{}' ({} dimensions)",
                report.products,
                index.collection(),
                report.dimension
            );
        }

        Commands::Search {
            query,
            top_k,
            score_threshold,
            brand,
            category,
            price_min,
            price_max,
        } => {
            let config = load_config(&cli.config)?;
            let service = build_search_service(&config)?;

            let filters = ProductFilters {
                brand,
                category,
                price_min,
                price_max,
            };
            let mut request = SearchRequest::new(&query)
                .with_top_k(top_k)
                .with_score_threshold(score_threshold);
            if !filters.is_empty() {
                request = request.with_filters(filters);
            }

            let matches = service.search(&request).await?;
            if matches.is_empty() {
                println!("No matching products for '{}'", query);
            } else {
                println!("Found {} results for '{}':", matches.len(), query);
                for m in &matches {
                    println!(
                        "- {} by {} (${:.2}, {}, {}) score {:.3}",
                        m.name, m.brand, m.price, m.color, m.material, m.score
                    );
                }
            }
        }

        Commands::Chat => {
            let config = load_config(&cli.config)?;
            let service = build_search_service(&config)?;

            let backend = Arc::new(ChatClient::new(&config.openai)?);
            let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(ProductSearchTool::new(service))];
            let instructions = config
                .agent
                .instructions
                .clone()
                .unwrap_or_else(default_instructions);
            let agent = ShoppingAgent::new(
                backend,
                tools,
                instructions,
                config.agent.max_tool_rounds,
            );

            println!("Wardrobe assistant ready. Ask about clothing; empty line to quit.");
            run_chat_loop(&agent).await?;
        }
    }

    Ok(())
}

/// Read-eval-print loop for the chat command.
///
/// The agent itself is stateless per turn; continuity comes from folding
/// the most recent exchanges into the next input.
async fn run_chat_loop(agent: &ShoppingAgent) -> Result<()> {
    // user/assistant pairs, most recent last
    let mut history: Vec<(String, String)> = Vec::new();
    let stdin = std::io::stdin();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let contextual_input = fold_history(&history, input);
        match agent.respond(&contextual_input).await {
            Ok(reply) => {
                println!("{}", reply);
                history.push((input.to_string(), reply));
            }
            Err(e) => {
                eprintln!("error: {}", e);
            }
        }
    }

    Ok(())
}

/// Prepend the last few exchanges so follow-ups like "something cheaper?"
/// keep their referent.
fn fold_history(history: &[(String, String)], input: &str) -> String {
    const CONTEXT_TURNS: usize = 3;

    if history.is_empty() {
        return input.to_string();
    }

    let mut context = String::new();
    let start = history.len().saturating_sub(CONTEXT_TURNS);
    for (user, assistant) in &history[start..] {
        context.push_str(&format!("User: {}\nAssistant: {}\n", user, assistant));
    }
    context.push_str(&format!("User: {}", input));
    context
}
