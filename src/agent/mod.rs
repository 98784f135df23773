//! Conversational shopping agent.
//!
//! The agent is a tool-calling loop around an OpenAI-compatible chat model.
//! Its behavioral policy is an instruction string interpreted by the model,
//! not executable logic here; the default below can be replaced from
//! configuration. The crate contributes the tool contract and the loop, the
//! model contributes the reasoning.

mod chat;
mod tool;

pub use chat::{ChatBackend, ChatClient, ChatMessage, FunctionCall, ShoppingAgent, ToolCall};
pub use tool::{ProductSearchTool, Tool, ToolSpec, SEARCH_TOOL_NAME};

use crate::catalog::{Brand, Category};

/// Build the default instruction prompt.
///
/// The available brands and categories are interpolated from the catalog
/// enums so the prompt never drifts from the data.
pub fn default_instructions() -> String {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let brands: Vec<&str> = Brand::ALL.iter().map(|b| b.as_str()).collect();

    format!(
        "You are an expert shopping assistant for clothing and fashion. \
Help users find clothing items that fit their needs and preferences.\n\
\n\
When helping users:\n\
1. Ask clarifying questions when a request is vague (occasion, size, budget, style).\n\
2. Use the {tool} tool to look up products for concrete requests, passing \
brand, category, or price filters when the user states them.\n\
3. Present results in a friendly, organized way with price, brand, material, \
and colors.\n\
4. Suggest styling ideas or alternatives when it helps.\n\
5. Help users compare options against their criteria.\n\
\n\
Available product categories: {categories}\n\
Available brands: {brands}\n\
\n\
Be conversational and focus on what the user is really trying to achieve.",
        tool = SEARCH_TOOL_NAME,
        categories = categories.join(", "),
        brands = brands.join(", "),
    )
}
