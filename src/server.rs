//! MCP server exposing the `search` and `search_count` tools.

use crate::tools::{
    SearchCountRequest, SearchRequest, SharedEngine, handle_search, handle_search_count,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for ranked search over versioned guidance documents
#[derive(Clone)]
pub struct SearchServer {
    engine: SharedEngine,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl SearchServer {
    pub fn new(engine: SharedEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search versioned guidance documents. Modes: simple (web-search syntax with quoted phrases, 'or' and -exclusions; default), phrase, plain (all words), normal (operators & | ! <-> and parentheses), string (literal substring) and regex. Results are ranked per document and paginated by document; each matching version is listed with a highlighted headline.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.engine, request).await
    }

    #[tool(
        description = "Count the documents and document versions matching a query, without fetching results. Accepts the same modes as search; the default mode is normal.",
        input_schema = inline_schema_for_type::<SearchCountRequest>()
    )]
    async fn search_count(
        &self,
        Parameters(request): Parameters<SearchCountRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_count(&self.engine, request).await
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "guidance-search: ranked full-text and pattern search over versioned guidance documents. \
                 Use search_count to size a result set, then search with page and page_size to walk it."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline enum definitions instead of $ref patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let json_object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => {
            tracing::error!("Schema for {} did not serialize to an object", std::any::type_name::<T>());
            JsonObject::new()
        }
    };

    Arc::new(json_object)
}
