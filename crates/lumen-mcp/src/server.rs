use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;

use crate::{ImageAnalyzer, ToolError};

const INSTRUCTIONS: &str = "Vision tools backed by an OpenAI-compatible model. Images may be given as \
local file paths, file:// URLs, http(s) URLs, data URLs, or raw base64.";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SummarizeImageParams {
    #[schemars(description = "Image to describe: file path, file:// URL, http(s) URL, data URL, or raw base64")]
    pub image_url: String,

    #[schemars(description = "Prompt to use instead of the default description request")]
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompareImagesParams {
    #[schemars(description = "Two or more images to compare, in the order they should be presented")]
    pub image_urls: Vec<String>,

    #[schemars(description = "Prompt to use instead of the default comparison request")]
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

/// MCP server exposing `summarize_image` and `compare_images`
#[derive(Debug, Clone)]
pub struct LumenServer {
    tool_router: ToolRouter<Self>,
    analyzer: Arc<ImageAnalyzer>,
}

impl LumenServer {
    pub fn new(analyzer: ImageAnalyzer) -> Self {
        Self {
            tool_router: Self::tool_router(),
            analyzer: Arc::new(analyzer),
        }
    }

    pub fn analyzer(&self) -> &ImageAnalyzer {
        &self.analyzer
    }
}

#[tool_router]
impl LumenServer {
    #[tool(description = "Describe an image in detail, including any text it contains.")]
    async fn summarize_image(
        &self,
        Parameters(params): Parameters<SummarizeImageParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .analyzer
            .summarize(&params.image_url, params.custom_prompt.as_deref())
            .await;

        Ok(into_tool_result("summarize_image", result))
    }

    #[tool(description = "Compare two or more images, describing their similarities and differences.")]
    async fn compare_images(
        &self,
        Parameters(params): Parameters<CompareImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .analyzer
            .compare(&params.image_urls, params.custom_prompt.as_deref())
            .await;

        Ok(into_tool_result("compare_images", result))
    }
}

#[tool_handler]
impl ServerHandler for LumenServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_owned()),
            ..Default::default()
        }
    }
}

/// Render a tool outcome; failures become error results, never protocol errors
fn into_tool_result(tool: &str, result: Result<String, ToolError>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            tracing::warn!(tool, error = %e, "tool call failed");
            CallToolResult::error(vec![Content::text(format!("Error: {e}"))])
        }
    }
}
