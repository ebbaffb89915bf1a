//! MCP server exposing usage lookups to Claude Code and other MCP clients.

use crate::client::UsageClient;
use crate::error::LimitsError;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::transport::stdio;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct LimitsService {
    client: Arc<UsageClient>,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LimitRequest {
    /// Field to look up
    #[schemars(description = "Free-text field name, e.g. \"five\", \"5h\" or \"7day\"")]
    pub query: String,
}

impl LimitsService {
    pub fn new(client: UsageClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }
}

fn error_result(err: &LimitsError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {err}"))])
}

#[tool_router]
impl LimitsService {
    #[tool(description = "Get current Claude.ai usage for your Pro/Max subscription")]
    pub async fn get_usage(&self) -> std::result::Result<CallToolResult, McpError> {
        debug!("get_usage called");
        let usage = match self.client.get_usage().await {
            Ok(usage) => usage,
            Err(e) => return Ok(error_result(&e)),
        };

        match usage.to_json() {
            Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
            Err(e) => Ok(error_result(&e.into())),
        }
    }

    #[tool(description = "Look up a single usage field by fuzzy name, e.g. \"five\" for the five-hour utilization")]
    pub async fn get_limit(
        &self,
        Parameters(request): Parameters<LimitRequest>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!("get_limit called with {:?}", request.query);
        let usage = match self.client.get_usage().await {
            Ok(usage) => usage,
            Err(e) => return Ok(error_result(&e)),
        };

        let entry = match usage.lookup(&request.query) {
            Ok(entry) => entry,
            Err(e) => return Ok(error_result(&e)),
        };

        match serde_json::to_string_pretty(&entry) {
            Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
            Err(e) => Ok(error_result(&e.into())),
        }
    }
}

#[tool_handler]
impl ServerHandler for LimitsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("claude-limits reports Claude.ai usage limits. Use 'get_usage' for the full usage document or 'get_limit' to fetch a single field by fuzzy name.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "claude-limits".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

/// Serves the MCP tools on stdio until the client disconnects.
pub async fn serve(client: UsageClient) -> crate::error::Result<()> {
    info!("Starting MCP server on stdio");
    let service = LimitsService::new(client)
        .serve(stdio())
        .await
        .map_err(|e| LimitsError::Mcp(e.to_string()))?;

    service
        .waiting()
        .await
        .map_err(|e| LimitsError::Mcp(e.to_string()))?;
    info!("MCP client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(body: ResponseTemplate) -> (MockServer, LimitsService) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/oauth/usage"))
            .respond_with(body)
            .mount(&server)
            .await;
        let client = UsageClient::new("token")
            .unwrap()
            .with_base_url(server.uri())
            .with_initial_backoff(Duration::from_millis(1));
        (server, LimitsService::new(client))
    }

    fn text_of(result: &CallToolResult) -> String {
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_get_usage_tool() {
        let (_server, service) = service_for(
            ResponseTemplate::new(200).set_body_json(json!({ "five_hour": { "utilization": 12.0 } })),
        )
        .await;

        let result = service.get_usage().await.unwrap();
        assert_ne!(result.is_error, Some(true));
        let parsed: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(parsed["five_hour"]["utilization"], json!(12.0));
    }

    #[tokio::test]
    async fn test_get_limit_tool() {
        let (_server, service) = service_for(ResponseTemplate::new(200).set_body_json(json!({
            "five_hour": { "utilization": 12.0 },
            "seven_day": { "utilization": 55.0 }
        })))
        .await;

        let result = service
            .get_limit(Parameters(LimitRequest {
                query: "7day".to_string(),
            }))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));

        let parsed: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(parsed["path"], "seven_day_utilization");
        assert_eq!(parsed["key"], "utilization");
        assert_eq!(parsed["value"], json!(55.0));
    }

    #[tokio::test]
    async fn test_get_limit_no_match_is_tool_error() {
        let (_server, service) =
            service_for(ResponseTemplate::new(200).set_body_json(json!({ "a": 1 }))).await;

        let result = service
            .get_limit(Parameters(LimitRequest {
                query: "zzz".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("zzz"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_tool_error() {
        let (_server, service) = service_for(ResponseTemplate::new(403)).await;
        let result = service.get_usage().await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("403"));
    }
}
