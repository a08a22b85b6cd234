use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, ErrorCode, ListToolsResult,
        PaginatedRequestParams, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_router,
};
use serde_json::Value;

use crate::{
    dispatcher::{Dispatcher, ToolName, ToolRequest},
    error::DispatchError,
    tools::{
        ChatCompletionParams, DownloadParams, ImageGenerationParams, RawArguments,
        TextGenerationParams,
    },
};

const INSTRUCTIONS: &str = "通过 Pollinations.ai 生成图像与文本。generate_image 返回图像URL，使用![](url)方式展现图片；download_image 将图像保存到服务器的下载目录。";

#[derive(Clone)]
pub struct PollinationsServer {
    tool_router: ToolRouter<Self>,
    dispatcher: Arc<Dispatcher>,
}

impl PollinationsServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dispatcher,
        }
    }

    async fn call(
        &self,
        tool: ToolName,
        arguments: Value,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatcher
            .dispatch(ToolRequest::new(tool.as_str(), arguments), Some(context.ct))
            .await
            .map_err(into_mcp_error)
    }
}

fn into_mcp_error(err: DispatchError) -> McpError {
    match err {
        DispatchError::MethodNotFound(_) => {
            McpError::new(ErrorCode::METHOD_NOT_FOUND, err.to_string(), None)
        }
    }
}

#[tool_router]
impl PollinationsServer {
    #[tool(description = "使用Pollinations.ai生成图像并返回URL，使用![](url)方式展现图片")]
    async fn generate_image(
        &self,
        Parameters(arguments): Parameters<RawArguments<ImageGenerationParams>>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolName::GenerateImage, arguments.value, context).await
    }

    #[tool(description = "下载Pollinations.ai生成的图像到本地文件")]
    async fn download_image(
        &self,
        Parameters(arguments): Parameters<RawArguments<DownloadParams>>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolName::DownloadImage, arguments.value, context).await
    }

    #[tool(description = "使用Pollinations.ai根据提示词生成文本")]
    async fn generate_text(
        &self,
        Parameters(arguments): Parameters<RawArguments<TextGenerationParams>>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolName::GenerateText, arguments.value, context).await
    }

    #[tool(description = "使用Pollinations.ai根据对话消息列表生成回复，消息内容可包含图像URL")]
    async fn generate_chat(
        &self,
        Parameters(arguments): Parameters<RawArguments<ChatCompletionParams>>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolName::GenerateChat, arguments.value, context).await
    }

    #[tool(description = "获取Pollinations.ai可用的文本模型列表")]
    async fn list_text_models(
        &self,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolName::ListTextModels, Value::Object(Default::default()), context)
            .await
    }
}

impl ServerHandler for PollinationsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        // The router answers unknown names with invalid_params; the dispatcher
        // owns that decision so callers see METHOD_NOT_FOUND.
        if !self.tool_router.has_route(&request.name) {
            let arguments = Value::Object(request.arguments.unwrap_or_default());
            return self
                .dispatcher
                .dispatch(ToolRequest::new(request.name, arguments), Some(context.ct))
                .await
                .map_err(into_mcp_error);
        }
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
