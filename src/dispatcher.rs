use std::fmt;

use anyhow::Result;
use rmcp::model::{CallToolResult, Content};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{DispatchError, ToolError},
    pollinations::PollinationsClient,
    storage::DownloadDirectory,
    tools,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolName {
    GenerateImage,
    DownloadImage,
    GenerateText,
    GenerateChat,
    ListTextModels,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::GenerateImage,
        ToolName::DownloadImage,
        ToolName::GenerateText,
        ToolName::GenerateChat,
        ToolName::ListTextModels,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateImage => "generate_image",
            Self::DownloadImage => "download_image",
            Self::GenerateText => "generate_text",
            Self::GenerateChat => "generate_chat",
            Self::ListTextModels => "list_text_models",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named tool invocation with its arguments as received.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    pub name: String,
    pub arguments: Value,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Routes tool calls to their handlers and folds every handled failure into
/// an `isError` result.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: PollinationsClient,
    downloads: DownloadDirectory,
    probe_image_urls: bool,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: PollinationsClient::new(config)?,
            downloads: DownloadDirectory::new(config.download_dir.clone()),
            probe_image_urls: config.probe_image_urls,
        })
    }

    /// Runs one tool call.
    ///
    /// Only an unknown tool name is returned as `Err`. When `cancel` fires
    /// before the handler finishes, the call ends with a handled error.
    pub async fn dispatch(
        &self,
        request: ToolRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<CallToolResult, DispatchError> {
        let tool = ToolName::parse(&request.name)
            .ok_or_else(|| DispatchError::MethodNotFound(request.name.clone()))?;
        info!(%tool, "tool call");

        let handled = self.run(tool, &request.arguments);
        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ToolError::remote("请求已取消", None)),
                outcome = handled => outcome,
            },
            None => handled.await,
        };

        Ok(outcome.unwrap_or_else(|err| {
            warn!(%tool, kind = err.kind(), error = %err, "tool call failed");
            CallToolResult::error(vec![Content::text(err.render())])
        }))
    }

    async fn run(&self, tool: ToolName, arguments: &Value) -> Result<CallToolResult, ToolError> {
        match tool {
            ToolName::GenerateImage => {
                tools::generate_image(&self.client, self.probe_image_urls, arguments).await
            }
            ToolName::DownloadImage => {
                tools::download_image(&self.client, &self.downloads, arguments).await
            }
            ToolName::GenerateText => tools::generate_text(&self.client, arguments).await,
            ToolName::GenerateChat => tools::generate_chat(&self.client, arguments).await,
            ToolName::ListTextModels => tools::list_text_models(&self.client).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
        assert_eq!(ToolName::parse("nonexistent_tool"), None);
    }
}
