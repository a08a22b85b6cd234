use rmcp::{
    model::{CallToolResult, Content},
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::ToolError,
    pollinations::PollinationsClient,
    tools::{json_content, prompt_hints},
    url_builder, validation,
};

fn default_size() -> i64 {
    1024
}

fn default_model() -> String {
    "flux".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageGenerationParams {
    #[schemars(description = "图像描述提示词")]
    pub prompt: String,
    #[serde(default = "default_size")]
    #[schemars(description = "图像宽度（像素）")]
    pub width: i64,
    #[serde(default = "default_size")]
    #[schemars(description = "图像高度（像素）")]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "随机种子值（用于生成一致的图像）")]
    pub seed: Option<i64>,
    #[serde(default = "default_model")]
    #[schemars(description = "要使用的模型（如flux、turbo等）")]
    pub model: String,
    #[serde(default = "default_true")]
    #[schemars(description = "设置为true可去除水印")]
    pub nologo: bool,
    #[serde(default)]
    #[schemars(description = "提高图像质量（应用增强滤镜）")]
    pub enhance: bool,
    #[serde(default)]
    #[schemars(description = "启用安全过滤（过滤不适内容）")]
    pub safe: bool,
    #[serde(default)]
    #[schemars(description = "设置为true可使图像私有（不在公共feed中显示）")]
    pub private: bool,
}

impl Default for ImageGenerationParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            width: default_size(),
            height: default_size(),
            seed: None,
            model: default_model(),
            nologo: true,
            enhance: false,
            safe: false,
            private: false,
        }
    }
}

#[derive(Serialize)]
struct GeneratedImage<'a> {
    url: String,
    #[serde(flatten)]
    params: &'a ImageGenerationParams,
}

/// Builds the image URL for a prompt; the image itself is rendered by the
/// remote service when the URL is first fetched.
pub async fn generate_image(
    client: &PollinationsClient,
    probe: bool,
    raw: &Value,
) -> Result<CallToolResult, ToolError> {
    let params = validation::validate_generate_image(raw)?;
    let url = url_builder::build_image_url(client.image_base(), &params);
    debug!(%url, "built image url");

    if probe {
        client.probe_image(&url, params.safe).await?;
    }

    let mut content = Vec::with_capacity(2);
    if let Some(feedback) = prompt_hints::prompt_feedback(&params.prompt) {
        content.push(Content::text(feedback));
    }
    content.push(json_content(&GeneratedImage {
        url,
        params: &params,
    })?);
    Ok(CallToolResult::success(content))
}
