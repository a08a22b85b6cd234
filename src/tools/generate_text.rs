use rmcp::{
    model::{CallToolResult, Content},
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ToolError, pollinations::PollinationsClient, validation};

pub(crate) fn default_text_model() -> String {
    "openai".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextGenerationParams {
    #[schemars(description = "文本生成提示词")]
    pub prompt: String,
    #[serde(default = "default_text_model")]
    #[schemars(description = "要使用的文本模型（如openai、mistral等）")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "随机种子值（用于生成一致的结果）")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "系统提示词")]
    pub system: Option<String>,
    #[serde(default)]
    #[schemars(description = "设置为true以JSON格式返回结果")]
    pub json: bool,
    #[serde(default)]
    #[schemars(description = "设置为true可使结果私有（不在公共feed中显示）")]
    pub private: bool,
}

impl Default for TextGenerationParams {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            model: default_text_model(),
            seed: None,
            system: None,
            json: false,
            private: false,
        }
    }
}

pub async fn generate_text(
    client: &PollinationsClient,
    raw: &Value,
) -> Result<CallToolResult, ToolError> {
    let params = validation::validate_generate_text(raw)?;
    let output = client.generate_text_get(&params).await?;
    Ok(CallToolResult::success(vec![Content::text(
        output.into_text(),
    )]))
}
