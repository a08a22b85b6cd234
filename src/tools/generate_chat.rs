use rmcp::{
    model::{CallToolResult, Content},
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::ToolError, pollinations::PollinationsClient, tools::generate_text::default_text_model,
    validation,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatMessage {
    #[schemars(description = "消息角色（system、user、assistant）")]
    pub role: String,
    #[schemars(description = "消息内容：纯文本，或 text / image_url 片段数组")]
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatCompletionParams {
    #[schemars(description = "对话消息列表")]
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_text_model")]
    #[schemars(description = "要使用的文本模型")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "随机种子值")]
    pub seed: Option<i64>,
    #[serde(default)]
    #[schemars(description = "设置为true以JSON格式返回结果")]
    pub json_mode: bool,
    #[serde(default)]
    #[schemars(description = "设置为true可使结果私有")]
    pub private: bool,
}

impl Default for ChatCompletionParams {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            model: default_text_model(),
            seed: None,
            json_mode: false,
            private: false,
        }
    }
}

/// POST-style text generation over a full message list.
pub async fn generate_chat(
    client: &PollinationsClient,
    raw: &Value,
) -> Result<CallToolResult, ToolError> {
    let params = validation::validate_generate_chat(raw)?;
    let output = client.generate_text_post(&params).await?;
    Ok(CallToolResult::success(vec![Content::text(
        output.into_text(),
    )]))
}
