use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::Config,
    error::ToolError,
    tools::{
        generate_chat::{ChatCompletionParams, ChatMessage},
        generate_text::TextGenerationParams,
    },
    url_builder,
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Body of a text endpoint response.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOutput {
    Json(Value),
    Text(String),
}

impl TextOutput {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequestBody<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    json_mode: bool,
    private: bool,
}

/// HTTP access to the image and text endpoints.
#[derive(Clone, Debug)]
pub struct PollinationsClient {
    client: Client,
    image_base: String,
    text_base: String,
}

impl PollinationsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            image_base: config.image_base_url.clone(),
            text_base: config.text_base_url.clone(),
        })
    }

    pub fn image_base(&self) -> &str {
        &self.image_base
    }

    /// Checks that the image endpoint accepts a constructed URL.
    pub async fn probe_image(&self, image_url: &str, safe: bool) -> Result<(), ToolError> {
        let response = self
            .client
            .head(image_url)
            .send()
            .await
            .map_err(|err| ToolError::from_reqwest("图像地址检查失败", err))?;
        let status = response.status();
        debug!(%status, "image probe finished");
        if status.is_success() {
            return Ok(());
        }
        if safe && status == StatusCode::BAD_REQUEST {
            return Err(ToolError::content_filtered());
        }
        Err(ToolError::remote(
            format!("图像地址检查失败: HTTP {status}"),
            Some(status.as_u16()),
        ))
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ToolError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ToolError::from_reqwest("下载图像失败", err))?;
        let response = assert_ok_response(response, "下载图像失败").await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ToolError::from_reqwest("读取图像数据失败", err))?;
        Ok(bytes.to_vec())
    }

    pub async fn generate_text_get(
        &self,
        params: &TextGenerationParams,
    ) -> Result<TextOutput, ToolError> {
        let url = url_builder::build_text_url(&self.text_base, params);
        debug!(%url, "requesting text generation");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ToolError::from_reqwest("文本生成失败", err))?;
        let response = assert_ok_response(response, "文本生成失败").await?;
        read_text_output(response, params.json).await
    }

    pub async fn generate_text_post(
        &self,
        params: &ChatCompletionParams,
    ) -> Result<TextOutput, ToolError> {
        let url = url_builder::build_chat_url(&self.text_base);
        let body = ChatRequestBody {
            messages: &params.messages,
            model: &params.model,
            seed: params.seed,
            json_mode: params.json_mode,
            private: params.private,
        };
        debug!(%url, messages = params.messages.len(), "requesting chat completion");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ToolError::from_reqwest("文本生成失败", err))?;
        let response = assert_ok_response(response, "文本生成失败").await?;
        read_text_output(response, params.json_mode).await
    }

    pub async fn list_text_models(&self) -> Result<TextOutput, ToolError> {
        let url = url_builder::build_models_url(&self.text_base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ToolError::from_reqwest("获取模型列表失败", err))?;
        let response = assert_ok_response(response, "获取模型列表失败").await?;
        read_text_output(response, true).await
    }
}

async fn assert_ok_response(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = if text.trim().is_empty() {
        format!("{context}: HTTP {status}")
    } else {
        format!("{context}: HTTP {status} {}", text.trim())
    };
    Err(ToolError::remote(message, Some(status.as_u16())))
}

async fn read_text_output(
    response: reqwest::Response,
    expect_json: bool,
) -> Result<TextOutput, ToolError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));
    let text = response
        .text()
        .await
        .map_err(|err| ToolError::from_reqwest("读取响应内容失败", err))?;
    if is_json || expect_json {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Ok(TextOutput::Json(value));
        }
    }
    Ok(TextOutput::Text(text))
}
