pub mod download_image;
pub mod generate_chat;
pub mod generate_image;
pub mod generate_text;
pub mod list_text_models;
pub mod prompt_hints;
pub mod url_validation;

use std::{borrow::Cow, marker::PhantomData};

use rmcp::{
    model::Content,
    schemars::{JsonSchema, Schema, SchemaGenerator},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ToolError;

pub use download_image::{DownloadParams, download_image};
pub use generate_chat::{ChatCompletionParams, generate_chat};
pub use generate_image::{ImageGenerationParams, generate_image};
pub use generate_text::{TextGenerationParams, generate_text};
pub use list_text_models::list_text_models;
pub use url_validation::{ensure_image_origin, validate_http_url};

/// Tool arguments exactly as the caller sent them.
///
/// Advertises the JSON schema of `T` in the tool catalog but accepts any
/// value, so that type mismatches reach the validator and come back as an
/// `isError` result instead of a protocol fault.
#[derive(Debug, Clone)]
pub struct RawArguments<T> {
    pub value: Value,
    _schema: PhantomData<fn() -> T>,
}

impl<T> RawArguments<T> {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            _schema: PhantomData,
        }
    }
}

impl<'de, T> Deserialize<'de> for RawArguments<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::new)
    }
}

impl<T: JsonSchema> JsonSchema for RawArguments<T> {
    fn schema_name() -> Cow<'static, str> {
        T::schema_name()
    }

    fn schema_id() -> Cow<'static, str> {
        T::schema_id()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        T::json_schema(generator)
    }
}

/// Serializes a tool payload into the single pretty-printed text block the
/// callers expect.
pub(crate) fn json_content<T: Serialize>(payload: &T) -> Result<Content, ToolError> {
    serde_json::to_string_pretty(payload)
        .map(Content::text)
        .map_err(|err| ToolError::internal(format!("序列化响应失败: {err}")))
}
