//! Structural checks over raw tool arguments.
//!
//! Each `validate_*` function either returns the typed parameter record for
//! a tool or a [`ToolError::Validation`]. Nothing here touches the network
//! or the filesystem.

use serde_json::{Map, Value};

use crate::{
    error::ToolError,
    tools::{
        download_image::{DEFAULT_OUTPUT_PATH, DownloadParams},
        generate_chat::{ChatCompletionParams, ChatMessage},
        generate_image::ImageGenerationParams,
        generate_text::TextGenerationParams,
        validate_http_url,
    },
};

struct Arguments<'a> {
    label: &'static str,
    fields: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    fn new(label: &'static str, raw: &'a Value) -> Result<Self, ToolError> {
        let fields = raw
            .as_object()
            .ok_or_else(|| ToolError::validation(format!("无效的{label}参数: 参数必须是对象")))?;
        Ok(Self { label, fields })
    }

    fn invalid(&self, field: &str, expected: &str) -> ToolError {
        ToolError::validation(format!("无效的{}参数: {field} 必须是{expected}", self.label))
    }

    /// `null` is treated the same as an absent field.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    fn required_string(&self, field: &str) -> Result<String, ToolError> {
        match self.get(field) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(_) => Err(self.invalid(field, "字符串")),
            None => Err(ToolError::validation(format!(
                "无效的{}参数: 缺少必填字段 {field}",
                self.label
            ))),
        }
    }

    fn prompt(&self) -> Result<String, ToolError> {
        let prompt = self.required_string("prompt")?;
        if prompt.trim().is_empty() {
            return Err(ToolError::validation(format!(
                "无效的{}参数: prompt 不能为空",
                self.label
            )));
        }
        Ok(prompt)
    }

    fn optional_string(&self, field: &str) -> Result<Option<String>, ToolError> {
        match self.get(field) {
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(self.invalid(field, "字符串")),
            None => Ok(None),
        }
    }

    fn optional_integer(&self, field: &str) -> Result<Option<i64>, ToolError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let Value::Number(number) = value else {
            return Err(self.invalid(field, "数字"));
        };
        if let Some(integer) = number.as_i64() {
            return Ok(Some(integer));
        }
        // Clients built on JavaScript may send `1024.0`.
        match number.as_f64() {
            Some(float)
                if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 =>
            {
                Ok(Some(float as i64))
            }
            _ => Err(self.invalid(field, "整数")),
        }
    }

    fn optional_bool(&self, field: &str) -> Result<Option<bool>, ToolError> {
        match self.get(field) {
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(self.invalid(field, "布尔值")),
            None => Ok(None),
        }
    }
}

pub fn validate_generate_image(raw: &Value) -> Result<ImageGenerationParams, ToolError> {
    let args = Arguments::new("图像生成", raw)?;
    let defaults = ImageGenerationParams::default();
    Ok(ImageGenerationParams {
        prompt: args.prompt()?,
        width: args.optional_integer("width")?.unwrap_or(defaults.width),
        height: args.optional_integer("height")?.unwrap_or(defaults.height),
        seed: args.optional_integer("seed")?,
        model: args.optional_string("model")?.unwrap_or(defaults.model),
        nologo: args.optional_bool("nologo")?.unwrap_or(defaults.nologo),
        enhance: args.optional_bool("enhance")?.unwrap_or(defaults.enhance),
        safe: args.optional_bool("safe")?.unwrap_or(defaults.safe),
        private: args.optional_bool("private")?.unwrap_or(defaults.private),
    })
}

pub fn validate_generate_text(raw: &Value) -> Result<TextGenerationParams, ToolError> {
    let args = Arguments::new("文本生成", raw)?;
    let defaults = TextGenerationParams::default();
    Ok(TextGenerationParams {
        prompt: args.prompt()?,
        model: args.optional_string("model")?.unwrap_or(defaults.model),
        seed: args.optional_integer("seed")?,
        system: args.optional_string("system")?,
        json: args.optional_bool("json")?.unwrap_or(defaults.json),
        private: args.optional_bool("private")?.unwrap_or(defaults.private),
    })
}

pub fn validate_generate_chat(raw: &Value) -> Result<ChatCompletionParams, ToolError> {
    let args = Arguments::new("对话生成", raw)?;
    let messages = match args.get("messages") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<ChatMessage>(item.clone()).map_err(|err| {
                    ToolError::validation(format!(
                        "无效的对话生成参数: messages[{index}] 格式错误: {err}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::Array(_)) => {
            return Err(ToolError::validation(
                "无效的对话生成参数: messages 不能为空",
            ));
        }
        Some(_) => return Err(args.invalid("messages", "数组")),
        None => {
            return Err(ToolError::validation(
                "无效的对话生成参数: 缺少必填字段 messages",
            ));
        }
    };
    let defaults = ChatCompletionParams::default();
    Ok(ChatCompletionParams {
        messages,
        model: args.optional_string("model")?.unwrap_or(defaults.model),
        seed: args.optional_integer("seed")?,
        json_mode: args.optional_bool("json_mode")?.unwrap_or(defaults.json_mode),
        private: args.optional_bool("private")?.unwrap_or(defaults.private),
    })
}

pub fn validate_download_image(raw: &Value) -> Result<DownloadParams, ToolError> {
    let args = Arguments::new("图像下载", raw)?;
    let url = args.required_string("url")?;
    let url = validate_http_url(&url)?;
    let output_path = args
        .optional_string("output_path")?
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());
    if output_path.trim().is_empty() {
        return Err(ToolError::validation(
            "无效的图像下载参数: output_path 不能为空",
        ));
    }
    Ok(DownloadParams {
        url: url.to_string(),
        output_path,
    })
}
