use std::fmt::Display;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::tools::{generate_image::ImageGenerationParams, generate_text::TextGenerationParams};

/// Characters left untouched by `encodeURIComponent`; the remote service
/// expects prompts escaped exactly this way.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Appends query parameters in exactly the order they are pushed.
#[derive(Debug)]
pub struct QueryBuilder {
    url: String,
    has_query: bool,
}

impl QueryBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            url: base.into(),
            has_query: false,
        }
    }

    pub fn push(mut self, name: &str, value: impl Display) -> Self {
        let separator = if self.has_query { '&' } else { '?' };
        self.url.push(separator);
        self.url.push_str(name);
        self.url.push('=');
        self.url.push_str(&value.to_string());
        self.has_query = true;
        self
    }

    pub fn push_encoded(self, name: &str, value: &str) -> Self {
        let encoded = encode_component(value);
        self.push(name, encoded)
    }

    pub fn push_opt(self, name: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.push(name, value),
            None => self,
        }
    }

    /// Boolean options are sent as `name=true` or not at all.
    pub fn flag(self, name: &str, enabled: bool) -> Self {
        if enabled { self.push(name, "true") } else { self }
    }

    pub fn build(self) -> String {
        self.url
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

pub fn build_image_url(image_base: &str, params: &ImageGenerationParams) -> String {
    let path = format!(
        "{}/prompt/{}",
        image_base.trim_end_matches('/'),
        encode_component(&params.prompt)
    );
    QueryBuilder::new(path)
        .push("width", params.width)
        .push("height", params.height)
        .push_opt("seed", params.seed)
        .push_opt("model", non_empty(&params.model))
        .flag("nologo", params.nologo)
        .flag("enhance", params.enhance)
        .flag("safe", params.safe)
        .flag("private", params.private)
        .build()
}

pub fn build_text_url(text_base: &str, params: &TextGenerationParams) -> String {
    let path = format!(
        "{}/{}",
        text_base.trim_end_matches('/'),
        encode_component(&params.prompt)
    );
    let mut builder = QueryBuilder::new(path)
        .push("model", &params.model)
        .push_opt("seed", params.seed)
        .flag("json", params.json);
    if let Some(system) = params.system.as_deref().and_then(non_empty) {
        builder = builder.push_encoded("system", system);
    }
    builder.flag("private", params.private).build()
}

pub fn build_chat_url(text_base: &str) -> String {
    format!("{}/", text_base.trim_end_matches('/'))
}

pub fn build_models_url(text_base: &str) -> String {
    format!("{}/models", text_base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use percent_encoding::percent_decode_str;

    use super::*;

    const IMAGE_BASE: &str = "https://pollinations.ai";
    const TEXT_BASE: &str = "https://text.pollinations.ai";

    fn image_params(prompt: &str) -> ImageGenerationParams {
        ImageGenerationParams {
            prompt: prompt.to_string(),
            ..ImageGenerationParams::default()
        }
    }

    fn query_names(url: &str) -> Vec<String> {
        let (_, query) = url.split_once('?').expect("url has a query");
        query
            .split('&')
            .map(|pair| pair.split_once('=').map_or(pair, |(name, _)| name).to_string())
            .collect()
    }

    #[test]
    fn image_url_with_defaults() {
        let url = build_image_url(IMAGE_BASE, &image_params("a red fox"));
        assert_eq!(
            url,
            "https://pollinations.ai/prompt/a%20red%20fox?width=1024&height=1024&model=flux&nologo=true"
        );
    }

    #[test]
    fn image_url_keeps_fixed_parameter_order() {
        let params = ImageGenerationParams {
            prompt: "sunset".to_string(),
            width: 512,
            height: 768,
            seed: Some(42),
            model: "turbo".to_string(),
            nologo: true,
            enhance: true,
            safe: true,
            private: true,
        };
        let url = build_image_url(IMAGE_BASE, &params);
        assert_eq!(
            query_names(&url),
            ["width", "height", "seed", "model", "nologo", "enhance", "safe", "private"]
        );
        assert!(url.contains("seed=42&model=turbo"));
    }

    #[test]
    fn false_flags_are_omitted_entirely() {
        let params = ImageGenerationParams {
            nologo: false,
            ..image_params("cat")
        };
        let url = build_image_url(IMAGE_BASE, &params);
        assert!(!url.contains("=false"));
        assert!(!url.contains("nologo"));
        assert!(!url.contains("enhance"));
        assert!(!url.contains("safe"));
        assert!(!url.contains("private"));
    }

    #[test]
    fn prompt_segment_round_trips() {
        let prompt = "一只猫 & a dog? 50% / done #1";
        let url = build_image_url(IMAGE_BASE, &image_params(prompt));
        let segment = url
            .strip_prefix("https://pollinations.ai/prompt/")
            .and_then(|rest| rest.split_once('?'))
            .map(|(segment, _)| segment)
            .expect("prompt segment");
        assert!(!segment.contains(' '));
        assert!(!segment.contains('/'));
        assert!(!segment.contains('&'));
        let decoded = percent_decode_str(segment).decode_utf8().expect("utf-8");
        assert_eq!(decoded, prompt);
    }

    #[test]
    fn encoding_matches_uri_component_set() {
        assert_eq!(encode_component("it's (fine)!*~_.-"), "it's (fine)!*~_.-");
        assert_eq!(encode_component("a+b=c"), "a%2Bb%3Dc");
    }

    #[test]
    fn model_is_appended_verbatim() {
        let params = ImageGenerationParams {
            model: "flux-realism".to_string(),
            ..image_params("x")
        };
        assert!(build_image_url(IMAGE_BASE, &params).contains("&model=flux-realism&"));
    }

    #[test]
    fn text_url_with_all_options() {
        let params = TextGenerationParams {
            prompt: "What is Rust?".to_string(),
            model: "mistral".to_string(),
            seed: Some(7),
            system: Some("Be brief & kind".to_string()),
            json: true,
            private: true,
        };
        assert_eq!(
            build_text_url(TEXT_BASE, &params),
            "https://text.pollinations.ai/What%20is%20Rust%3F?model=mistral&seed=7&json=true&system=Be%20brief%20%26%20kind&private=true"
        );
    }

    #[test]
    fn text_url_with_defaults() {
        let params = TextGenerationParams {
            prompt: "hi".to_string(),
            ..TextGenerationParams::default()
        };
        assert_eq!(
            build_text_url(TEXT_BASE, &params),
            "https://text.pollinations.ai/hi?model=openai"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        assert_eq!(
            build_models_url("https://text.pollinations.ai/"),
            "https://text.pollinations.ai/models"
        );
        assert_eq!(build_chat_url(TEXT_BASE), "https://text.pollinations.ai/");
    }
}
