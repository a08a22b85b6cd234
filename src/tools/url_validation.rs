use url::Url;

use crate::error::ToolError;

pub fn validate_http_url(raw: &str) -> Result<Url, ToolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ToolError::validation("无效的图像下载参数: url 不能为空"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|err| ToolError::validation(format!("无效的图像下载参数: URL格式无效 ({err})")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ToolError::validation(format!(
            "无效的图像下载参数: 仅允许http或https协议，当前协议: {scheme}"
        ))),
    }
}

/// Requires `url` to share scheme, host and port with the image endpoint.
pub fn ensure_image_origin(url: &str, image_base: &str) -> Result<(), ToolError> {
    let url = validate_http_url(url)?;
    let endpoint = Url::parse(image_base)
        .map_err(|err| ToolError::validation(format!("图像服务地址无效: {err}")))?;
    if url.origin() != endpoint.origin() {
        return Err(ToolError::validation(format!(
            "无效的图像下载参数: url 必须指向图像服务 {}",
            endpoint.origin().ascii_serialization()
        )));
    }
    Ok(())
}
