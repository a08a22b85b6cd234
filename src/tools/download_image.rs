use rmcp::{model::CallToolResult, schemars::JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::ToolError, pollinations::PollinationsClient, storage::DownloadDirectory,
    tools::{ensure_image_origin, json_content},
    validation,
};

pub const DEFAULT_OUTPUT_PATH: &str = "image.jpg";

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct DownloadParams {
    #[schemars(description = "要下载的图像URL")]
    pub url: String,
    #[serde(default = "default_output_path")]
    #[schemars(description = "保存图像的路径（包括文件名），相对于下载目录")]
    pub output_path: String,
}

#[derive(Debug, Serialize)]
struct DownloadResult {
    success: bool,
    message: String,
    size: u64,
    path: String,
}

/// Fetches an image and stores it under the download directory.
///
/// Only URLs on the configured image endpoint are fetched. The parent
/// directory is created and re-checked against the download directory with
/// symlinks resolved before anything is fetched, so a rejected path never
/// costs a remote call.
pub async fn download_image(
    client: &PollinationsClient,
    downloads: &DownloadDirectory,
    raw: &Value,
) -> Result<CallToolResult, ToolError> {
    let params = validation::validate_download_image(raw)?;
    ensure_image_origin(&params.url, client.image_base())?;
    let path = downloads.resolve_path(&params.output_path)?;
    info!(path = %path.display(), "image will be saved");

    downloads.ensure_parent(&path).await?;
    downloads.confirm_inside(&path).await?;

    info!(url = %params.url, "downloading image");
    let bytes = client.fetch_bytes(&params.url).await?;

    downloads.write(&path, &bytes).await?;

    let size = downloads.verify(&path).await.inspect_err(|err| {
        warn!(path = %path.display(), error = %err, "file verification failed");
    })?;
    info!(path = %path.display(), size, "file written");

    let path = path.display().to_string();
    let payload = DownloadResult {
        success: true,
        message: format!("图像已下载到 {path}"),
        size,
        path,
    };
    Ok(CallToolResult::success(vec![json_content(&payload)?]))
}
