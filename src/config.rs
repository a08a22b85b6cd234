use std::{env, path::PathBuf};

use anyhow::{Context, Result, bail};
use url::Url;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://pollinations.ai";
pub const DEFAULT_TEXT_BASE_URL: &str = "https://text.pollinations.ai";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

/// Runtime settings, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub image_base_url: String,
    pub text_base_url: String,
    /// Every `download_image` output path is resolved under this directory.
    pub download_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Issue a HEAD request against generated image URLs before returning them.
    pub probe_image_urls: bool,
    pub transport: Transport,
    pub port: u16,
    pub secret_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir().context("cannot determine working directory")?;
        Self::from_lookup(|key| env::var(key).ok(), cwd)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, cwd: PathBuf) -> Result<Self> {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let image_base_url = normalize_base_url(
            value("POLLINATIONS_IMAGE_BASE_URL").as_deref(),
            DEFAULT_IMAGE_BASE_URL,
        )?;
        let text_base_url = normalize_base_url(
            value("POLLINATIONS_TEXT_BASE_URL").as_deref(),
            DEFAULT_TEXT_BASE_URL,
        )?;
        let download_dir = match value("DOWNLOAD_DIR").map(PathBuf::from) {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        let request_timeout_secs = value("REQUEST_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let probe_image_urls = value("PROBE_IMAGE_URLS")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        let transport = match value("MCP_TRANSPORT").as_deref() {
            None => Transport::Stdio,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "stdio" => Transport::Stdio,
                "http" => Transport::Http,
                other => bail!("MCP_TRANSPORT must be `stdio` or `http`, got `{other}`"),
            },
        };
        let port = value("MCP_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let secret_key = value("SECRET_KEY");

        Ok(Self {
            image_base_url,
            text_base_url,
            download_dir,
            request_timeout_secs,
            probe_image_urls,
            transport,
            port,
            secret_key,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn mcp_path(&self) -> String {
        match self.secret_key.as_deref() {
            Some(value) => format!("/{value}/mcp"),
            None => "/mcp".to_string(),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_base_url(raw: Option<&str>, default: &str) -> Result<String> {
    let Some(raw) = raw else {
        return Ok(default.to_string());
    };
    let base = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", raw.trim_end_matches('/'))
    };
    Url::parse(&base).with_context(|| format!("invalid base url `{raw}`"))?;
    Ok(base)
}
