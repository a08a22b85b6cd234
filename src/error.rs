use thiserror::Error;

pub const VALIDATION_STATUS: u16 = 400;

const CONTENT_FILTERED_MESSAGE: &str =
    "内容被安全过滤器拦截，请修改提示词后重试（safe 模式已启用）";

/// Failure of a single tool invocation.
///
/// Built where the failure happens and rendered once, at the dispatcher
/// boundary, into the text of an `isError` response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    RemoteApi { message: String, status: Option<u16> },

    #[error("{operation}: {message}")]
    FileSystem {
        operation: &'static str,
        message: String,
    },

    /// A fault inside this server, such as a payload that failed to encode.
    #[error("{message}")]
    Internal { message: String },
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::RemoteApi {
            message: message.into(),
            status,
        }
    }

    pub fn file_system(operation: &'static str, message: impl Into<String>) -> Self {
        Self::FileSystem {
            operation,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The remote service rejected a prompt while safe mode was on.
    pub fn content_filtered() -> Self {
        Self::validation(CONTENT_FILTERED_MESSAGE)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::RemoteApi { .. } => "remote_api",
            Self::FileSystem { .. } => "file_system",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(VALIDATION_STATUS),
            Self::RemoteApi { status, .. } => *status,
            Self::FileSystem { .. } | Self::Internal { .. } => None,
        }
    }

    /// The single user-facing rendering of any tool failure.
    pub fn render(&self) -> String {
        match self.status_code() {
            Some(code) => format!("错误: {self} (状态码: {code})"),
            None => format!("错误: {self}"),
        }
    }

    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        let status = err.status().map(|status| status.as_u16());
        let detail = if err.is_timeout() {
            format!("{context}: 请求超时 ({err})")
        } else {
            format!("{context}: {err}")
        };
        Self::remote(detail, status)
    }
}

/// Failures that escape the dispatcher as protocol-level faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("未知工具: {0}")]
    MethodNotFound(String),
}
