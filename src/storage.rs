use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::ToolError;

/// Local directory that `download_image` writes into.
#[derive(Clone, Debug)]
pub struct DownloadDirectory {
    base_dir: PathBuf,
}

impl DownloadDirectory {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir: normalize(&base_dir),
        }
    }

    /// Resolves a caller-supplied path under the base directory.
    ///
    /// The result is normalized lexically; anything that would land outside
    /// the base directory (via `..` or an unrelated absolute path) is
    /// rejected.
    pub fn resolve_path(&self, output_path: &str) -> Result<PathBuf, ToolError> {
        let resolved = normalize(&self.base_dir.join(output_path.trim()));
        if resolved == self.base_dir || !resolved.starts_with(&self.base_dir) {
            return Err(self.outside());
        }
        Ok(resolved)
    }

    /// Repeats the containment check with symlinks resolved on disk.
    ///
    /// Runs after `ensure_parent`, when the base directory and the parent of
    /// `path` exist. An existing entry at `path` is followed too, so a
    /// symlinked file cannot redirect the write.
    pub async fn confirm_inside(&self, path: &Path) -> Result<(), ToolError> {
        let base = canonicalize(&self.base_dir).await?;
        let on_disk = if fs::symlink_metadata(path).await.is_ok() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        let resolved = canonicalize(on_disk).await?;
        if !resolved.starts_with(&base) {
            debug!(
                path = %path.display(),
                target = %resolved.display(),
                "path escapes download directory"
            );
            return Err(self.outside());
        }
        Ok(())
    }

    fn outside(&self) -> ToolError {
        ToolError::validation(format!(
            "无效的图像下载参数: output_path 超出下载目录 {}",
            self.base_dir.display()
        ))
    }

    pub async fn ensure_parent(&self, path: &Path) -> Result<(), ToolError> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if fs::metadata(parent).await.is_ok_and(|meta| meta.is_dir()) {
            return Ok(());
        }
        debug!(dir = %parent.display(), "creating download directory");
        fs::create_dir_all(parent).await.map_err(|err| {
            ToolError::file_system(
                "create_dir",
                format!("创建目录 {} 失败: {err}", parent.display()),
            )
        })
    }

    pub async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ToolError> {
        debug!(path = %path.display(), bytes = data.len(), "writing file");
        fs::write(path, data).await.map_err(|err| {
            ToolError::file_system("write", format!("写入文件 {} 失败: {err}", path.display()))
        })
    }

    /// Confirms the file exists and returns its size on disk.
    pub async fn verify(&self, path: &Path) -> Result<u64, ToolError> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(ToolError::file_system(
                "verify",
                format!("文件写入失败: {} 不是文件", path.display()),
            )),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(
                ToolError::file_system("verify", format!("文件写入失败: {}", path.display())),
            ),
            Err(err) => Err(ToolError::file_system(
                "verify",
                format!("读取文件信息 {} 失败: {err}", path.display()),
            )),
        }
    }
}

async fn canonicalize(path: &Path) -> Result<PathBuf, ToolError> {
    fs::canonicalize(path).await.map_err(|err| {
        ToolError::file_system("resolve", format!("解析路径 {} 失败: {err}", path.display()))
    })
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}
