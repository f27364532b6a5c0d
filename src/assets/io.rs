use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

use crate::assets::loader::LoadProgress;
use crate::errors::{Result, StageError};

/// 资产读取器 Trait
///
/// 以块为单位异步读取资源字节流，每读完一块回调一次进度。
pub trait AssetReader: Send + Sync {
    fn read_bytes<F>(&self, uri: &str, on_progress: F) -> impl Future<Output = Result<Vec<u8>>> + Send
    where
        F: FnMut(LoadProgress) + Send;
}

/// 本地文件读取器
pub struct FileAssetReader {
    root_path: PathBuf,
    chunk_size: usize,
}

impl FileAssetReader {
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// `path` may be a directory or a file; for a file its parent becomes the root.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self {
            root_path,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes<F>(&self, uri: &str, mut on_progress: F) -> Result<Vec<u8>>
    where
        F: FnMut(LoadProgress) + Send,
    {
        let path = self.root_path.join(uri);
        let mut file = tokio::fs::File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StageError::AssetNotFound(path.display().to_string())
            } else {
                StageError::Io(err)
            }
        })?;

        // Length unknown when metadata is unavailable (pipes, special files).
        let total = file.metadata().await.ok().map(|m| m.len());

        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0_u8; self.chunk_size];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            on_progress(LoadProgress {
                loaded: data.len() as u64,
                total,
            });
        }

        log::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}
