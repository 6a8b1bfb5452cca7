use crate::core::fetcher::verify_archive;
use crate::domain::ports::{BodySink, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes downloads to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

/// A download in progress, written to `<name>.part` next to its final path.
#[derive(Debug)]
pub struct StagedFile {
    file: tokio::fs::File,
    part_path: PathBuf,
    final_path: PathBuf,
}

#[async_trait]
impl BodySink for StagedFile {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        Ok(())
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

impl Storage for LocalStorage {
    type Staged = StagedFile;

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(())
    }

    async fn stage(&self, path: &Path) -> Result<StagedFile> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part_path = part_path(path);
        let file = tokio::fs::File::create(&part_path).await?;
        Ok(StagedFile {
            file,
            part_path,
            final_path: path.to_path_buf(),
        })
    }

    async fn check_archive(&self, staged: &mut StagedFile) -> Result<()> {
        staged.file.flush().await?;
        let file = std::fs::File::open(&staged.part_path)?;
        verify_archive(file)
    }

    async fn commit(&self, staged: StagedFile) -> Result<()> {
        let StagedFile {
            mut file,
            part_path,
            final_path,
        } = staged;

        let result = async {
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&part_path, &final_path).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn discard(&self, staged: StagedFile) {
        let StagedFile {
            file, part_path, ..
        } = staged;
        drop(file);
        if let Err(e) = tokio::fs::remove_file(&part_path).await {
            tracing::debug!("Could not remove {}: {}", part_path.display(), e);
        }
    }
}
