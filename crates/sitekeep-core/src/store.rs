use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use crate::error::AppError;
use crate::traits::AssetStore;

/// [`AssetStore`] backed by a single directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    dir: PathBuf,
}

impl DirAssetStore {
    /// Open the directory, creating it (and its parents) if missing.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map an asset name to its path, refusing anything that is not a
    /// single file name inside the directory.
    fn path_for(&self, name: &str) -> Result<PathBuf, AppError> {
        let plain = !matches!(name, "" | "." | "..")
            && !name.contains(['/', '\\', '\0'])
            && matches!(
                Path::new(name).components().collect::<Vec<_>>().as_slice(),
                [Component::Normal(_)]
            );
        if !plain {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("asset name is not a plain file name: {name:?}"),
            )
            .into());
        }
        Ok(self.dir.join(name))
    }
}

impl AssetStore for DirAssetStore {
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        match tokio::fs::read(self.path_for(name)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<(), AppError> {
        tokio::fs::write(self.path_for(name)?, data).await?;
        Ok(())
    }
}
