use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

/// The texture directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    async fn list_files(&self) -> Result<Vec<String>> {
        match fs::metadata(&self.base_path).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(EtlError::DirectoryNotFound {
                    path: self.base_path.display().to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EtlError::DirectoryNotFound {
                    path: self.base_path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            // follows symlinks, so a link to a texture counts as a file
            let is_file = match fs::metadata(entry.path()).await {
                Ok(meta) => meta.is_file(),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                    false
                }
            };
            if !is_file {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non UTF-8 file name {:?}", raw),
            }
        }

        Ok(names)
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(name);
        fs::read(&full_path)
            .await
            .map_err(|source| EtlError::ReadError {
                path: full_path.display().to_string(),
                source,
            })
    }

    /// Stage the bytes next to the target and rename over it, so a failed write
    /// never leaves a truncated texture behind.
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(name);
        let target = full_path.clone();
        let data = data.to_vec();

        let written = tokio::task::spawn_blocking(move || replace_file(&target, &data))
            .await
            .map_err(std::io::Error::other)
            .and_then(|result| result);

        written.map_err(|source| EtlError::WriteError {
            path: full_path.display().to_string(),
            source,
        })
    }
}

fn replace_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    // write through symlinks to the texture they point at
    let target = std::fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = std::fs::metadata(&target)?.permissions();

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().set_permissions(permissions)?;
    staged.as_file().sync_all()?;
    staged.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_files_skips_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();
        std::fs::write(dir.path().join("nested.png").join("c.png"), b"c").unwrap();

        let storage = LocalStorage::new(dir.path());
        let mut names = storage.list_files().await.unwrap();
        names.sort();

        assert_eq!(names, vec!["a.png", "b.txt"]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("gone"));

        match storage.list_files().await {
            Err(EtlError::DirectoryNotFound { path }) => assert!(path.ends_with("gone")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_as_root_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"a").unwrap();

        let storage = LocalStorage::new(file);
        assert!(matches!(
            storage.list_files().await,
            Err(EtlError::DirectoryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_write_round_trip() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.png"), b"before").unwrap();

        let storage = LocalStorage::new(dir.path());
        storage.write_file("a.png", b"after").await.unwrap();

        assert_eq!(storage.read_file("a.png").await.unwrap(), b"after");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "staging file was left behind");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage.read_file("vanished.png").await.unwrap_err();

        match &err {
            EtlError::ReadError { path, .. } => assert!(path.ends_with("vanished.png")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_per_file());
    }

    #[tokio::test]
    async fn test_failed_write_is_write_error_and_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage.write_file("vanished.png", b"data").await.unwrap_err();

        assert!(matches!(err, EtlError::WriteError { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_goes_through_symlink() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.png");
        std::fs::write(&real, b"before").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link.png")).unwrap();

        let storage = LocalStorage::new(dir.path());
        storage.write_file("link.png", b"after").await.unwrap();

        assert!(std::fs::symlink_metadata(dir.path().join("link.png"))
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read(&real).unwrap(), b"after");
    }
}
