use crate::core::{codec, transform};
use crate::core::{ConfigProvider, DecodedTexture, Pipeline, Storage, TextureFile};
use crate::domain::model::{ErrorPolicy, Operation};
use crate::utils::error::Result;
use std::path::PathBuf;

/// Decode, transform and write back every texture in one directory.
pub struct FlipPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> FlipPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FlipPipeline<S, C> {
    async fn discover(&self) -> Result<Vec<TextureFile>> {
        let suffix = self.config.suffix();
        tracing::debug!(
            "Listing {} for files ending in '{}'",
            self.storage.root().display(),
            suffix
        );

        let mut names: Vec<String> = self
            .storage
            .list_files()
            .await?
            .into_iter()
            .filter(|name| name.ends_with(suffix))
            .collect();
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| TextureFile {
                path: self.storage.root().join(&name),
                name,
            })
            .collect())
    }

    async fn extract(&self, file: &TextureFile) -> Result<DecodedTexture> {
        let bytes = self.storage.read_file(&file.name).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), file.name);
        codec::decode(&file.name, &bytes)
    }

    async fn transform(&self, mut texture: DecodedTexture) -> Result<DecodedTexture> {
        transform::apply_operations(
            &mut texture.image,
            self.config.operations(),
            self.config.channel_map(),
        )?;
        Ok(texture)
    }

    async fn load(&self, file: &TextureFile, texture: DecodedTexture) -> Result<()> {
        // encode fully before touching the file so a failure leaves the original intact
        let bytes = codec::encode(&file.name, &texture)?;
        drop(texture);

        tracing::debug!("Writing {} bytes to {}", bytes.len(), file.name);
        self.storage.write_file(&file.name, &bytes).await
    }

    fn error_policy(&self) -> ErrorPolicy {
        self.config.error_policy()
    }

    fn describe(&self) -> (PathBuf, String, Vec<Operation>) {
        (
            self.storage.root().to_path_buf(),
            self.config.suffix().to_string(),
            self.config.operations().to_vec(),
        )
    }
}
