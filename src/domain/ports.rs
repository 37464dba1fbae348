use crate::domain::model::{ChannelMap, DecodedTexture, ErrorPolicy, Operation, TextureFile};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Flat access to the files directly inside one directory.
pub trait Storage: Send + Sync {
    fn root(&self) -> &Path;
    /// Names of the regular files in the root, subdirectories excluded.
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn read_file(&self, name: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn suffix(&self) -> &str;
    fn operations(&self) -> &[Operation];
    fn channel_map(&self) -> Option<&ChannelMap>;
    fn error_policy(&self) -> ErrorPolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn discover(&self) -> Result<Vec<TextureFile>>;
    async fn extract(&self, file: &TextureFile) -> Result<DecodedTexture>;
    async fn transform(&self, texture: DecodedTexture) -> Result<DecodedTexture>;
    async fn load(&self, file: &TextureFile, texture: DecodedTexture) -> Result<()>;

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Abort
    }

    /// Header fields for the run report: directory, suffix and operation chain.
    fn describe(&self) -> (std::path::PathBuf, String, Vec<Operation>);
}
