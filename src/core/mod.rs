pub mod codec;
pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{DecodedTexture, TextureFile};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
