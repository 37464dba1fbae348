use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A directory entry selected by the suffix filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureFile {
    pub name: String,
    pub path: PathBuf,
}

/// A decoded image plus the container format it came from, so it can be written back unchanged.
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedTexture {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    FlipVertical,
    RemapChannels,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::FlipVertical => write!(f, "flip_vertical"),
            Operation::RemapChannels => write!(f, "remap_channels"),
        }
    }
}

/// What happens when a single texture fails to decode, transform, encode or write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSource {
    Channel(usize),
    Zero,
}

impl fmt::Display for ChannelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSource::Channel(index) => write!(f, "{}", index),
            ChannelSource::Zero => write!(f, "zero"),
        }
    }
}

/// Output channel `i` takes the value named by `sources[i]`; channels past the end are kept.
///
/// Parsed from a comma-separated list of source indices, channel letters
/// (`r`, `g`, `b`, `a`) or `zero`, or from a preset name. The `mer` preset
/// moves blue into green and clears blue: `r,b,zero`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelMap {
    sources: Vec<ChannelSource>,
}

pub const MAX_CHANNELS: usize = 4;

impl ChannelMap {
    pub fn new(sources: Vec<ChannelSource>) -> Result<Self, String> {
        if sources.is_empty() {
            return Err("channel map must name at least one output channel".to_string());
        }
        if sources.len() > MAX_CHANNELS {
            return Err(format!(
                "channel map has {} entries, images have at most {} channels",
                sources.len(),
                MAX_CHANNELS
            ));
        }
        if let Some(ChannelSource::Channel(index)) = sources
            .iter()
            .find(|s| matches!(s, ChannelSource::Channel(i) if *i >= MAX_CHANNELS))
        {
            return Err(format!("source channel {} is out of range", index));
        }
        Ok(Self { sources })
    }

    pub fn mer() -> Self {
        Self {
            sources: vec![
                ChannelSource::Channel(0),
                ChannelSource::Channel(2),
                ChannelSource::Zero,
            ],
        }
    }

    pub fn sources(&self) -> &[ChannelSource] {
        &self.sources
    }

    /// Highest source channel index referenced, if any.
    pub fn max_source(&self) -> Option<usize> {
        self.sources
            .iter()
            .filter_map(|s| match s {
                ChannelSource::Channel(i) => Some(*i),
                ChannelSource::Zero => None,
            })
            .max()
    }
}

impl FromStr for ChannelMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("mer") {
            return Ok(Self::mer());
        }

        let sources = trimmed
            .split(',')
            .map(|token| match token.trim().to_ascii_lowercase().as_str() {
                "r" => Ok(ChannelSource::Channel(0)),
                "g" => Ok(ChannelSource::Channel(1)),
                "b" => Ok(ChannelSource::Channel(2)),
                "a" => Ok(ChannelSource::Channel(3)),
                "zero" => Ok(ChannelSource::Zero),
                other => other
                    .parse::<usize>()
                    .map(ChannelSource::Channel)
                    .map_err(|_| format!("unknown channel token '{}'", other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(sources)
    }
}

impl TryFrom<String> for ChannelMap {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelMap> for String {
    fn from(map: ChannelMap) -> Self {
        map.to_string()
    }
}

impl fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.sources.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", tokens.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Processed { width: u32, height: u32 },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub suffix: String,
    pub operations: Vec<Operation>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn new(directory: PathBuf, suffix: String, operations: Vec<Operation>) -> Self {
        Self {
            directory,
            suffix,
            operations,
            started_at: Utc::now(),
            finished_at: None,
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, file: &TextureFile, status: FileStatus) {
        self.files.push(FileOutcome {
            file: file.name.clone(),
            status,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn processed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Processed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.files.len() - self.processed_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> crate::utils::error::Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
