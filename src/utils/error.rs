use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image '{path}': {source}")]
    DecodeError {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image '{path}': {source}")]
    EncodeError {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Image processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    Codec,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_)
            | EtlError::DirectoryNotFound { .. }
            | EtlError::ReadError { .. }
            | EtlError::WriteError { .. } => ErrorCategory::FileSystem,
            EtlError::DecodeError { .. }
            | EtlError::EncodeError { .. }
            | EtlError::SerializationError(_) => ErrorCategory::Codec,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // the file on disk is untouched, rerunning is safe
            EtlError::ReadError { .. }
            | EtlError::DecodeError { .. }
            | EtlError::ProcessingError { .. } => ErrorSeverity::Medium,
            // writes are staged and renamed, so a failed one leaves the original in place
            EtlError::WriteError { .. }
            | EtlError::EncodeError { .. }
            | EtlError::SerializationError(_)
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::DirectoryNotFound { .. } => ErrorSeverity::High,
            EtlError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Errors that concern a single texture and may be skipped under `ErrorPolicy::Skip`.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            EtlError::ReadError { .. }
                | EtlError::DecodeError { .. }
                | EtlError::EncodeError { .. }
                | EtlError::WriteError { .. }
                | EtlError::ProcessingError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::DirectoryNotFound { .. } => {
                "Check that the texture directory exists and the path is spelled correctly"
            }
            EtlError::ReadError { .. } => {
                "Check that the file is readable; it was left unchanged"
            }
            EtlError::DecodeError { .. } => {
                "The file is not a readable image; fix or remove it, or narrow the suffix filter"
            }
            EtlError::EncodeError { .. } => {
                "The image could not be re-encoded in its original format; the file was left unchanged"
            }
            EtlError::WriteError { .. } => {
                "Check directory permissions and free disk space; the original file was left unchanged"
            }
            EtlError::IoError(_) => "Check file permissions and that the directory is readable",
            EtlError::SerializationError(_) => "Check that the report path is writable",
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the command line flags or TOML configuration file"
            }
            EtlError::ProcessingError { .. } => {
                "Check that the channel map fits the channel layout of the image"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::DirectoryNotFound { path } => {
                format!("Texture directory '{}' does not exist", path)
            }
            EtlError::ReadError { path, .. } => format!("Could not open file '{}'", path),
            EtlError::DecodeError { path, .. } => format!("Could not read image '{}'", path),
            EtlError::EncodeError { path, .. } => format!("Could not encode image '{}'", path),
            EtlError::WriteError { path, .. } => format!("Could not write image '{}'", path),
            EtlError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
