use crate::core::ConfigProvider;
use crate::domain::model::{ChannelMap, ErrorPolicy, Operation};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    pub error_handling: Option<ErrorHandlingConfig>,
    pub monitoring: Option<MonitoringConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub directory: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default = "default_operations")]
    pub operations: Vec<Operation>,
    pub channel_map: Option<ChannelMap>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            operations: default_operations(),
            channel_map: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_file_error: Option<ErrorPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub path: String,
}

fn default_suffix() -> String {
    ".png".to_string()
}

fn default_operations() -> Vec<Operation> {
    vec![Operation::FlipVertical]
}

impl TomlConfig {
    /// Load the job configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse the job configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Expand `${VAR}` references from the environment; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;
        validation::validate_path("source.directory", &self.source.directory)?;
        validation::validate_suffix("source.suffix", &self.source.suffix)?;
        validation::validate_non_empty_list("transform.operations", &self.transform.operations)?;

        if self.transform.operations.contains(&Operation::RemapChannels) {
            validation::validate_required_field(
                "transform.channel_map",
                &self.transform.channel_map,
            )?;
        }

        if let Some(report) = &self.report {
            validation::validate_path("report.path", &report.path)?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn report_path(&self) -> Option<&str> {
        self.report.as_ref().map(|r| r.path.as_str())
    }

    pub fn set_error_policy(&mut self, policy: ErrorPolicy) {
        self.error_handling = Some(ErrorHandlingConfig {
            on_file_error: Some(policy),
        });
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.source.directory
    }

    fn suffix(&self) -> &str {
        &self.source.suffix
    }

    fn operations(&self) -> &[Operation] {
        &self.transform.operations
    }

    fn channel_map(&self) -> Option<&ChannelMap> {
        self.transform.channel_map.as_ref()
    }

    fn error_policy(&self) -> ErrorPolicy {
        self.error_handling
            .as_ref()
            .and_then(|e| e.on_file_error)
            .unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
