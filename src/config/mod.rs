pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::core::ConfigProvider;
    use crate::domain::model::{ChannelMap, ErrorPolicy, Operation};
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "texflip")]
    #[command(about = "Flip every texture in a directory vertically, in place")]
    pub struct CliConfig {
        /// Directory holding the textures (not searched recursively)
        #[arg(long)]
        pub dir: String,

        /// Only file names ending with this suffix are processed
        #[arg(long, default_value = ".png")]
        pub suffix: String,

        #[arg(long, value_enum, value_delimiter = ',', default_value = "flip-vertical")]
        pub operations: Vec<Operation>,

        /// Channel map for remap-channels, e.g. "mer" or "r,b,zero"
        #[arg(long)]
        pub channel_map: Option<ChannelMap>,

        #[arg(long, value_enum, default_value = "abort")]
        pub on_error: ErrorPolicy,

        /// List the files that would be processed without touching them
        #[arg(long)]
        pub dry_run: bool,

        /// Write a JSON run report to this path
        #[arg(long)]
        pub report: Option<String>,

        #[arg(long, help = "Log process CPU and memory usage")]
        pub monitor: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn input_dir(&self) -> &str {
            &self.dir
        }

        fn suffix(&self) -> &str {
            &self.suffix
        }

        fn operations(&self) -> &[Operation] {
            &self.operations
        }

        fn channel_map(&self) -> Option<&ChannelMap> {
            self.channel_map.as_ref()
        }

        fn error_policy(&self) -> ErrorPolicy {
            self.on_error
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("dir", &self.dir)?;
            validation::validate_suffix("suffix", &self.suffix)?;
            validation::validate_non_empty_list("operations", &self.operations)?;
            if self.operations.contains(&Operation::RemapChannels) {
                validation::validate_required_field("channel-map", &self.channel_map)?;
            }
            Ok(())
        }
    }

}
