use anyhow::Context;
use clap::Parser;
use texflip::core::ConfigProvider;
use texflip::utils::{logger, validation::Validate};
use texflip::{EtlEngine, ErrorPolicy, EtlError, FlipPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "texflip-toml")]
#[command(about = "Texture batch flipper driven by a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "texflip.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the per-file error policy from config
    #[arg(long, value_enum)]
    on_error: Option<ErrorPolicy>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based texture batch");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(policy) = args.on_error {
        config.set_error_policy(policy);
        tracing::info!("🔧 Error policy overridden to: {:?}", policy);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let report_path = config.report_path().map(str::to_string);
    let storage = LocalStorage::new(config.input_dir());
    let pipeline = FlipPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be modified");
        match engine.plan().await {
            Ok(files) => {
                println!("🔍 Dry Run Analysis:");
                for file in &files {
                    println!("  {}", file.path.display());
                }
                println!();
                println!("✅ {} files would be processed.", files.len());
                return Ok(());
            }
            Err(e) => report_failure(&e),
        }
    }

    match engine.run().await {
        Ok(report) => {
            if let Some(path) = report_path {
                report
                    .save(&path)
                    .with_context(|| format!("failed to write report to {}", path))?;
                tracing::info!("📁 Report saved to: {}", path);
            }

            println!("✅ Texture batch completed!");
            println!(
                "📊 {} processed, {} failed",
                report.processed_count(),
                report.failed_count()
            );

            if report.has_failures() {
                std::process::exit(2);
            }
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn report_failure(e: &EtlError) -> ! {
    tracing::error!(
        "❌ Texture batch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Directory: {}", config.input_dir());
    println!("  Suffix: {}", config.suffix());

    let operations: Vec<String> = config.operations().iter().map(|o| o.to_string()).collect();
    println!("  Operations: {}", operations.join(", "));

    if let Some(map) = config.channel_map() {
        println!("  Channel Map: {}", map);
    }

    println!("  On File Error: {:?}", config.error_policy());

    if let Some(path) = config.report_path() {
        println!("  Report: {}", path);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
