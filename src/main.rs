use anyhow::Context;
use clap::Parser;
use texflip::utils::{logger, validation::Validate};
use texflip::{CliConfig, EtlEngine, FlipPipeline, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting texflip");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let dry_run = config.dry_run;
    let report_path = config.report.clone();

    let storage = LocalStorage::new(&config.dir);
    let pipeline = FlipPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be modified");
        match engine.plan().await {
            Ok(files) => {
                for file in &files {
                    println!("{}", file.path.display());
                }
                println!("{} files would be processed", files.len());
                return Ok(());
            }
            Err(e) => exit_with(&e),
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

            println!(
                "✅ Flipped {} files, {} failed",
                report.processed_count(),
                report.failed_count()
            );

            if report.has_failures() {
                std::process::exit(2);
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &texflip::EtlError) -> ! {
    tracing::error!(
        "❌ Batch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
