use clap::Parser;
use sgx_fetch::domain::model::DownloadStatus;
use sgx_fetch::utils::logger::{self, TracingObserver};
use sgx_fetch::{CliArgs, DateRequest, FetchConfig, FetchEngine, FetchError, HttpSource, LocalStorage};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let (mut config, config_error) = FetchConfig::load_or_default(&args.config);
    config.apply_cli(&args);

    if let Err(e) = logger::init_cli_logger(args.verbose, &config.log_file, config.log_format) {
        logger::init_stderr_logger(args.verbose);
        tracing::warn!("Cannot open log file {}: {}", config.log_file.display(), e);
    }

    tracing::info!("Starting sgx-fetch");
    if let Some(e) = config_error {
        tracing::debug!(
            "Config file {} not used ({}). Using default values.",
            args.config.display(),
            e
        );
    }
    tracing::debug!("Effective config: {:?}", config);

    let source = HttpSource::new(config.request_timeout())?;
    let engine = FetchEngine::new(
        config.engine_settings(),
        LocalStorage::new(),
        source,
        Arc::new(TracingObserver),
    );

    let today = chrono::Local::now().date_naive();
    let request = DateRequest::from(args.date);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be downloaded");
        let plan = engine.plan(request, today).unwrap_or_else(|e| exit_with(e));
        println!("📅 {} (key {})", plan.date, plan.key);
        for target in &plan.targets {
            println!("  {} -> {}", target.url, target.destination_path.display());
        }
        return Ok(());
    }

    let report = engine.run(request, today).await.unwrap_or_else(|e| exit_with(e));

    println!("📅 {} (key {})", report.date, report.key);
    for outcome in &report.outcomes {
        match &outcome.status {
            DownloadStatus::Saved { bytes } => println!(
                "  ✅ {} ({} bytes) -> {}",
                outcome.file_name,
                bytes,
                outcome.destination_path.display()
            ),
            DownloadStatus::Failed { error } => {
                println!("  ❌ {}: {}", outcome.file_name, error)
            }
        }
    }
    println!(
        "📁 {}/{} files downloaded",
        report.saved(),
        report.outcomes.len()
    );

    // Individual download failures are logged, not reflected in the exit code.
    Ok(())
}

fn exit_with(e: FetchError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
