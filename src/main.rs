use anyhow::Context;
use clap::Parser;
use countries_etl::utils::error::ErrorSeverity;
use countries_etl::utils::{logger, validation::Validate};
use countries_etl::{
    BatchOptions, CliConfig, ConfigProvider, EtlEngine, EtlError, FlushOutcome, KafkaSource,
    LocalStorage, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse().normalized();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("🚀 Starting countries-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let result = match config.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            match TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path.display()))
            {
                Ok(file_config) => {
                    let output_path = file_config.output_path().to_string();
                    run(file_config, output_path).await
                }
                Err(e) => Err(e),
            }
        }
        None => {
            let output_path = config.output_path.clone();
            run(config, output_path).await
        }
    };

    let Err(e) = result else {
        return Ok(());
    };

    let Some(etl_error) = e.downcast_ref::<EtlError>() else {
        return Err(e);
    };

    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {:#} (Category: {:?}, Severity: {:?})",
        e,
        etl_error.category(),
        etl_error.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", etl_error.recovery_suggestion());

    eprintln!("❌ {}", etl_error.user_friendly_message());
    eprintln!("💡 Suggestion: {}", etl_error.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match etl_error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run<C>(config: C, output_path: String) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate,
{
    config.validate().context("invalid configuration")?;

    let source = KafkaSource::connect(&config).context("failed to connect to Kafka")?;
    let storage = LocalStorage::new(output_path);
    let options = BatchOptions::from_config(&config);

    let summary = EtlEngine::new(source, storage.clone(), options)
        .run()
        .await
        .context("batch aborted")?;

    match &summary.flush {
        FlushOutcome::Written { key, bytes } => {
            println!("✅ Processed {} countries", summary.records_processed);
            println!(
                "📁 Output saved to: {} ({} bytes)",
                storage.base_path().join(key).display(),
                bytes
            );
        }
        FlushOutcome::Skipped => println!("No new data to process"),
        FlushOutcome::Failed { key, error } => {
            eprintln!(
                "⚠️ Processed {} countries but could not write {}: {}",
                summary.records_processed, key, error
            );
        }
    }

    if summary.records_skipped > 0 {
        println!("⚠️ Skipped {} invalid records", summary.records_skipped);
    }

    Ok(())
}
