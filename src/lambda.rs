use countries_etl::utils::{logger, validation::Validate};
use countries_etl::{
    BatchOptions, EtlEngine, InvocationResponse, KafkaSource, LambdaConfig, S3Storage,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

/// 事件內容不影響處理，每次呼叫處理一批
async fn function_handler(_event: LambdaEvent<serde_json::Value>) -> Result<InvocationResponse, Error> {
    tracing::info!("🚀 Starting countries ETL Lambda function");

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    let storage = S3Storage::from_config(&config).await;
    tracing::debug!("Writing batches to bucket {}", storage.bucket());

    let source = KafkaSource::connect(&config)?;
    let options = BatchOptions::from_config(&config);

    // 轉換或讀取錯誤會直接讓這次呼叫失敗
    let summary = EtlEngine::new(source, storage, options).run().await?;

    let response = InvocationResponse::from(&summary);
    tracing::info!("✅ {}", response.body);
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
