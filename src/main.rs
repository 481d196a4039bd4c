use std::sync::Arc;
use manifest_notifier::{
    application::notification_service::NotificationService,
    config::Settings,
    infrastructure::{notify_api::client::NotifyApiClient, s3_adapter::S3ConfigurationLoader},
    triggers::{queue_trigger::QueueTrigger, timer_trigger::TimerTrigger},
};
use tracing::{info, debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("manifest_notifier=debug".parse().unwrap())
            .add_directive("aws_sdk=warn".parse().unwrap()))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting manifest notifier");
    let settings = Settings::from_env()?;
    debug!(
        "Configuration: s3://{}/{}, queue: {:?}, notify api: {}",
        settings.config_bucket, settings.config_key, settings.queue_url, settings.notify_api.base_url
    );

    let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

    // Configure endpoint for LocalStack if AWS_ENDPOINT_URL is set
    let endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();
    if let Some(endpoint_url) = &endpoint_url {
        info!("Using custom AWS endpoint: {}", endpoint_url);
        aws_config_builder = aws_config_builder.endpoint_url(endpoint_url);
    }
    let aws_config = aws_config_builder.load().await;
    debug!("AWS region: {:?}", aws_config.region());

    let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);
    if endpoint_url.is_some() {
        s3_config = s3_config.force_path_style(true);
    }
    let s3_client = aws_sdk_s3::Client::from_conf(s3_config.build());

    let config_loader = Arc::new(S3ConfigurationLoader::new(
        s3_client,
        settings.config_bucket.clone(),
        settings.config_key.clone(),
    ));
    let notifier = Arc::new(NotifyApiClient::new());
    let service = Arc::new(NotificationService::new(config_loader, notifier, settings.notify_api.clone()));

    let queue_trigger = settings.queue_url.clone().map(|queue_url| {
        QueueTrigger::new(service.clone(), aws_sdk_sqs::Client::new(&aws_config), queue_url)
    });
    let timer_trigger = settings.timer.is_enabled()
        .then(|| TimerTrigger::new(service.clone(), settings.timer.clone()));

    if queue_trigger.is_none() && timer_trigger.is_none() {
        warn!("Neither SQS_QUEUE_URL nor NOTIFY_TIMER_SOURCE_IDS is set, nothing to do");
        return Ok(());
    }

    tokio::try_join!(
        async {
            match &queue_trigger {
                Some(trigger) => trigger.run().await,
                None => {
                    info!("Queue trigger disabled");
                    Ok(())
                }
            }
        },
        async {
            match &timer_trigger {
                Some(trigger) => trigger.run().await,
                None => {
                    info!("Timer trigger disabled");
                    Ok(())
                }
            }
        },
    )?;

    Ok(())
}
