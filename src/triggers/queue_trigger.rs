use std::sync::Arc;
use aws_sdk_sqs::{types::Message, Client as SqsClient};
use tracing::{info, error, debug, warn};
use crate::{
    application::notification_service::NotificationService,
    domain::{error::NotifierError, models::StorageEvent},
};

/// Consumes storage events from an SQS queue and routes each file url.
pub struct QueueTrigger {
    service: Arc<NotificationService>,
    sqs_client: SqsClient,
    queue_url: String,
}

impl QueueTrigger {
    pub fn new(service: Arc<NotificationService>, sqs_client: SqsClient, queue_url: String) -> Self {
        Self { service, sqs_client, queue_url }
    }

    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Starting queue trigger, polling SQS queue: {}", self.queue_url);

        let mut poll_count: u64 = 0;
        loop {
            poll_count += 1;
            debug!("Polling SQS queue (attempt {})", poll_count);

            let response = self.sqs_client
                .receive_message()
                .queue_url(&self.queue_url)
                .max_number_of_messages(10)
                .wait_time_seconds(20)
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to receive messages from SQS: {}", e);
                    NotifierError::Queue(e.to_string())
                })?;

            let Some(messages) = response.messages else {
                debug!("No messages received from SQS");
                continue;
            };
            info!("Received {} messages from SQS", messages.len());

            let deleted = self.process_batch(&messages).await;
            debug!("Deleted {} of {} messages", deleted, messages.len());
        }
    }

    /// Handles a received batch and deletes every message that was handled or has no body.
    /// Failures are logged per message and never stop the batch. Returns the number deleted.
    pub async fn process_batch(&self, messages: &[Message]) -> usize {
        let mut deleted = 0;

        for (i, message) in messages.iter().enumerate() {
            match &message.body {
                Some(body) => {
                    debug!("Processing message {} of {}: {}", i + 1, messages.len(), body);
                    if let Err(e) = handle_message(&self.service, body).await {
                        // Left on the queue; the redrive policy decides on retries.
                        error!("Failed to process message {}: {}", i + 1, e);
                        continue;
                    }
                }
                None => warn!("Received message {} without body, deleting it", i + 1),
            }

            let Some(receipt_handle) = &message.receipt_handle else {
                warn!("Message {} has no receipt handle and cannot be deleted", i + 1);
                continue;
            };

            match self.sqs_client
                .delete_message()
                .queue_url(&self.queue_url)
                .receipt_handle(receipt_handle)
                .send()
                .await
            {
                Ok(_) => {
                    debug!("Message {} deleted from queue", i + 1);
                    deleted += 1;
                }
                Err(e) => error!("Failed to delete message {} from SQS: {}", i + 1, e),
            }
        }

        deleted
    }
}

/// Handles one queue message body. Returns the number of sources the file was added for.
pub async fn handle_message(service: &NotificationService, body: &str) -> Result<usize, NotifierError> {
    let event = StorageEvent::from_message(body)
        .map_err(|e| {
            error!("Failed to parse storage event: {}", e);
            e
        })?;

    service.add_to_manifests(&event.data.url).await
}
