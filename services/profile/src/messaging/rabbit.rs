//! RabbitMQ publisher

use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties,
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{EventPublisher, MessagingConfig, MessagingError};
use crate::models::events::{AnketEvent, PhotoEvent, TagsEvent};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Publishes events to the default exchange, routed by queue name
pub struct RabbitPublisher {
    connection: Connection,
    channel: Channel,
    tags_queue: String,
    photos_queue: String,
    ankets_queue: String,
    publish_timeout: Duration,
}

impl RabbitPublisher {
    /// Connect, open a channel and declare the three queues
    pub async fn connect(config: &MessagingConfig) -> Result<Self, MessagingError> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(MessagingError::Connection)?;

        let channel = connection
            .create_channel()
            .await
            .map_err(MessagingError::Connection)?;

        // Non-durable, non-exclusive, kept when unused.
        for queue in [&config.tags_queue, &config.photos_queue, &config.ankets_queue] {
            channel
                .queue_declare(queue, QueueDeclareOptions::default(), FieldTable::default())
                .await
                .map_err(|source| MessagingError::QueueDeclare {
                    queue: queue.clone(),
                    source,
                })?;
            info!("Declared queue: {}", queue);
        }

        Ok(Self {
            connection,
            channel,
            tags_queue: config.tags_queue.clone(),
            photos_queue: config.photos_queue.clone(),
            ankets_queue: config.ankets_queue.clone(),
            publish_timeout: Duration::from_millis(config.publish_timeout_ms),
        })
    }

    /// Close the channel, then the connection
    pub async fn close(&self) -> Result<(), MessagingError> {
        self.channel
            .close(200, "shutdown")
            .await
            .map_err(MessagingError::Connection)?;
        self.connection
            .close(200, "shutdown")
            .await
            .map_err(MessagingError::Connection)?;
        Ok(())
    }

    async fn publish<T>(&self, queue: &str, message: &T) -> Result<(), MessagingError>
    where
        T: Serialize + Sync,
    {
        let payload = serde_json::to_vec(message)?;

        let publish = async {
            let confirm = self
                .channel
                .basic_publish(
                    "",
                    queue,
                    BasicPublishOptions::default(),
                    &payload,
                    BasicProperties::default().with_content_type(JSON_CONTENT_TYPE.into()),
                )
                .await?;
            confirm.await?;
            Ok::<(), lapin::Error>(())
        };

        match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(())) => {
                debug!("Published {} bytes to {}", payload.len(), queue);
                Ok(())
            }
            Ok(Err(source)) => Err(MessagingError::Publish {
                queue: queue.to_string(),
                source,
            }),
            Err(_) => Err(MessagingError::Timeout {
                queue: queue.to_string(),
                timeout_ms: self.publish_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl EventPublisher for RabbitPublisher {
    async fn publish_anket(&self, event: &AnketEvent) -> Result<(), MessagingError> {
        self.publish(&self.ankets_queue, event).await
    }

    async fn publish_tags(&self, event: &TagsEvent) -> Result<(), MessagingError> {
        self.publish(&self.tags_queue, event).await
    }

    async fn publish_photo(&self, event: &PhotoEvent) -> Result<(), MessagingError> {
        self.publish(&self.photos_queue, event).await
    }
}
