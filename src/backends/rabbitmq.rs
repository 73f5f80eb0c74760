// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! RabbitMQ broker session built on `lapin`.
//!
//! Topology declared on connect:
//! - a durable topic exchange named by `messaging.exchange`
//! - an exclusive, server-named queue (deleted when the connection goes away)
//! - a binding of that queue to the exchange with `messaging.topic`
//!
//! Deliveries are consumed with manual acknowledgment and a prefetch of
//! `messaging.prefetch` (1 by default), so the broker never hands out a
//! second job while one is still unacknowledged.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicQosOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::uri::{AMQPAuthority, AMQPUri, AMQPUserInfo};
use lapin::{Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};

use crate::config::consts::CONSUMER_TAG;
use crate::config::MessagingConfig;
use crate::errors::BrokerError;
use crate::observability::messages::broker::ConsumerStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::{BrokerSession, InboundDelivery};

const REPLY_SUCCESS: u16 = 200;

pub struct RabbitMqSession {
    connection: Connection,
    channel: Channel,
    consumer: Consumer,
}

impl RabbitMqSession {
    /// Connect, declare the topology and start consuming.
    pub async fn connect(config: &MessagingConfig) -> Result<Self, BrokerError> {
        tracing::debug!(
            host = %config.host,
            port = config.port,
            virtual_host = %config.virtual_host,
            "Connecting to message broker"
        );

        let connection = Connection::connect_uri(
            amqp_uri(config),
            ConnectionProperties::default().with_connection_name(CONSUMER_TAG.into()),
        )
        .await
        .map_err(|e| {
            BrokerError::Connection(format!(
                "{}:{}{}: {}",
                config.host, config.port, config.virtual_host, e
            ))
        })?;

        let channel = connection.create_channel().await?;

        channel
            .basic_qos(config.prefetch, BasicQosOptions::default())
            .await?;

        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        let queue_name = queue.name().as_str().to_string();

        channel
            .queue_bind(
                &queue_name,
                &config.exchange,
                &config.topic,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let consumer = channel
            .basic_consume(
                &queue_name,
                CONSUMER_TAG,
                BasicConsumeOptions {
                    no_ack: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        ConsumerStarted {
            exchange: &config.exchange,
            topic: &config.topic,
            queue: &queue_name,
        }
        .log();

        Ok(Self {
            connection,
            channel,
            consumer,
        })
    }
}

#[async_trait]
impl BrokerSession for RabbitMqSession {
    async fn next_delivery(&mut self) -> Result<Option<InboundDelivery>, BrokerError> {
        match self.consumer.next().await {
            None => Ok(None),
            Some(Err(e)) => Err(BrokerError::Consume(e.to_string())),
            Some(Ok(delivery)) => Ok(Some(InboundDelivery {
                delivery_tag: delivery.delivery_tag,
                correlation_id: delivery
                    .properties
                    .correlation_id()
                    .as_ref()
                    .map(|id| id.as_str().to_string()),
                app_id: delivery
                    .properties
                    .app_id()
                    .as_ref()
                    .map(|id| id.as_str().to_string()),
                routing_key: delivery.routing_key.as_str().to_string(),
                body: delivery.data,
            })),
        }
    }

    async fn acknowledge(&self, delivery_tag: u64) -> Result<(), BrokerError> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| BrokerError::Acknowledge {
                delivery_tag,
                reason: e.to_string(),
            })
    }

    async fn close(&mut self) -> Result<(), BrokerError> {
        self.channel
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(|e| BrokerError::Close(format!("channel: {}", e)))?;
        self.connection
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(|e| BrokerError::Close(format!("connection: {}", e)))
    }
}

/// Broker URI from discrete settings, so credentials and virtual host need
/// no percent-encoding.
fn amqp_uri(config: &MessagingConfig) -> AMQPUri {
    AMQPUri {
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost: config.virtual_host.clone(),
        ..Default::default()
    }
}
