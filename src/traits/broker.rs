// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::BrokerError;

/// One message delivered by the broker, with the metadata the dispatcher uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundDelivery {
    /// Broker-assigned handle required to acknowledge this delivery.
    pub delivery_tag: u64,
    /// Job id from the message properties, if the publisher set one.
    pub correlation_id: Option<String>,
    /// Originating application id (logged only).
    pub app_id: Option<String>,
    /// Routing key the message was published with (logged only).
    pub routing_key: String,
    /// Raw message body.
    pub body: Vec<u8>,
}

/// A subscription to one topic on the message bus.
///
/// Deliveries are pulled one at a time; the dispatcher finishes each job
/// before asking for the next one.
#[async_trait]
pub trait BrokerSession: Send + Sync {
    /// Wait for the next delivery. `Ok(None)` means the subscription ended.
    async fn next_delivery(&mut self) -> Result<Option<InboundDelivery>, BrokerError>;

    /// Positively acknowledge a delivery.
    async fn acknowledge(&self, delivery_tag: u64) -> Result<(), BrokerError>;

    /// Release the session. Called once when the dispatch loop exits.
    async fn close(&mut self) -> Result<(), BrokerError>;
}
