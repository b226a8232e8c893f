// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::application::EventBus;
use crate::domain::GcaEvent;

/// Writes every event to the `gca::events` tracing target as structured JSON.
#[derive(Debug, Default, Clone)]
pub struct LoggingEventBus;

impl LoggingEventBus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventBus for LoggingEventBus {
    async fn publish(&self, event: GcaEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        info!(
            target: "gca::events",
            event_type = event.event_type(),
            timestamp = %event.timestamp(),
            payload = %payload,
            "Domain event"
        );
        Ok(())
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone)]
pub struct NoopEventBus;

#[async_trait]
impl EventBus for NoopEventBus {
    async fn publish(&self, _event: GcaEvent) -> Result<()> {
        Ok(())
    }
}
