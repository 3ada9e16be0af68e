use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::protocol::AlarmEvent;
use crate::types::ConnectionContext;

/// Backend capability consumed by the dispatcher
#[async_trait]
pub trait MotionTrigger: Send + Sync {
    /// Mark the camera at `host` as detecting motion
    async fn trigger_motion(&self, host: &str) -> anyhow::Result<String>;
}

/// What the dispatcher did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a motion start; nothing sent
    Ignored,
    /// Backend accepted the trigger
    Triggered(String),
    /// Backend call failed. Not retried.
    Failed(String),
}

/// Decides which alarm events reach the backend.
///
/// Shared read-only by every connection task.
#[derive(Clone)]
pub struct EventDispatcher {
    backend: Arc<dyn MotionTrigger>,
}

impl EventDispatcher {
    pub fn new(backend: Arc<dyn MotionTrigger>) -> Self {
        Self { backend }
    }

    /// Report the event and trigger motion on `host` if it is a motion start.
    ///
    /// `host` is the camera address decoded from the event. Without one there
    /// is nothing to trigger, so the event is only reported. Delivery is at
    /// most once: a failed trigger is logged and dropped.
    pub async fn dispatch(
        &self,
        ctx: &ConnectionContext,
        event: &AlarmEvent,
        host: Option<&str>,
    ) -> DispatchOutcome {
        info!(
            conn_id = ctx.conn_id.0,
            peer = %ctx.peer_addr,
            host = host.unwrap_or("-"),
            address = %event.address,
            description = %event.description,
            event = %event.event_type,
            kind = %event.kind,
            status = %event.status,
            channel = event.channel,
            serial_id = %event.serial_id,
            "📥 Alarm event received"
        );

        if !event.is_motion_start() {
            debug!(
                "No trigger from {}: event={:?} status={:?}",
                ctx, event.event_type, event.status
            );
            return DispatchOutcome::Ignored;
        }

        let Some(host) = host else {
            warn!(
                "⚠️ Motion start from {} without a usable camera address {:?}, not triggering",
                ctx, event.address
            );
            return DispatchOutcome::Ignored;
        };

        match self.backend.trigger_motion(host).await {
            Ok(message) => {
                info!("🚨 Motion triggered for {}: {}", host, message);
                DispatchOutcome::Triggered(message)
            }
            Err(e) => {
                error!("❌ Motion trigger for {} failed: {:#}", host, e);
                DispatchOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}
