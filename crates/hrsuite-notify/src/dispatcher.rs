use std::sync::Arc;

use chrono::NaiveDateTime;
use hrsuite_core::time::timestamp;
use hrsuite_core::{Clock, DomainEvent, HrResult};
use hrsuite_employees::EmployeeDirectory;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::senders::{Channel, NotificationSender, OutboundMessage, normalize_phone, truncate_sms};
use crate::templates::{email_for, sms_for};

const HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeliveryRecord {
    pub event_id: Uuid,
    pub event_kind: &'static str,
    pub channel: Channel,
    pub recipient: String,
    pub success: bool,
    pub error: Option<String>,
    #[serde(with = "timestamp")]
    pub at: NaiveDateTime,
}

/// Turns domain events into email and SMS deliveries.
///
/// Delivery failures are logged and recorded, never returned: an event
/// only fails to dispatch when its employee cannot be resolved.
pub struct Dispatcher {
    directory: EmployeeDirectory,
    email: Arc<dyn NotificationSender>,
    sms: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
    history: RwLock<Vec<DeliveryRecord>>,
}

impl Dispatcher {
    pub fn new(
        directory: EmployeeDirectory,
        email: Arc<dyn NotificationSender>,
        sms: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            email,
            sms,
            clock,
            history: RwLock::new(Vec::new()),
        }
    }

    pub async fn dispatch(&self, event: &DomainEvent) -> HrResult<Vec<DeliveryRecord>> {
        let employee = self.directory.get(event.employee_id).await?;
        let name = employee.full_name();

        let mut outbound = Vec::new();
        if let Some(template) = email_for(&name, &event.payload) {
            outbound.push(OutboundMessage {
                channel: Channel::Email,
                recipient: employee.email.clone(),
                subject: Some(template.subject),
                body: template.body,
            });
        }
        if let Some(text) = sms_for(&name, &event.payload) {
            match employee.phone.as_deref().map(|raw| (raw, normalize_phone(raw))) {
                Some((_, Some(phone))) => outbound.push(OutboundMessage {
                    channel: Channel::Sms,
                    recipient: phone,
                    subject: None,
                    body: truncate_sms(&text),
                }),
                Some((raw, None)) => {
                    warn!("skipping sms for employee {}: invalid phone {raw:?}", employee.id);
                }
                None => {}
            }
        }

        let mut deliveries = Vec::with_capacity(outbound.len());
        for message in outbound {
            let sender = match message.channel {
                Channel::Email => &self.email,
                Channel::Sms => &self.sms,
            };
            let result = sender.send(&message).await;
            if let Err(err) = &result {
                warn!(
                    "{} delivery of {} to {} failed: {err:#}",
                    message.channel,
                    event.kind(),
                    message.recipient
                );
            }
            deliveries.push(DeliveryRecord {
                event_id: event.id,
                event_kind: event.kind(),
                channel: message.channel,
                recipient: message.recipient,
                success: result.is_ok(),
                error: result.err().map(|err| format!("{err:#}")),
                at: self.clock.now(),
            });
        }

        info!(
            "dispatched {} for employee {}: {} deliveries",
            event.kind(),
            employee.id,
            deliveries.len()
        );
        self.remember(&deliveries).await;
        Ok(deliveries)
    }

    /// Most recent deliveries, oldest first.
    pub async fn history(&self, limit: usize) -> Vec<DeliveryRecord> {
        let history = self.history.read().await;
        let skip = history.len().saturating_sub(limit);
        history[skip..].to_vec()
    }

    async fn remember(&self, deliveries: &[DeliveryRecord]) {
        let mut history = self.history.write().await;
        history.extend_from_slice(deliveries);
        let overflow = history.len().saturating_sub(HISTORY_CAPACITY);
        history.drain(..overflow);
    }
}
