//! Outbound employee notifications.
//!
//! Engines never call into this crate. They publish [`DomainEvent`]s and a
//! worker feeds each one to [`Dispatcher::dispatch`], which renders the
//! email and SMS templates and hands them to the configured senders.
//!
//! [`DomainEvent`]: hrsuite_core::DomainEvent

mod dispatcher;
mod senders;
mod templates;

pub use dispatcher::{DeliveryRecord, Dispatcher};
pub use senders::{
    Channel, LogEmailSender, LogSmsSender, NotificationSender, OutboundMessage, SMS_MAX_CHARS,
    normalize_phone, truncate_sms,
};
pub use templates::{EmailTemplate, email_for, sms_for};
