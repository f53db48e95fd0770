use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

hrsuite_core::string_enum! {
    pub enum Channel {
        Email => "email",
        Sms => "sms",
    }
}

pub const SMS_MAX_CHARS: usize = 160;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundMessage {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    fn channel(&self) -> Channel;

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}

/// Logs every email instead of talking to an SMTP relay.
#[derive(Debug, Clone)]
pub struct LogEmailSender {
    from: String,
}

impl LogEmailSender {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Default for LogEmailSender {
    fn default() -> Self {
        Self::new("noreply@company.com")
    }
}

#[async_trait]
impl NotificationSender for LogEmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        info!(
            from = %self.from,
            to = %message.recipient,
            subject = message.subject.as_deref().unwrap_or_default(),
            "email delivered"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogSmsSender;

#[async_trait]
impl NotificationSender for LogSmsSender {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        info!(to = %message.recipient, body = %message.body, "sms delivered");
        Ok(())
    }
}

/// Strips separators and accepts `+` followed by 10 to 15 digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    let digits = cleaned.strip_prefix('+')?;
    let valid = (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    valid.then_some(cleaned)
}

pub fn truncate_sms(body: &str) -> String {
    if body.chars().count() <= SMS_MAX_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(SMS_MAX_CHARS - 3).collect();
    cut.push_str("...");
    cut
}
