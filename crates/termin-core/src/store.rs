//! Abstract durable-storage capability consumed by the registry, the
//! engine and the calendar exporter.

use crate::poll::Poll;
use anyhow::Result;
use async_trait::async_trait;

/// Default metadata substituted into calendar invites when the resolved
/// poll does not carry its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteDefaults {
    pub location: String,
    pub summary: String,
    pub description: String,
    /// Event start time of day, `HHMMSS`.
    pub start_time: String,
    /// Event end time of day, `HHMMSS`.
    pub end_time: String,
}

impl Default for InviteDefaults {
    fn default() -> Self {
        Self {
            location: "Online".to_string(),
            summary: "Nächste Session".to_string(),
            description: "Scheduled by the Termin bot".to_string(),
            start_time: "130000".to_string(),
            end_time: "180000".to_string(),
        }
    }
}

#[async_trait]
pub trait PollStore: Send + Sync {
    /// Durably save one poll record under its name, replacing any previous
    /// record with the same name.
    async fn save(&self, poll: &Poll) -> Result<()>;

    /// Retire a poll's durable record. The name becomes reusable.
    async fn retire(&self, poll: &Poll) -> Result<()>;

    /// Load every durable poll record. Implementations skip (and log)
    /// records that fail to decode instead of failing the whole load.
    async fn load_all(&self) -> Result<Vec<Poll>>;

    /// The calendar-invite template, or `None` when not configured.
    async fn load_template(&self) -> Result<Option<String>>;

    /// Default invite metadata.
    async fn invite_defaults(&self) -> Result<InviteDefaults>;
}
