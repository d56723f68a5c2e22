//! Abstract chat-platform capability consumed by the engine.
//!
//! The concrete gateway (Discord or otherwise) lives outside this crate;
//! tests and the local console runner provide in-process implementations.

use anyhow::Result;
use async_trait::async_trait;

/// Identifier of a posted channel item (message).
pub type ItemId = String;

/// A channel member. Automated accounts never appear in rosters or
/// reacting-user sets returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
}

impl ChatUser {
    /// Platform mention token for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Reaction count for one labeled reaction, in the order the labels were
/// attached to the item (i.e. option order for poll announcements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTally {
    pub glyph: String,
    pub count: u64,
}

/// One inbound chat message, as dispatched by the gateway.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: ItemId,
    pub channel: String,
    pub author: ChatUser,
    pub author_is_bot: bool,
    pub content: String,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post text to a channel, returning the id of the posted item.
    async fn post_message(&self, channel: &str, text: &str) -> Result<ItemId>;

    /// Attach one labeled reaction to a posted item.
    async fn add_reaction(&self, item: &str, glyph: &str) -> Result<()>;

    /// Per-label reaction counts for an item, in label-attachment order.
    async fn reaction_tallies(&self, channel: &str, item: &str) -> Result<Vec<ReactionTally>>;

    /// Distinct users who reacted to an item, optionally restricted to one
    /// label. Automated accounts are excluded.
    async fn reacting_users(
        &self,
        channel: &str,
        item: &str,
        glyph: Option<&str>,
    ) -> Result<Vec<ChatUser>>;

    /// Members of a channel eligible to vote. Automated accounts are
    /// excluded.
    async fn channel_roster(&self, channel: &str) -> Result<Vec<ChatUser>>;

    /// Delete a posted item.
    async fn delete_item(&self, channel: &str, item: &str) -> Result<()>;

    /// Post a file attachment to a channel.
    async fn send_attachment(&self, channel: &str, filename: &str, bytes: Vec<u8>)
        -> Result<()>;
}
