//! Local console gateway: a [`ChatTransport`] whose channel is stdout.
//!
//! Posted items, reactions and the roster live in memory; attachments are
//! written into an outbox directory. Reactions arrive through simulator
//! controls in the REPL, which makes the full poll lifecycle drivable
//! without any chat platform.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use termin_core::transport::{ChatTransport, ChatUser, ItemId, ReactionTally};

#[derive(Default)]
struct State {
    next_id: u64,
    /// Live items: id -> text.
    items: HashMap<ItemId, String>,
    /// Per item: (glyph, reacting users) in attachment order.
    reactions: HashMap<ItemId, Vec<(String, Vec<ChatUser>)>>,
    roster: Vec<ChatUser>,
}

pub struct ConsoleTransport {
    state: Mutex<State>,
    outbox: PathBuf,
}

impl ConsoleTransport {
    pub fn new(outbox: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&outbox)
            .with_context(|| format!("creating outbox {outbox:?}"))?;
        Ok(Self {
            state: Mutex::new(State::default()),
            outbox,
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add a member to the channel roster.
    pub fn join(&self, user: ChatUser) {
        let mut state = self.lock();
        if !state.roster.iter().any(|member| member.id == user.id) {
            println!("* {} joined the channel", user.name);
            state.roster.push(user);
        }
    }

    pub fn roster(&self) -> Vec<ChatUser> {
        self.lock().roster.clone()
    }

    /// Record a reaction from a roster member. The glyph must already be
    /// attached to the item (the bot attaches one per option).
    pub fn react(&self, item: &str, glyph: &str, user_id: &str) -> Result<()> {
        let mut state = self.lock();
        let Some(user) = state
            .roster
            .iter()
            .find(|member| member.id == user_id)
            .cloned()
        else {
            bail!("no roster member with id {user_id}");
        };
        let Some(labels) = state.reactions.get_mut(item) else {
            bail!("no item {item}");
        };
        let Some((_, users)) = labels.iter_mut().find(|(label, _)| label == glyph) else {
            bail!("item {item} has no {glyph} reaction");
        };
        if !users.iter().any(|reactor| reactor.id == user.id) {
            users.push(user);
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn post_message(&self, channel: &str, text: &str) -> Result<ItemId> {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id.to_string();
        state.items.insert(id.clone(), text.to_string());
        println!("#{channel} [{id}]\n{text}\n");
        Ok(id)
    }

    async fn add_reaction(&self, item: &str, glyph: &str) -> Result<()> {
        self.lock()
            .reactions
            .entry(item.to_string())
            .or_default()
            .push((glyph.to_string(), Vec::new()));
        Ok(())
    }

    async fn reaction_tallies(&self, _channel: &str, item: &str) -> Result<Vec<ReactionTally>> {
        Ok(self
            .lock()
            .reactions
            .get(item)
            .map(|labels| {
                labels
                    .iter()
                    .map(|(glyph, users)| ReactionTally {
                        glyph: glyph.clone(),
                        count: users.len() as u64,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn reacting_users(
        &self,
        _channel: &str,
        item: &str,
        glyph: Option<&str>,
    ) -> Result<Vec<ChatUser>> {
        let state = self.lock();
        let mut users: Vec<ChatUser> = Vec::new();
        if let Some(labels) = state.reactions.get(item) {
            for (label, reactors) in labels {
                if glyph.is_some() && glyph != Some(label.as_str()) {
                    continue;
                }
                for user in reactors {
                    if !users.iter().any(|seen| seen.id == user.id) {
                        users.push(user.clone());
                    }
                }
            }
        }
        Ok(users)
    }

    async fn channel_roster(&self, _channel: &str) -> Result<Vec<ChatUser>> {
        Ok(self.lock().roster.clone())
    }

    async fn delete_item(&self, channel: &str, item: &str) -> Result<()> {
        let mut state = self.lock();
        if state.items.remove(item).is_some() {
            println!("#{channel} [{item}] deleted\n");
        }
        state.reactions.remove(item);
        Ok(())
    }

    async fn send_attachment(
        &self,
        channel: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let path = self.outbox.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing attachment {path:?}"))?;
        println!("#{channel} attachment -> {}\n", path.display());
        Ok(())
    }
}
