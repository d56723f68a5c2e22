use crate::command::{Command, ParseError, COMMANDS, NEXT_POLL_NAME};
use crate::dates;
use crate::error::CoreError;
use crate::ical;
use crate::poll::{option_glyph, Poll};
use crate::registry::PollRegistry;
use crate::resolve;
use crate::store::PollStore;
use crate::transport::{ChatTransport, ChatUser, InboundMessage};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Prefix that notifies every channel member.
const BROADCAST: &str = "@everyone";

/// Question substituted for the `!newpoll next` shortcut.
const NEXT_SESSION_QUESTION: &str = "Wann habt ihr Zeit für die nächste Session?";

const POKE_HEADER: &str = "Es müssen die Umfrage noch ausfüllen:";
const VOTING_COMPLETE: &str = "Abstimmung abgeschlossen!";
const NO_CONSENSUS_REPLY: &str = "```diff\n- Kein Termin konnte gefunden werden```";
const POLL_EXISTS: &str = "Poll already exists";
const POLL_MISSING: &str = "Poll does not exist";
const POLL_DELETED: &str = "Poll deleted";
const TEMPLATE_APOLOGY: &str =
    "Sorry, I cannot build a calendar invite right now (no template configured)";
const INTERNAL_APOLOGY: &str = "Something went wrong, please check the logs";

/// Orchestrates one handler invocation per inbound message: parse, dispatch
/// against the registry and the transport, reply. Handlers for distinct
/// messages may run concurrently; the registry serializes the shared state.
pub struct CommandEngine {
    registry: Arc<PollRegistry>,
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn PollStore>,
    /// Only messages in this channel are handled.
    schedule_channel: String,
}

impl CommandEngine {
    pub fn new(
        registry: Arc<PollRegistry>,
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn PollStore>,
        schedule_channel: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            transport,
            store,
            schedule_channel: schedule_channel.into(),
        }
    }

    /// Handle one inbound message end to end. Returns the reply that was
    /// sent, if any. Never fails: every error becomes either a reply or a
    /// log line, so one bad message cannot poison the handler loop.
    pub async fn handle(&self, msg: &InboundMessage) -> Option<String> {
        if msg.author_is_bot || msg.channel != self.schedule_channel {
            return None;
        }
        tracing::info!(
            author = %msg.author.name,
            author_id = %msg.author.id,
            content = %msg.content,
            "request received"
        );

        let reply = match Command::parse(&msg.content) {
            Ok(command) => self.dispatch(command, msg).await,
            // An unknown head carrying arguments is probably meant for some
            // other bot; stay quiet instead of answering with `???`.
            Err(ParseError::UnknownCommandWithArgs) => String::new(),
            Err(err) => err.to_string(),
        };
        if reply.is_empty() {
            return None;
        }

        // Keep the schedule channel free of command chatter.
        if let Err(err) = self.transport.delete_item(&msg.channel, &msg.id).await {
            tracing::warn!("could not delete trigger message: {err:#}");
        }
        if let Err(err) = self.transport.post_message(&msg.channel, &reply).await {
            tracing::warn!("could not send reply: {err:#}");
        }
        Some(reply)
    }

    async fn dispatch(&self, command: Command, msg: &InboundMessage) -> String {
        let result = match command {
            Command::Ping => Ok("pong".to_string()),
            Command::Help => Ok(Self::help()),
            Command::NewPoll {
                name,
                question,
                options,
            } => self.new_poll(msg, &name, question, options).await,
            Command::DeletePoll { name } => self.delete_poll(msg, &name).await,
            Command::EndPoll { name, keep } => self.end_poll(msg, &name, keep).await,
            Command::Poke { name, emote } => self.poke(msg, &name, emote.as_deref()).await,
            Command::Who { message_id, emote } => {
                self.who(msg, &message_id, emote.as_deref()).await
            }
        };
        result.unwrap_or_else(|err| self.reply_for(err))
    }

    /// Convert a command failure into the reply text the user sees.
    fn reply_for(&self, err: CoreError) -> String {
        match err {
            CoreError::AlreadyExists(_) => POLL_EXISTS.to_string(),
            CoreError::NotFound(_) => POLL_MISSING.to_string(),
            CoreError::NoConsensus => NO_CONSENSUS_REPLY.to_string(),
            CoreError::InvalidArgument(msg) => msg,
            CoreError::TemplateMissing => {
                tracing::error!("calendar template missing, export aborted");
                TEMPLATE_APOLOGY.to_string()
            }
            // Invariant violations and collaborator failures are defects:
            // log with context, apologize, keep the handler alive.
            err => {
                tracing::error!(error = %err, "command handling failed");
                INTERNAL_APOLOGY.to_string()
            }
        }
    }

    fn help() -> String {
        let commands = COMMANDS
            .iter()
            .map(|(cmd, usage, desc)| format!("**{cmd}** {usage}\n\t*\\~ {desc}*"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Hi :wave:,\nI am **Termin**, your scheduling automaton.\n\nMy commands are:\n{commands}"
        )
    }

    async fn new_poll(
        &self,
        msg: &InboundMessage,
        name: &str,
        question: String,
        options: Vec<String>,
    ) -> Result<String, CoreError> {
        let (question, options) = if name == NEXT_POLL_NAME {
            (NEXT_SESSION_QUESTION.to_string(), dates::next_weekends())
        } else {
            (question, options)
        };

        let poll = self.registry.create(name, question, options).await?;
        let announcement = format!("{BROADCAST}\n{}", poll.render());
        let item = self
            .transport
            .post_message(&msg.channel, &announcement)
            .await
            .map_err(CoreError::Transport)?;
        let poll = self.registry.mark_posted(name, &item).await?;

        // One labeled reaction per option. Ordering between these calls
        // does not matter, and a failed reaction is only a degraded poll.
        for index in 0..poll.option_count() {
            if let Err(err) = self.transport.add_reaction(&item, &option_glyph(index)).await {
                tracing::warn!(poll = name, index, "could not attach reaction: {err:#}");
            }
        }
        Ok(String::new())
    }

    async fn delete_poll(&self, msg: &InboundMessage, name: &str) -> Result<String, CoreError> {
        let poll = self.registry.remove(name).await?;
        if let Some(item) = poll.posted_item_id() {
            if let Err(err) = self.transport.delete_item(&msg.channel, item).await {
                tracing::warn!(poll = name, "could not delete announcement: {err:#}");
            }
        }
        Ok(POLL_DELETED.to_string())
    }

    async fn end_poll(
        &self,
        msg: &InboundMessage,
        name: &str,
        keep: bool,
    ) -> Result<String, CoreError> {
        let poll = self.registry.lookup(name).await?;

        // Outstanding voters block resolution; the reminder is the reply
        // and the poll stays posted.
        let pending = self.pending_voters(&poll, &msg.channel, None).await?;
        if !pending.is_empty() {
            return Ok(Self::poke_reply(&pending));
        }

        let item = poll
            .posted_item_id()
            .ok_or(CoreError::IllegalState("poll has not been announced"))?;
        let tallies = self
            .transport
            .reaction_tallies(&msg.channel, item)
            .await
            .map_err(CoreError::Transport)?;
        let roster = self
            .transport
            .channel_roster(&msg.channel)
            .await
            .map_err(CoreError::Transport)?;

        let pairs: Vec<(usize, u64)> = tallies
            .iter()
            .enumerate()
            .map(|(index, tally)| (index, tally.count))
            .collect();
        let winner = resolve::winning_option(&pairs, roster.len() as u64)?;
        let option = poll.option_at(winner)?.to_string();

        let reply = match dates::parse_date(&option) {
            Some(date) => {
                let template = self
                    .store
                    .load_template()
                    .await
                    .map_err(CoreError::Storage)?;
                let meta = self
                    .store
                    .invite_defaults()
                    .await
                    .map_err(CoreError::Storage)?;
                let uid = Uuid::new_v4().to_string();
                let invite =
                    ical::build_invite(template.as_deref(), &meta, date, Utc::now(), &uid)?;
                self.transport
                    .send_attachment(&msg.channel, &ical::invite_filename(date), invite.into_bytes())
                    .await
                    .map_err(CoreError::Transport)?;
                format!(
                    "{BROADCAST} Nächster Termin steht fest: {}",
                    date.format(dates::DATE_FMT)
                )
            }
            // A poll over free-form options resolves without an invite.
            None => format!("{BROADCAST} Entscheidung steht fest: {option}"),
        };

        if !keep {
            if let Err(err) = self.transport.delete_item(&msg.channel, item).await {
                tracing::warn!(poll = name, "could not delete announcement: {err:#}");
            }
        }
        self.registry.remove(name).await?;
        Ok(reply)
    }

    async fn poke(
        &self,
        msg: &InboundMessage,
        name: &str,
        emote: Option<&str>,
    ) -> Result<String, CoreError> {
        let poll = self.registry.lookup(name).await?;
        let pending = self.pending_voters(&poll, &msg.channel, emote).await?;
        Ok(Self::poke_reply(&pending))
    }

    async fn who(
        &self,
        msg: &InboundMessage,
        message_id: &str,
        emote: Option<&str>,
    ) -> Result<String, CoreError> {
        let users = self
            .transport
            .reacting_users(&msg.channel, message_id, emote)
            .await
            .map_err(CoreError::Transport)?;
        Ok(users
            .iter()
            .map(|user| user.name.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Roster members who have not yet reacted to the poll's announcement,
    /// optionally counting only reactions with one specific label.
    async fn pending_voters(
        &self,
        poll: &Poll,
        channel: &str,
        emote: Option<&str>,
    ) -> Result<Vec<ChatUser>, CoreError> {
        let item = poll
            .posted_item_id()
            .ok_or(CoreError::IllegalState("poll has not been announced"))?;
        let reacted: HashSet<String> = self
            .transport
            .reacting_users(channel, item, emote)
            .await
            .map_err(CoreError::Transport)?
            .into_iter()
            .map(|user| user.id)
            .collect();
        Ok(self
            .transport
            .channel_roster(channel)
            .await
            .map_err(CoreError::Transport)?
            .into_iter()
            .filter(|user| !reacted.contains(&user.id))
            .collect())
    }

    fn poke_reply(pending: &[ChatUser]) -> String {
        if pending.is_empty() {
            return VOTING_COMPLETE.to_string();
        }
        let mut lines = vec![POKE_HEADER.to_string()];
        lines.extend(pending.iter().map(ChatUser::mention));
        lines.join("\n")
    }
}
